//! Wake word detection
//!
//! Turns the stream of uncorrelated phrases into a wake event plus any
//! command text spoken in the same breath. The wake word must open the
//! phrase at a word boundary: with wake word "robot", "robot go" wakes
//! but "robots are great" does not.

use regex::Regex;

use crate::listener::PhraseClient;
use crate::{Error, Result};

/// Matches phrases that start with the configured wake word
pub struct WakeWordDetector {
    wake_word: String,
    pattern: Regex,
}

impl WakeWordDetector {
    /// Build a detector for a wake word (matched case-insensitively).
    ///
    /// # Errors
    ///
    /// Returns an error if the wake word cannot be compiled into a
    /// pattern.
    pub fn new(wake_word: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(r"(?i)^{}\b(.*)", regex::escape(wake_word)))
            .map_err(|e| Error::Config(format!("invalid wake word {wake_word:?}: {e}")))?;
        Ok(Self {
            wake_word: wake_word.to_string(),
            pattern,
        })
    }

    /// Wake word this detector listens for
    #[must_use]
    pub fn wake_word(&self) -> &str {
        &self.wake_word
    }

    /// Text trailing the wake word, if the phrase starts with it.
    ///
    /// The trailing text is returned raw (untrimmed, possibly empty).
    /// `None` means the phrase did not open with the wake word.
    #[must_use]
    pub fn trailing_command<'p>(&self, phrase: &'p str) -> Option<&'p str> {
        self.pattern
            .captures(phrase)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }

    /// Keep requesting phrases until one opens with the wake word, then
    /// return the trailing text.
    ///
    /// Non-matching phrases are discarded without buffering; the
    /// detector simply asks again.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus fails. Never times out.
    pub async fn wait_for_wake(&self, listener: &mut PhraseClient) -> Result<String> {
        tracing::debug!(wake_word = %self.wake_word, "listening for wake word");
        loop {
            let phrase = listener.request_phrase(None).await?;
            if let Some(trailing) = self.trailing_command(&phrase) {
                tracing::debug!(%phrase, "wake word detected");
                return Ok(trailing.to_string());
            }
            tracing::trace!(%phrase, "phrase did not open with wake word");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_text_is_raw() {
        let detector = WakeWordDetector::new("Robot").unwrap();
        assert_eq!(detector.trailing_command("Robot turn left"), Some(" turn left"));
    }

    #[test]
    fn word_boundary_is_enforced() {
        let detector = WakeWordDetector::new("Robot").unwrap();
        assert_eq!(detector.trailing_command("Robots are great"), None);
    }

    #[test]
    fn match_is_case_insensitive() {
        let detector = WakeWordDetector::new("robot").unwrap();
        assert_eq!(detector.trailing_command("ROBOT stop"), Some(" stop"));
        assert_eq!(detector.trailing_command("rObOt"), Some(""));
    }

    #[test]
    fn wake_word_must_open_the_phrase() {
        let detector = WakeWordDetector::new("robot").unwrap();
        assert_eq!(detector.trailing_command("hey robot stop"), None);
    }

    #[test]
    fn bare_wake_word_yields_empty_trailing_text() {
        let detector = WakeWordDetector::new("robot").unwrap();
        assert_eq!(detector.trailing_command("robot"), Some(""));
    }

    #[test]
    fn wake_word_with_regex_metacharacters_is_escaped() {
        let detector = WakeWordDetector::new("r2.d2").unwrap();
        assert_eq!(detector.trailing_command("r2xd2 go"), None);
        assert_eq!(detector.trailing_command("r2.d2 go"), Some(" go"));
    }
}
