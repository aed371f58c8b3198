//! LED and speech side effects
//!
//! Thin publishers for the LED and speech subsystems. Order matters to
//! the subsystems, so callers emit these strictly in sequence around
//! the listening calls they bracket.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::bus::{MessageBus, topic};

/// LED operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedAction {
    /// Switch the LED on
    TurnOn,
    /// Switch the LED off
    TurnOff,
}

/// Command published on `subsystem.led.command`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedCommand {
    /// Operation to perform
    pub command: LedAction,
    /// LED name (e.g. "red")
    pub name: String,
}

/// Switch a named LED on.
///
/// # Errors
///
/// Returns an error if the bus publish fails.
pub async fn turn_on_led(bus: &dyn MessageBus, name: &str) -> Result<()> {
    publish_led(bus, LedAction::TurnOn, name).await
}

/// Switch a named LED off.
///
/// # Errors
///
/// Returns an error if the bus publish fails.
pub async fn turn_off_led(bus: &dyn MessageBus, name: &str) -> Result<()> {
    publish_led(bus, LedAction::TurnOff, name).await
}

async fn publish_led(bus: &dyn MessageBus, command: LedAction, name: &str) -> Result<()> {
    let payload = serde_json::to_string(&LedCommand {
        command,
        name: name.to_string(),
    })?;
    bus.publish(topic::LED_COMMAND, payload).await
}

/// Speak a phrase. Speech payloads are plain text, not JSON-wrapped.
///
/// # Errors
///
/// Returns an error if the bus publish fails.
pub async fn say(bus: &dyn MessageBus, phrase: &str) -> Result<()> {
    tracing::debug!(%phrase, "saying");
    bus.publish(topic::SPEECH_COMMAND, phrase.to_string()).await
}

/// Speak a randomly chosen member of a phrase set.
///
/// An empty set is a no-op. No ordering or distribution is promised
/// beyond picking from the set.
///
/// # Errors
///
/// Returns an error if the bus publish fails.
pub async fn say_one_of(bus: &dyn MessageBus, phrases: &[String]) -> Result<()> {
    let Some(phrase) = phrases.choose(&mut rand::thread_rng()).cloned() else {
        return Ok(());
    };
    say(bus, &phrase).await
}
