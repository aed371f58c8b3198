//! Wake-to-dispatch session loop
//!
//! One session runs from a wake event to either a dispatched command or
//! a timeout, then the loop goes back to waiting for the wake word.
//! Sessions are strictly sequential; there is never more than one
//! outstanding listen. The loop has no terminal state of its own: it
//! ends only when the bus fails or the process is torn down.

use std::sync::Arc;

use crate::bus::MessageBus;
use crate::config::{Config, SessionConfig};
use crate::dispatch::CommandDispatcher;
use crate::listener::PhraseClient;
use crate::wake::WakeWordDetector;
use crate::{Error, Result, effects};

/// The session state machine
pub struct SessionLoop {
    bus: Arc<dyn MessageBus>,
    listener: PhraseClient,
    detector: WakeWordDetector,
    session: SessionConfig,
    dispatcher: Box<dyn CommandDispatcher>,
}

impl SessionLoop {
    /// Subscribe to the reply topic and build a ready session loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the wake word is unusable or the reply
    /// subscription cannot be established.
    pub async fn new(
        bus: Arc<dyn MessageBus>,
        config: &Config,
        dispatcher: Box<dyn CommandDispatcher>,
    ) -> Result<Self> {
        let listener = PhraseClient::new(Arc::clone(&bus)).await?;
        let detector = WakeWordDetector::new(&config.wake_word)?;
        Ok(Self {
            bus,
            listener,
            detector,
            session: config.session.clone(),
            dispatcher,
        })
    }

    /// Run wake-to-dispatch cycles forever.
    ///
    /// # Errors
    ///
    /// Returns the first bus/transport error. Listening timeouts are
    /// handled inside the loop and never surface here.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.run_session().await?;
        }
    }

    /// One wake-to-dispatch (or wake-to-timeout) cycle.
    async fn run_session(&mut self) -> Result<()> {
        let trailing = self.detector.wait_for_wake(&mut self.listener).await?;

        let command = if trailing.trim().is_empty() {
            tracing::debug!("no command followed the wake word");
            match self.listen_for_command().await? {
                // Any reply counts as received, an empty one included
                Some(follow_up) => {
                    effects::say_one_of(&*self.bus, &self.session.acknowledgements).await?;
                    follow_up
                }
                None => return Ok(()),
            }
        } else {
            effects::say_one_of(&*self.bus, &self.session.acknowledgements).await?;
            trailing
        };

        let command = command.trim();
        if command.is_empty() {
            tracing::debug!("empty command, nothing to dispatch");
            return Ok(());
        }

        self.dispatcher.dispatch(command).await;
        Ok(())
    }

    /// Prompt for a follow-up command within the configured window.
    ///
    /// Emits LED-on, prompt, then listens; the LED-off is emitted on
    /// every exit from this state, including timeout and transport
    /// failure. Returns `None` when the window expired (the spoken
    /// timeout message has already been emitted).
    async fn listen_for_command(&mut self) -> Result<Option<String>> {
        effects::turn_on_led(&*self.bus, &self.session.led_name).await?;
        effects::say_one_of(&*self.bus, &self.session.prompts).await?;

        tracing::debug!("listening for a command");
        let outcome = self
            .listener
            .request_phrase(Some(self.session.command_timeout()))
            .await;

        effects::turn_off_led(&*self.bus, &self.session.led_name).await?;

        match outcome {
            Ok(command) => {
                tracing::debug!(%command, "got command string");
                Ok(Some(command))
            }
            Err(Error::ListeningTimeout) => {
                tracing::debug!("no command received before timeout");
                effects::say(&*self.bus, &self.session.timeout_message).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
