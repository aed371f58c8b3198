//! Message bus abstraction
//!
//! The robot's subsystems (listener, LED, speech) talk over a fan-out
//! publish/subscribe bus: every subscriber to a topic sees every message
//! published on it. The controller only needs the two primitives in
//! [`MessageBus`]; everything else (correlation, timeouts) is layered on
//! top in [`crate::listener`].

mod memory;
mod remote;

pub use memory::MemoryBus;
pub use remote::RemoteBus;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{Error, Result};

/// Well-known bus topics
pub mod topic {
    /// Phrase requests to the listener subsystem
    pub const LISTENER_COMMAND: &str = "subsystem.listener.command";
    /// Transcription replies from the listener subsystem
    pub const LISTENER_RECORDING: &str = "subsystem.listener.recording";
    /// LED on/off commands
    pub const LED_COMMAND: &str = "subsystem.led.command";
    /// Plain-text phrases for the speech subsystem
    pub const SPEECH_COMMAND: &str = "subsystem.speech.command";
}

/// A message delivered on a bus topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Topic the message was published on
    pub topic: String,

    /// Raw payload; JSON for most topics, plain text for speech
    pub payload: String,
}

/// Fan-out publish/subscribe transport
///
/// Implementations: [`MemoryBus`] (in-process, used by tests and
/// `--embedded` runs) and [`RemoteBus`] (WebSocket broker connection).
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a payload on a topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport is no longer usable.
    async fn publish(&self, topic: &str, payload: String) -> Result<()>;

    /// Subscribe to a topic, receiving every message published on it
    /// from this point on.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established.
    async fn subscribe(&self, topic: &str) -> Result<BusSubscription>;
}

/// A live subscription to a single topic
///
/// Dropping the subscription releases it.
pub struct BusSubscription {
    topic: String,
    rx: broadcast::Receiver<BusMessage>,
}

impl BusSubscription {
    pub(crate) fn new(topic: &str, rx: broadcast::Receiver<BusMessage>) -> Self {
        Self {
            topic: topic.to_string(),
            rx,
        }
    }

    /// Topic this subscription is bound to
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Receive the next message on the subscribed topic.
    ///
    /// Messages dropped by a lagging fan-out slot are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] once the bus side has shut down.
    pub async fn recv(&mut self) -> Result<BusMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) if message.topic == self.topic => return Ok(message),
                // Shared fan-out channel; other topics are not ours
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(topic = %self.topic, missed, "subscription lagged, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(Error::Bus("bus connection closed".to_string()));
                }
            }
        }
    }
}
