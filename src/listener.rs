//! Correlated request/reply over the listener topics
//!
//! The listener subsystem transcribes speech on demand: the controller
//! publishes a request on `subsystem.listener.command` and the reply
//! comes back on `subsystem.listener.recording`, tagged with the
//! request's correlation id. Because the bus fans out, the reply topic
//! may carry replies meant for other requesters; the correlation id is
//! the only demultiplexing key. First matching reply wins; everything
//! else is discarded, never buffered or replayed.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::bus::{BusSubscription, MessageBus, topic};
use crate::{Error, Result};

/// Recording mode requested from the listener subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Record until end of utterance and transcribe
    Phrase,
}

/// Request published on `subsystem.listener.command`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseRequest {
    /// Recording mode
    pub mode: RequestMode,
    /// Correlation id, fresh per request and never reused
    pub request_id: String,
}

/// Reply received on `subsystem.listener.recording`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseReply {
    /// Correlation id echoed from the request
    pub request_id: String,
    /// Transcribed speech, possibly empty
    pub transcription: String,
}

/// Synchronous "ask for a phrase" primitive on top of the fan-out bus
///
/// Holds the pre-established subscription to the reply topic. Requests
/// are strictly sequential: `request_phrase` takes `&mut self`, so at
/// most one request is ever outstanding.
pub struct PhraseClient {
    bus: Arc<dyn MessageBus>,
    recordings: BusSubscription,
}

impl PhraseClient {
    /// Subscribe to the reply topic and return a ready client.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established.
    pub async fn new(bus: Arc<dyn MessageBus>) -> Result<Self> {
        let recordings = bus.subscribe(topic::LISTENER_RECORDING).await?;
        Ok(Self { bus, recordings })
    }

    /// Request a transcription and wait for the matching reply.
    ///
    /// With `timeout: None` the wait is unbounded. Replies carrying a
    /// different correlation id are stale and dropped; unparseable
    /// payloads are dropped too. Both keep the wait going.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ListeningTimeout`] when the deadline passes
    /// without a matching reply, or a bus error if the transport fails.
    pub async fn request_phrase(&mut self, timeout: Option<Duration>) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let request = PhraseRequest {
            mode: RequestMode::Phrase,
            request_id: request_id.clone(),
        };
        self.bus
            .publish(topic::LISTENER_COMMAND, serde_json::to_string(&request)?)
            .await?;
        tracing::debug!(%request_id, "listening for phrase");

        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let message = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, self.recordings.recv())
                    .await
                    .map_err(|_| Error::ListeningTimeout)??,
                None => self.recordings.recv().await?,
            };

            let reply: PhraseReply = match serde_json::from_str(&message.payload) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed reply payload");
                    continue;
                }
            };
            if reply.request_id != request_id {
                tracing::debug!(stale_id = %reply.request_id, "ignoring reply for another request");
                continue;
            }

            tracing::debug!(%request_id, transcription = %reply.transcription, "phrase received");
            return Ok(reply.transcription);
        }
    }
}
