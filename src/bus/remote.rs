//! WebSocket bus client
//!
//! Connects to the robot's message broker. Each WebSocket text frame
//! carries one JSON envelope: publishes are `{"op": "publish", "topic",
//! "payload"}` and subscriptions are announced with `{"op": "subscribe",
//! "topic"}`. A writer task drains an outbound queue and a reader task
//! fans incoming publishes into a broadcast channel shared by all
//! subscriptions.
//!
//! There is no reconnect: once the connection drops, `publish` and
//! subscription `recv` calls fail and the error propagates to the
//! top-level loop.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;

use super::{BusMessage, BusSubscription, MessageBus};
use crate::{Error, Result};

/// Outbound queue depth before `publish` applies backpressure
const OUTBOUND_CAPACITY: usize = 64;

/// Fan-out slots per subscription before a slow receiver starts lagging
const INBOUND_CAPACITY: usize = 256;

/// Wire envelope, one per WebSocket text frame
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Frame {
    Publish { topic: String, payload: String },
    Subscribe { topic: String },
}

/// WebSocket connection to the message broker
///
/// Dropping the bus closes the connection and ends all subscriptions.
pub struct RemoteBus {
    out_tx: mpsc::Sender<Frame>,
    // The reader task owns the only strong reference to the fan-out
    // sender, so when it exits on connection loss every subscription's
    // `recv` sees the channel close instead of waiting forever.
    in_tx: Weak<broadcast::Sender<BusMessage>>,
    writer: tokio::task::JoinHandle<()>,
    reader: tokio::task::JoinHandle<()>,
}

impl RemoteBus {
    /// Connect to a broker at a `ws://host:port` URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the WebSocket handshake fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| Error::Bus(format!("failed to connect to {url}: {e}")))?;
        tracing::debug!(url, "connected to bus");

        let (mut write, mut read) = ws.split();
        let (out_tx, mut out_rx) = mpsc::channel::<Frame>(OUTBOUND_CAPACITY);
        let (in_tx, _) = broadcast::channel(INBOUND_CAPACITY);
        let fan_out = Arc::new(in_tx);
        let in_tx = Arc::downgrade(&fan_out);

        let writer = tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                match serde_json::to_string(&frame) {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::error!(error = %e, "failed to send frame, closing writer");
                            break;
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "failed to serialize frame"),
                }
            }
        });

        let reader = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::error!(error = %e, "bus read failed");
                        break;
                    }
                };
                match message {
                    Message::Text(text) => match serde_json::from_str::<Frame>(&text) {
                        Ok(Frame::Publish { topic, payload }) => {
                            let _ = fan_out.send(BusMessage { topic, payload });
                        }
                        Ok(Frame::Subscribe { .. }) => {
                            tracing::warn!("broker sent a subscribe frame, ignoring");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "discarding unparseable frame");
                        }
                    },
                    Message::Close(reason) => {
                        tracing::info!(?reason, "bus connection closed");
                        break;
                    }
                    _ => {}
                }
            }
            // Dropping fan_out here closes all subscriptions
        });

        Ok(Self {
            out_tx,
            in_tx,
            writer,
            reader,
        })
    }
}

impl Drop for RemoteBus {
    fn drop(&mut self) {
        self.writer.abort();
        self.reader.abort();
    }
}

#[async_trait]
impl MessageBus for RemoteBus {
    /// Queue a frame for delivery.
    ///
    /// Delivery is asynchronous: `Ok` means the frame was handed to
    /// the writer task, not that it reached the broker. A write error
    /// shuts the writer down and surfaces on the next `publish`.
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        self.out_tx
            .send(Frame::Publish {
                topic: topic.to_string(),
                payload,
            })
            .await
            .map_err(|_| Error::Bus("bus writer is gone".to_string()))
    }

    async fn subscribe(&self, topic: &str) -> Result<BusSubscription> {
        let fan_out = self
            .in_tx
            .upgrade()
            .ok_or_else(|| Error::Bus("bus connection is closed".to_string()))?;
        self.out_tx
            .send(Frame::Subscribe {
                topic: topic.to_string(),
            })
            .await
            .map_err(|_| Error::Bus("bus writer is gone".to_string()))?;
        Ok(BusSubscription::new(topic, fan_out.subscribe()))
    }
}
