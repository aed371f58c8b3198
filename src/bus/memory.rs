//! In-process message bus
//!
//! Backs `--embedded` runs and the integration tests. All topics share a
//! single broadcast channel; subscriptions filter by topic on receive,
//! which preserves the bus-wide publish order for every subscriber.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{BusMessage, BusSubscription, MessageBus};
use crate::Result;

/// Fan-out slots per subscription before a slow receiver starts lagging
const CHANNEL_CAPACITY: usize = 256;

/// In-process fan-out bus over a [`broadcast`] channel
#[derive(Debug, Clone)]
pub struct MemoryBus {
    tx: broadcast::Sender<BusMessage>,
}

impl MemoryBus {
    /// Create a new empty bus.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for MemoryBus {
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        let message = BusMessage {
            topic: topic.to_string(),
            payload,
        };
        // A publish with no live subscribers is not an error
        let _ = self.tx.send(message);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<BusSubscription> {
        Ok(BusSubscription::new(topic, self.tx.subscribe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::topic;

    #[tokio::test]
    async fn fan_out_delivers_to_every_subscriber() {
        let bus = MemoryBus::new();
        let mut first = bus.subscribe(topic::SPEECH_COMMAND).await.unwrap();
        let mut second = bus.subscribe(topic::SPEECH_COMMAND).await.unwrap();

        bus.publish(topic::SPEECH_COMMAND, "hello".to_string())
            .await
            .unwrap();

        assert_eq!(first.recv().await.unwrap().payload, "hello");
        assert_eq!(second.recv().await.unwrap().payload, "hello");
    }

    #[tokio::test]
    async fn subscription_filters_other_topics() {
        let bus = MemoryBus::new();
        let mut leds = bus.subscribe(topic::LED_COMMAND).await.unwrap();

        bus.publish(topic::SPEECH_COMMAND, "not for leds".to_string())
            .await
            .unwrap();
        bus.publish(topic::LED_COMMAND, "for leds".to_string())
            .await
            .unwrap();

        assert_eq!(leds.recv().await.unwrap().payload, "for leds");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let bus = MemoryBus::new();
        bus.publish(topic::LED_COMMAND, "nobody listening".to_string())
            .await
            .unwrap();
    }
}
