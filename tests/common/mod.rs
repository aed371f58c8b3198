//! Shared test utilities
//!
//! Fakes for the external collaborators: the listener subsystem, the
//! command interpreter, and a publish-recording bus wrapper.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use voice_controller::bus::{BusMessage, BusSubscription, MemoryBus, MessageBus, topic};
use voice_controller::dispatch::CommandDispatcher;
use voice_controller::effects::LedCommand;
use voice_controller::listener::{PhraseReply, PhraseRequest};
use voice_controller::{Error, Result};

/// Dispatcher that records every command it receives
#[derive(Debug, Default, Clone)]
pub struct RecordingDispatcher {
    commands: Arc<Mutex<Vec<String>>>,
}

impl RecordingDispatcher {
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandDispatcher for RecordingDispatcher {
    async fn dispatch(&self, command: &str) {
        self.commands.lock().unwrap().push(command.to_string());
    }
}

/// Bus wrapper that records everything published through it, in order.
///
/// Hand the wrapper to the code under test and the inner [`MemoryBus`]
/// to the fakes, so the record holds only controller-side publishes.
#[derive(Clone)]
pub struct RecordingBus {
    inner: MemoryBus,
    published: Arc<Mutex<Vec<BusMessage>>>,
}

impl RecordingBus {
    #[must_use]
    pub fn new(inner: MemoryBus) -> Self {
        Self {
            inner,
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Everything published so far, in publish order
    #[must_use]
    pub fn published(&self) -> Vec<BusMessage> {
        self.published.lock().unwrap().clone()
    }

    /// Payloads published on one topic, in publish order
    #[must_use]
    pub fn published_on(&self, topic: &str) -> Vec<String> {
        self.published()
            .into_iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.payload)
            .collect()
    }

    /// LED commands published so far, decoded
    #[must_use]
    pub fn led_commands(&self) -> Vec<LedCommand> {
        self.published_on(topic::LED_COMMAND)
            .iter()
            .map(|payload| serde_json::from_str(payload).unwrap())
            .collect()
    }
}

#[async_trait]
impl MessageBus for RecordingBus {
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        self.published.lock().unwrap().push(BusMessage {
            topic: topic.to_string(),
            payload: payload.clone(),
        });
        self.inner.publish(topic, payload).await
    }

    async fn subscribe(&self, topic: &str) -> Result<BusSubscription> {
        self.inner.subscribe(topic).await
    }
}

/// Spawn a fake listener subsystem.
///
/// Answers each phrase request with the next scripted transcription,
/// echoing the request id. A `None` step leaves that request
/// unanswered (the timeout path); requests past the end of the script
/// go unanswered too.
pub async fn spawn_listener_service(
    bus: &MemoryBus,
    script: &[Option<&str>],
) -> tokio::task::JoinHandle<()> {
    let script: Vec<Option<String>> = script
        .iter()
        .map(|step| step.map(ToString::to_string))
        .collect();
    let mut script = script.into_iter();
    let mut requests = bus.subscribe(topic::LISTENER_COMMAND).await.unwrap();
    let bus = bus.clone();
    tokio::spawn(async move {
        while let Ok(message) = requests.recv().await {
            let request: PhraseRequest = serde_json::from_str(&message.payload).unwrap();
            let Some(Some(transcription)) = script.next() else {
                continue;
            };
            let reply = PhraseReply {
                request_id: request.request_id,
                transcription,
            };
            bus.publish(
                topic::LISTENER_RECORDING,
                serde_json::to_string(&reply).unwrap(),
            )
            .await
            .unwrap();
        }
    })
}

/// Poll until `condition` holds.
///
/// Meant for paused-clock tests: the sleeps auto-advance virtual time,
/// so long virtual waits (past the 10s command timeout) finish
/// instantly in real time.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..5_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within the virtual time budget");
}

/// Assert that an error is the listening timeout.
pub fn assert_listening_timeout<T: std::fmt::Debug>(result: Result<T>) {
    match result {
        Err(Error::ListeningTimeout) => {}
        other => panic!("expected ListeningTimeout, got {other:?}"),
    }
}
