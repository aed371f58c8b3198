//! Voice controller - voice-command front-end for robot subsystems
//!
//! Listens on the robot's message bus for transcribed speech, waits for
//! the wake word, captures a follow-up command within a bounded window,
//! and emits LED/speech side effects around the listening states.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Robot subsystems                     │
//! │   Listener (STT)  │  LED driver  │  Speech (TTS)     │
//! └─────────────────────────┬────────────────────────────┘
//!                           │ pub/sub bus
//! ┌─────────────────────────▼────────────────────────────┐
//! │                  Voice controller                     │
//! │   PhraseClient  │  WakeWordDetector  │  SessionLoop  │
//! └─────────────────────────┬────────────────────────────┘
//!                           │
//! ┌─────────────────────────▼────────────────────────────┐
//! │           Command interpreter (stubbed)               │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The hard core is [`listener::PhraseClient`]: it turns the fan-out
//! bus into a synchronous "ask and wait for the matching answer"
//! primitive, demultiplexed by correlation id, with an optional
//! deadline.

pub mod bus;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod error;
pub mod listener;
pub mod session;
pub mod wake;

pub use bus::{BusMessage, BusSubscription, MemoryBus, MessageBus, RemoteBus};
pub use config::Config;
pub use dispatch::{CommandDispatcher, LogDispatcher};
pub use error::{Error, Result};
pub use listener::PhraseClient;
pub use session::SessionLoop;
pub use wake::WakeWordDetector;
