//! Command dispatch
//!
//! The eventual natural-language interpreter sits behind
//! [`CommandDispatcher`]. Dispatch is infallible by contract: whatever
//! the command contains, handling it must never block or fail the
//! session loop.

use async_trait::async_trait;

/// Receives the final command text of a session
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Handle a non-empty, arbitrary UTF-8 command.
    async fn dispatch(&self, command: &str);
}

/// Stub dispatcher that only logs the command
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

#[async_trait]
impl CommandDispatcher for LogDispatcher {
    async fn dispatch(&self, command: &str) {
        tracing::info!(%command, "command received (no interpreter wired up yet)");
    }
}
