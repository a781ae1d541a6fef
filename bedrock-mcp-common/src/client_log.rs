//! Protocol-level log messages sent to the connected MCP client.
//!
//! These are `notifications/message` notifications, separate from the
//! server's own `tracing` output on stderr. Delivery is best effort: a failed
//! notification is traced and otherwise ignored.

use async_trait::async_trait;
use rmcp::model::{LoggingLevel, LoggingMessageNotificationParam};
use rmcp::service::{Peer, RoleServer};
use serde_json::Value;

/// Sink for client-visible log messages.
#[async_trait]
pub trait ClientLogger: Send + Sync {
    /// Send one log message at the given level.
    async fn log(&self, level: LoggingLevel, message: String);

    async fn info(&self, message: String) {
        self.log(LoggingLevel::Info, message).await;
    }

    async fn error(&self, message: String) {
        self.log(LoggingLevel::Error, message).await;
    }
}

/// Logger that forwards messages to the client through the rmcp peer.
pub struct PeerLogger {
    peer: Peer<RoleServer>,
    logger: &'static str,
}

impl PeerLogger {
    /// Create a logger that tags every message with `logger`.
    pub fn new(peer: Peer<RoleServer>, logger: &'static str) -> Self {
        Self { peer, logger }
    }
}

#[async_trait]
impl ClientLogger for PeerLogger {
    async fn log(&self, level: LoggingLevel, message: String) {
        let param = LoggingMessageNotificationParam {
            level,
            logger: Some(self.logger.to_string()),
            data: Value::String(message),
        };
        if let Err(e) = self.peer.notify_logging_message(param).await {
            tracing::debug!(error = %e, "Failed to deliver log notification");
        }
    }
}

/// Logger that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentLogger;

#[async_trait]
impl ClientLogger for SilentLogger {
    async fn log(&self, _level: LoggingLevel, _message: String) {}
}
