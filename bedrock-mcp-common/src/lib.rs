//! Bedrock MCP Common Library
//!
//! Shared configuration, AWS client setup, error handling, transport
//! selection, and tracing for the Amazon Bedrock MCP server.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod auth;
pub mod client_log;
pub mod config;
pub mod error;
pub mod server;
pub mod tracing;
pub mod transport;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod server_test;

pub use client_log::{ClientLogger, PeerLogger, SilentLogger};
pub use config::Config;
pub use error::{AuthError, ConfigError, Error, Result};
pub use server::{McpServerBuilder, ServerError, shutdown_channel};
pub use transport::{Transport, TransportArgs, TransportMode};
