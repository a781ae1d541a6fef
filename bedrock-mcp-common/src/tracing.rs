//! Tracing initialization for the Bedrock MCP server.
//!
//! Log output is written to **stderr**. Stdout carries the MCP protocol stream
//! when the server runs on the stdio transport, so nothing else may write there.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls the log level and filtering. Examples:
//!   - `RUST_LOG=debug` - Enable debug logging for all modules
//!   - `RUST_LOG=bedrock_mcp_image=debug` - Enable debug for the image crate
//!   - `RUST_LOG=warn,aws_config=debug` - Warn by default, debug for credential resolution

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: ::tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
}

/// Initialize the tracing subscriber with `RUST_LOG` filtering (default `info`).
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing with a custom default level used when `RUST_LOG` is not set.
///
/// ```no_run
/// use bedrock_mcp_common::tracing::init_tracing_with_default;
///
/// init_tracing_with_default("debug");
/// ```
pub fn init_tracing_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize tracing, returning an error if already initialized.
///
/// ```
/// use bedrock_mcp_common::tracing::try_init_tracing;
///
/// let _ = try_init_tracing();
/// ```
pub fn try_init_tracing() -> Result<(), ()> {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stderr_layer())
        .try_init()
        .map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_tracing_does_not_panic() {
        let _ = try_init_tracing();
        // A second call must fail quietly rather than panic.
        assert!(try_init_tracing().is_err());
    }

    #[test]
    fn test_documented_filters_parse() {
        for directives in [
            "debug",
            "bedrock_mcp_image=debug",
            "warn,aws_config=debug",
            "warn,bedrock_mcp_image=debug,aws_config=info",
        ] {
            assert!(EnvFilter::try_new(directives).is_ok(), "{} should parse", directives);
        }
        assert!(EnvFilter::try_new("bedrock_mcp_image=loud").is_err());
    }
}
