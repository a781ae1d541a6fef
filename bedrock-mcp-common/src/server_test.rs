//! Unit tests for server builder utilities.

use super::server::{McpServerBuilder, ServerError, shutdown_channel};
use super::transport::Transport;
use rmcp::ServerHandler;

#[derive(Clone)]
struct NoopHandler;

impl ServerHandler for NoopHandler {}

#[test]
fn test_builder_defaults_to_stdio() {
    let builder = McpServerBuilder::new(NoopHandler);
    assert_eq!(builder.transport(), Transport::Stdio);
}

#[test]
fn test_builder_with_transport() {
    let builder = McpServerBuilder::new(NoopHandler).with_transport(Transport::http(3001));
    assert_eq!(builder.transport().port(), Some(3001));
}

#[test]
fn test_server_error_bind_failed_display() {
    let err = ServerError::BindFailed {
        port: 8080,
        message: "Address already in use".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("8080"), "Should contain port number");
    assert!(msg.contains("Address already in use"), "Should contain error message");
}

#[test]
fn test_server_error_io_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
    let err: ServerError = io_err.into();
    assert!(matches!(err, ServerError::Io(_)));
}

#[tokio::test]
async fn test_http_server_stops_on_shutdown_signal() {
    let (tx, rx) = shutdown_channel();
    let builder = McpServerBuilder::new(NoopHandler)
        .with_transport(Transport::http(0))
        .with_shutdown(rx);

    let server = tokio::spawn(builder.run());
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let _ = tx.send(());

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .expect("server should stop after shutdown signal")
        .expect("server task should not panic");
    assert!(result.is_ok());
}
