//! Error types for the common library.
//!
//! This module provides a unified error hierarchy using `thiserror` for consistent
//! error handling across the Bedrock MCP server.
//!
//! # Error Categories
//!
//! - `ConfigError`: Missing or invalid configuration
//! - `AuthError`: AWS credential resolution failures
//! - `Error::UnknownTool`: Invocation of a tool the server does not expose
//! - `Error::Validation`: Input validation failures
//! - `Error::Api`: Bedrock call failures (includes the model ID)
//! - `Error::EmptyResult`: Bedrock answered but returned no images
//! - `Error::Internal`: Anything not classified above

use rmcp::ErrorData as McpError;
use rmcp::model::ErrorCode;
use serde_json::json;
use thiserror::Error;

/// Unified error type for the common library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Credential resolution errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The invocation named a tool this server does not provide
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Input validation errors, already aggregated into one message
    #[error("Invalid parameters: {0}")]
    Validation(String),

    /// The upstream Bedrock call itself failed (network, auth, throttling)
    #[error("Failed to generate image: {message}")]
    Api {
        /// The model that was invoked
        model_id: String,
        /// Error message from the service or describing the failure
        message: String,
    },

    /// The upstream call succeeded but produced no images
    #[error("{}", empty_result_message(.0.as_deref()))]
    EmptyResult(Option<String>),

    /// Unclassified failures
    #[error("{0}")]
    Internal(String),
}

fn empty_result_message(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("No image data in response due to {}.", reason),
        None => "No image data in response.".to_string(),
    }
}

impl Error {
    /// Create a new API error for the given model.
    ///
    /// # Example
    ///
    /// ```
    /// use bedrock_mcp_common::error::Error;
    ///
    /// let err = Error::api("amazon.nova-canvas-v1:0", "ThrottlingException: slow down");
    /// assert!(err.to_string().contains("slow down"));
    /// ```
    pub fn api(model_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Api {
            model_id: model_id.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use bedrock_mcp_common::error::Error;
    ///
    /// let err = Error::validation("Width must be divisible by 16");
    /// assert!(err.to_string().contains("divisible by 16"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Create an empty-result error, keeping whatever reason the service gave.
    pub fn empty_result(reason: Option<impl Into<String>>) -> Self {
        Error::EmptyResult(reason.map(Into::into))
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    /// Machine-readable error kind reported to the caller.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownTool(_) => "unknown_tool",
            Error::Validation(_) => "invalid_params",
            Error::Api { .. } => "upstream_failure",
            Error::EmptyResult(_) => "empty_result",
            Error::Config(_) | Error::Auth(_) | Error::Internal(_) => "internal_error",
        }
    }

    /// JSON-RPC error code used when surfacing this error over MCP.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::UnknownTool(_) => ErrorCode::METHOD_NOT_FOUND,
            Error::Validation(_) => ErrorCode::INVALID_PARAMS,
            _ => ErrorCode::INTERNAL_ERROR,
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        McpError::new(err.code(), err.to_string(), Some(json!({ "kind": err.kind() })))
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Credential resolution errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential provider was configured on the SDK config
    #[error("No AWS credentials provider configured")]
    NotConfigured,

    /// Every provider in the chain failed
    #[error("Failed to resolve AWS credentials: {0}")]
    ResolutionFailed(String),
}

impl AuthError {
    /// Create a new resolution failure.
    pub fn resolution_failed(message: impl Into<String>) -> Self {
        AuthError::ResolutionFailed(message.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
