//! Bedrock MCP Image Server Library
//!
//! This library provides text-to-image generation through the Amazon Nova
//! Canvas model on Amazon Bedrock, exposed as the `generate_image` MCP tool.

pub mod handler;
pub mod server;

pub use handler::{
    BedrockImageGenerator, GenerateImageParams, ImageGenerator, ImageHandler, Quality,
    ValidationError,
};
pub use server::ImageServer;
