//! Integration tests for bedrock-mcp-image against the live Bedrock service.
//!
//! These tests require:
//! - AWS credentials resolvable through the profile or the default chain
//! - Access to the Nova Canvas model in the configured region
//! - `BEDROCK_INTEGRATION_TESTS=1`
//!
//! Run with: `BEDROCK_INTEGRATION_TESTS=1 cargo test --package bedrock-mcp-image --test integration_test`
//!
//! Generated images are saved to `./test_output/` for inspection.

use bedrock_mcp_common::auth::{load_sdk_config, probe_credentials};
use bedrock_mcp_common::client_log::SilentLogger;
use bedrock_mcp_common::config::Config;
use bedrock_mcp_image::handler::{BedrockImageGenerator, GenerateImageParams, ImageHandler};
use rmcp::model::JsonObject;
use serde_json::json;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

const TEST_OUTPUT_DIR: &str = "test_output";

/// PNG files start with these bytes.
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn init_env() {
    INIT.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

fn should_run_integration_tests() -> bool {
    init_env();
    env::var("BEDROCK_INTEGRATION_TESTS").is_ok_and(|v| !v.is_empty() && v != "0")
}

macro_rules! skip_if_no_integration {
    () => {
        if !should_run_integration_tests() {
            eprintln!("Skipping integration test: BEDROCK_INTEGRATION_TESTS not set");
            return;
        }
    };
}

fn get_test_output_dir() -> PathBuf {
    let dir = PathBuf::from(TEST_OUTPUT_DIR);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).expect("Failed to create test output directory");
    }
    dir
}

fn save_test_images(images: &[Vec<u8>], prefix: &str) {
    let output_dir = get_test_output_dir();
    for (i, bytes) in images.iter().enumerate() {
        let path = output_dir.join(format!("{}_{}.png", prefix, i));
        match std::fs::write(&path, bytes) {
            Ok(()) => eprintln!("Saved: {}", path.display()),
            Err(e) => eprintln!("Failed to save {}: {}", path.display(), e),
        }
    }
}

async fn live_handler() -> ImageHandler {
    let config = Config::from_env().expect("Failed to load configuration");
    let sdk_config = load_sdk_config(&config).await;
    probe_credentials(&sdk_config)
        .await
        .expect("AWS credentials must resolve for integration tests");

    let client = aws_sdk_bedrockruntime::Client::new(&sdk_config);
    ImageHandler::new(Arc::new(BedrockImageGenerator::new(client, config.model_id)))
}

fn params(value: serde_json::Value) -> GenerateImageParams {
    let args: JsonObject = serde_json::from_value(value).expect("arguments must be an object");
    GenerateImageParams::from_arguments(Some(&args)).expect("arguments must validate")
}

fn decode_all(images: &[String]) -> Vec<Vec<u8>> {
    images
        .iter()
        .map(|data| {
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, data)
                .expect("Should be valid base64 data")
        })
        .collect()
}

mod nova_canvas_tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_image_basic() {
        skip_if_no_integration!();

        let handler = live_handler().await;
        let params = params(json!({
            "prompt": "A simple red circle on a white background",
            "width": 512,
            "height": 512,
        }));

        let images = handler
            .generate_image(&params, &SilentLogger)
            .await
            .unwrap_or_else(|e| panic!("Image generation failed: {}", e));

        assert_eq!(images.len(), 1, "Should generate exactly 1 image");
        let decoded = decode_all(&images);
        assert!(decoded[0].starts_with(&PNG_MAGIC), "Should be PNG data");
        save_test_images(&decoded, "basic_red_circle");
    }

    #[tokio::test]
    async fn test_generate_multiple_images() {
        skip_if_no_integration!();

        let handler = live_handler().await;
        let params = params(json!({
            "prompt": "A blue square",
            "width": 512,
            "height": 512,
            "numberOfImages": 2,
            "seed": 42,
        }));

        let images = handler
            .generate_image(&params, &SilentLogger)
            .await
            .unwrap_or_else(|e| panic!("Image generation failed: {}", e));

        assert_eq!(images.len(), 2, "Should generate exactly 2 images");
        save_test_images(&decode_all(&images), "multiple_blue_square");
    }

    #[tokio::test]
    async fn test_generate_with_negative_prompt_and_premium() {
        skip_if_no_integration!();

        let handler = live_handler().await;
        let params = params(json!({
            "prompt": "A mountain landscape at sunset",
            "negativePrompt": "people, buildings",
            "width": 1280,
            "height": 720,
            "quality": "premium",
            "cfg_scale": 8.0,
        }));

        let images = handler
            .generate_image(&params, &SilentLogger)
            .await
            .unwrap_or_else(|e| panic!("Image generation failed: {}", e));

        assert!(!images.is_empty());
        save_test_images(&decode_all(&images), "landscape_premium");
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_model_is_upstream_failure() {
        skip_if_no_integration!();

        let config = Config::from_env().expect("Failed to load configuration");
        let sdk_config = load_sdk_config(&config).await;
        let client = aws_sdk_bedrockruntime::Client::new(&sdk_config);
        let handler = ImageHandler::new(Arc::new(BedrockImageGenerator::new(
            client,
            "amazon.nonexistent-model-v9:0",
        )));

        let err = handler
            .generate_image(&params(json!({"prompt": "a cat"})), &SilentLogger)
            .await
            .expect_err("Unknown model should fail");

        assert_eq!(err.kind(), "upstream_failure");
        assert!(err.to_string().starts_with("Failed to generate image: "));
    }
}
