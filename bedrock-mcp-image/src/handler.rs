//! Image generation handler for the Bedrock MCP server.
//!
//! This module provides the `generate_image` parameter type and its validator,
//! the Nova Canvas request/response bodies, the `ImageGenerator` seam over the
//! Bedrock runtime, and the assembly of MCP content from generated images.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_bedrockruntime::primitives::Blob;
use bedrock_mcp_common::client_log::ClientLogger;
use bedrock_mcp_common::error::Error;
use rmcp::model::{Content, JsonObject};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Name of the single tool exposed by the server.
pub const TOOL_NAME: &str = "generate_image";

/// MIME type attached to every returned image.
pub const IMAGE_MIME_TYPE: &str = "image/png";

/// Nova Canvas task type for text-to-image generation.
pub const TASK_TYPE_TEXT_IMAGE: &str = "TEXT_IMAGE";

/// Prompt and negative prompt length bounds, in characters.
pub const MIN_PROMPT_LENGTH: usize = 1;
pub const MAX_PROMPT_LENGTH: usize = 1024;

/// Width and height bounds, in pixels.
pub const MIN_DIMENSION: i64 = 320;
pub const MAX_DIMENSION: i64 = 4096;
/// Width and height must be multiples of this.
pub const DIMENSION_STEP: i64 = 16;
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Inclusive bounds on `width / height`.
pub const MIN_ASPECT_RATIO: f64 = 0.25;
pub const MAX_ASPECT_RATIO: f64 = 4.0;

/// `width * height` must be strictly below this.
pub const MAX_PIXEL_COUNT: u64 = 4_194_304;

pub const MIN_CFG_SCALE: f64 = 1.1;
pub const MAX_CFG_SCALE: f64 = 10.0;
pub const DEFAULT_CFG_SCALE: f64 = 6.5;

pub const MAX_SEED: i64 = 858_993_459;
pub const DEFAULT_SEED: u32 = 12;

pub const MIN_NUMBER_OF_IMAGES: i64 = 1;
pub const MAX_NUMBER_OF_IMAGES: i64 = 5;
pub const DEFAULT_NUMBER_OF_IMAGES: u8 = 1;

/// Quality of the generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Standard,
    Premium,
}

impl Quality {
    /// Every accepted quality value.
    pub const ALL: [Quality; 2] = [Quality::Standard, Quality::Premium];

    /// Wire name of this quality.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Standard => "standard",
            Quality::Premium => "premium",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.as_str() == s)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated `generate_image` parameters with every default applied.
///
/// The serde and schema shape matches the tool's declared input schema, so a
/// value of this type can be turned back into tool arguments with
/// [`GenerateImageParams::to_arguments`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageParams {
    /// Text description of the image to generate (1-1024 characters)
    #[schemars(length(min = 1, max = 1024))]
    pub prompt: String,

    /// Optional text description of what to avoid in the image (1-1024 characters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(min = 1, max = 1024))]
    pub negative_prompt: Option<String>,

    /// Width of the generated image in pixels, divisible by 16 (320-4096, default: 1024)
    #[serde(default = "default_dimension")]
    #[schemars(range(min = 320, max = 4096))]
    pub width: u32,

    /// Height of the generated image in pixels, divisible by 16 (320-4096, default: 1024)
    #[serde(default = "default_dimension")]
    #[schemars(range(min = 320, max = 4096))]
    pub height: u32,

    /// Quality of the generated image (default: standard)
    #[serde(default)]
    pub quality: Quality,

    /// How closely to follow the prompt (1.1-10, default: 6.5)
    #[serde(rename = "cfg_scale", alias = "cfgScale", default = "default_cfg_scale")]
    #[schemars(range(min = 1.1, max = 10.0))]
    pub cfg_scale: f64,

    /// Seed for reproducible generation (0-858993459, default: 12)
    #[serde(default = "default_seed")]
    #[schemars(range(min = 0, max = 858993459))]
    pub seed: u32,

    /// Number of images to generate (1-5, default: 1)
    #[serde(default = "default_number_of_images")]
    #[schemars(range(min = 1, max = 5))]
    pub number_of_images: u8,
}

fn default_dimension() -> u32 {
    DEFAULT_DIMENSION
}

fn default_cfg_scale() -> f64 {
    DEFAULT_CFG_SCALE
}

fn default_seed() -> u32 {
    DEFAULT_SEED
}

fn default_number_of_images() -> u8 {
    DEFAULT_NUMBER_OF_IMAGES
}

/// Validation error details for one field or cross-field constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The field (or field pair) that failed validation.
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Fold every validation failure into one `Error::Validation`.
pub fn validation_failure(errors: &[ValidationError]) -> Error {
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    Error::validation(messages.join(", "))
}

impl GenerateImageParams {
    /// Validate untyped tool arguments and apply defaults.
    ///
    /// Every field is checked independently first; the aspect-ratio and
    /// pixel-count constraints run afterwards, and only when `width` and
    /// `height` each passed their own checks. All failures are returned.
    /// Missing arguments behave like an empty object, `null` behaves like an
    /// absent field, and unknown keys are ignored.
    pub fn from_arguments(arguments: Option<&JsonObject>) -> Result<Self, Vec<ValidationError>> {
        let empty = JsonObject::new();
        let args = arguments.unwrap_or(&empty);
        let mut errors = Vec::new();

        let prompt = match present(args, "prompt") {
            Some(value) => read_text("prompt", value, &mut errors),
            None => {
                errors.push(ValidationError::new("prompt", "is required"));
                None
            }
        };

        let negative_prompt = present(args, "negativePrompt")
            .and_then(|value| read_text("negativePrompt", value, &mut errors));

        let width = match present(args, "width") {
            Some(value) => read_dimension("width", value, &mut errors),
            None => Some(DEFAULT_DIMENSION),
        };

        let height = match present(args, "height") {
            Some(value) => read_dimension("height", value, &mut errors),
            None => Some(DEFAULT_DIMENSION),
        };

        let quality = present(args, "quality")
            .and_then(|value| read_quality(value, &mut errors))
            .unwrap_or_default();

        let cfg_scale = present(args, "cfg_scale")
            .or_else(|| present(args, "cfgScale"))
            .and_then(|value| read_cfg_scale(value, &mut errors))
            .unwrap_or(DEFAULT_CFG_SCALE);

        let seed = present(args, "seed")
            .and_then(|value| read_integer_in("seed", value, 0, MAX_SEED, &mut errors))
            .map(|seed| seed as u32)
            .unwrap_or(DEFAULT_SEED);

        let number_of_images = present(args, "numberOfImages")
            .and_then(|value| {
                read_integer_in(
                    "numberOfImages",
                    value,
                    MIN_NUMBER_OF_IMAGES,
                    MAX_NUMBER_OF_IMAGES,
                    &mut errors,
                )
            })
            .map(|n| n as u8)
            .unwrap_or(DEFAULT_NUMBER_OF_IMAGES);

        if let (Some(width), Some(height)) = (width, height) {
            check_dimensions(width, height, &mut errors);
        }

        match (prompt, width, height) {
            (Some(prompt), Some(width), Some(height)) if errors.is_empty() => Ok(Self {
                prompt,
                negative_prompt,
                width,
                height,
                quality,
                cfg_scale,
                seed,
                number_of_images,
            }),
            _ => Err(errors),
        }
    }

    /// Convert back into the tool's argument shape.
    pub fn to_arguments(&self) -> JsonObject {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => JsonObject::new(),
        }
    }

    /// Build the Nova Canvas request body.
    pub fn to_request(&self) -> NovaCanvasRequest {
        NovaCanvasRequest {
            task_type: TASK_TYPE_TEXT_IMAGE.to_string(),
            text_to_image_params: TextToImageParams {
                text: self.prompt.clone(),
                negative_text: self.negative_prompt.clone(),
            },
            image_generation_config: ImageGenerationConfig {
                number_of_images: self.number_of_images,
                height: self.height,
                width: self.width,
                quality: self.quality,
                cfg_scale: self.cfg_scale,
                seed: self.seed,
            },
        }
    }

    /// Generation settings reported to the client before the upstream call.
    pub fn generation_summary(&self) -> Value {
        json!({
            "width": self.width,
            "height": self.height,
            "quality": self.quality,
            "numberOfImages": self.number_of_images,
            "cfgScale": self.cfg_scale,
            "seed": self.seed,
        })
    }
}

fn present<'a>(args: &'a JsonObject, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|value| !value.is_null())
}

fn read_text(field: &str, value: &Value, errors: &mut Vec<ValidationError>) -> Option<String> {
    let Some(text) = value.as_str() else {
        errors.push(ValidationError::new(field, "must be a string"));
        return None;
    };
    let length = text.chars().count();
    if !(MIN_PROMPT_LENGTH..=MAX_PROMPT_LENGTH).contains(&length) {
        errors.push(ValidationError::new(
            field,
            format!(
                "must be {}-{} characters, got {}",
                MIN_PROMPT_LENGTH, MAX_PROMPT_LENGTH, length
            ),
        ));
        return None;
    }
    Some(text.to_string())
}

/// Integers may arrive as JSON floats with no fractional part (e.g. `1024.0`).
fn read_integer(field: &str, value: &Value, errors: &mut Vec<ValidationError>) -> Option<i64> {
    let integer = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    });
    if integer.is_none() {
        errors.push(ValidationError::new(
            field,
            format!("must be an integer, got {}", value),
        ));
    }
    integer
}

fn read_integer_in(
    field: &str,
    value: &Value,
    min: i64,
    max: i64,
    errors: &mut Vec<ValidationError>,
) -> Option<i64> {
    let n = read_integer(field, value, errors)?;
    if n < min || n > max {
        errors.push(ValidationError::new(
            field,
            format!("must be between {} and {}, got {}", min, max, n),
        ));
        return None;
    }
    Some(n)
}

fn read_dimension(field: &str, value: &Value, errors: &mut Vec<ValidationError>) -> Option<u32> {
    let n = read_integer(field, value, errors)?;
    let mut valid = true;
    if n < MIN_DIMENSION || n > MAX_DIMENSION {
        errors.push(ValidationError::new(
            field,
            format!(
                "must be between {} and {} pixels, got {}",
                MIN_DIMENSION, MAX_DIMENSION, n
            ),
        ));
        valid = false;
    }
    if n % DIMENSION_STEP != 0 {
        errors.push(ValidationError::new(
            field,
            format!("must be divisible by {}, got {}", DIMENSION_STEP, n),
        ));
        valid = false;
    }
    valid.then_some(n as u32)
}

fn read_quality(value: &Value, errors: &mut Vec<ValidationError>) -> Option<Quality> {
    let quality = value.as_str().and_then(Quality::parse);
    if quality.is_none() {
        errors.push(ValidationError::new(
            "quality",
            format!("must be one of standard, premium, got {}", value),
        ));
    }
    quality
}

fn read_cfg_scale(value: &Value, errors: &mut Vec<ValidationError>) -> Option<f64> {
    let Some(scale) = value.as_f64() else {
        errors.push(ValidationError::new(
            "cfg_scale",
            format!("must be a number, got {}", value),
        ));
        return None;
    };
    if !(MIN_CFG_SCALE..=MAX_CFG_SCALE).contains(&scale) {
        errors.push(ValidationError::new(
            "cfg_scale",
            format!(
                "must be between {} and {}, got {}",
                MIN_CFG_SCALE, MAX_CFG_SCALE, scale
            ),
        ));
        return None;
    }
    Some(scale)
}

fn check_dimensions(width: u32, height: u32, errors: &mut Vec<ValidationError>) {
    let ratio = f64::from(width) / f64::from(height);
    if !(MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&ratio) {
        errors.push(ValidationError::new(
            "width/height",
            format!("aspect ratio must be between 1:4 and 4:1, got {:.2}", ratio),
        ));
    }

    let pixels = u64::from(width) * u64::from(height);
    if pixels >= MAX_PIXEL_COUNT {
        errors.push(ValidationError::new(
            "width/height",
            format!(
                "total pixel count must be less than 4,194,304, got {}",
                pixels
            ),
        ));
    }
}

/// Nova Canvas `InvokeModel` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaCanvasRequest {
    pub task_type: String,
    pub text_to_image_params: TextToImageParams,
    pub image_generation_config: ImageGenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToImageParams {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationConfig {
    pub number_of_images: u8,
    pub height: u32,
    pub width: u32,
    pub quality: Quality,
    pub cfg_scale: f64,
    pub seed: u32,
}

/// Nova Canvas `InvokeModel` response body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NovaCanvasResponse {
    /// Base64-encoded images, in the order the service produced them.
    /// A missing or `null` list reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    /// Explanation supplied by the service, e.g. when content was filtered.
    #[serde(default)]
    pub error: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The upstream image-generation service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Model identifier used for requests.
    fn model_id(&self) -> &str;

    /// Send one generation request.
    ///
    /// # Errors
    /// `Error::Api` when the call itself fails, `Error::Internal` when the
    /// response body is missing or cannot be decoded.
    async fn invoke(&self, request: &NovaCanvasRequest) -> Result<NovaCanvasResponse, Error>;
}

/// `ImageGenerator` backed by the Bedrock runtime `InvokeModel` API.
#[derive(Clone)]
pub struct BedrockImageGenerator {
    client: Client,
    model_id: String,
}

impl BedrockImageGenerator {
    /// Create a generator that invokes `model_id` through `client`.
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl ImageGenerator for BedrockImageGenerator {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    #[instrument(level = "debug", name = "invoke_model", skip(self, request), fields(model_id = %self.model_id))]
    async fn invoke(&self, request: &NovaCanvasRequest) -> Result<NovaCanvasResponse, Error> {
        let body = serde_json::to_vec(request)
            .map_err(|e| Error::internal(format!("Failed to encode request body: {}", e)))?;

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                let message = match e.as_service_error() {
                    Some(service) => match (service.code(), service.message()) {
                        (Some(code), Some(message)) => format!("{}: {}", code, message),
                        (None, Some(message)) => message.to_string(),
                        _ => DisplayErrorContext(&e).to_string(),
                    },
                    None => DisplayErrorContext(&e).to_string(),
                };
                Error::api(&self.model_id, message)
            })?;

        let bytes = output.body.into_inner();
        if bytes.is_empty() {
            return Err(Error::internal("No response body received from Bedrock"));
        }
        debug!(bytes = bytes.len(), "Received response body");

        serde_json::from_slice(&bytes)
            .map_err(|e| Error::internal(format!("Failed to parse Bedrock response: {}", e)))
    }
}

/// Image generation handler.
///
/// Holds no per-call state; clones share the same generator.
#[derive(Clone)]
pub struct ImageHandler {
    generator: Arc<dyn ImageGenerator>,
}

impl ImageHandler {
    /// Create a handler over the given upstream generator.
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }

    /// Model identifier of the underlying generator.
    pub fn model_id(&self) -> &str {
        self.generator.model_id()
    }

    /// Generate images for already-validated parameters.
    ///
    /// Returns the base64 images in upstream order. The count is not checked
    /// against `number_of_images`.
    ///
    /// # Errors
    /// `Error::EmptyResult` if the service answered with no images; upstream
    /// and decoding errors are passed through unchanged.
    #[instrument(level = "info", name = "generate_image", skip_all, fields(model_id = %self.model_id(), width = params.width, height = params.height, number_of_images = params.number_of_images))]
    pub async fn generate_image(
        &self,
        params: &GenerateImageParams,
        logger: &dyn ClientLogger,
    ) -> Result<Vec<String>, Error> {
        logger
            .info(format!("Configuration: {}", params.generation_summary()))
            .await;
        logger.info("Sending request to Bedrock API...".to_string()).await;

        let response = self.generator.invoke(&params.to_request()).await?;
        logger.info("Received response from Bedrock API".to_string()).await;

        if response.images.is_empty() {
            warn!(reason = ?response.error, "No image data in response");
            logger.error("No image data in response".to_string()).await;
            return Err(Error::empty_result(response.error));
        }

        info!(count = response.images.len(), "Received images from Bedrock");
        logger.info("Successfully generated image".to_string()).await;
        Ok(response.images)
    }
}

/// Build the tool result content: a leading text item naming the prompt, one
/// image item per generated image in upstream order, and a closing text item.
pub fn assemble_content(prompt: &str, images: Vec<String>) -> Vec<Content> {
    let mut content = Vec::with_capacity(images.len() + 2);
    content.push(Content::text(format!(
        "This is the image generated for your request '{}'.",
        prompt
    )));
    content.extend(
        images
            .into_iter()
            .map(|image| Content::image(image, IMAGE_MIME_TYPE)),
    );
    content.push(Content::text("This is the end of the image generation."));
    content
}
