//! Bedrock MCP Image Server
//!
//! MCP server for image generation using Amazon Nova Canvas on Bedrock.

use anyhow::Result;
use bedrock_mcp_common::auth::{load_sdk_config, log_credential_environment, probe_credentials};
use bedrock_mcp_common::tracing::init_tracing;
use bedrock_mcp_common::{Config, McpServerBuilder, TransportArgs};
use bedrock_mcp_image::{BedrockImageGenerator, ImageHandler, ImageServer};
use clap::Parser;
use std::sync::Arc;

/// Command-line arguments for the image server.
#[derive(Parser, Debug)]
#[command(name = "bedrock-mcp-image")]
#[command(about = "MCP server for image generation using Amazon Nova Canvas on Bedrock")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,

    /// AWS region, overrides AWS_REGION / AWS_DEFAULT_REGION
    #[arg(long)]
    region: Option<String>,

    /// AWS shared-config profile, overrides AWS_PROFILE
    #[arg(long)]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("bedrock-mcp-image server starting...");

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(region) = args.region {
        config = config.with_region(region);
    }
    if let Some(profile) = args.profile {
        config = config.with_profile(profile);
    }
    tracing::info!(
        region = %config.region,
        profile = %config.profile,
        model_id = %config.model_id,
        endpoint = %config.bedrock_runtime_endpoint(),
        "Configuration loaded"
    );

    log_credential_environment(&config);
    let sdk_config = load_sdk_config(&config).await;
    if let Err(e) = probe_credentials(&sdk_config).await {
        // Requests will fail with an upstream error until credentials resolve.
        tracing::warn!(error = %e, "AWS credentials could not be resolved at startup");
    }

    let client = aws_sdk_bedrockruntime::Client::new(&sdk_config);
    let generator = BedrockImageGenerator::new(client, config.model_id.clone());
    let server = ImageServer::new(ImageHandler::new(Arc::new(generator)));

    let transport = args.transport.into_transport();

    McpServerBuilder::new(server)
        .with_transport(transport)
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
