//! Gemini Image MCP Server
//!
//! MCP server for image generation and editing using the Gemini API.

use anyhow::Result;
use clap::Parser;
use gemini_image_mcp::ImageServer;
use gemini_image_mcp_common::config::load_dotenv;
use gemini_image_mcp_common::tracing::init_tracing;
use gemini_image_mcp_common::{Config, McpServerBuilder, TransportArgs};

/// Command-line arguments for the image server.
#[derive(Parser, Debug)]
#[command(name = "gemini-image-mcp")]
#[command(about = "MCP server for image generation and editing using the Gemini API")]
#[command(version)]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Before argument parsing, so `PORT` from .env reaches `--port`.
    load_dotenv();
    let args = Args::parse();

    let config = Config::from_env()?;
    tracing::info!(
        default_model = %config.default_model,
        api_base_url = %config.api_base_url,
        min_image_dimension = config.min_image_dimension,
        "Configuration loaded"
    );

    let server = ImageServer::new(config);

    McpServerBuilder::new(server)
        .with_transport(args.transport.into_transport())
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
