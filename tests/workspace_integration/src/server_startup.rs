//! Server startup integration tests.
//!
//! The image server can be built from environment-style configuration,
//! advertises its tools and resources, and runs (and stops) over HTTP.

use gemini_image_mcp_common::Config;

/// Test configuration for integration tests.
fn test_config() -> Config {
    Config::from_vars(|name| match name {
        "GEMINI_API_KEY" => Some("test-key".to_string()),
        "GEMINI_API_BASE_URL" => Some("http://127.0.0.1:9".to_string()),
        _ => None,
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gemini_image_mcp::ImageServer;
    use gemini_image_mcp_common::{McpServerBuilder, ServerError, Transport, TransportArgs, shutdown_channel};
    use rmcp::ServerHandler;
    use std::time::Duration;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        transport: TransportArgs,
    }

    #[test]
    fn test_image_server_startup() {
        let server = ImageServer::new(test_config());
        let info = server.get_info();

        let instructions = info.instructions.as_ref().unwrap().to_lowercase();
        assert!(instructions.contains("image"), "Server instructions should mention 'image'");
        assert!(instructions.contains("validate_image"));
    }

    #[test]
    fn test_server_has_tools_and_resources_capability() {
        let info = ImageServer::new(test_config()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }

    #[test]
    fn test_config_from_fallback_key() {
        let config = Config::from_vars(|name| match name {
            "GOOGLE_API_KEY" => Some("fallback".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_key, "fallback");
        let _server = ImageServer::new(config);
    }

    #[test]
    fn test_missing_key_prevents_startup() {
        assert!(Config::from_vars(|_| None).is_err());
    }

    #[test]
    fn test_cli_selects_http_transport() {
        let cli = Cli::try_parse_from(["gemini-image-mcp", "--transport", "http", "--port", "3100"]).unwrap();
        assert_eq!(cli.transport.into_transport(), Transport::http(3100));
    }

    #[test]
    fn test_cli_defaults_to_stdio() {
        let cli = Cli::try_parse_from(["gemini-image-mcp"]).unwrap();
        assert!(cli.transport.into_transport().is_stdio());
    }

    #[tokio::test]
    async fn test_http_server_stops_on_shutdown() {
        let (tx, rx) = shutdown_channel();
        let server = McpServerBuilder::new(ImageServer::new(test_config()))
            .with_transport(Transport::http(0))
            .with_shutdown(rx);

        let handle = tokio::spawn(server.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server should stop")
            .unwrap();
        assert!(result.is_ok(), "{:?}", result);
    }

    #[tokio::test]
    async fn test_http_server_reports_port_in_use() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let (_tx, rx) = shutdown_channel();
        let result = McpServerBuilder::new(ImageServer::new(test_config()))
            .with_transport(Transport::http(port))
            .with_shutdown(rx)
            .run()
            .await;

        match result {
            Err(ServerError::BindFailed { addr, .. }) => assert_eq!(addr.port(), port),
            other => panic!("expected BindFailed, got {:?}", other),
        }
    }
}
