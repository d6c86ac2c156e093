//! MCP transport selection.
//!
//! Two transports are supported:
//!
//! - **Stdio**: default, for clients that spawn the server as a subprocess
//! - **HTTP**: streamable HTTP served under `/mcp`
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use gemini_image_mcp_common::transport::TransportArgs;
//!
//! #[derive(Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     transport: TransportArgs,
//! }
//!
//! let args = Args::parse_from(["gemini-image-mcp", "--transport", "http", "--port", "9000"]);
//! let transport = args.transport.into_transport();
//! assert_eq!(transport.port(), Some(9000));
//! ```

use clap::Args;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default bind address for the HTTP transport (loopback only).
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Transport mode for MCP server communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Standard input/output transport (default).
    #[default]
    Stdio,
    /// HTTP streamable transport.
    Http {
        /// Address to bind
        host: IpAddr,
        /// Port to listen on
        port: u16,
    },
}

impl Transport {
    /// Create a new stdio transport.
    pub fn stdio() -> Self {
        Transport::Stdio
    }

    /// Create a new HTTP transport on the loopback interface.
    pub fn http(port: u16) -> Self {
        Transport::Http {
            host: DEFAULT_HOST,
            port,
        }
    }

    /// Check if this is a stdio transport.
    pub fn is_stdio(&self) -> bool {
        matches!(self, Transport::Stdio)
    }

    /// Check if this is an HTTP transport.
    pub fn is_http(&self) -> bool {
        matches!(self, Transport::Http { .. })
    }

    /// Get the port if this is a network transport.
    pub fn port(&self) -> Option<u16> {
        match self {
            Transport::Stdio => None,
            Transport::Http { port, .. } => Some(*port),
        }
    }

    /// Socket address to bind, for network transports.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            Transport::Stdio => None,
            Transport::Http { host, port } => Some(SocketAddr::new(*host, *port)),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http { host, port } => write!(f, "http ({})", SocketAddr::new(*host, *port)),
        }
    }
}

/// Command-line arguments for transport configuration.
#[derive(Args, Debug, Clone)]
pub struct TransportArgs {
    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio", value_parser = parse_transport_mode)]
    pub transport: TransportMode,

    /// Port for the HTTP transport
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Address the HTTP transport binds to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,
}

/// Transport mode parsed from command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    Stdio,
    Http,
}

pub(crate) fn parse_transport_mode(s: &str) -> Result<TransportMode, String> {
    match s.to_lowercase().as_str() {
        "stdio" => Ok(TransportMode::Stdio),
        "http" => Ok(TransportMode::Http),
        _ => Err(format!(
            "Invalid transport mode '{}'. Valid options: stdio, http",
            s
        )),
    }
}

impl TransportArgs {
    /// Convert command-line arguments into a Transport configuration.
    pub fn into_transport(self) -> Transport {
        match self.transport {
            TransportMode::Stdio => Transport::Stdio,
            TransportMode::Http => Transport::Http {
                host: self.host,
                port: self.port,
            },
        }
    }
}

impl Default for TransportArgs {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            port: 8080,
            host: DEFAULT_HOST,
        }
    }
}
