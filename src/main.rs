//! MCP Tool Server - Rust Implementation
//!
//! Serves a registry of tools over one HTTP endpoint: SSE for the session
//! announcement, JSON-RPC over POST for discovery and invocation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use mcp_tool_server::config::Config;
use mcp_tool_server::error::Result;
use mcp_tool_server::mcp::registry::ToolRegistry;
use mcp_tool_server::mcp::server::McpServer;
use mcp_tool_server::mcp::transport;

/// MCP Tool Server
#[derive(Parser)]
#[command(name = "mcp-tool-server")]
#[command(author, version, about = "MCP Tool Server - filesystem and weather tools over HTTP + SSE")]
struct Cli {
    /// Host or IP address to listen on
    #[arg(long, env = "MCP_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MCP_PORT")]
    port: Option<u16>,

    /// Directory the filesystem tools operate in
    #[arg(short, long, env = "MCP_WORKDIR")]
    workdir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::new()?.with_overrides(cli.host, cli.port, cli.workdir)?;

    run_server(config).await
}

async fn run_server(config: Config) -> Result<()> {
    let addr = config.listen_addr()?;

    let registry = ToolRegistry::builtin(&config.workdir)?;
    tracing::info!(
        tools = registry.len(),
        workdir = %config.workdir.display(),
        "Tool registry ready"
    );

    let server = Arc::new(McpServer::new(Arc::new(registry), config.identity()));
    transport::serve(addr, server).await
}
