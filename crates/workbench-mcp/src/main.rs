//! Workbench MCP Server: entry point.

use std::sync::Arc;

use anyhow::Context as _;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use workbench_mcp::config::ServerConfig;
use workbench_mcp::context::{LogControl, ServerContext};
use workbench_mcp::integrations::EchoProvider;
use workbench_mcp::protocol::ProtocolHandler;
use workbench_mcp::transport::StdioTransport;
use workbench_mcp::types::{InitializeResult, SUPPORTED_PROTOCOL_VERSIONS};

#[derive(Parser)]
#[command(
    name = "workbench-mcp",
    about = "MCP server for Workbench: tools, resources, prompts, and live resource notifications",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Register `ask_assistant`, answered by a built-in echo provider.
    #[arg(long)]
    echo_assistant: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over HTTP with an SSE push stream.
    #[cfg(feature = "sse")]
    ServeHttp {
        /// Listen host. Also reads MCP_HOST.
        #[arg(long)]
        host: Option<String>,

        /// Listen port. Also reads MCP_PORT.
        #[arg(long)]
        port: Option<u16>,

        /// Bearer token for authentication.
        /// Also reads from WORKBENCH_TOKEN env var.
        #[arg(long)]
        token: Option<String>,
    },

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   workbench-mcp completions bash > ~/.local/share/bash-completion/completions/workbench-mcp
    ///   workbench-mcp completions zsh > ~/.zfunc/_workbench-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

/// Install the stderr subscriber; the returned control swaps its filter.
fn init_tracing(log_level: &str) -> LogControl {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    LogControl::new(move |directive| {
        let filter = EnvFilter::try_new(directive).map_err(|e| e.to_string())?;
        handle.reload(filter).map_err(|e| e.to_string())
    })
}

fn build_handler(
    config: ServerConfig,
    log_control: LogControl,
    echo_assistant: bool,
) -> anyhow::Result<Arc<ProtocolHandler>> {
    let mut server = ServerContext::new(config).with_log_control(log_control);
    if echo_assistant {
        server = server.with_completer(Arc::new(EchoProvider));
    }
    let handler =
        ProtocolHandler::new(Arc::new(server)).context("failed to build capability registry")?;
    Ok(Arc::new(handler))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_control = init_tracing(&cli.log_level);
    let config = ServerConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let handler = build_handler(config, log_control, cli.echo_assistant)?;
            tracing::info!("Workbench MCP server (stdio)");
            StdioTransport::new(handler).run().await?;
        }

        #[cfg(feature = "sse")]
        Commands::ServeHttp { host, port, token } => {
            use workbench_mcp::config::resolve;
            use workbench_mcp::integrations::StaticTokenAuthorizer;
            use workbench_mcp::transport::SseTransport;

            let config = ServerConfig {
                host: resolve(host, config.host),
                port: resolve(port, config.port),
                token: token.or(config.token),
                ..config
            };
            let addr = config.bind_addr();
            let token = config.token.clone();
            let handler = build_handler(config, log_control, cli.echo_assistant)?;

            tracing::info!("Workbench MCP server (http)");
            let transport = match token {
                Some(token) => {
                    tracing::info!("Auth: bearer token required");
                    SseTransport::with_authorizer(handler, Arc::new(StaticTokenAuthorizer::new(token)))
                }
                None => SseTransport::new(handler),
            };
            transport.run(&addr).await?;
        }

        Commands::Info => {
            let config_name = config.name.clone();
            let handler = build_handler(config, log_control, cli.echo_assistant)?;
            let init = InitializeResult::negotiated(SUPPORTED_PROTOCOL_VERSIONS[0], &config_name);
            let tools = handler.tools().list_tools();
            let info = serde_json::json!({
                "server": init.server_info,
                "protocol_version": init.protocol_version,
                "supported_versions": SUPPORTED_PROTOCOL_VERSIONS,
                "capabilities": init.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
                "resources": handler.resources().list_resources().iter().map(|r| r.uri.clone()).collect::<Vec<_>>(),
                "prompts": handler.prompts().list_prompts().iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "workbench-mcp", &mut std::io::stdout());
        }

        Commands::Repl => {
            let handler = build_handler(config, log_control, true)?;
            workbench_mcp::repl::run(handler).await?;
        }
    }

    Ok(())
}
