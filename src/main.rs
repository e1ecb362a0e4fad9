use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agent_console::agent::AgentRegistry;
use agent_console::config::{self, Config};
use agent_console::llm::{Provider, ProviderRegistry};
use agent_console::runtime::AgentRuntime;
use agent_console::server::{self, AppState};
use agent_console::store::file::FileRecordStore;

/// Agent Console - a self-hosted console for managing and chatting with hierarchical AI agents
#[derive(Parser, Debug)]
#[command(version = agent_console::build_info::VERSION, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "agent-console.yaml")]
    config: String,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Registry directory (overrides config file). If relative, it is
    /// resolved relative to the config file directory.
    #[arg(long)]
    registry_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agent_console=info,warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;

    // CLI overrides config
    if let Some(host) = args.host {
        config.server.host = host.to_string();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.registry_dir {
        config.registry_dir = dir;
    }

    let registry_dir = config::resolve_registry_dir(Path::new(&args.config), &config.registry_dir);
    let store = FileRecordStore::new(&registry_dir);
    let registry = AgentRegistry::new(Arc::new(store), config.defaults.clone());
    info!(registry_dir = %registry_dir.display(), "Opened agent registry");

    // Initialize LLM providers from environment
    let providers = ProviderRegistry::from_env();
    let provider: Provider = config.llm.provider.parse()?;
    let runtime = AgentRuntime::new(providers, provider, config.llm.base_url.clone());

    let state = AppState {
        registry,
        runtime,
        idle_timeout_seconds: config.server.idle_timeout_seconds,
        keep_alive_interval_seconds: config.server.keep_alive_interval_seconds,
    };

    let app = server::build_app(state, config.server.request_timeout_seconds);

    let ip: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "Starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
