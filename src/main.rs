//! # sunchat — chat/RAG backend for the SunShield Solar & Coatings website
//!
//! Serves the chat widget API: session management, message orchestration
//! with optional keyword retrieval over uploaded documents, and document
//! CRUD.
//!
//! Usage:
//!   sunchat                       # Start the gateway (default port 8080)
//!   sunchat --port 3000           # Custom port
//!   sunchat --db ./chat.db        # Custom database location

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sunchat_core::config::SunChatConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sunchat", version, about = "SunShield chat/RAG gateway")]
struct Cli {
    /// Gateway port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Gateway host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    db: Option<String>,

    /// Config file path (default: $SUNCHAT_CONFIG, then ~/.sunchat/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "sunchat=debug,tower_http=debug"
    } else {
        "sunchat=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Load configuration: --config flag, then SUNCHAT_CONFIG, then default
    let cli_config = cli.config.as_ref().map(|c| shellexpand::tilde(c).to_string());
    let env_config = std::env::var("SUNCHAT_CONFIG").ok();
    let config_path =
        SunChatConfig::resolve_path(cli_config.as_deref(), env_config.as_deref());
    let mut config = if config_path.exists() {
        SunChatConfig::load_from(&config_path)?
    } else {
        SunChatConfig::default()
    };
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(db) = cli.db {
        config.store.db_path = shellexpand::tilde(&db).to_string();
    }

    // Open the store
    let db_path = config.store.resolved_db_path();
    let store = Arc::new(sunchat_store::ChatStore::open(
        &db_path,
        config.knowledge.max_chunk_size,
    )?);
    tracing::info!("chat store ready: {}", db_path.display());

    // Completion client — fails fast when no API key is configured
    let client = sunchat_llm::OpenAiCompatibleClient::new(&config.llm)?;
    tracing::info!("completion client ready (model={})", config.llm.model);

    let agent = Arc::new(sunchat_agent::ChatAgent::new(
        store.clone(),
        Arc::new(client),
        config.knowledge.top_k,
    ));

    let state = Arc::new(sunchat_gateway::AppState { store, agent });
    sunchat_gateway::start(&config.gateway, state).await?;
    Ok(())
}
