//! CLI entrypoint for reentry-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use reentry_application::{ChannelSession, IdentityStore, MemoryIdentityStore, Transport};
use reentry_domain::{ChatMessage, TurnRequest};
use reentry_infrastructure::{
    ConfigLoader, FileConfig, FileIdentityStore, JsonlConversationLogger, ScriptedTransport,
    TcpTransport,
};
use reentry_presentation::{ChatRepl, Cli, ConsoleRenderer, execute_turn};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    if let Some(host) = &cli.host {
        config.endpoint.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.endpoint.port = port;
    }
    config.validate().context("Invalid configuration")?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        println!("{}", ConfigLoader::render(&config)?);
        return Ok(());
    }

    init_logging(cli.verbose, &config);
    info!("Starting reentry-chat");

    // === Dependency Injection ===
    let transport = build_transport(&cli, &config)?;
    let session_config = config.session.to_session_config();
    let mut session = ChannelSession::new(transport, build_identity_store(&config), &session_config);
    if let Some(path) = &config.logging.transcript
        && let Some(logger) = JsonlConversationLogger::new(path)
    {
        info!("Writing transcript to {}", logger.path().display());
        session = session.with_conversation_logger(Arc::new(logger));
    }
    let session = Arc::new(session);

    if cli.new_conversation {
        session.clear_conversation();
    }

    let user_info = config.profile.to_user_info();

    // Interactive mode
    let Some(message) = cli.message else {
        let mut repl = ChatRepl::new(Arc::clone(&session))
            .with_user_info(user_info)
            .with_turn_timeout(session_config.turn_timeout)
            .with_quiet(cli.quiet);
        repl.run().await?;
        return Ok(());
    };

    // Single message mode
    let request = TurnRequest::new(message.clone())
        .with_history(vec![ChatMessage::user(message)])
        .with_user_info(user_info);
    let renderer = ConsoleRenderer::stdout(cli.quiet);
    let result = execute_turn(&*session, &request, &renderer, session_config.turn_timeout).await;
    session.close().await;

    let summary = result?;
    if summary.messages_delivered == 0 {
        warn!("The reply contained no text");
    }
    Ok(())
}

/// Install the tracing subscriber: `-v` flags win over the configured level.
fn init_logging(verbose: u8, config: &FileConfig) {
    let filter = match verbose {
        0 => config
            .logging
            .level
            .as_deref()
            .and_then(|level| EnvFilter::try_new(level).ok())
            .unwrap_or_else(|| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_transport(cli: &Cli, config: &FileConfig) -> Result<Arc<dyn Transport>> {
    if let Some(path) = &cli.replay {
        let transport = ScriptedTransport::from_jsonl_file(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        info!("Replaying {} frames from {}", transport.script_len(), path.display());
        return Ok(Arc::new(transport));
    }
    if let Some(text) = &cli.simulate {
        return Ok(Arc::new(ScriptedTransport::simulated(text)));
    }
    Ok(Arc::new(TcpTransport::new(config.endpoint.address())))
}

fn build_identity_store(config: &FileConfig) -> Arc<dyn IdentityStore> {
    let path = config
        .session
        .identity_file
        .as_ref()
        .map(PathBuf::from)
        .or_else(FileIdentityStore::default_path);

    match path {
        Some(path) => Arc::new(FileIdentityStore::new(path)),
        None => {
            warn!("No data directory; the conversation will not be remembered between runs");
            Arc::new(MemoryIdentityStore::new())
        }
    }
}
