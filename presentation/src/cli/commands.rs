//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for reentry-chat
#[derive(Parser, Debug)]
#[command(name = "reentry-chat")]
#[command(author, version, about = "Terminal client for the reentry resources chatbot")]
#[command(long_about = r#"
reentry-chat talks to the reentry resources chatbot over a streaming channel.
Replies are shown as they are typed; one reply may arrive as several bubbles.

Without a MESSAGE an interactive chat starts. The conversation is remembered
between runs until you type /new or pass --new-conversation.

Configuration files are loaded from (in priority order):
1. REENTRY_CHAT_* environment variables
2. --config <path>             Explicit config file
3. ./reentry-chat.toml         Project-level config
4. ~/.config/reentry-chat/config.toml   Global config

Example:
  reentry-chat "Where can I find housing help in Alameda county?"
  reentry-chat --host chat.example.org --port 9000
  reentry-chat --simulate "One moment. BREAK_TOKEN Here are three shelters."
"#)]
pub struct Cli {
    /// Message to send (starts interactive chat when omitted)
    pub message: Option<String>,

    /// Chat backend host (overrides config)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Chat backend port (overrides config)
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Answer every turn from a recorded JSONL frame capture instead of a backend
    #[arg(long, value_name = "FILE", conflicts_with = "simulate")]
    pub replay: Option<PathBuf>,

    /// Answer every turn by streaming this text (BREAK_TOKEN splits bubbles)
    #[arg(long, value_name = "TEXT")]
    pub simulate: Option<String>,

    /// Forget the remembered conversation before starting
    #[arg(long)]
    pub new_conversation: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}
