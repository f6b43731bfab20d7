//! REPL (Read-Eval-Print Loop) for interactive chat

use super::turn::{TurnError, execute_turn};
use crate::output::console::{ConsoleRenderer, FAILURE_NOTICE};
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use reentry_application::{ChannelSession, Transport, TurnSummary};
use reentry_domain::{ChatMessage, TranscriptEntry, TurnRequest, UserInfo, normalize_history};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const WELCOME: &str = "Hi! I can help you find housing, jobs, health care and other \
reentry resources. What would you like to know?";

const HISTORY_CAPACITY: usize = 1000;

/// Result of a slash command
#[derive(Debug, PartialEq, Eq)]
enum CommandOutcome {
    Continue,
    Quit,
}

/// Interactive chat REPL
pub struct ChatRepl<T: Transport + ?Sized> {
    session: Arc<ChannelSession<T>>,
    transcript: Vec<TranscriptEntry>,
    user_info: Option<UserInfo>,
    turn_timeout: Option<Duration>,
    quiet: bool,
}

impl<T: Transport + ?Sized> ChatRepl<T> {
    /// Create a new ChatRepl
    pub fn new(session: Arc<ChannelSession<T>>) -> Self {
        Self {
            session,
            transcript: vec![TranscriptEntry::synthetic(WELCOME)],
            user_info: None,
            turn_timeout: None,
            quiet: false,
        }
    }

    /// Profile sent with every turn
    pub fn with_user_info(mut self, user_info: Option<UserInfo>) -> Self {
        self.user_info = user_info;
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Set whether to hide progress indicators
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// What the backend would receive as `messages` right now.
    pub fn history(&self) -> Vec<ChatMessage> {
        normalize_history(&self.transcript)
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut line_editor = Reedline::create();

        let history = dirs::data_dir()
            .map(|p| p.join("reentry-chat").join("history.txt"))
            .and_then(open_history);
        if let Some(history) = history {
            line_editor = line_editor.with_history(Box::new(history));
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("you".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match line_editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(line) == CommandOutcome::Quit {
                            break;
                        }
                        continue;
                    }

                    println!();
                    let renderer = ConsoleRenderer::stdout(self.quiet);
                    let _ = self.ask_with(line, &renderer).await;
                    println!();
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                _ => {
                    println!("Bye!");
                    break;
                }
            }
        }

        self.session.close().await;
        Ok(())
    }

    /// Send one message as the next turn of the transcript.
    ///
    /// A failed turn leaves the generic failure notice in the transcript;
    /// it is never sent back as history.
    pub async fn ask_with(
        &mut self,
        message: &str,
        renderer: &ConsoleRenderer,
    ) -> Result<TurnSummary, TurnError> {
        self.transcript.push(TranscriptEntry::user(message));
        let request = TurnRequest::new(message)
            .with_history(self.history())
            .with_user_info(self.user_info.clone());

        let result = execute_turn(&*self.session, &request, renderer, self.turn_timeout).await;
        match &result {
            Ok(_) => {
                for bubble in renderer.bubbles() {
                    self.transcript.push(TranscriptEntry::bot(bubble));
                }
            }
            Err(_) => self.transcript.push(TranscriptEntry::synthetic(FAILURE_NOTICE)),
        }
        result
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Reentry resources chat".cyan().bold());
        println!();
        println!("{} {}", "bot>".cyan().bold(), WELCOME);
        println!();
        println!("Commands:");
        println!("  /new      - Start a new conversation");
        println!("  /help     - Show this help");
        println!("  /quit     - Exit chat");
        println!();
    }

    /// Handle slash commands.
    fn handle_command(&mut self, cmd: &str) -> CommandOutcome {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                CommandOutcome::Quit
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /new              - Start a new conversation");
                println!("  /help, /h, /?     - Show this help");
                println!("  /quit, /exit, /q  - Exit chat");
                println!();
                CommandOutcome::Continue
            }
            "/new" => {
                self.start_new_conversation();
                println!("Started a new conversation.");
                CommandOutcome::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                CommandOutcome::Continue
            }
        }
    }

    fn start_new_conversation(&mut self) {
        self.session.clear_conversation();
        self.transcript = vec![TranscriptEntry::synthetic(WELCOME)];
        info!("Conversation cleared");
    }
}

/// Prompt history backed by `path`, or `None` if it cannot be used.
fn open_history(path: PathBuf) -> Option<FileBackedHistory> {
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        debug!("Could not create {}: {}", parent.display(), e);
    }
    match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
        Ok(history) => Some(history),
        Err(e) => {
            debug!("Prompt history disabled: {}", e);
            None
        }
    }
}
