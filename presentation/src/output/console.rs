//! Console rendering of streamed replies
//!
//! Each logical message is printed as its own bubble. Updates for the bubble
//! in progress print only the new suffix, so the reply appears to type
//! itself out.

use crate::progress::spinner::TurnSpinner;
use colored::Colorize;
use reentry_application::TurnObserver;
use reentry_domain::LogicalMessage;
use std::io::Write;
use std::sync::Mutex;

const BOT_LABEL: &str = "bot";

/// Shown in place of a reply when a turn fails.
pub const FAILURE_NOTICE: &str =
    "Sorry, I couldn't get a response just now. Please try again in a moment.";

struct RenderState {
    out: Box<dyn Write + Send>,
    /// Text of the bubble currently on screen.
    current: Option<String>,
    /// Bubbles already closed by a break token.
    finished: Vec<String>,
}

/// [`TurnObserver`] that renders a turn to a terminal (or any writer).
pub struct ConsoleRenderer {
    state: Mutex<RenderState>,
    spinner: TurnSpinner,
    color: bool,
}

impl ConsoleRenderer {
    /// Render to stdout, with a spinner until the first text unless `quiet`.
    pub fn stdout(quiet: bool) -> Self {
        let spinner = if quiet {
            TurnSpinner::hidden()
        } else {
            TurnSpinner::start()
        };
        Self::with_writer(Box::new(std::io::stdout()), spinner)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, spinner: TurnSpinner) -> Self {
        Self {
            state: Mutex::new(RenderState {
                out,
                current: None,
                finished: Vec::new(),
            }),
            spinner,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Every bubble of the turn so far, in order.
    pub fn bubbles(&self) -> Vec<String> {
        let state = self.lock();
        let mut bubbles = state.finished.clone();
        bubbles.extend(state.current.iter().cloned());
        bubbles
    }

    /// Print the generic failure notice (details go to the log).
    pub fn render_failure(&self) {
        self.spinner.clear();
        let mut state = self.lock();
        end_line(&mut state);
        let notice = if self.color {
            FAILURE_NOTICE.red().to_string()
        } else {
            FAILURE_NOTICE.to_string()
        };
        let _ = writeln!(state.out, "{}", notice);
        let _ = state.out.flush();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RenderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn label(&self) -> String {
        if self.color {
            format!("{}>", BOT_LABEL.cyan().bold())
        } else {
            format!("{}>", BOT_LABEL)
        }
    }
}

/// Terminate the bubble currently on screen, keeping its text.
fn end_line(state: &mut RenderState) {
    if let Some(text) = state.current.take() {
        let _ = writeln!(state.out);
        state.finished.push(text);
    }
}

impl TurnObserver for ConsoleRenderer {
    fn on_message(&self, message: &LogicalMessage) {
        self.spinner.clear();
        let label = self.label();
        let mut state = self.lock();

        if message.is_new_message {
            end_line(&mut state);
        }

        let extends = state
            .current
            .as_deref()
            .is_some_and(|shown| message.text.starts_with(shown));
        let suffix = if extends {
            let shown_len = state.current.as_ref().map_or(0, String::len);
            message.text[shown_len..].to_string()
        } else {
            // First text, or not an extension of what is shown: new bubble.
            end_line(&mut state);
            let _ = write!(state.out, "{} ", label);
            message.text.clone()
        };

        let _ = write!(state.out, "{}", suffix);
        let _ = state.out.flush();
        state.current = Some(message.text.clone());
    }

    fn on_info(&self, text: &str) {
        if self.spinner.is_active() {
            self.spinner.set_status(text);
            return;
        }
        let mut state = self.lock();
        if state.current.is_some() {
            // Never break into a bubble that is still typing.
            return;
        }
        let line = if self.color {
            format!("({})", text).dimmed().to_string()
        } else {
            format!("({})", text)
        };
        let _ = writeln!(state.out, "{}", line);
    }

    fn on_complete(&self) {
        self.spinner.clear();
        let mut state = self.lock();
        if let Some(text) = state.current.take() {
            let _ = writeln!(state.out);
            state.finished.push(text);
        }
        let _ = state.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer that shares its buffer with the test.
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn renderer() -> (ConsoleRenderer, Sink) {
        let sink = Sink::default();
        let renderer = ConsoleRenderer::with_writer(Box::new(sink.clone()), TurnSpinner::hidden())
            .with_color(false);
        (renderer, sink)
    }

    #[test]
    fn growing_message_prints_only_new_text() {
        let (renderer, sink) = renderer();
        renderer.on_message(&LogicalMessage::update("Hi"));
        renderer.on_message(&LogicalMessage::update("Hi there"));
        renderer.on_complete();

        assert_eq!(sink.text(), "bot> Hi there\n");
        assert_eq!(renderer.bubbles(), vec!["Hi there"]);
    }

    #[test]
    fn new_message_opens_a_second_bubble() {
        let (renderer, sink) = renderer();
        renderer.on_message(&LogicalMessage::update("Thinking..."));
        // Re-emission at a break prints nothing new.
        renderer.on_message(&LogicalMessage::update("Thinking..."));
        renderer.on_message(&LogicalMessage::opening("Answer"));
        renderer.on_complete();

        assert_eq!(sink.text(), "bot> Thinking...\nbot> Answer\n");
        assert_eq!(renderer.bubbles(), vec!["Thinking...", "Answer"]);
    }

    #[test]
    fn info_before_text_is_printed_on_its_own_line() {
        let (renderer, sink) = renderer();
        renderer.on_info("Searching resources");
        renderer.on_message(&LogicalMessage::update("Found two"));
        renderer.on_info("ignored while typing");
        renderer.on_complete();

        assert_eq!(sink.text(), "(Searching resources)\nbot> Found two\n");
    }

    #[test]
    fn failure_notice_closes_partial_bubble() {
        let (renderer, sink) = renderer();
        renderer.on_message(&LogicalMessage::update("partial"));
        renderer.render_failure();

        assert_eq!(sink.text(), format!("bot> partial\n{}\n", FAILURE_NOTICE));
    }
}
