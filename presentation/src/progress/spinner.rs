//! Waiting indicator shown until the first reply text arrives

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Spinner for one turn; also displays transient status notices.
pub struct TurnSpinner {
    bar: ProgressBar,
    active: AtomicBool,
}

impl TurnSpinner {
    /// Start spinning immediately.
    pub fn start() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar.set_message("Thinking...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar,
            active: AtomicBool::new(true),
        }
    }

    /// A spinner that never draws (quiet mode, tests).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            active: AtomicBool::new(false),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Remove the spinner line. Safe to call repeatedly.
    pub fn clear(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.bar.finish_and_clear();
        }
    }
}

impl Drop for TurnSpinner {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_is_never_active() {
        let spinner = TurnSpinner::hidden();
        assert!(!spinner.is_active());
        spinner.clear();
        assert!(!spinner.is_active());
    }

    #[test]
    fn clear_deactivates() {
        let spinner = TurnSpinner::start();
        spinner.set_status("Searching");
        assert!(spinner.is_active());
        spinner.clear();
        spinner.clear();
        assert!(!spinner.is_active());
    }
}
