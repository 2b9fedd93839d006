use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::progress::{clear_active_bar, set_active_bar};

/// Spinner on stderr that also becomes the target for log output while alive.
pub struct Spinner {
    progress: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            progress.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        progress.set_message(message.to_string());
        progress.enable_steady_tick(Duration::from_millis(80));
        set_active_bar(progress.clone());

        Self { progress }
    }

    pub fn set_message(&self, message: String) {
        self.progress.set_message(message);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        clear_active_bar();
        self.progress.finish_and_clear();
    }
}
