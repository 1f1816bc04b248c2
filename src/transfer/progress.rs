use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::watch;

/// Tracks bytes moved by one engine and publishes the running total.
/// The bar is hidden unless verbose output was requested.
pub struct ProgressTracker {
    bytes: u64,
    progress_sender: watch::Sender<u64>,
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(label: &str, verbose: bool) -> Self {
        let (progress_sender, _) = watch::channel(0);

        let bar = if verbose {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };

        // Template is a literal, fall back to the default spinner if it ever breaks
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {bytes} ({bytes_per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(label.to_string());

        Self {
            bytes: 0,
            progress_sender,
            bar,
        }
    }

    /// Subscribe to running byte totals; starts at the current total
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.progress_sender.subscribe()
    }

    /// Record `n` more bytes, returns the new total
    pub fn advance(&mut self, n: usize) -> u64 {
        self.bytes += n as u64;
        self.bar.set_position(self.bytes);
        // Stored even with no receiver so late subscribers see the total
        self.progress_sender.send_replace(self.bytes);
        self.bytes
    }

    pub fn total(&self) -> u64 {
        self.bytes
    }

    pub fn finish(&self) {
        self.bar
            .finish_with_message(format!("done, {}", format_bytes(self.bytes)));
    }

    /// Leave the bar where it stopped (for errors)
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

/// Human-readable byte count for log lines
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1 << 10;
    const MB: u64 = 1 << 20;
    const GB: u64 = 1 << 30;

    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.2} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}
