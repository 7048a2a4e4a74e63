//! Batch progress reporting using indicatif.
//!
//! Progress is observability only; nothing in the scan output depends on
//! it. The scanner reports through the [`ScanProgress`] trait so tests can
//! plug in [`NoProgress`] and batch code stays free of terminal concerns.
//! Checkpoints fire at 25/50/75/100% of each batch.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress callback for batch processing.
pub trait ScanProgress: Send + Sync {
    /// Called when a batch starts.
    ///
    /// # Arguments
    ///
    /// * `batch_number` - 1-based batch counter across the whole scan
    /// * `total` - Number of objects in this batch
    fn on_batch_start(&self, batch_number: usize, total: usize);

    /// Called after each object is processed.
    fn on_object(&self, completed: usize, total: usize);

    /// Called when batch completion crosses a quarter checkpoint.
    fn on_checkpoint(&self, batch_number: usize, percent: u8);

    /// Called when a batch completes.
    fn on_batch_end(&self, batch_number: usize);
}

/// Progress sink that reports nothing. Used in tests and JSON output mode.
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn on_batch_start(&self, _batch_number: usize, _total: usize) {}
    fn on_object(&self, _completed: usize, _total: usize) {}
    fn on_checkpoint(&self, _batch_number: usize, _percent: u8) {}
    fn on_batch_end(&self, _batch_number: usize) {}
}

/// Terminal progress reporter.
///
/// Shows one indicatif bar per batch and logs the quarter checkpoints so
/// they also land in non-terminal log output.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bar will be displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ScanProgress for Progress {
    fn on_batch_start(&self, batch_number: usize, total: usize) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::batch_style());
        pb.set_prefix(format!("Batch {batch_number}"));
        *self.bar.lock().unwrap() = Some(pb);
    }

    fn on_object(&self, completed: usize, _total: usize) {
        if let Some(pb) = self.bar.lock().unwrap().as_ref() {
            pb.set_position(completed as u64);
        }
    }

    fn on_checkpoint(&self, batch_number: usize, percent: u8) {
        log::info!("Batch {batch_number} progress: {percent}%");
    }

    fn on_batch_end(&self, _batch_number: usize) {
        if let Some(pb) = self.bar.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }
}

/// The four object counts at which a batch crosses 25/50/75/100%.
#[must_use]
pub fn quarter_checkpoints(total: usize) -> [usize; 4] {
    [total / 4, total / 2, total * 3 / 4, total]
}
