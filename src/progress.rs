//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] or
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as a directory is processed. The CLI drives its progress bar from
//! these; library users can forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2docx::{BatchProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     converted: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, input: &Path) {
//!         self.converted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", index + 1, total, input.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { converted: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::SkipReason;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch drivers as they walk a directory.
///
/// Files are handled one at a time, so events for one batch never overlap.
/// The trait is still `Send + Sync` because the Phase 1 driver is async and
/// may resume on another worker thread. `index` is 0-based.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once with the number of matching input files.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a file is read.
    fn on_file_start(&self, index: usize, total: usize, input: &Path) {
        let _ = (index, total, input);
    }

    /// Called after the output file was written.
    fn on_file_complete(&self, index: usize, total: usize, input: &Path) {
        let _ = (index, total, input);
    }

    /// Called when a file is passed over without processing.
    fn on_file_skipped(&self, index: usize, total: usize, input: &Path, reason: SkipReason) {
        let _ = (index, total, input, reason);
    }

    /// Called when a file failed; the batch continues.
    fn on_file_error(&self, index: usize, total: usize, input: &Path, error: &str) {
        let _ = (index, total, input, error);
    }

    /// Called once after every file was attempted.
    fn on_batch_complete(&self, converted: usize, skipped: usize, failed: usize) {
        let _ = (converted, skipped, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the configs.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        skips: Mutex<Vec<SkipReason>>,
        errors: Mutex<Vec<String>>,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total: usize) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _input: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _input: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_skipped(&self, _index: usize, _total: usize, _input: &Path, reason: SkipReason) {
            self.skips.lock().unwrap().push(reason);
        }

        fn on_file_error(&self, _index: usize, _total: usize, _input: &Path, error: &str) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(0, 2, Path::new("a.json"));
        cb.on_file_complete(0, 2, Path::new("a.json"));
        cb.on_file_skipped(1, 2, Path::new("b.json"), SkipReason::OutputExists);
        cb.on_file_error(1, 2, Path::new("b.json"), "boom");
        cb.on_batch_complete(1, 1, 0);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_batch_start(3);
        tracker.on_file_start(0, 3, Path::new("a.json"));
        tracker.on_file_complete(0, 3, Path::new("a.json"));
        tracker.on_file_skipped(1, 3, Path::new("b.json"), SkipReason::EmptyInput);
        tracker.on_file_start(2, 3, Path::new("c.json"));
        tracker.on_file_error(2, 3, Path::new("c.json"), "Malformed JSON");

        assert_eq!(tracker.total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(*tracker.skips.lock().unwrap(), vec![SkipReason::EmptyInput]);
        assert_eq!(tracker.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_file_start(0, 10, Path::new("x.pdf"));
    }
}
