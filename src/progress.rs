//! Observing and stopping a running extraction.
//!
//! A [`ProgressCallback`] receives a [`ProgressInfo`] snapshot every few
//! saved frames and once when the run finishes. Any
//! `Fn(&ProgressInfo) + Send + Sync` closure is a callback. Callbacks only
//! observe: they never influence which frames are written. To stop a run
//! early, share a [`CancellationToken`] with it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framegrab::{ExtractionRequest, FrameExtractor, ProgressInfo};
//!
//! let request = ExtractionRequest::new("input.mp4")
//!     .with_frame_interval(5)
//!     .with_progress(Arc::new(|info: &ProgressInfo| {
//!         println!("Saved {} frames so far...", info.frames_saved);
//!     }));
//! let result = FrameExtractor::new(request).run()?;
//! # Ok::<(), framegrab::FrameGrabError>(())
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Where an extraction stands.
///
/// Delivered every
/// [`progress_interval`](crate::ExtractionRequest::with_progress_interval)
/// saved frames, and once more when the run finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Saved slots so far, successful writes plus skipped failures.
    pub frames_saved: u64,
    /// Frames decoded from the source so far.
    pub frames_read: u64,
    /// How many frames the run should save, when the stream reports a frame
    /// count.
    pub expected_frames: Option<u64>,
    /// `frames_saved` as a share of `expected_frames`, capped at 100.
    pub percentage: Option<f32>,
    /// Time since the first frame was requested.
    pub elapsed: Duration,
    /// Extrapolated from the average time per saved frame so far.
    pub remaining: Option<Duration>,
    /// Source position of the frame saved just before this report. `None`
    /// on the final report.
    pub source_position: Option<u64>,
    /// Set on the final report only.
    pub finished: bool,
}

/// Receives [`ProgressInfo`] snapshots from a running extraction.
///
/// Shared behind an `Arc`, so implementations must be [`Send`] and [`Sync`].
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, info: &ProgressInfo);
}

impl<F> ProgressCallback for F
where
    F: Fn(&ProgressInfo) + Send + Sync,
{
    fn on_progress(&self, info: &ProgressInfo) {
        self(info);
    }
}

/// Callback used when the request has none.
pub(crate) struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Logs "Saved N frames so far..." at `info` level on every periodic report.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if !info.finished {
            log::info!("Saved {} frames so far...", info.frames_saved);
        }
    }
}

/// Shared flag that stops an extraction before its next frame read.
///
/// Clones observe the same flag, so one clone can be handed to the request
/// and another kept by whoever decides to stop it.
///
/// ```
/// use framegrab::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
///
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop every extraction holding a clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Counts reads and saved slots, and calls the observer on cadence.
pub(crate) struct ProgressTracker {
    observer: Arc<dyn ProgressCallback>,
    expected_frames: Option<u64>,
    report_every: u64,
    frames_read: u64,
    frames_saved: u64,
    started: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        observer: Arc<dyn ProgressCallback>,
        expected_frames: Option<u64>,
        report_every: u64,
    ) -> Self {
        Self {
            observer,
            expected_frames,
            report_every: report_every.max(1),
            frames_read: 0,
            frames_saved: 0,
            started: Instant::now(),
        }
    }

    pub(crate) fn frame_read(&mut self) {
        self.frames_read += 1;
    }

    /// Count one saved slot. Failed writes that were skipped count too.
    pub(crate) fn frame_saved(&mut self, source_position: u64) {
        self.frames_saved += 1;
        if self.frames_saved % self.report_every == 0 {
            self.observer
                .on_progress(&self.snapshot(Some(source_position), false));
        }
    }

    pub(crate) fn finish(&self) {
        self.observer.on_progress(&self.snapshot(None, true));
    }

    fn snapshot(&self, source_position: Option<u64>, finished: bool) -> ProgressInfo {
        let elapsed = self.started.elapsed();
        let expected = self.expected_frames.filter(|&expected| expected > 0);

        let percentage = expected
            .map(|expected| (self.frames_saved as f32 * 100.0 / expected as f32).min(100.0));

        let remaining = expected.filter(|_| self.frames_saved > 0).map(|expected| {
            let left = expected.saturating_sub(self.frames_saved);
            elapsed.div_f64(self.frames_saved as f64).mul_f64(left as f64)
        });

        ProgressInfo {
            frames_saved: self.frames_saved,
            frames_read: self.frames_read,
            expected_frames: self.expected_frames,
            percentage,
            elapsed,
            remaining,
            source_position,
            finished,
        }
    }
}
