//! Extraction configuration.
//!
//! [`ExtractionRequest`] is a builder describing one extraction: which video
//! to read, where to write, the sampling stride, and the operational settings
//! (output format, write-failure policy, progress, cancellation) that would
//! otherwise pollute the [`FrameExtractor::run`](crate::FrameExtractor::run)
//! signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framegrab::{CancellationToken, ExtractionRequest, LogProgress, OutputFormat};
//!
//! let token = CancellationToken::new();
//! let request = ExtractionRequest::new("clips/intro.mp4")
//!     .with_frame_interval(10)
//!     .with_output_format(OutputFormat::Png)
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone());
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageFormat;

use crate::progress::{CancellationToken, ProgressCallback, Silent};

/// Number of digits saved-frame indices are zero-padded to.
pub const FRAME_INDEX_WIDTH: usize = 6;

/// Prefix of every saved-frame file name.
pub const FRAME_FILE_PREFIX: &str = "frame_";

/// Suffix appended to the video's file stem to derive the default output folder.
pub const OUTPUT_FOLDER_SUFFIX: &str = "_frames";

/// Default number of saved frames between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// Image container used for saved frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Baseline JPEG, written with a `.jpg` extension. This is the default.
    #[default]
    Jpeg,
    /// Lossless PNG, written with a `.png` extension.
    Png,
}

impl OutputFormat {
    /// File extension (without the dot) used for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub(crate) const fn to_image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

/// What to do when a single frame cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFailurePolicy {
    /// Log the failure, count it, and keep going. The failed frame still
    /// consumes its saved index, so `frame_k` always holds source position
    /// `k * frame_interval`. This is the default.
    #[default]
    Skip,
    /// Stop the run and return [`FrameGrabError::FrameWrite`](crate::FrameGrabError::FrameWrite).
    Abort,
}

/// A single extraction request.
///
/// Only the video path is required. Every other setting has a default that
/// matches the command-line tool: every frame, JPEG output, a folder named
/// after the video next to it, skip-and-continue on write failures, and a
/// progress report every [`DEFAULT_PROGRESS_INTERVAL`] saved frames.
#[derive(Clone)]
pub struct ExtractionRequest {
    pub(crate) video_path: PathBuf,
    pub(crate) output_folder: Option<PathBuf>,
    pub(crate) frame_interval: u64,
    pub(crate) output_format: OutputFormat,
    pub(crate) write_failure_policy: WriteFailurePolicy,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) progress_interval: u64,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for ExtractionRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractionRequest")
            .field("video_path", &self.video_path)
            .field("output_folder", &self.output_folder)
            .field("frame_interval", &self.frame_interval)
            .field("output_format", &self.output_format)
            .field("write_failure_policy", &self.write_failure_policy)
            .field("progress_interval", &self.progress_interval)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl ExtractionRequest {
    /// Create a request for `video_path` with default settings.
    pub fn new<P: AsRef<Path>>(video_path: P) -> Self {
        Self {
            video_path: video_path.as_ref().to_path_buf(),
            output_folder: None,
            frame_interval: 1,
            output_format: OutputFormat::default(),
            write_failure_policy: WriteFailurePolicy::default(),
            progress: Arc::new(Silent),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            cancellation: None,
        }
    }

    /// Write frames to `folder` instead of the derived `<stem>_frames` folder.
    #[must_use]
    pub fn with_output_folder<P: AsRef<Path>>(mut self, folder: P) -> Self {
        self.output_folder = Some(folder.as_ref().to_path_buf());
        self
    }

    /// Save every `interval`th frame.
    ///
    /// Not clamped: an interval of zero is rejected by
    /// [`FrameExtractor::run`](crate::FrameExtractor::run) with
    /// [`FrameGrabError::InvalidArgument`](crate::FrameGrabError::InvalidArgument).
    #[must_use]
    pub fn with_frame_interval(mut self, interval: u64) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the image container for saved frames.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the policy applied when a frame cannot be written.
    #[must_use]
    pub fn with_write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure_policy = policy;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how many saved frames pass between progress reports.
    ///
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Attach a cancellation token, checked before every frame read.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Path of the video to read.
    #[must_use]
    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    /// Explicit output folder, if one was set.
    #[must_use]
    pub fn output_folder(&self) -> Option<&Path> {
        self.output_folder.as_deref()
    }

    /// Sampling stride.
    #[must_use]
    pub const fn frame_interval(&self) -> u64 {
        self.frame_interval
    }

    /// Image container for saved frames.
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
