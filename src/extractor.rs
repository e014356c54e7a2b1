//! The extraction loop.
//!
//! [`FrameExtractor`] reads a video front to back and writes every Nth frame
//! to `<output folder>/frame_<saved index>.<ext>`. The sampling decision uses
//! the frame's position in the source; the file name uses its position among
//! saved frames, so names are contiguous from zero whatever the interval.
//!
//! # Example
//!
//! ```no_run
//! use framegrab::{ExtractionRequest, FrameExtractor};
//!
//! let request = ExtractionRequest::new("input.mp4").with_frame_interval(3);
//! let result = FrameExtractor::new(request).run()?;
//! println!(
//!     "read {} frames, saved {} to {}",
//!     result.total_frames_read(),
//!     result.frames_saved(),
//!     result.output_folder().display(),
//! );
//! # Ok::<(), framegrab::FrameGrabError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    configuration::{ExtractionRequest, WriteFailurePolicy},
    decoder::VideoFile,
    error::FrameGrabError,
    metadata::StreamMetadata,
    naming::{default_output_folder, frame_path},
    progress::ProgressTracker,
    sink::{FrameSink, ImageFileSink},
    stream::{Frames, VideoStream},
};

/// Outcome of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ExtractionResult {
    total_frames_read: u64,
    frames_saved: u64,
    failed_writes: u64,
    output_folder: PathBuf,
    truncated: bool,
}

impl ExtractionResult {
    /// Number of frames decoded from the source.
    #[must_use]
    pub const fn total_frames_read(&self) -> u64 {
        self.total_frames_read
    }

    /// Number of frames successfully written.
    #[must_use]
    pub const fn frames_saved(&self) -> u64 {
        self.frames_saved
    }

    /// Number of sampled frames whose write failed and was skipped.
    #[must_use]
    pub const fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    /// Folder the frames were written to.
    #[must_use]
    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// `true` if the stream ended on a read error rather than a clean end of
    /// stream. Frames decoded before the error are still counted and saved.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }
}

/// Runs one [`ExtractionRequest`].
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    request: ExtractionRequest,
}

impl FrameExtractor {
    /// Create an extractor for `request`.
    #[must_use]
    pub const fn new(request: ExtractionRequest) -> Self {
        Self { request }
    }

    /// The request this extractor runs.
    #[must_use]
    pub const fn request(&self) -> &ExtractionRequest {
        &self.request
    }

    /// Decode the video with FFmpeg and write sampled frames as image files.
    ///
    /// The output folder (and any missing ancestors) is created before the
    /// video is opened and is left in place if the open fails.
    ///
    /// # Errors
    ///
    /// - [`FrameGrabError::InvalidArgument`] if the interval is zero or the
    ///   video path is empty. Nothing is created or opened.
    /// - [`FrameGrabError::Io`] if the output folder cannot be created.
    /// - [`FrameGrabError::VideoOpen`] if the video cannot be opened.
    /// - [`FrameGrabError::FrameWrite`] if a write fails under
    ///   [`WriteFailurePolicy::Abort`].
    /// - [`FrameGrabError::Cancelled`] if the request's token is cancelled.
    /// - The decoder's error if not even the first frame can be read.
    pub fn run(&self) -> Result<ExtractionResult, FrameGrabError> {
        let mut sink = ImageFileSink::new(self.request.output_format);
        self.run_with(|path| VideoFile::open(path), &mut sink)
    }

    /// Like [`run`](FrameExtractor::run), but with a caller-supplied stream
    /// opener and sink.
    ///
    /// `open` is called at most once, after validation and folder creation.
    /// The stream it returns is dropped before this method returns, on every
    /// path.
    ///
    /// # Errors
    ///
    /// Same as [`run`](FrameExtractor::run), plus any error returned by
    /// `open`.
    pub fn run_with<S, O, K>(
        &self,
        open: O,
        sink: &mut K,
    ) -> Result<ExtractionResult, FrameGrabError>
    where
        S: VideoStream,
        O: FnOnce(&Path) -> Result<S, FrameGrabError>,
        K: FrameSink + ?Sized,
    {
        validate(&self.request)?;

        let output_folder = match &self.request.output_folder {
            Some(folder) => folder.clone(),
            None => default_output_folder(&self.request.video_path)?,
        };
        fs::create_dir_all(&output_folder)?;
        log::info!("Saving frames to: {}", output_folder.display());

        let mut stream = open(&self.request.video_path)?;
        log_stream_details(&self.request, stream.metadata());

        let result = sample_frames(&self.request, &mut stream, sink, output_folder);
        drop(stream);
        result
    }
}

/// Extract every `frame_interval`th frame of `video_path` with default
/// settings otherwise.
///
/// When `output_folder` is `None` the folder is derived from the video path
/// (see [`default_output_folder`]).
///
/// # Errors
///
/// See [`FrameExtractor::run`].
pub fn extract_frames<P: AsRef<Path>>(
    video_path: P,
    output_folder: Option<&Path>,
    frame_interval: u64,
) -> Result<ExtractionResult, FrameGrabError> {
    let mut request = ExtractionRequest::new(video_path).with_frame_interval(frame_interval);
    if let Some(folder) = output_folder {
        request = request.with_output_folder(folder);
    }
    FrameExtractor::new(request).run()
}

fn validate(request: &ExtractionRequest) -> Result<(), FrameGrabError> {
    if request.video_path.as_os_str().is_empty() {
        return Err(FrameGrabError::InvalidArgument(
            "video path must not be empty".to_string(),
        ));
    }
    if request.frame_interval == 0 {
        return Err(FrameGrabError::InvalidArgument(
            "frame interval must be at least 1".to_string(),
        ));
    }
    if request
        .output_folder
        .as_ref()
        .is_some_and(|folder| folder.as_os_str().is_empty())
    {
        return Err(FrameGrabError::InvalidArgument(
            "output folder must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn log_stream_details(request: &ExtractionRequest, metadata: &StreamMetadata) {
    let frame_count = metadata
        .frame_count
        .map_or_else(|| "unknown".to_string(), |count| count.to_string());
    let fps = metadata
        .frames_per_second
        .map_or_else(|| "unknown".to_string(), |fps| format!("{fps:.2}"));

    log::info!("Video loaded: {}", request.video_path.display());
    log::info!("Total frames: {frame_count}");
    log::info!("FPS: {fps}");
    log::info!("Extracting every {} frame(s)", request.frame_interval);
}

fn sample_frames<S, K>(
    request: &ExtractionRequest,
    stream: &mut S,
    sink: &mut K,
    output_folder: PathBuf,
) -> Result<ExtractionResult, FrameGrabError>
where
    S: VideoStream + ?Sized,
    K: FrameSink + ?Sized,
{
    let interval = request.frame_interval;
    let format = request.output_format;
    let expected = stream.metadata().expected_saved_frames(interval);
    let mut tracker =
        ProgressTracker::new(Arc::clone(&request.progress), expected, request.progress_interval);

    let mut read_index = 0_u64;
    let mut saved_index = 0_u64;
    let mut frames_saved = 0_u64;
    let mut failed_writes = 0_u64;

    let mut frames = Frames::new(stream);
    loop {
        if request.is_cancelled() {
            log::info!("Extraction cancelled after {read_index} frames");
            return Err(FrameGrabError::Cancelled);
        }

        let Some(frame) = frames.next() else {
            break;
        };
        tracker.frame_read();

        if read_index % interval == 0 {
            let path = frame_path(&output_folder, saved_index, format);
            match sink.write_frame(&frame, &path) {
                Ok(()) => {
                    frames_saved += 1;
                    log::trace!("Saved frame {read_index} -> {}", path.display());
                }
                Err(error) => match request.write_failure_policy {
                    WriteFailurePolicy::Abort => return Err(error),
                    WriteFailurePolicy::Skip => {
                        log::warn!("Skipping frame {read_index}: {error}");
                        failed_writes += 1;
                    }
                },
            }
            tracker.frame_saved(read_index);
            saved_index += 1;
        }

        read_index += 1;
    }

    let truncated = match frames.into_error() {
        Some(error) if read_index == 0 => return Err(error),
        Some(error) => {
            log::warn!("Stream ended early after {read_index} frames: {error}");
            true
        }
        None => false,
    };

    tracker.finish();
    log::info!(
        "Extraction complete! Saved {frames_saved} frames to {}",
        output_folder.display()
    );

    Ok(ExtractionResult {
        total_frames_read: read_index,
        frames_saved,
        failed_writes,
        output_folder,
        truncated,
    })
}
