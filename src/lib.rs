//! # framegrab
//!
//! Sample every Nth frame of a video file into a folder of numbered images.
//!
//! `framegrab` opens a video with FFmpeg (via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)), decodes it front to
//! back, and writes each sampled frame with the
//! [`image`](https://crates.io/crates/image) crate as
//! `frame_000000.jpg`, `frame_000001.jpg`, ... in the output folder.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framegrab::{ExtractionRequest, FrameExtractor};
//!
//! // Every 30th frame into `input_frames/` next to the video.
//! let request = ExtractionRequest::new("input.mp4").with_frame_interval(30);
//! let result = FrameExtractor::new(request).run()?;
//! assert_eq!(result.output_folder(), std::path::Path::new("input_frames"));
//! # Ok::<(), framegrab::FrameGrabError>(())
//! ```
//!
//! ## Behaviour
//!
//! - A frame is saved when its source position is a multiple of the interval.
//! - Saved files are numbered by save order, contiguously from zero, padded
//!   to [`FRAME_INDEX_WIDTH`] digits. JPEG is the default container.
//! - The output folder is created (with its ancestors) if missing; re-running
//!   overwrites same-named files.
//! - A read error part way through ends the run gracefully; a single failed
//!   write is skipped by default ([`WriteFailurePolicy`]).
//! - Progress is reported to an optional [`ProgressCallback`] on a fixed
//!   cadence; a [`CancellationToken`] can stop the run between frames.
//!
//! Two runs writing into the same folder at the same time may overwrite each
//! other's files.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod metadata;
pub mod naming;
pub mod progress;
pub mod sink;
pub mod stream;

pub use configuration::{
    DEFAULT_PROGRESS_INTERVAL, ExtractionRequest, FRAME_FILE_PREFIX, FRAME_INDEX_WIDTH,
    OUTPUT_FOLDER_SUFFIX, OutputFormat, WriteFailurePolicy,
};
pub use decoder::VideoFile;
pub use error::FrameGrabError;
pub use extractor::{ExtractionResult, FrameExtractor, extract_frames};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::StreamMetadata;
pub use naming::{default_output_folder, frame_file_name, frame_path};
pub use progress::{CancellationToken, LogProgress, ProgressCallback, ProgressInfo};
pub use sink::{FrameSink, ImageFileSink};
pub use stream::{Frames, VideoStream};
