//! Error types for the `framegrab` crate.
//!
//! This module defines [`FrameGrabError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the path or reason
//! that caused the failure so callers can report it without extra logging.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framegrab` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameGrabError {
    /// The request was rejected before any I/O took place.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The video could not be opened as a decodable stream.
    #[error("Failed to open video file at {path}: {reason}")]
    VideoOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A decoded frame could not be encoded or written to disk.
    #[error("Failed to write frame to {path}: {reason}")]
    FrameWrite {
        /// Destination of the failed write.
        path: PathBuf,
        /// Underlying encoder or filesystem error.
        reason: String,
    },

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecode(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while preparing the output folder.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    /// The extraction was stopped via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for FrameGrabError {
    fn from(error: FfmpegError) -> Self {
        FrameGrabError::Ffmpeg(error.to_string())
    }
}
