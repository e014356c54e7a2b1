//! Sequential video streams.
//!
//! [`VideoStream`] is the seam between the extraction loop and whatever
//! decodes frames. [`VideoFile`](crate::VideoFile) implements it on top of
//! FFmpeg; tests implement it with synthetic frames.
//!
//! [`Frames`] turns a stream into a lazy, finite, fused sequence of decoded
//! frames: it ends at the first exhaustion *or* read error, and cannot be
//! restarted.
//!
//! # Example
//!
//! ```no_run
//! use framegrab::{Frames, VideoFile};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! let mut frames = Frames::new(&mut video);
//! let count = frames.by_ref().count();
//! if let Some(error) = frames.error() {
//!     eprintln!("stream ended early after {count} frames: {error}");
//! }
//! # Ok::<(), framegrab::FrameGrabError>(())
//! ```

use std::iter::FusedIterator;

use image::DynamicImage;

use crate::{error::FrameGrabError, metadata::StreamMetadata};

/// A video stream that yields decoded frames in presentation order.
pub trait VideoStream {
    /// Metadata captured when the stream was opened.
    fn metadata(&self) -> &StreamMetadata;

    /// Decode the next frame.
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the next frame cannot be read or decoded. Callers
    /// treat this as the end of the stream.
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, FrameGrabError>;
}

impl<S: VideoStream + ?Sized> VideoStream for Box<S> {
    fn metadata(&self) -> &StreamMetadata {
        (**self).metadata()
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, FrameGrabError> {
        (**self).read_frame()
    }
}

/// Lazy sequence of frames read from a [`VideoStream`].
///
/// Borrows the stream mutably for its lifetime. Once it returns `None` it
/// keeps returning `None`; if the sequence ended because of a read error the
/// error is available from [`error`](Frames::error).
pub struct Frames<'a, S: VideoStream + ?Sized> {
    stream: &'a mut S,
    error: Option<FrameGrabError>,
    done: bool,
}

impl<'a, S: VideoStream + ?Sized> Frames<'a, S> {
    /// Start reading frames from `stream`.
    pub fn new(stream: &'a mut S) -> Self {
        Self {
            stream,
            error: None,
            done: false,
        }
    }

    /// The read error that ended the sequence, if any.
    #[must_use]
    pub fn error(&self) -> Option<&FrameGrabError> {
        self.error.as_ref()
    }

    /// Consume the sequence, returning the read error that ended it, if any.
    #[must_use]
    pub fn into_error(self) -> Option<FrameGrabError> {
        self.error
    }
}

impl<S: VideoStream + ?Sized> Iterator for Frames<'_, S> {
    type Item = DynamicImage;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.stream.read_frame() {
            Ok(Some(frame)) => Some(frame),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                self.error = Some(error);
                None
            }
        }
    }
}

impl<S: VideoStream + ?Sized> FusedIterator for Frames<'_, S> {}
