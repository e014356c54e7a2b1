//! Video stream metadata.
//!
//! [`StreamMetadata`] is read once when a stream is opened. Every field is
//! best-effort: containers may omit the frame count or report a frame rate
//! that only approximates variable-frame-rate content.

/// Metadata for the video stream being extracted.
///
/// # Example
///
/// ```no_run
/// use framegrab::{VideoFile, VideoStream};
///
/// let video = VideoFile::open("input.mp4")?;
/// let metadata = video.metadata();
/// println!("{}x{} [{}]", metadata.width, metadata.height, metadata.codec);
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use]
pub struct StreamMetadata {
    /// Frame width in pixels (0 if unknown).
    pub width: u32,
    /// Frame height in pixels (0 if unknown).
    pub height: u32,
    /// Frames per second, if the container reports a usable rate.
    pub frames_per_second: Option<f64>,
    /// Total number of frames, as reported by the container or estimated
    /// from duration and frame rate.
    pub frame_count: Option<u64>,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
}

impl StreamMetadata {
    /// Number of frames a run with `frame_interval` is expected to save.
    ///
    /// `None` when the frame count is unknown or `frame_interval` is zero.
    ///
    /// ```
    /// use framegrab::StreamMetadata;
    ///
    /// let metadata = StreamMetadata {
    ///     frame_count: Some(10),
    ///     ..StreamMetadata::default()
    /// };
    /// assert_eq!(metadata.expected_saved_frames(3), Some(4));
    /// ```
    #[must_use]
    pub fn expected_saved_frames(&self, frame_interval: u64) -> Option<u64> {
        if frame_interval == 0 {
            return None;
        }
        self.frame_count.map(|count| count.div_ceil(frame_interval))
    }
}
