//! FFmpeg-backed video stream.
//!
//! [`VideoFile`] opens a container, picks its best video stream and decodes
//! it front to back, converting every frame to 8-bit RGB at the source
//! resolution. It never seeks.
//!
//! The FFmpeg contexts are owned by the `VideoFile` and released when it is
//! dropped, so every exit path of an extraction releases the stream.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{error::FrameGrabError, metadata::StreamMetadata, stream::VideoStream};

/// An open video file, read sequentially.
///
/// # Example
///
/// ```no_run
/// use framegrab::{VideoFile, VideoStream};
///
/// let mut video = VideoFile::open("input.mp4")?;
/// if let Some(frame) = video.read_frame()? {
///     frame.save("first_frame.png")?;
/// }
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
pub struct VideoFile {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    metadata: StreamMetadata,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    path: PathBuf,
    eof_sent: bool,
    done: bool,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .field("eof_sent", &self.eof_sent)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file for sequential decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, selects the best
    /// video stream, and prepares a decoder and an RGB converter for it.
    ///
    /// # Errors
    ///
    /// Returns [`FrameGrabError::VideoOpen`] if the file is missing, is not a
    /// recognisable container, has no video stream, or uses a codec FFmpeg
    /// cannot decode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameGrabError> {
        let path = path.as_ref();
        let open_error = |reason: String| FrameGrabError::VideoOpen {
            path: path.to_path_buf(),
            reason,
        };

        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let container_duration = match input_context.duration() {
            microseconds if microseconds > 0 => Some(Duration::from_micros(microseconds as u64)),
            _ => None,
        };

        let (video_stream_index, decoder, frames_per_second, reported_frames) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or_else(|| open_error("no video stream found".to_string()))?;

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| open_error(format!("unreadable codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("unsupported video codec: {error}")))?;

            let frames_per_second =
                rational_to_f64(stream.avg_frame_rate()).or_else(|| rational_to_f64(stream.rate()));

            (stream.index(), decoder, frames_per_second, stream.frames())
        };

        // Prefer the container's own count; fall back to duration × rate.
        let frame_count = if reported_frames > 0 {
            Some(reported_frames as u64)
        } else {
            container_duration
                .zip(frames_per_second)
                .map(|(duration, fps)| (duration.as_secs_f64() * fps) as u64)
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| open_error(format!("cannot convert frames to RGB: {error}")))?;

        let metadata = StreamMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
        };

        log::debug!(
            "Opened {} (stream {video_stream_index}): {metadata:?}",
            path.display()
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            metadata,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            path: path.to_path_buf(),
            eof_sent: false,
            done: false,
        })
    }

    /// Path the file was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Convert the current `decoded_frame` to an RGB image.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, FrameGrabError> {
        self.scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;

        let width = self.rgb_frame.width();
        let height = self.rgb_frame.height();
        let buffer = packed_rgb_plane(&self.rgb_frame, width, height);

        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FrameGrabError::VideoDecode(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }

    /// Signal end of input so the decoder releases its buffered frames.
    fn flush(&mut self) -> Result<(), FrameGrabError> {
        self.eof_sent = true;
        if let Err(error) = self.decoder.send_eof() {
            self.done = true;
            return Err(FrameGrabError::from(error));
        }
        Ok(())
    }
}

impl VideoStream for VideoFile {
    fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, FrameGrabError> {
        if self.done {
            return Ok(None);
        }

        loop {
            // Drain anything the decoder already has.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return match self.convert_current_frame() {
                    Ok(image) => Ok(Some(image)),
                    Err(error) => {
                        self.done = true;
                        Err(error)
                    }
                };
            }

            if self.eof_sent {
                self.done = true;
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    match self.decoder.send_packet(&packet) {
                        Ok(()) => {}
                        Err(error) if is_concealable(&error) => {
                            log::warn!(
                                "Skipping damaged packet in {}: {error}",
                                self.path.display()
                            );
                        }
                        Err(error) => {
                            self.done = true;
                            return Err(FrameGrabError::VideoDecode(error.to_string()));
                        }
                    }
                }
                Err(FfmpegError::Eof) => self.flush()?,
                Err(error) => {
                    // Truncated or damaged container: keep what is decoded.
                    log::warn!(
                        "Read error in {}, treating as end of stream: {error}",
                        self.path.display()
                    );
                    self.flush()?;
                }
            }
        }
    }
}

impl Drop for VideoFile {
    fn drop(&mut self) {
        log::debug!("Released video stream {}", self.path.display());
    }
}

/// Packet errors the decoder recovers from by dropping the packet.
fn is_concealable(error: &FfmpegError) -> bool {
    matches!(error, FfmpegError::InvalidData)
}

fn rational_to_f64(rate: Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(f64::from(rate.numerator()) / f64::from(rate.denominator()))
    } else {
        None
    }
}

/// Copy the first plane of an RGB24 frame into a tightly-packed buffer.
///
/// FFmpeg rows often carry padding (stride > width × 3); it is dropped here.
fn packed_rgb_plane(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_bytes = width as usize * 3;
    let rows = height as usize;
    let data = frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * rows].to_vec();
    }

    data.chunks(stride)
        .take(rows)
        .flat_map(|row| &row[..row_bytes])
        .copied()
        .collect()
}
