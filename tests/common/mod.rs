//! Synthetic streams and sinks shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use framegrab::{FrameGrabError, FrameSink, StreamMetadata, VideoStream};
use image::{DynamicImage, Rgb, RgbImage};

pub const FRAME_SIZE: u32 = 8;

/// A stream of `frame_count` solid-colour frames. Frame `i` has red channel
/// `i % 256`, so saved files can be traced back to their source position.
pub struct SyntheticStream {
    metadata: StreamMetadata,
    frame_count: u64,
    fail_at: Option<u64>,
    position: u64,
    released: Arc<AtomicBool>,
}

impl SyntheticStream {
    pub fn new(frame_count: u64) -> Self {
        Self {
            metadata: StreamMetadata {
                width: FRAME_SIZE,
                height: FRAME_SIZE,
                frames_per_second: Some(25.0),
                frame_count: Some(frame_count),
                codec: "synthetic".to_string(),
            },
            frame_count,
            fail_at: None,
            position: 0,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fail with a decode error instead of returning frame `position`.
    pub fn failing_at(mut self, position: u64) -> Self {
        self.fail_at = Some(position);
        self
    }

    /// Report no frame count or frame rate, like some streaming containers.
    pub fn without_counts(mut self) -> Self {
        self.metadata.frame_count = None;
        self.metadata.frames_per_second = None;
        self
    }

    /// Flag set when the stream is dropped.
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl VideoStream for SyntheticStream {
    fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, FrameGrabError> {
        if self.fail_at == Some(self.position) {
            return Err(FrameGrabError::VideoDecode(format!(
                "synthetic corruption at frame {}",
                self.position
            )));
        }
        if self.position >= self.frame_count {
            return Ok(None);
        }

        let red = (self.position % 256) as u8;
        self.position += 1;
        let image = RgbImage::from_pixel(FRAME_SIZE, FRAME_SIZE, Rgb([red, 0, 0]));
        Ok(Some(DynamicImage::ImageRgb8(image)))
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Records every write instead of touching the filesystem. Writes to the
/// saved indices in `failing` fail.
#[derive(Default)]
pub struct RecordingSink {
    pub written: Vec<PathBuf>,
    pub attempted: Vec<PathBuf>,
    pub source_reds: Vec<u8>,
    failing: HashSet<usize>,
}

impl RecordingSink {
    pub fn failing_on(indices: &[usize]) -> Self {
        Self {
            failing: indices.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn file_names(&self) -> Vec<String> {
        self.written
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

impl FrameSink for RecordingSink {
    fn write_frame(&mut self, image: &DynamicImage, path: &Path) -> Result<(), FrameGrabError> {
        let attempt = self.attempted.len();
        self.attempted.push(path.to_path_buf());

        if self.failing.contains(&attempt) {
            return Err(FrameGrabError::FrameWrite {
                path: path.to_path_buf(),
                reason: "disk full".to_string(),
            });
        }

        self.written.push(path.to_path_buf());
        self.source_reds.push(image.to_rgb8().get_pixel(0, 0)[0]);
        Ok(())
    }
}

/// Sorted file names in `folder`.
pub fn list_files(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(folder)
        .expect("Failed to read output folder")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Opener handing out a prepared stream, for `FrameExtractor::run_with`.
pub fn open_with(
    stream: SyntheticStream,
) -> impl FnOnce(&Path) -> Result<SyntheticStream, FrameGrabError> {
    move |_| Ok(stream)
}
