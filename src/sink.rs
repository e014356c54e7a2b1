//! Frame encoding and writing.
//!
//! [`FrameSink`] is the seam through which the extraction loop persists a
//! sampled frame. [`ImageFileSink`] encodes with the `image` crate and writes
//! straight to the target path.

use std::path::Path;

use image::DynamicImage;

use crate::{configuration::OutputFormat, error::FrameGrabError};

/// Destination for sampled frames.
pub trait FrameSink {
    /// Encode `image` and write it to `path`, overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`FrameGrabError::FrameWrite`] if the frame cannot be encoded
    /// or the file cannot be written.
    fn write_frame(&mut self, image: &DynamicImage, path: &Path) -> Result<(), FrameGrabError>;
}

/// Writes frames as image files in a fixed [`OutputFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileSink {
    format: OutputFormat,
}

impl ImageFileSink {
    /// Create a sink encoding frames as `format`.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// The format frames are encoded as.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }
}

impl FrameSink for ImageFileSink {
    fn write_frame(&mut self, image: &DynamicImage, path: &Path) -> Result<(), FrameGrabError> {
        // JPEG has no alpha channel.
        let result = match (self.format, image) {
            (OutputFormat::Jpeg, DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_)) => {
                image.save_with_format(path, self.format.to_image_format())
            }
            (OutputFormat::Jpeg, _) => DynamicImage::ImageRgb8(image.to_rgb8())
                .save_with_format(path, self.format.to_image_format()),
            (OutputFormat::Png, _) => image.save_with_format(path, self.format.to_image_format()),
        };

        result.map_err(|error| FrameGrabError::FrameWrite {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
    }
}
