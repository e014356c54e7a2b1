//! Output folder derivation and saved-frame file naming.
//!
//! Saved frames are named `frame_<index>.<ext>` where `<index>` is the
//! zero-based saved index padded to [`FRAME_INDEX_WIDTH`] digits, so a plain
//! lexicographic sort of the folder lists frames in save order.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::configuration::{
    FRAME_FILE_PREFIX, FRAME_INDEX_WIDTH, OUTPUT_FOLDER_SUFFIX, OutputFormat,
};
use crate::error::FrameGrabError;

/// Derive the default output folder for `video_path`.
///
/// The folder sits next to the video and is named after its file stem with
/// [`OUTPUT_FOLDER_SUFFIX`] appended: `clips/intro.mp4` becomes
/// `clips/intro_frames`.
///
/// # Errors
///
/// Returns [`FrameGrabError::InvalidArgument`] if `video_path` has no file
/// name component (for example `/` or `..`).
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// let folder = framegrab::default_output_folder(Path::new("clips/intro.mp4"))?;
/// assert_eq!(folder, Path::new("clips/intro_frames"));
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
pub fn default_output_folder(video_path: &Path) -> Result<PathBuf, FrameGrabError> {
    let stem = video_path.file_stem().ok_or_else(|| {
        FrameGrabError::InvalidArgument(format!(
            "cannot derive an output folder from {}",
            video_path.display()
        ))
    })?;

    let mut folder_name = OsString::from(stem);
    folder_name.push(OUTPUT_FOLDER_SUFFIX);

    let parent = video_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(folder_name))
}

/// File name for the frame stored at `saved_index`.
///
/// ```
/// use framegrab::{OutputFormat, frame_file_name};
///
/// assert_eq!(frame_file_name(42, OutputFormat::Jpeg), "frame_000042.jpg");
/// ```
#[must_use]
pub fn frame_file_name(saved_index: u64, format: OutputFormat) -> String {
    format!(
        "{FRAME_FILE_PREFIX}{saved_index:0width$}.{ext}",
        width = FRAME_INDEX_WIDTH,
        ext = format.extension(),
    )
}

/// Full path of the frame stored at `saved_index` inside `output_folder`.
#[must_use]
pub fn frame_path(output_folder: &Path, saved_index: u64, format: OutputFormat) -> PathBuf {
    output_folder.join(frame_file_name(saved_index, format))
}
