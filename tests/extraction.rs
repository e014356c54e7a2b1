//! End-to-end extraction tests against synthetic streams.
//!
//! These tests drive `FrameExtractor::run_with` with in-memory streams, so
//! they do not need FFmpeg fixtures.

mod common;

use std::sync::atomic::Ordering;

use common::{RecordingSink, SyntheticStream, list_files, open_with};
use framegrab::{
    ExtractionRequest, ExtractionResult, FrameExtractor, FrameGrabError, ImageFileSink,
    OutputFormat, default_output_folder,
};

fn run_recorded(frame_count: u64, interval: u64) -> (ExtractionResult, RecordingSink) {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("synthetic.mp4")
        .with_output_folder(directory.path())
        .with_frame_interval(interval);

    let mut sink = RecordingSink::default();
    let result = FrameExtractor::new(request)
        .run_with(open_with(SyntheticStream::new(frame_count)), &mut sink)
        .expect("Extraction failed");
    (result, sink)
}

// ── sampling ───────────────────────────────────────────────────────

#[test]
fn ten_frames_every_third() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("synthetic.mp4")
        .with_output_folder(directory.path())
        .with_frame_interval(3)
        .with_output_format(OutputFormat::Png);

    let mut sink = ImageFileSink::new(OutputFormat::Png);
    let result = FrameExtractor::new(request)
        .run_with(open_with(SyntheticStream::new(10)), &mut sink)
        .expect("Extraction failed");

    assert_eq!(result.total_frames_read(), 10);
    assert_eq!(result.frames_saved(), 4);
    assert_eq!(result.failed_writes(), 0);
    assert!(!result.truncated());
    assert_eq!(result.output_folder(), directory.path());

    assert_eq!(
        list_files(directory.path()),
        [
            "frame_000000.png",
            "frame_000001.png",
            "frame_000002.png",
            "frame_000003.png",
        ]
    );

    // Saved files hold source positions 0, 3, 6, 9.
    for (saved_index, source_position) in [0_u8, 3, 6, 9].into_iter().enumerate() {
        let path = directory
            .path()
            .join(format!("frame_{saved_index:06}.png"));
        let image = image::open(&path).expect("Failed to read saved frame");
        assert_eq!(image.to_rgb8().get_pixel(0, 0)[0], source_position);
    }
}

#[test]
fn saved_count_is_ceiling_of_frames_over_interval() {
    for (frame_count, interval) in [(1, 1), (7, 2), (9, 3), (10, 4), (100, 7), (5, 10)] {
        let (result, sink) = run_recorded(frame_count, interval);
        let expected = frame_count.div_ceil(interval);

        assert_eq!(result.total_frames_read(), frame_count);
        assert_eq!(
            result.frames_saved(),
            expected,
            "frame_count={frame_count} interval={interval}",
        );
        assert_eq!(sink.written.len() as u64, expected);
    }
}

#[test]
fn interval_one_saves_every_frame() {
    let (result, sink) = run_recorded(12, 1);

    assert_eq!(result.total_frames_read(), 12);
    assert_eq!(result.frames_saved(), 12);
    assert_eq!(sink.source_reds, (0..12).collect::<Vec<u8>>());
}

#[test]
fn saved_names_are_contiguous_for_any_interval() {
    let (_, sink) = run_recorded(50, 7);

    let expected: Vec<String> = (0..8).map(|index| format!("frame_{index:06}.jpg")).collect();
    assert_eq!(sink.file_names(), expected);
    assert_eq!(sink.source_reds, [0, 7, 14, 21, 28, 35, 42, 49]);
}

#[test]
fn interval_larger_than_stream_saves_first_frame_only() {
    let (result, sink) = run_recorded(5, 100);

    assert_eq!(result.frames_saved(), 1);
    assert_eq!(sink.source_reds, [0]);
}

// ── empty and truncated streams ────────────────────────────────────

#[test]
fn empty_stream_succeeds_without_files() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("frames");
    let request = ExtractionRequest::new("empty.mp4").with_output_folder(&output);

    let result = FrameExtractor::new(request)
        .run_with(open_with(SyntheticStream::new(0)), &mut ImageFileSink::default())
        .expect("Empty stream should not be an error");

    assert_eq!(result.total_frames_read(), 0);
    assert_eq!(result.frames_saved(), 0);
    assert!(output.is_dir());
    assert!(list_files(&output).is_empty());
}

#[test]
fn read_error_mid_stream_keeps_partial_extraction() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("truncated.mp4")
        .with_output_folder(directory.path())
        .with_frame_interval(2);

    let stream = SyntheticStream::new(20).failing_at(7);
    let mut sink = RecordingSink::default();
    let result = FrameExtractor::new(request)
        .run_with(open_with(stream), &mut sink)
        .expect("A read error after the first frame should end the stream gracefully");

    assert_eq!(result.total_frames_read(), 7);
    assert_eq!(result.frames_saved(), 4);
    assert!(result.truncated());
    assert_eq!(sink.source_reds, [0, 2, 4, 6]);
}

#[test]
fn read_error_on_first_frame_is_reported() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("broken.mp4").with_output_folder(directory.path());

    let stream = SyntheticStream::new(20).failing_at(0);
    let released = stream.release_flag();
    let result =
        FrameExtractor::new(request).run_with(open_with(stream), &mut RecordingSink::default());

    assert!(matches!(result, Err(FrameGrabError::VideoDecode(_))));
    assert!(released.load(Ordering::SeqCst), "Stream should be released");
}

#[test]
fn stream_without_counts_still_extracts() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("live.ts")
        .with_output_folder(directory.path())
        .with_frame_interval(4);

    let stream = SyntheticStream::new(9).without_counts();
    let result = FrameExtractor::new(request)
        .run_with(open_with(stream), &mut RecordingSink::default())
        .expect("Extraction failed");

    assert_eq!(result.total_frames_read(), 9);
    assert_eq!(result.frames_saved(), 3);
}

// ── output folder ──────────────────────────────────────────────────

#[test]
fn default_folder_is_derived_from_video_name() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let video = directory.path().join("holiday.clip.mp4");
    let request = ExtractionRequest::new(&video).with_frame_interval(5);

    let result = FrameExtractor::new(request)
        .run_with(open_with(SyntheticStream::new(10)), &mut ImageFileSink::default())
        .expect("Extraction failed");

    let expected = directory.path().join("holiday.clip_frames");
    assert_eq!(result.output_folder(), expected);
    assert_eq!(default_output_folder(&video).unwrap(), expected);
    assert_eq!(list_files(&expected), ["frame_000000.jpg", "frame_000001.jpg"]);
}

#[test]
fn missing_ancestors_are_created() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("a").join("b").join("c");
    let request = ExtractionRequest::new("synthetic.mp4").with_output_folder(&output);

    FrameExtractor::new(request)
        .run_with(open_with(SyntheticStream::new(2)), &mut ImageFileSink::default())
        .expect("Extraction failed");

    assert_eq!(list_files(&output), ["frame_000000.jpg", "frame_000001.jpg"]);
}

#[test]
fn rerun_into_existing_folder_overwrites() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("synthetic.mp4")
        .with_output_folder(directory.path())
        .with_frame_interval(2);
    let extractor = FrameExtractor::new(request);

    let first = extractor
        .run_with(open_with(SyntheticStream::new(6)), &mut ImageFileSink::default())
        .expect("First run failed");
    let second = extractor
        .run_with(open_with(SyntheticStream::new(6)), &mut ImageFileSink::default())
        .expect("Second run into the same folder failed");

    assert_eq!(first, second);
    assert_eq!(list_files(directory.path()).len(), 3);
}

#[test]
fn stream_is_released_after_success() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let request = ExtractionRequest::new("synthetic.mp4").with_output_folder(directory.path());

    let stream = SyntheticStream::new(3);
    let released = stream.release_flag();
    FrameExtractor::new(request)
        .run_with(open_with(stream), &mut RecordingSink::default())
        .expect("Extraction failed");

    assert!(released.load(Ordering::SeqCst));
}
