//! Benchmarks for decoding and frame extraction.
//!
//! Run with: cargo bench
//!
//! The FFmpeg benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh`.

use std::{path::Path, time::Duration};

use criterion::{BenchmarkId, Criterion};
use framegrab::{
    ExtractionRequest, FfmpegLogLevel, FrameExtractor, FrameGrabError, FrameSink, Frames,
    OutputFormat, StreamMetadata, VideoFile, VideoStream,
};
use image::{DynamicImage, RgbImage};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// In-memory stream of identical 1280x720 frames.
struct BlankStream {
    metadata: StreamMetadata,
    frame: DynamicImage,
    remaining: u64,
}

impl BlankStream {
    fn new(frame_count: u64) -> Self {
        Self {
            metadata: StreamMetadata {
                width: 1280,
                height: 720,
                frames_per_second: Some(30.0),
                frame_count: Some(frame_count),
                codec: "blank".to_string(),
            },
            frame: DynamicImage::ImageRgb8(RgbImage::new(1280, 720)),
            remaining: frame_count,
        }
    }
}

impl VideoStream for BlankStream {
    fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, FrameGrabError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(self.frame.clone()))
    }
}

struct DiscardSink;

impl FrameSink for DiscardSink {
    fn write_frame(&mut self, _image: &DynamicImage, _path: &Path) -> Result<(), FrameGrabError> {
        Ok(())
    }
}

fn benchmark_sampling_loop(criterion: &mut Criterion) {
    let directory = tempfile::tempdir().unwrap();
    let mut group = criterion.benchmark_group("sampling loop (300 in-memory frames)");

    for interval in [1_u64, 10, 30] {
        group.bench_with_input(
            BenchmarkId::from_parameter(interval),
            &interval,
            |bencher, &interval| {
                let request = ExtractionRequest::new("blank.mp4")
                    .with_output_folder(directory.path())
                    .with_frame_interval(interval);
                let extractor = FrameExtractor::new(request);
                bencher.iter(|| {
                    extractor
                        .run_with(|_: &Path| Ok(BlankStream::new(300)), &mut DiscardSink)
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_decoding(criterion: &mut Criterion) {
    framegrab::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("open video", |bencher| {
        bencher.iter(|| VideoFile::open(SAMPLE_VIDEO).unwrap());
    });

    criterion.bench_function("decode all frames", |bencher| {
        bencher.iter(|| {
            let mut video = VideoFile::open(SAMPLE_VIDEO).unwrap();
            Frames::new(&mut video).count()
        });
    });
}

fn benchmark_extraction(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let directory = tempfile::tempdir().unwrap();
    let mut group = criterion.benchmark_group("extract to disk");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for (name, format, interval) in [
        ("jpg every frame", OutputFormat::Jpeg, 1_u64),
        ("jpg every 10th", OutputFormat::Jpeg, 10),
        ("png every 10th", OutputFormat::Png, 10),
    ] {
        group.bench_function(name, |bencher| {
            let request = ExtractionRequest::new(SAMPLE_VIDEO)
                .with_output_folder(directory.path())
                .with_frame_interval(interval)
                .with_output_format(format);
            let extractor = FrameExtractor::new(request);
            bencher.iter(|| extractor.run().unwrap());
        });
    }

    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_sampling_loop,
    benchmark_decoding,
    benchmark_extraction,
);
criterion::criterion_main!(benches);
