use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use framegrab::{
    ExtractionRequest, ExtractionResult, FfmpegLogLevel, FrameExtractor, FrameGrabError,
    LogProgress, OutputFormat, ProgressCallback, ProgressInfo, WriteFailurePolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framegrab input.mp4\n  framegrab input.mp4 --interval 30 --out frames --format png\n  framegrab input.mp4 --interval 5 --progress --json\n  framegrab --completions zsh > _framegrab";

#[derive(Debug, Parser)]
#[command(
    name = "framegrab",
    version,
    about = "Extract every Nth frame of a video into numbered image files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to the video file.
    #[arg(required_unless_present = "completions")]
    video: Option<PathBuf>,

    /// Extract every Nth frame.
    #[arg(long, short = 'n', default_value_t = 1, allow_negative_numbers = true)]
    interval: i64,

    /// Output folder (default: `<video name>_frames` next to the video).
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Image format for saved frames (jpg, png).
    #[arg(long, default_value = "jpg")]
    format: String,

    /// What to do when a frame cannot be written (skip, abort).
    #[arg(long, default_value = "skip")]
    on_write_error: String,

    /// Show a progress bar instead of periodic log lines.
    #[arg(long)]
    progress: bool,

    /// Print the final summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Show debug logging.
    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors.
    #[arg(long, short)]
    quiet: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    ffmpeg_log_level: Option<String>,

    /// Print a shell completion script and exit.
    #[arg(long, value_enum, exclusive = true)]
    completions: Option<Shell>,
}

fn parse_output_format(value: &str) -> Option<OutputFormat> {
    match value.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
        "png" => Some(OutputFormat::Png),
        _ => None,
    }
}

fn parse_write_failure_policy(value: &str) -> Option<WriteFailurePolicy> {
    match value.to_ascii_lowercase().as_str() {
        "skip" | "continue" => Some(WriteFailurePolicy::Skip),
        "abort" | "stop" => Some(WriteFailurePolicy::Abort),
        _ => None,
    }
}

fn parse_interval(value: i64) -> Result<u64, FrameGrabError> {
    u64::try_from(value)
        .ok()
        .filter(|&interval| interval > 0)
        .ok_or_else(|| {
            FrameGrabError::InvalidArgument(format!(
                "--interval must be a positive integer, got {value}"
            ))
        })
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::no_length();
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.expected_frames {
            self.bar.set_length(total.max(info.frames_saved));
        }
        self.bar.set_position(info.frames_saved);
        if info.finished {
            self.bar.finish_with_message("done");
        }
    }
}

fn build_request(
    cli: &Cli,
    video: PathBuf,
) -> Result<ExtractionRequest, Box<dyn std::error::Error>> {
    let interval = parse_interval(cli.interval)?;
    let format = parse_output_format(&cli.format)
        .ok_or_else(|| format!("unsupported --format: {}", cli.format))?;
    let policy = parse_write_failure_policy(&cli.on_write_error)
        .ok_or_else(|| format!("unsupported --on-write-error: {}", cli.on_write_error))?;

    let mut request = ExtractionRequest::new(video)
        .with_frame_interval(interval)
        .with_output_format(format)
        .with_write_failure_policy(policy);

    if let Some(out) = &cli.out {
        request = request.with_output_folder(out);
    }

    request = if cli.progress {
        request
            .with_progress(Arc::new(TerminalProgress::new()?))
            .with_progress_interval(1)
    } else {
        request.with_progress(Arc::new(LogProgress))
    };

    Ok(request)
}

fn print_summary(
    cli: &Cli,
    result: &ExtractionResult,
) -> Result<(), Box<dyn std::error::Error>> {
    if cli.json {
        let payload = json!({
            "video": cli.video.as_ref().map(|video| video.display().to_string()),
            "output_folder": result.output_folder().display().to_string(),
            "total_frames_read": result.total_frames_read(),
            "frames_saved": result.frames_saved(),
            "failed_writes": result.failed_writes(),
            "truncated": result.truncated(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if result.truncated() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "video ended early; partial extraction".yellow()
        );
    }
    if result.failed_writes() > 0 {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("{} frame(s) could not be written", result.failed_writes()).yellow()
        );
    }
    println!("Total frames processed: {}", result.total_frames_read());
    println!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "Saved {} frame(s) to {}",
            result.frames_saved(),
            result.output_folder().display()
        )
        .green()
    );
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "framegrab", &mut std::io::stdout());
        return Ok(());
    }

    init_logging(&cli);

    if let Some(level) = &cli.ffmpeg_log_level {
        framegrab::set_ffmpeg_log_level(level.parse::<FfmpegLogLevel>()?);
    }

    let video = cli.video.clone().ok_or("missing video path")?;
    let request = build_request(&cli, video)?;
    let result = FrameExtractor::new(request).run()?;
    print_summary(&cli, &result)
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
