use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use vidpipe_core::inpainting::infrastructure::cpu_inpainter::CpuInpainter;
use vidpipe_core::pipeline::batch_discovery::{default_output_dir, discover_videos};
use vidpipe_core::pipeline::batch_pipeline::BatchPipeline;
use vidpipe_core::pipeline::batch_report::VideoOutcome;
use vidpipe_core::pipeline::config::{OutputSize, PipelineConfig, RegionSource, TrimConfig};
use vidpipe_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use vidpipe_core::selection::infrastructure::terminal_selector::TerminalRegionSelector;
use vidpipe_core::video::domain::video_reader::VideoReader;
use vidpipe_core::video::domain::video_writer::VideoWriter;
use vidpipe_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use vidpipe_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use vidpipe_core::video::infrastructure::image_file_writer::ImageFileWriter;
use vidpipe_core::video::media_codec::MediaCodec;

/// Trim, crop, remove watermarks from and loop a batch of videos.
#[derive(Parser, Debug)]
#[command(name = "vidpipe")]
struct Cli {
    /// Input video file or directory of videos.
    #[arg(short, long, default_value = "video")]
    input: PathBuf,

    /// Output directory (default: input path + "_processed").
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds to cut from the start of each video.
    #[arg(short = 's', long)]
    skip_start: Option<f64>,

    /// Seconds to cut from the end of each video.
    #[arg(short = 'e', long)]
    skip_end: Option<f64>,

    /// Longest duration to keep after skipping, in seconds.
    #[arg(short = 'm', long)]
    max_duration: Option<f64>,

    /// Crop regions: "auto" to select interactively, or "x,y,w,h[;x,y,w,h]".
    #[arg(short = 'c', long)]
    crop: Option<RegionSource>,

    /// Watermark regions: "auto" to select interactively, or "x,y,w,h[;x,y,w,h]".
    #[arg(short = 'w', long)]
    watermark: Option<RegionSource>,

    /// Loop each video up to this many seconds.
    #[arg(short = 'l', long)]
    loop_duration: Option<f64>,

    /// Scale the finished video to WIDTHxHEIGHT, e.g. 640x480.
    #[arg(long)]
    resize: Option<OutputSize>,

    /// Playback speed factor for the finished video, e.g. 1.25.
    #[arg(long)]
    speed: Option<f64>,

    /// Only keep this many frames for cropping and watermark removal.
    #[arg(short = 'f', long)]
    frames: Option<usize>,

    /// Frames sampled when building the watermark mask.
    #[arg(long)]
    sample_frames: Option<usize>,

    /// Votes a pixel needs to be treated as watermark.
    #[arg(long)]
    min_votes: Option<usize>,

    /// Inpainting neighbourhood radius in pixels.
    #[arg(long)]
    inpaint_radius: Option<u32>,

    /// Select regions again for every video instead of once per batch.
    #[arg(long)]
    reselect: bool,

    /// Video encoder name.
    #[arg(long)]
    codec: Option<String>,

    /// JSON config file; command-line options take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns whether every video was written or deliberately excluded.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    config.validate()?;

    let inputs = discover_videos(&cli.input)?;
    if inputs.is_empty() {
        log::warn!("No videos found in {}", cli.input.display());
        return Ok(true);
    }
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(&cli.input));
    log::info!(
        "Processing {} video(s) into {}",
        inputs.len(),
        output_dir.display()
    );

    let codec = MediaCodec::new(
        Box::new(|| Box::new(FfmpegReader::new()) as Box<dyn VideoReader>),
        Box::new(|name: &str| Box::new(FfmpegWriter::new().with_codec(name)) as Box<dyn VideoWriter>),
    );
    let selector = TerminalRegionSelector::new(
        BufReader::new(io::stdin()),
        io::stderr(),
        Box::new(ImageFileWriter::new()),
        &output_dir.join(".previews"),
    );

    let mut pipeline = BatchPipeline::new(
        config,
        codec,
        Box::new(selector),
        Box::new(CpuInpainter::new()),
        Box::new(StdoutPipelineLogger::new()),
    )?;
    let report = pipeline.run(&inputs, &output_dir)?;

    for video in report.videos() {
        if let VideoOutcome::Failed(e) = &video.outcome {
            eprintln!("Failed: {}: {e}", video.source.display());
        }
    }
    eprintln!("{}", report.summary_line());
    Ok(!report.has_failures())
}

/// Loads the JSON config (if any) and layers command-line options on top.
fn build_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    if cli.skip_start.is_some() || cli.skip_end.is_some() || cli.max_duration.is_some() {
        let mut trim = config.stages.trim.clone().unwrap_or_default();
        if let Some(s) = cli.skip_start {
            trim.skip_start = s;
        }
        if let Some(e) = cli.skip_end {
            trim.skip_end = e;
        }
        if cli.max_duration.is_some() {
            trim.max_duration = cli.max_duration;
        }
        config.stages.trim = trim_if_active(trim);
    }

    if let Some(crop) = &cli.crop {
        config.stages.crop = Some(crop.clone());
    }
    if let Some(watermark) = &cli.watermark {
        config.stages.watermark = Some(watermark.clone());
    }
    if cli.loop_duration.is_some() {
        config.stages.loop_duration = cli.loop_duration;
    }
    if cli.resize.is_some() {
        config.finish.resize = cli.resize;
    }
    if cli.speed.is_some() {
        config.finish.speed = cli.speed;
    }
    if cli.frames.is_some() {
        config.max_frames = cli.frames;
    }
    if let Some(n) = cli.sample_frames {
        config.sample_frames = n;
    }
    if let Some(n) = cli.min_votes {
        config.min_vote_count = n;
    }
    if let Some(r) = cli.inpaint_radius {
        config.inpaint_radius = r;
    }
    if cli.reselect {
        config.reselect_per_video = true;
    }
    if let Some(codec) = &cli.codec {
        config.codec = codec.clone();
    }
    Ok(config)
}

/// Zero skips without a duration cap leave the clip untouched.
fn trim_if_active(trim: TrimConfig) -> Option<TrimConfig> {
    if trim.skip_start > 0.0 || trim.skip_end > 0.0 || trim.max_duration.is_some() {
        Some(trim)
    } else {
        None
    }
}
