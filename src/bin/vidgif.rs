use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use vidgif::{
    BufferMode, ConversionOptions, ConversionRequest, ConversionStage, ConversionStatus,
    ConversionWorker, Converter, DEFAULT_FRAME_RATE, DecoderVerbosity, PREVIEW_HEIGHT,
    PREVIEW_WIDTH, ProgressCallback, ProgressInfo, ResizeFilter, TargetParameters,
    VideoFile,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidgif info clip.mov --json\n  vidgif estimate clip.mov --width 480\n  vidgif convert clip.mov --out clip.gif --width 480 --fps 10 --progress\n  vidgif preview clip.mov --out clip.png\n  vidgif completions zsh > _vidgif";

#[derive(Debug, Parser)]
#[command(
    name = "vidgif",
    version,
    about = "Convert video files into looping animated GIFs",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while converting.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print video metadata.
    #[command(
        about = "Print video metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  vidgif info clip.mov\n  vidgif info clip.mov --json"
    )]
    Info {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Estimate the GIF size for a frame rate and width.
    #[command(
        about = "Estimate output size",
        after_help = "Examples:\n  vidgif estimate clip.mov --width 480\n  vidgif estimate clip.mov --width 320 --fps 15 --json"
    )]
    Estimate {
        /// Input video path.
        input: PathBuf,
        /// Output width in pixels; height follows the aspect ratio.
        #[arg(long)]
        width: String,
        /// Output frames per second.
        #[arg(long, default_value_t = DEFAULT_FRAME_RATE.to_string())]
        fps: String,
        /// Output the estimate as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Save a still preview of the first frame.
    #[command(about = "Save a preview image")]
    Preview {
        /// Input video path.
        input: PathBuf,
        /// Output image path (format from extension).
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = PREVIEW_WIDTH)]
        width: u32,
        #[arg(long, default_value_t = PREVIEW_HEIGHT)]
        height: u32,
    },

    /// Convert a video into an animated GIF.
    #[command(
        about = "Convert video to GIF",
        after_help = "Examples:\n  vidgif convert clip.mov --out clip.gif --width 480\n  vidgif convert clip.mp4 --out small.gif --width 240 --fps 8 --filter lanczos3 --streaming"
    )]
    Convert {
        /// Input video path.
        input: PathBuf,
        /// Output GIF path.
        #[arg(long)]
        out: PathBuf,
        /// Output width in pixels; height follows the aspect ratio.
        #[arg(long)]
        width: String,
        /// Output frames per second.
        #[arg(long, default_value_t = DEFAULT_FRAME_RATE.to_string())]
        fps: String,
        /// Resize filter (nearest, triangle, catmull-rom, gaussian, lanczos3).
        #[arg(long, default_value = "catmull-rom")]
        filter: String,
        /// Palette quantizer speed, 1 (best) to 30 (fastest).
        #[arg(long, default_value_t = 10)]
        speed: i32,
        /// Encode frames as they are decoded instead of buffering them all.
        #[arg(long)]
        streaming: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let verbosity = match &global.log_level {
        Some(level) => level.parse::<DecoderVerbosity>()?,
        None if global.verbose => DecoderVerbosity::Warning,
        None => DecoderVerbosity::Error,
    };
    vidgif::set_decoder_verbosity(verbosity);

    Ok(())
}

/// Drives an `indicatif` bar from conversion progress.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let stage = match info.stage {
            ConversionStage::Decoding => "decoding",
            _ => "encoding",
        };
        self.bar.set_message(stage);
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
    }
}

fn print_status(status: &ConversionStatus) {
    match status {
        ConversionStatus::Idle => {}
        ConversionStatus::Processing => eprintln!("{}", status.to_string().truecolor(250, 128, 114)),
        ConversionStatus::Complete(_) => eprintln!("{}", status.to_string().green()),
        ConversionStatus::Failed(_) => eprintln!("{}", status.to_string().red()),
    }
}

async fn run_conversion(
    request: ConversionRequest,
    options: ConversionOptions,
    progress: Option<Arc<TerminalProgress>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let worker = ConversionWorker::new(Converter::new(options));
    let mut status = worker.subscribe();
    let task = worker.start(request)?;

    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            print_status(&current);
            if current.is_finished() {
                break;
            }
        }
    });

    let result = task.await;
    if let Some(progress) = &progress {
        progress.finish();
    }
    let _ = watcher.await;
    let report = result?;

    println!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "{} of {} frames at {}x{}, {} ms per frame -> {}",
            report.frames_written,
            report.frames_considered,
            report.width,
            report.height,
            report.frame_delay_ms,
            report.output.display()
        )
        .green()
    );
    if let Some(directory) = worker.last_output_directory() {
        println!("{} {}", "folder".cyan().bold(), directory.display());
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Info { input, json } => {
            let metadata = VideoFile::probe(&input)?;
            if json {
                let payload = json!({
                    "format": metadata.format,
                    "codec": metadata.codec,
                    "duration_seconds": metadata.duration_seconds(),
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!("Duration: {:.3}s", metadata.duration_seconds());
                println!(
                    "Video: {}x{} @ {:.2} fps, {} frames [{}]",
                    metadata.width,
                    metadata.height,
                    metadata.frames_per_second,
                    metadata.frame_count,
                    metadata.codec,
                );
            }
        }
        Commands::Estimate {
            input,
            width,
            fps,
            json,
        } => {
            let target = TargetParameters::parse(&fps, &width)?;
            let estimate = vidgif::estimate_for_file(&input, &target)?;
            if json {
                let metadata = VideoFile::probe(&input)?;
                let payload = json!({
                    "fps": target.frame_rate(),
                    "width": target.width(),
                    "height": metadata.derived_height(target.width()),
                    "estimated_megabytes": estimate.megabytes,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{estimate}");
            }
        }
        Commands::Preview {
            input,
            out,
            width,
            height,
        } => {
            ensure_writable_path(&out, cli.global.overwrite)?;
            let image = vidgif::preview(&input, width, height)?;
            image.save(&out)?;
            println!("{} {}", "saved".green().bold(), out.display());
        }
        Commands::Convert {
            input,
            out,
            width,
            fps,
            filter,
            speed,
            streaming,
        } => {
            let request = ConversionRequest::from_inputs(Some(&input), &out, &fps, &width)?;
            let filter: ResizeFilter = filter.parse()?;
            ensure_writable_path(&out, cli.global.overwrite)?;

            let mut options = ConversionOptions::new()
                .with_resize_filter(filter)
                .with_quantizer_speed(speed);
            if streaming {
                options = options.with_buffer_mode(BufferMode::Streaming);
            }
            let progress = if cli.global.progress {
                let progress = Arc::new(TerminalProgress::new()?);
                options = options
                    .with_progress(progress.clone())
                    .with_batch_size(5);
                Some(progress)
            } else {
                None
            };

            run_conversion(request, options, progress).await?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidgif", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
