//! pnmconv - 3x3 convolution filters for ASCII PGM/PPM images
//!
//! Runs blur, Laplace and sharpen kernels with either row-partitioned or
//! per-kernel parallelism and writes the results as new image files.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;

/// Default directory for filtered images.
const DEFAULT_OUTPUT_DIR: &str = "imgs_out";

#[derive(Parser)]
#[command(name = "pnmconv")]
#[command(author, version, about = "3x3 convolution filters for ASCII PGM/PPM images")]
#[command(long_about = "
Applies a fixed 3x3 kernel (blur, laplace or sharpen) to a P2 (grayscale)
or P3 (color) image and writes the result as a new file.

Examples:
  pnmconv info photo.ppm                    # Show image info
  pnmconv filter photo.ppm -f blur          # Row-partitioned, 4 workers
  pnmconv filter photo.pgm -f laplace -j 8 -o out
  pnmconv all photo.ppm                     # All three kernels, one task each
  pnmconv sequential photo.ppm -f sharpen   # Single-threaded reference
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one filter, splitting rows across a worker pool
    #[command(visible_alias = "f")]
    Filter(FilterArgs),

    /// Apply blur, laplace and sharpen concurrently, one task per kernel
    #[command(visible_alias = "a")]
    All(AllArgs),

    /// Apply one filter on the calling thread (reference output)
    #[command(visible_alias = "seq")]
    Sequential(SequentialArgs),

    /// Display image information
    #[command(visible_alias = "i")]
    Info(InfoArgs),
}

#[derive(Args)]
struct FilterArgs {
    /// Input image (.pgm or .ppm)
    input: PathBuf,

    /// Filter: blur, laplace, sharpen
    #[arg(short, long)]
    filter: String,

    /// Number of row workers
    #[arg(short = 'j', long, default_value_t = pnmconv_ops::RowPartitioned::DEFAULT_WORKERS)]
    workers: usize,

    /// Output directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,
}

#[derive(Args)]
struct AllArgs {
    /// Input image (.pgm or .ppm)
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,
}

#[derive(Args)]
struct SequentialArgs {
    /// Input image (.pgm or .ppm)
    input: PathBuf,

    /// Filter: blur, laplace, sharpen
    #[arg(short, long)]
    filter: String,

    /// Output directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
/// The returned guard must live until exit so buffered file output is flushed.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Filter(args) => commands::filter::run(args, cli.verbose),
        Commands::All(args) => commands::all::run(args, cli.verbose),
        Commands::Sequential(args) => commands::sequential::run(args, cli.verbose),
        Commands::Info(args) => commands::info::run(args, cli.verbose),
    }
}
