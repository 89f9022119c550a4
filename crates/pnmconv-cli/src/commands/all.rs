//! All command
//!
//! Runs blur, laplace and sharpen concurrently, one single-threaded task per
//! kernel, and writes three images.

use crate::AllArgs;
#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::Result;
use pnmconv_ops::{FilterKind, KernelTasks, ParallelScheduler};

pub fn run(args: AllArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), "all::run");

    let image = super::load_image(&args.input)?;
    let tasks = KernelTasks;

    info!(tasks = FilterKind::ALL.len(), w = image.width(), h = image.height(), "Applying all filters");

    if verbose {
        println!(
            "Applying blur, laplace and sharpen to {} ({}x{} {})",
            args.input.display(),
            image.width(),
            image.height(),
            image.format()
        );
    }

    let outputs = super::run_timed(&tasks, &image, &FilterKind::ALL)?;

    let mut namer = super::OutputNamer::new(&args.output, &args.input, image.format())?;
    if verbose {
        println!("Writing to {}", namer.dir().display());
    }
    super::save_outputs(&mut namer, &outputs, tasks.name())?;

    Ok(())
}
