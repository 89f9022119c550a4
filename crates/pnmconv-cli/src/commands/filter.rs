//! Filter command
//!
//! Applies one kernel with rows split across a fixed worker pool.

use crate::FilterArgs;
#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::{Context, Result};
use pnmconv_ops::{ParallelScheduler, RowPartitioned};

pub fn run(args: FilterArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), filter = %args.filter, workers = args.workers, "filter::run");

    let filter = super::parse_filter(&args.filter)?;
    let rows = RowPartitioned::new(args.workers)
        .with_context(|| format!("Cannot start {} row workers", args.workers))?;
    let image = super::load_image(&args.input)?;

    info!(%filter, workers = rows.workers(), w = image.width(), h = image.height(), "Applying filter");

    if verbose {
        println!(
            "Applying {} to {} ({}x{} {}) with {} workers",
            filter,
            args.input.display(),
            image.width(),
            image.height(),
            image.format(),
            rows.workers()
        );
    }

    let outputs = super::run_timed(&rows, &image, &[filter])?;

    let mut namer = super::OutputNamer::new(&args.output, &args.input, image.format())?;
    if verbose {
        println!("Writing to {}", namer.dir().display());
    }
    super::save_outputs(&mut namer, &outputs, rows.name())?;

    Ok(())
}
