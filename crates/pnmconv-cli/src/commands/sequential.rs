//! Sequential command
//!
//! Single-threaded reference sweep, useful for timing comparisons.

use crate::SequentialArgs;
#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::Result;
use pnmconv_ops::{ParallelScheduler, Sequential};

pub fn run(args: SequentialArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), filter = %args.filter, "sequential::run");

    let filter = super::parse_filter(&args.filter)?;
    let image = super::load_image(&args.input)?;

    if verbose {
        println!("Applying {} to {} on one thread", filter, args.input.display());
    }

    let outputs = super::run_timed(&Sequential, &image, &[filter])?;

    let mut namer = super::OutputNamer::new(&args.output, &args.input, image.format())?;
    if verbose {
        println!("Writing to {}", namer.dir().display());
    }
    super::save_outputs(&mut namer, &outputs, Sequential.name())?;

    Ok(())
}
