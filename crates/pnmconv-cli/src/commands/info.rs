//! Image info command.
//!
//! Displays format, dimensions, white point and sample range.

use crate::InfoArgs;
use anyhow::{Context, Result};
use pnmconv_core::Image;
use std::fs;
use std::path::Path;

/// Runs the info command for every input path.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    for path in &args.input {
        let file_size = fs::metadata(path)
            .with_context(|| format!("Failed to stat: {}", path.display()))?
            .len();
        let image = super::load_image(path)?;

        print_text(path, &image, file_size, verbose);

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}

fn print_text(path: &Path, image: &Image, file_size: u64, verbose: bool) {
    println!("{}", path.display());
    println!("  Format:     {}", image.format());
    println!("  Resolution: {}x{}", image.width(), image.height());
    println!("  Channels:   {}", image.channels());
    println!("  Max value:  {}", image.max_value());
    println!("  File size:  {}", super::format_size(file_size));

    let (lo, hi) = image.sample_range();
    println!("  Range:      {lo}..={hi}");

    if verbose {
        println!("  Samples:    {}", image.len());
        println!("  Pixels:     {}", image.width() as u64 * image.height() as u64);
    }
}
