//! # pnmconv-io
//!
//! Reading and writing of the ASCII pixel-map formats:
//!
//! - **P2** - grayscale (`.pgm`)
//! - **P3** - RGB (`.ppm`)
//!
//! # Architecture
//!
//! - [`ImageReader`] / [`ImageWriter`] - Codec traits
//! - [`pnm::PnmCodec`] - The ASCII implementation
//! - [`read`] / [`write`] - Path-based convenience functions
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pnmconv_io::{read, write};
//!
//! let image = read("input.ppm")?;
//! write("copy.ppm", &image)?;
//! ```
//!
//! # Format Notes
//!
//! The header is the tag, `width height`, then the max value, all
//! whitespace-delimited. Comments are not recognised. Samples are clamped to
//! the max value on load. Output wraps at 12 samples per line.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod traits;
pub mod pnm;

pub use error::{IoError, IoResult};
pub use pnm::PnmCodec;
pub use traits::{ImageReader, ImageWriter};

use pnmconv_core::Image;
use std::path::Path;

/// Reads a P2/P3 image from a file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened ([`IoError::Io`])
/// - The tag is not `P2`/`P3` or the header is malformed
/// - Fewer samples are present than the header requires
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    PnmCodec.read(path)
}

/// Writes an image as P2 or P3, chosen by the image's format.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be created or written.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    PnmCodec.write(path, image)
}
