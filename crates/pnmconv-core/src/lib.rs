//! # pnmconv-core
//!
//! Core raster types shared by the pnmconv crates.
//!
//! - [`Image`] - Owned integer raster (grayscale or RGB) with a declared white point
//! - [`ImageFormat`] - Grayscale / RGB discriminator, tag and extension lookup
//! - [`Pixel`] - One output sample (scalar or RGB triple)
//! - [`BandMut`] - Disjoint mutable run of rows, used by parallel writers
//!
//! ## Crate Structure
//!
//! ```text
//! pnmconv-core (this crate)
//!    ^
//!    |
//!    +-- pnmconv-io  (PGM/PPM ASCII codec)
//!    +-- pnmconv-ops (3x3 convolution and schedulers)
//!    +-- pnmconv-cli
//! ```
//!
//! ## Invariants
//!
//! Every sample of an [`Image`] lies in `[0, max_value]`. Constructors clamp
//! incoming data and [`BandMut::put`] clamps every write, so no code path can
//! store an out-of-range value.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod image;
pub mod pixel;

pub use error::{Error, Result};
pub use format::ImageFormat;
pub use image::{BandMut, Image, MAX_SAMPLE_VALUE};
pub use pixel::Pixel;
