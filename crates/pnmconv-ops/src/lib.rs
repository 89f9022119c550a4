//! # pnmconv-ops
//!
//! 3x3 convolution over [`pnmconv_core::Image`] and the schedulers that
//! drive it.
//!
//! # Modules
//!
//! - [`filter`] - Kernels, the per-pixel convolver and the sequential sweep
//! - [`scheduler`] - The [`ParallelScheduler`] capability and the sequential reference
//! - [`parallel`] - Row-partitioned and kernel-task strategies (rayon)
//!
//! # Example
//!
//! ```rust
//! use pnmconv_core::{Image, ImageFormat};
//! use pnmconv_ops::{FilterKind, ParallelScheduler, RowPartitioned};
//!
//! let img = Image::from_samples(ImageFormat::Grayscale, 3, 3, 255, vec![100; 9]).unwrap();
//! let rows = RowPartitioned::new(2).unwrap();
//! let blurred = rows.run_one(&img, FilterKind::Blur).unwrap();
//! assert_eq!(blurred.samples(), img.samples());
//! ```
//!
//! Every scheduler produces output bit-identical to
//! [`filter::convolve_sequential`]; parallelism only changes wall time.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod filter;
pub mod parallel;
pub mod scheduler;

pub use error::{OpsError, OpsResult};
pub use filter::{apply, convolve_sequential, FilterKind, Kernel3};
pub use parallel::{partition_rows, KernelTasks, RowPartitioned};
pub use scheduler::{Filtered, ParallelScheduler, Sequential};
