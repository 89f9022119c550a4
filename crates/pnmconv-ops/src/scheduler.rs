//! The scheduling capability shared by every execution strategy.
//!
//! A scheduler takes one input image and one or more filters and returns one
//! output image per filter. How the work is spread over threads is its own
//! business; the pixels are not. Every implementation must produce exactly
//! what [`convolve_sequential`] produces.

use crate::filter::{convolve_sequential, FilterKind};
use crate::OpsResult;
use pnmconv_core::Image;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// One filter's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered {
    /// Filter that produced `image`.
    pub filter: FilterKind,
    /// Convolved image, same geometry as the input.
    pub image: Image,
}

/// Strategy for running convolutions.
///
/// Implementations only borrow the input; it must stay unmodified and
/// outlive the call.
pub trait ParallelScheduler: Send + Sync {
    /// Short identifier used in logs and output file names.
    fn name(&self) -> &'static str;

    /// Applies a single filter.
    fn run_one(&self, input: &Image, filter: FilterKind) -> OpsResult<Image>;

    /// Applies every filter in `filters` and returns the outputs in the same
    /// order. Duplicates are allowed and produce duplicate outputs.
    ///
    /// The default runs the filters one after another through
    /// [`run_one`](Self::run_one).
    fn run(&self, input: &Image, filters: &[FilterKind]) -> OpsResult<Vec<Filtered>> {
        filters
            .iter()
            .map(|&filter| {
                Ok(Filtered {
                    filter,
                    image: self.run_one(input, filter)?,
                })
            })
            .collect()
    }
}

/// Single-threaded reference scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl ParallelScheduler for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn run_one(&self, input: &Image, filter: FilterKind) -> OpsResult<Image> {
        debug!(%filter, ?input, "sequential sweep");
        convolve_sequential(input, &filter.kernel())
    }
}
