//! Parallel schedulers built on Rayon thread pools.
//!
//! Two strategies, both bit-identical to
//! [`convolve_sequential`](crate::filter::convolve_sequential):
//!
//! - [`RowPartitioned`]: one filter at a time, rows split across a fixed pool
//! - [`KernelTasks`]: one task per filter, each a full single-threaded sweep
//!
//! Workers never share output memory. Each one owns a disjoint
//! [`BandMut`](pnmconv_core::BandMut) of the output, so no locking is needed.
//!
//! # Example
//!
//! ```rust
//! use pnmconv_core::{Image, ImageFormat};
//! use pnmconv_ops::{FilterKind, KernelTasks, ParallelScheduler};
//!
//! let img = Image::from_samples(ImageFormat::Grayscale, 2, 2, 255, vec![0, 40, 80, 120]).unwrap();
//! let out = KernelTasks.run(&img, &FilterKind::ALL).unwrap();
//! assert_eq!(out.len(), 3);
//! ```

use crate::filter::{sweep_band, FilterKind};
use crate::scheduler::{Filtered, ParallelScheduler};
use crate::{OpsError, OpsResult};
use pnmconv_core::Image;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
#[allow(unused_imports)]
use tracing::{debug, trace, warn};

/// Splits `[0, height)` into contiguous row ranges, one per worker.
///
/// Uses `n = min(workers, height)` chunks of `height / n` rows; the last
/// chunk absorbs the remainder. A worker count of zero is treated as one.
///
/// ```rust
/// use pnmconv_ops::partition_rows;
///
/// assert_eq!(partition_rows(10, 4), vec![0..2, 2..4, 4..6, 6..10]);
/// assert_eq!(partition_rows(2, 8), vec![0..1, 1..2]);
/// ```
pub fn partition_rows(height: usize, workers: usize) -> Vec<Range<usize>> {
    let n = workers.min(height).max(1);
    let chunk = height / n;
    (0..n)
        .map(|i| {
            let start = i * chunk;
            let end = if i + 1 == n { height } else { start + chunk };
            start..end
        })
        .collect()
}

/// Row-partitioned data parallelism over a fixed worker pool.
///
/// The pool is created once in [`new`](Self::new) and reused for every
/// filter. Each filter allocates its output up front, then every worker
/// sweeps its own band of rows.
#[derive(Debug)]
pub struct RowPartitioned {
    workers: usize,
    pool: ThreadPool,
}

impl RowPartitioned {
    /// Worker count used when none is given.
    pub const DEFAULT_WORKERS: usize = 4;

    /// Builds a pool of exactly `workers` threads.
    ///
    /// # Errors
    ///
    /// - [`OpsError::InvalidWorkerCount`] if `workers` is zero
    /// - [`OpsError::ThreadPool`] if the threads cannot be spawned
    pub fn new(workers: usize) -> OpsResult<Self> {
        if workers == 0 {
            return Err(OpsError::InvalidWorkerCount(workers));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pnmconv row worker #{i}"))
            .build()?;
        debug!(workers, "row pool ready");
        Ok(Self { workers, pool })
    }

    /// Configured worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl ParallelScheduler for RowPartitioned {
    fn name(&self) -> &'static str {
        "rows"
    }

    fn run_one(&self, input: &Image, filter: FilterKind) -> OpsResult<Image> {
        trace!(%filter, ?input, workers = self.workers, "RowPartitioned::run_one");
        let kernel = filter.kernel();
        let mut output = input.blank_like()?;
        let ranges = partition_rows(input.height() as usize, self.workers);
        debug!(%filter, bands = ranges.len(), ?ranges, "row partition");

        let bands = output.bands_mut(&ranges)?;
        join_scope(|| {
            self.pool.scope(|s| {
                for mut band in bands {
                    s.spawn(move |_| sweep_band(input, &kernel, &mut band));
                }
            })
        })?;
        Ok(output)
    }
}

/// Kernel-level task parallelism: one concurrent task per filter.
///
/// Each task allocates its own output and sweeps every row on a single
/// thread. A fresh pool sized to the number of filters is built per
/// [`run`](ParallelScheduler::run).
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelTasks;

impl ParallelScheduler for KernelTasks {
    fn name(&self) -> &'static str {
        "tasks"
    }

    /// A single filter is a single task, run on the calling thread.
    fn run_one(&self, input: &Image, filter: FilterKind) -> OpsResult<Image> {
        trace!(%filter, ?input, "KernelTasks::run_one");
        single_sweep(input, filter)
    }

    fn run(&self, input: &Image, filters: &[FilterKind]) -> OpsResult<Vec<Filtered>> {
        trace!(?filters, ?input, "KernelTasks::run");
        if filters.is_empty() {
            return Ok(Vec::new());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(filters.len())
            .thread_name(|i| format!("pnmconv kernel task #{i}"))
            .build()?;
        debug!(tasks = filters.len(), "kernel pool ready");

        let mut slots: Vec<Option<OpsResult<Image>>> = filters.iter().map(|_| None).collect();
        join_scope(|| {
            pool.scope(|s| {
                for (slot, &filter) in slots.iter_mut().zip(filters) {
                    s.spawn(move |_| *slot = Some(single_sweep(input, filter)));
                }
            })
        })?;

        filters
            .iter()
            .zip(slots)
            .map(|(&filter, slot)| {
                let image = slot.ok_or_else(|| {
                    OpsError::WorkerPanicked(format!("{filter} task produced no output"))
                })??;
                Ok(Filtered { filter, image })
            })
            .collect()
    }
}

fn single_sweep(input: &Image, filter: FilterKind) -> OpsResult<Image> {
    let kernel = filter.kernel();
    let mut output = input.blank_like()?;
    sweep_band(input, &kernel, &mut output.full_band_mut());
    Ok(output)
}

/// Runs a pool scope, turning a worker panic into [`OpsError::WorkerPanicked`].
///
/// Rayon re-raises a job's panic only after every job of the scope has
/// finished, so no band is still borrowed when the error is returned.
fn join_scope<R>(f: impl FnOnce() -> R) -> OpsResult<R> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        warn!(%message, "worker panicked");
        OpsError::WorkerPanicked(message)
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
