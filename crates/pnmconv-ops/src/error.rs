//! Error types for convolution and scheduling.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Filter name is not one of the built-in kernels.
    #[error("unknown filter: {0:?} (expected blur, laplace or sharpen)")]
    UnknownFilter(String),

    /// Row-partitioned scheduling needs at least one worker.
    #[error("invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),

    /// The worker pool could not be started.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A worker panicked; the whole parallel phase is discarded.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),

    /// Output allocation or band split failed.
    #[error(transparent)]
    Core(#[from] pnmconv_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
