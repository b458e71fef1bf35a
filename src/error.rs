use std::path::PathBuf;
use thiserror::Error;

/// Per-file failures raised while turning a path into a feature row.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to decode `{path}`: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("unsupported audio format: `{path}`")]
    UnsupportedFormat { path: PathBuf },
}

/// Batch-level failures raised by the orchestrator.
#[derive(Debug, Error)]
pub enum BatchError {
    /// One or more input paths carry an extension outside the supported
    /// set. Raised before any worker starts; the batch produces nothing.
    #[error("unsupported input paths: {paths:?}")]
    InvalidInput { paths: Vec<PathBuf> },

    /// A row failed under the fail-fast policy. Already-completed rows
    /// are discarded.
    #[error("extraction failed for `{path}`")]
    Extraction {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },
}
