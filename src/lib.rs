//! Content-based audio feature extraction.
//!
//! Decodes a batch of audio files, runs each one through a fixed
//! signal-analysis pipeline (harmonic/percussive separation, tempo,
//! chroma, cepstral and spectral statistics), and produces one
//! 74-column feature row per file, suitable for a single homogeneous
//! table. Batches run across a fixed-size worker pool with a shared
//! progress counter; results stay aligned with the input order.

pub mod audio;
pub mod batch;
pub mod discover;
pub mod error;
pub mod output;

pub use audio::{AudioSignal, FeatureExtractor, FeatureVector, COLUMNS, N_FEATURES};
pub use batch::{extract_batch, run_batch, BatchReport, BatchRow, ErrorPolicy, ProgressTracker};
pub use error::{BatchError, ExtractError};
