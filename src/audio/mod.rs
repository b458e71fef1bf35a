pub mod chroma;
pub mod decoder;
pub mod features;
pub mod hpss;
pub mod mel;
pub mod spectral;
pub mod stats;
pub mod stft;
pub mod tempo;

pub use decoder::decode;
pub use features::{FeatureExtractor, FeatureVector, COLUMNS, N_FEATURES};
pub use tempo::TempoEstimate;

use std::path::Path;

/// File extensions the pipeline accepts, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

/// One decoded recording: mono samples plus the native sample rate.
/// Immutable once produced; owned by the worker analyzing it.
#[derive(Debug, Clone)]
pub struct AudioSignal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSignal {
    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Whether a path's extension is in the supported set.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_check_covers_the_supported_set() {
        assert!(is_supported(&PathBuf::from("song.mp3")));
        assert!(is_supported(&PathBuf::from("song.wav")));
        assert!(is_supported(&PathBuf::from("SONG.WAV")));
        assert!(!is_supported(&PathBuf::from("song.flac")));
        assert!(!is_supported(&PathBuf::from("song")));
        assert!(!is_supported(&PathBuf::from("mp3")));
    }

    #[test]
    fn duration_is_samples_over_rate() {
        let signal = AudioSignal {
            samples: vec![0.0; 44100],
            sample_rate: 22050,
        };
        assert!((signal.duration_seconds() - 2.0).abs() < 1e-6);
    }
}
