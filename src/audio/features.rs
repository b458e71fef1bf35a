//! The per-file analysis pipeline and the fixed row schema it fills.

use super::chroma::{self, N_CHROMA};
use super::hpss;
use super::mel::{self, MelFilterBank};
use super::spectral::{self, N_CONTRAST_BANDS};
use super::stats;
use super::stft::Stft;
use super::tempo;
use super::AudioSignal;

pub const N_MFCC: usize = 13;
pub const N_FEATURES: usize = 74;

pub const FRAME_SIZE: usize = 2048;
pub const HOP_SIZE: usize = 512;
pub const N_MELS: usize = 128;

/// Column names of every feature row, in serialization order. The
/// count and order are a contract: every row of every run carries
/// exactly these fields, which is what lets a batch land in one
/// homogeneous table.
pub const COLUMNS: [&str; N_FEATURES] = [
    "chroma_mean_0",
    "chroma_mean_1",
    "chroma_mean_2",
    "chroma_mean_3",
    "chroma_mean_4",
    "chroma_mean_5",
    "chroma_mean_6",
    "chroma_mean_7",
    "chroma_mean_8",
    "chroma_mean_9",
    "chroma_mean_10",
    "chroma_mean_11",
    "chroma_std_0",
    "chroma_std_1",
    "chroma_std_2",
    "chroma_std_3",
    "chroma_std_4",
    "chroma_std_5",
    "chroma_std_6",
    "chroma_std_7",
    "chroma_std_8",
    "chroma_std_9",
    "chroma_std_10",
    "chroma_std_11",
    "mfcc_mean_0",
    "mfcc_mean_1",
    "mfcc_mean_2",
    "mfcc_mean_3",
    "mfcc_mean_4",
    "mfcc_mean_5",
    "mfcc_mean_6",
    "mfcc_mean_7",
    "mfcc_mean_8",
    "mfcc_mean_9",
    "mfcc_mean_10",
    "mfcc_mean_11",
    "mfcc_mean_12",
    "mfcc_std_0",
    "mfcc_std_1",
    "mfcc_std_2",
    "mfcc_std_3",
    "mfcc_std_4",
    "mfcc_std_5",
    "mfcc_std_6",
    "mfcc_std_7",
    "mfcc_std_8",
    "mfcc_std_9",
    "mfcc_std_10",
    "mfcc_std_11",
    "mfcc_std_12",
    "cent_mean",
    "cent_std",
    "cent_skew",
    "contrast_mean_0",
    "contrast_mean_1",
    "contrast_mean_2",
    "contrast_mean_3",
    "contrast_mean_4",
    "contrast_mean_5",
    "contrast_mean_6",
    "contrast_std_0",
    "contrast_std_1",
    "contrast_std_2",
    "contrast_std_3",
    "contrast_std_4",
    "contrast_std_5",
    "contrast_std_6",
    "rolloff_mean",
    "rolloff_std",
    "rolloff_skew",
    "zrate_mean",
    "zrate_std",
    "zrate_skew",
    "tempo",
];

/// One fully-populated feature row. Values are stored in `COLUMNS`
/// order and never mutated after assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f32; N_FEATURES],
}

// Serialized as a map so rows keep their column names in JSON output.
impl serde::Serialize for FeatureVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(N_FEATURES))?;
        for (column, value) in COLUMNS.iter().zip(self.values.iter()) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl FeatureVector {
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Look a value up by column name.
    pub fn get(&self, column: &str) -> Option<f32> {
        COLUMNS
            .iter()
            .position(|&c| c == column)
            .map(|i| self.values[i])
    }
}

/// Runs the full analysis pipeline on one decoded signal.
///
/// A pure function of its input: no shared state is read or written,
/// so any number of extractions may run concurrently.
pub struct FeatureExtractor {
    frame_size: usize,
    hop_size: usize,
    n_mels: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            frame_size: FRAME_SIZE,
            hop_size: HOP_SIZE,
            n_mels: N_MELS,
        }
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract(&self, signal: &AudioSignal) -> FeatureVector {
        let sr = signal.sample_rate;
        let stft = Stft::new(self.frame_size, self.hop_size);

        let full_mags = stft.magnitudes(&signal.samples);

        let harmonic = hpss::harmonic_component(&signal.samples, &stft);
        let harmonic_mags = stft.magnitudes(&harmonic);

        let bank = MelFilterBank::new(sr, self.frame_size, self.n_mels);
        let log_mel = bank.log_mel_spectrogram(&harmonic_mags);
        let tempo_est = tempo::estimate(&log_mel, sr, self.hop_size);

        let chroma = chroma::chromagram(&harmonic_mags, sr, self.frame_size);
        let mfcc = mel::mfcc(&log_mel, N_MFCC);

        let centroid = spectral::centroid_series(&full_mags, sr, self.frame_size);
        let contrast = spectral::contrast_series(&harmonic_mags, sr, self.frame_size);
        let rolloff = spectral::rolloff_series(&full_mags, sr, self.frame_size);
        let zcr = spectral::zero_crossing_series(&harmonic, self.frame_size, self.hop_size);

        assemble(&chroma, &mfcc, &centroid, &contrast, &rolloff, &zcr, tempo_est.bpm)
    }
}

fn assemble(
    chroma: &[[f32; N_CHROMA]],
    mfcc: &[Vec<f32>],
    centroid: &[f32],
    contrast: &[[f32; N_CONTRAST_BANDS]],
    rolloff: &[f32],
    zcr: &[f32],
    bpm: f32,
) -> FeatureVector {
    let mut values = [0.0f32; N_FEATURES];
    let mut at = 0;
    let mut push = |v: f32| {
        values[at] = v;
        at += 1;
    };

    for bin in 0..N_CHROMA {
        let series: Vec<f32> = chroma.iter().map(|f| f[bin]).collect();
        push(stats::mean(&series));
    }
    for bin in 0..N_CHROMA {
        let series: Vec<f32> = chroma.iter().map(|f| f[bin]).collect();
        push(stats::std_dev(&series));
    }

    for coeff in 0..N_MFCC {
        let series: Vec<f32> = mfcc.iter().map(|f| f[coeff]).collect();
        push(stats::mean(&series));
    }
    for coeff in 0..N_MFCC {
        let series: Vec<f32> = mfcc.iter().map(|f| f[coeff]).collect();
        push(stats::std_dev(&series));
    }

    push(stats::mean(centroid));
    push(stats::std_dev(centroid));
    push(stats::skewness(centroid));

    for band in 0..N_CONTRAST_BANDS {
        let series: Vec<f32> = contrast.iter().map(|f| f[band]).collect();
        push(stats::mean(&series));
    }
    for band in 0..N_CONTRAST_BANDS {
        let series: Vec<f32> = contrast.iter().map(|f| f[band]).collect();
        push(stats::std_dev(&series));
    }

    push(stats::mean(rolloff));
    push(stats::std_dev(rolloff));
    push(stats::skewness(rolloff));

    push(stats::mean(zcr));
    push(stats::std_dev(zcr));
    push(stats::skewness(zcr));

    push(bpm);

    debug_assert_eq!(at, N_FEATURES);
    FeatureVector { values }
}
