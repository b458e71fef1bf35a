//! Mel filterbank, log-mel spectrogram, and cepstral coefficients.

/// Triangular mel filterbank over the non-redundant FFT bins.
pub struct MelFilterBank {
    n_mels: usize,
    // Dense weights, `n_mels` rows of `bins` columns.
    filters: Vec<Vec<f32>>,
}

impl MelFilterBank {
    pub fn new(sample_rate: u32, frame_size: usize, n_mels: usize) -> Self {
        let bins = frame_size / 2 + 1;
        let nyquist = sample_rate as f32 / 2.0;

        let mel_lo = hz_to_mel(0.0);
        let mel_hi = hz_to_mel(nyquist);
        let centers: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_lo + (mel_hi - mel_lo) * i as f32 / (n_mels + 1) as f32))
            .collect();

        let bin_freq = |bin: usize| bin as f32 * sample_rate as f32 / frame_size as f32;

        let mut filters = Vec::with_capacity(n_mels);
        for m in 0..n_mels {
            let (left, center, right) = (centers[m], centers[m + 1], centers[m + 2]);
            let mut weights = vec![0.0f32; bins];
            for (bin, w) in weights.iter_mut().enumerate() {
                let f = bin_freq(bin);
                if f > left && f < right {
                    *w = if f <= center {
                        (f - left) / (center - left)
                    } else {
                        (right - f) / (right - center)
                    };
                }
            }
            filters.push(weights);
        }

        Self { n_mels, filters }
    }

    pub fn n_mels(&self) -> usize {
        self.n_mels
    }

    /// Mel band energies for one magnitude frame (power-weighted).
    pub fn apply(&self, magnitudes: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|weights| {
                weights
                    .iter()
                    .zip(magnitudes.iter())
                    .map(|(&w, &m)| w * m * m)
                    .sum()
            })
            .collect()
    }

    /// Log-compressed mel spectrogram, one `n_mels` row per frame.
    pub fn log_mel_spectrogram(&self, magnitudes: &[Vec<f32>]) -> Vec<Vec<f32>> {
        magnitudes
            .iter()
            .map(|frame| {
                self.apply(frame)
                    .into_iter()
                    .map(|e| (e + 1e-10).ln())
                    .collect()
            })
            .collect()
    }
}

/// Cepstral coefficients: orthonormal DCT-II of each log-mel frame,
/// truncated to `n_coeffs`. One row per frame.
pub fn mfcc(log_mel: &[Vec<f32>], n_coeffs: usize) -> Vec<Vec<f32>> {
    log_mel.iter().map(|frame| dct_ii(frame, n_coeffs)).collect()
}

fn dct_ii(x: &[f32], n_coeffs: usize) -> Vec<f32> {
    let n = x.len();
    if n == 0 {
        return vec![0.0; n_coeffs];
    }
    let n_f = n as f32;
    (0..n_coeffs)
        .map(|k| {
            let scale = if k == 0 {
                (1.0 / n_f).sqrt()
            } else {
                (2.0 / n_f).sqrt()
            };
            let sum: f32 = x
                .iter()
                .enumerate()
                .map(|(i, &xi)| {
                    xi * (std::f32::consts::PI / n_f * (i as f32 + 0.5) * k as f32).cos()
                })
                .sum();
            scale * sum
        })
        .collect()
}

fn hz_to_mel(f: f32) -> f32 {
    2595.0 * (1.0 + f / 700.0).log10()
}

fn mel_to_hz(m: f32) -> f32 {
    700.0 * (10.0f32.powf(m / 2595.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mel_scale_round_trips() {
        for f in [0.0, 100.0, 440.0, 4000.0, 11025.0] {
            assert!((mel_to_hz(hz_to_mel(f)) - f).abs() < 0.5);
        }
    }

    #[test]
    fn every_filter_has_support() {
        let bank = MelFilterBank::new(22050, 2048, 128);
        for (m, weights) in bank.filters.iter().enumerate() {
            assert!(
                weights.iter().any(|&w| w > 0.0),
                "mel filter {m} has no bins"
            );
        }
    }

    #[test]
    fn dct_of_constant_concentrates_in_first_coefficient() {
        let frame = vec![1.0f32; 64];
        let coeffs = dct_ii(&frame, 13);
        assert!(coeffs[0] > 1.0);
        for &c in &coeffs[1..] {
            assert!(c.abs() < 1e-4);
        }
    }

    #[test]
    fn mfcc_row_shape() {
        let bank = MelFilterBank::new(22050, 2048, 128);
        let frame = vec![0.1f32; 1025];
        let log_mel = bank.log_mel_spectrogram(&[frame]);
        let coeffs = mfcc(&log_mel, 13);
        assert_eq!(coeffs.len(), 1);
        assert_eq!(coeffs[0].len(), 13);
    }
}
