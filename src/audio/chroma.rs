//! Pitch-class energy profiles.
//!
//! Spectrum bins are folded onto the 12 equal-tempered pitch classes,
//! smoothed across time, and normalized per frame so every value lands
//! in [0, 1] regardless of recording level.

use super::stft::bin_frequency;

pub const N_CHROMA: usize = 12;

// Fold range: C1 through roughly C8, the span where pitch-class
// assignment of FFT bins is meaningful at this resolution.
const FOLD_MIN_HZ: f32 = 32.7;
const FOLD_MAX_HZ: f32 = 4186.0;

const SMOOTHING_WINDOW: usize = 41;

/// Time-normalized chromagram: one 12-bin row per frame.
pub fn chromagram(
    magnitudes: &[Vec<f32>],
    sample_rate: u32,
    frame_size: usize,
) -> Vec<[f32; N_CHROMA]> {
    let folded: Vec<[f32; N_CHROMA]> = magnitudes
        .iter()
        .map(|frame| fold_frame(frame, sample_rate, frame_size))
        .collect();

    let smoothed = smooth_over_time(&folded);
    smoothed.into_iter().map(normalize_frame).collect()
}

fn fold_frame(frame: &[f32], sample_rate: u32, frame_size: usize) -> [f32; N_CHROMA] {
    let mut classes = [0.0f32; N_CHROMA];
    for (bin, &mag) in frame.iter().enumerate() {
        let f = bin_frequency(bin, sample_rate, frame_size);
        if !(FOLD_MIN_HZ..=FOLD_MAX_HZ).contains(&f) {
            continue;
        }
        let midi = 69.0 + 12.0 * (f / 440.0).log2();
        let class = (midi.round() as i32).rem_euclid(N_CHROMA as i32) as usize;
        classes[class] += mag * mag;
    }
    classes
}

fn smooth_over_time(frames: &[[f32; N_CHROMA]]) -> Vec<[f32; N_CHROMA]> {
    let half = SMOOTHING_WINDOW / 2;
    (0..frames.len())
        .map(|t| {
            let lo = t.saturating_sub(half);
            let hi = (t + half + 1).min(frames.len());
            let span = (hi - lo) as f32;
            let mut acc = [0.0f32; N_CHROMA];
            for frame in &frames[lo..hi] {
                for (a, &v) in acc.iter_mut().zip(frame.iter()) {
                    *a += v;
                }
            }
            for a in acc.iter_mut() {
                *a /= span;
            }
            acc
        })
        .collect()
}

fn normalize_frame(mut frame: [f32; N_CHROMA]) -> [f32; N_CHROMA] {
    let norm = frame.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 1e-10 {
        for v in frame.iter_mut() {
            *v /= norm;
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::stft::Stft;

    #[test]
    fn tone_dominates_its_pitch_class() {
        let sr = 22050u32;
        // A4 = 440 Hz = pitch class 9.
        let signal: Vec<f32> = (0..sr as usize)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr as f32).sin())
            .collect();

        let stft = Stft::new(2048, 512);
        let chroma = chromagram(&stft.magnitudes(&signal), sr, 2048);

        let frame = &chroma[chroma.len() / 2];
        let strongest = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(strongest, 9);
    }

    #[test]
    fn frames_are_bounded_after_normalization() {
        let sr = 22050u32;
        let signal: Vec<f32> = (0..sr as usize)
            .map(|i| ((i * 7919) % 1000) as f32 / 500.0 - 1.0)
            .collect();

        let stft = Stft::new(2048, 512);
        let chroma = chromagram(&stft.magnitudes(&signal), sr, 2048);

        for frame in &chroma {
            for &v in frame.iter() {
                assert!((0.0..=1.0 + 1e-6).contains(&v), "chroma value {v}");
            }
        }
    }

    #[test]
    fn silence_stays_zero() {
        let stft = Stft::new(2048, 512);
        let chroma = chromagram(&stft.magnitudes(&vec![0.0f32; 8192]), 22050, 2048);
        for frame in &chroma {
            assert!(frame.iter().all(|&v| v == 0.0));
        }
    }
}
