//! Harmonic/percussive separation.
//!
//! Tonal content shows up as horizontal ridges in a spectrogram
//! (stable across time) while transients are vertical spikes (broad
//! across frequency). Median-filtering the magnitude spectrogram along
//! each axis enhances one structure and suppresses the other; soft
//! Wiener masks built from the two enhanced spectrograms split the
//! original spectrum, and overlap-add resynthesis returns the harmonic
//! part to the time domain.

use super::stft::Stft;

const MEDIAN_WINDOW: usize = 17;
const MASK_EPSILON: f32 = 1e-10;

/// Extract the time-domain harmonic component of `samples`.
pub fn harmonic_component(samples: &[f32], stft: &Stft) -> Vec<f32> {
    let mut frames = stft.spectrum(samples);
    let n_frames = frames.len();
    let bins = stft.bins();
    let frame_size = stft.frame_size();

    let mags: Vec<Vec<f32>> = frames
        .iter()
        .map(|f| f[..bins].iter().map(|c| c.norm()).collect())
        .collect();

    for t in 0..n_frames {
        for k in 0..bins {
            let harmonic = median_over_time(&mags, t, k);
            let percussive = median_over_frequency(&mags[t], k);

            let h2 = harmonic * harmonic;
            let p2 = percussive * percussive;
            let mask = h2 / (h2 + p2 + MASK_EPSILON);

            frames[t][k] *= mask;
            // Mirror onto the conjugate-symmetric bin; k = 0 and the
            // Nyquist bin are their own mirrors.
            if k > 0 && k < frame_size - k {
                frames[t][frame_size - k] *= mask;
            }
        }
    }

    stft.reconstruct(&frames, samples.len())
}

fn median_over_time(mags: &[Vec<f32>], t: usize, k: usize) -> f32 {
    let half = MEDIAN_WINDOW / 2;
    let lo = t.saturating_sub(half);
    let hi = (t + half + 1).min(mags.len());
    let mut window: Vec<f32> = (lo..hi).map(|i| mags[i][k]).collect();
    median(&mut window)
}

fn median_over_frequency(frame: &[f32], k: usize) -> f32 {
    let half = MEDIAN_WINDOW / 2;
    let lo = k.saturating_sub(half);
    let hi = (k + half + 1).min(frame.len());
    let mut window: Vec<f32> = frame[lo..hi].to_vec();
    median(&mut window)
}

fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mid = values.len() / 2;
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values[mid]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|x| x * x).sum()
    }

    #[test]
    fn median_of_odd_window() {
        let mut xs = [5.0, 1.0, 3.0];
        assert_eq!(median(&mut xs), 3.0);
    }

    #[test]
    fn steady_tone_survives_separation() {
        let sr = 22050u32;
        let signal: Vec<f32> = (0..sr as usize)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr as f32).sin())
            .collect();

        let stft = Stft::new(2048, 512);
        let harmonic = harmonic_component(&signal, &stft);

        assert_eq!(harmonic.len(), signal.len());
        // A pure tone is entirely harmonic; most of its energy remains.
        let kept = energy(&harmonic[2048..signal.len() - 2048])
            / energy(&signal[2048..signal.len() - 2048]);
        assert!(kept > 0.5, "harmonic energy ratio {kept}");
    }

    #[test]
    fn impulse_train_is_attenuated() {
        let sr = 22050u32;
        let mut signal = vec![0.0f32; sr as usize];
        // Clicks every 100 ms: vertical spectrogram structure.
        let mut i = 0;
        while i < signal.len() {
            signal[i] = 1.0;
            i += sr as usize / 10;
        }

        let stft = Stft::new(2048, 512);
        let harmonic = harmonic_component(&signal, &stft);

        let kept = energy(&harmonic) / energy(&signal);
        assert!(kept < 0.5, "percussive energy ratio kept {kept}");
    }
}
