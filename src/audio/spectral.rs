//! Frame-wise spectral shape descriptors: centroid, rolloff, sub-band
//! contrast, and zero-crossing rate.

use super::stft::bin_frequency;

pub const N_CONTRAST_BANDS: usize = 7;

const ROLLOFF_FRACTION: f32 = 0.85;
const CONTRAST_QUANTILE: f32 = 0.02;

// Octave-spaced band edges; the last band runs to Nyquist.
const CONTRAST_EDGES_HZ: [f32; N_CONTRAST_BANDS] =
    [0.0, 200.0, 400.0, 800.0, 1600.0, 3200.0, 6400.0];

/// Spectral centroid in Hz per frame.
pub fn centroid_series(magnitudes: &[Vec<f32>], sample_rate: u32, frame_size: usize) -> Vec<f32> {
    magnitudes
        .iter()
        .map(|frame| {
            let total: f32 = frame.iter().sum();
            if total <= 0.0 {
                return 0.0;
            }
            let weighted: f32 = frame
                .iter()
                .enumerate()
                .map(|(bin, &mag)| bin_frequency(bin, sample_rate, frame_size) * mag)
                .sum();
            weighted / total
        })
        .collect()
}

/// Frequency below which 85% of the frame's magnitude lies, per frame.
pub fn rolloff_series(magnitudes: &[Vec<f32>], sample_rate: u32, frame_size: usize) -> Vec<f32> {
    let nyquist = sample_rate as f32 / 2.0;
    magnitudes
        .iter()
        .map(|frame| {
            let threshold: f32 = frame.iter().sum::<f32>() * ROLLOFF_FRACTION;
            let mut cumulative = 0.0;
            for (bin, &mag) in frame.iter().enumerate() {
                cumulative += mag;
                if cumulative >= threshold {
                    return bin_frequency(bin, sample_rate, frame_size);
                }
            }
            nyquist
        })
        .collect()
}

/// Peak-to-valley contrast in dB for 7 octave sub-bands, per frame.
pub fn contrast_series(
    magnitudes: &[Vec<f32>],
    sample_rate: u32,
    frame_size: usize,
) -> Vec<[f32; N_CONTRAST_BANDS]> {
    let bins = frame_size / 2 + 1;
    let hz_to_bin = |f: f32| ((f * frame_size as f32 / sample_rate as f32).round() as usize).min(bins);

    let mut edges = [0usize; N_CONTRAST_BANDS + 1];
    for (i, &f) in CONTRAST_EDGES_HZ.iter().enumerate() {
        edges[i] = hz_to_bin(f);
    }
    edges[N_CONTRAST_BANDS] = bins;

    magnitudes
        .iter()
        .map(|frame| {
            let mut bands = [0.0f32; N_CONTRAST_BANDS];
            for (band, out) in bands.iter_mut().enumerate() {
                let (start, end) = (edges[band], edges[band + 1]);
                if end <= start {
                    continue;
                }
                let mut sorted: Vec<f32> = frame[start..end].to_vec();
                sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

                let take = ((sorted.len() as f32 * CONTRAST_QUANTILE).ceil() as usize).max(1);
                let valley: f32 = sorted[..take].iter().sum::<f32>() / take as f32;
                let peak: f32 =
                    sorted[sorted.len() - take..].iter().sum::<f32>() / take as f32;
                *out = 20.0 * ((peak + 1e-10) / (valley + 1e-10)).log10();
            }
            bands
        })
        .collect()
}

/// Sign-change proportion per analysis frame of the time-domain signal.
pub fn zero_crossing_series(samples: &[f32], frame_size: usize, hop_size: usize) -> Vec<f32> {
    let mut series = Vec::new();
    let mut pos = 0;

    loop {
        let end = (pos + frame_size).min(samples.len());
        let frame = &samples[pos..end];
        series.push(frame_rate_of_crossings(frame));

        pos += hop_size;
        if pos >= samples.len() {
            break;
        }
    }

    series
}

fn frame_rate_of_crossings(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
    crossings as f32 / (frame.len() - 1) as f32
}
