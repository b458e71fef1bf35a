//! Tempo estimation and beat placement.
//!
//! An onset-strength envelope (positive log-mel flux, summed across
//! bands) is autocorrelated over the plausible beat-period range; the
//! best lag under a log-normal prior centered at 120 BPM gives the
//! tempo, and peaks of the envelope near that period give beat times.

const MIN_BPM: f32 = 30.0;
const MAX_BPM: f32 = 300.0;
const PRIOR_BPM: f32 = 120.0;
const FALLBACK_BPM: f32 = 120.0;

#[derive(Debug, Clone)]
pub struct TempoEstimate {
    pub bpm: f32,
    /// Beat-onset timestamps in seconds. Retained for callers that need
    /// the grid; only the scalar tempo enters the feature vector.
    pub beat_times: Vec<f32>,
}

pub fn estimate(log_mel: &[Vec<f32>], sample_rate: u32, hop_size: usize) -> TempoEstimate {
    let envelope = onset_envelope(log_mel);
    let frame_rate = sample_rate as f32 / hop_size as f32;

    let lag_min = ((frame_rate * 60.0 / MAX_BPM).floor() as usize).max(1);
    let lag_max = (frame_rate * 60.0 / MIN_BPM).ceil() as usize;

    if envelope.len() <= lag_min * 2 {
        // Too little signal to resolve even the fastest period.
        return TempoEstimate {
            bpm: FALLBACK_BPM,
            beat_times: Vec::new(),
        };
    }
    let lag_max = lag_max.min(envelope.len() - 1);

    let mut best_lag = lag_min;
    let mut best_score = f32::NEG_INFINITY;
    for lag in lag_min..=lag_max {
        let corr: f32 = envelope[lag..]
            .iter()
            .zip(envelope.iter())
            .map(|(&a, &b)| a * b)
            .sum();
        let bpm = 60.0 * frame_rate / lag as f32;
        let octaves_off = (bpm / PRIOR_BPM).log2();
        let prior = (-0.5 * octaves_off * octaves_off).exp();

        let score = corr * prior;
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }

    if best_score <= 0.0 {
        // Nothing onset-like in the signal; every lag scored zero.
        return TempoEstimate {
            bpm: FALLBACK_BPM,
            beat_times: Vec::new(),
        };
    }

    let bpm = 60.0 * frame_rate / best_lag as f32;
    let beat_times = pick_beats(&envelope, best_lag, hop_size, sample_rate);

    TempoEstimate { bpm, beat_times }
}

/// Positive first difference of the log-mel spectrogram, summed over
/// bands. Non-negative by construction.
pub fn onset_envelope(log_mel: &[Vec<f32>]) -> Vec<f32> {
    let mut env = vec![0.0f32; log_mel.len()];
    for t in 1..log_mel.len() {
        env[t] = log_mel[t]
            .iter()
            .zip(log_mel[t - 1].iter())
            .map(|(&cur, &prev)| (cur - prev).max(0.0))
            .sum();
    }
    env
}

fn pick_beats(envelope: &[f32], period: usize, hop_size: usize, sample_rate: u32) -> Vec<f32> {
    if envelope.is_empty() {
        return Vec::new();
    }
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let min_gap = (period / 2).max(1);

    let mut beats = Vec::new();
    let mut last: Option<usize> = None;
    for t in 1..envelope.len().saturating_sub(1) {
        let is_peak = envelope[t] >= envelope[t - 1] && envelope[t] > envelope[t + 1];
        let strong = envelope[t] > mean;
        let spaced = last.map_or(true, |l| t - l >= min_gap);
        if is_peak && strong && spaced {
            beats.push(t);
            last = Some(t);
        }
    }

    beats
        .into_iter()
        .map(|t| t as f32 * hop_size as f32 / sample_rate as f32)
        .collect()
}
