use crate::error::ExtractError;
use log::debug;
use rodio::{Decoder, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::AudioSignal;

/// Decode an audio file to a mono sample buffer at its native rate.
///
/// Interleaved channels are averaged into one. Synchronous and free of
/// shared state, so safe to call from any worker.
pub fn decode(path: &Path) -> Result<AudioSignal, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| ExtractError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let channels = source.channels().max(1) as usize;
    let sample_rate = source.sample_rate();
    let interleaved: Vec<i16> = source.convert_samples().collect();

    if interleaved.is_empty() {
        return Err(ExtractError::Decode {
            path: path.to_path_buf(),
            reason: "no audio samples decoded".to_string(),
        });
    }

    let samples: Vec<f32> = interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().map(|&s| s as f32 / 32768.0).sum();
            sum / channels as f32
        })
        .collect();

    debug!(
        "decoded {}: {} samples at {} Hz ({:.2}s)",
        path.display(),
        samples.len(),
        sample_rate,
        samples.len() as f32 / sample_rate as f32
    );

    Ok(AudioSignal {
        samples,
        sample_rate,
    })
}
