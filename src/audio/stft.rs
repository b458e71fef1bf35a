use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Short-time Fourier transform over fixed-size Hann-windowed frames.
///
/// Frames start every `hop_size` samples; the tail frame is zero-padded.
/// A signal shorter than one frame still yields a single padded frame so
/// downstream feature series are never empty.
pub struct Stft {
    frame_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl Stft {
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(frame_size);
        let inverse = planner.plan_fft_inverse(frame_size);

        Self {
            frame_size,
            hop_size,
            window: hann_window(frame_size),
            forward,
            inverse,
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of non-redundant frequency bins per frame.
    pub fn bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Full complex spectrum per frame (all `frame_size` bins, needed
    /// for reconstruction).
    pub fn spectrum(&self, samples: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let mut frames = Vec::with_capacity(self.frame_count(samples.len()));
        let mut pos = 0;

        loop {
            let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); self.frame_size];
            let end = (pos + self.frame_size).min(samples.len());
            for (i, &s) in samples[pos..end].iter().enumerate() {
                buffer[i] = Complex::new(s * self.window[i], 0.0);
            }

            self.forward.process(&mut buffer);
            frames.push(buffer);

            pos += self.hop_size;
            if pos >= samples.len() {
                break;
            }
        }

        frames
    }

    /// Magnitude spectrogram: one `bins()`-length row per frame,
    /// normalized the same way as a single-frame analyzer would be.
    pub fn magnitudes(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        let scale = 2.0 / self.frame_size as f32;
        self.spectrum(samples)
            .iter()
            .map(|frame| frame[..self.bins()].iter().map(|c| c.norm() * scale).collect())
            .collect()
    }

    /// Inverse transform with windowed overlap-add. `output_len` trims
    /// the synthesis back to the original signal length.
    pub fn reconstruct(&self, frames: &[Vec<Complex<f32>>], output_len: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; output_len];
        let mut norm = vec![0.0f32; output_len];
        let fft_scale = 1.0 / self.frame_size as f32;

        for (t, frame) in frames.iter().enumerate() {
            let mut buffer = frame.clone();
            self.inverse.process(&mut buffer);

            let start = t * self.hop_size;
            for i in 0..self.frame_size {
                let pos = start + i;
                if pos >= output_len {
                    break;
                }
                out[pos] += buffer[i].re * fft_scale * self.window[i];
                norm[pos] += self.window[i] * self.window[i];
            }
        }

        for (sample, w) in out.iter_mut().zip(norm.iter()) {
            if *w > 1e-8 {
                *sample /= *w;
            }
        }

        out
    }

    fn frame_count(&self, sample_count: usize) -> usize {
        if sample_count <= self.frame_size {
            1
        } else {
            (sample_count - 1) / self.hop_size + 1
        }
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Frequency in Hz of FFT bin `bin` for the given analysis size.
pub fn bin_frequency(bin: usize, sample_rate: u32, frame_size: usize) -> f32 {
    bin as f32 * sample_rate as f32 / frame_size as f32
}
