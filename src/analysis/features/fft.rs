// FFT module - windowed short-time Fourier transform
//
// This module handles framing and FFT computation with windowing to reduce
// spectral leakage. Complex spectra feed the phase analysis; magnitude and
// power spectra feed the spectral and cepstral analyses.
//
// The FFT plan is built once and shared read-only, so one processor can be
// used from many threads at once.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Analysis window shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Hann window (spectral/phase STFT)
    Hann,
    /// Hamming window (cepstral frames)
    Hamming,
}

/// FFT processor that computes spectra from fixed-length frames
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Pre-computed analysis window (length = frame length)
    window: Vec<f32>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (frames shorter than this are zero-padded)
    /// * `frame_length` - Samples per frame, at most `fft_size`
    /// * `kind` - Window applied to each frame
    pub fn new(fft_size: usize, frame_length: usize, kind: WindowKind) -> Self {
        let frame_length = frame_length.min(fft_size);
        let denom = (frame_length.max(2) - 1) as f32;
        let window = (0..frame_length)
            .map(|i| {
                let phase = (2.0 * std::f32::consts::PI * i as f32) / denom;
                match kind {
                    WindowKind::Hann => 0.5 * (1.0 - phase.cos()),
                    WindowKind::Hamming => 0.54 - 0.46 * phase.cos(),
                }
            })
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn frame_length(&self) -> usize {
        self.window.len()
    }

    /// Number of bins returned per frame (positive frequencies only)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Compute the complex spectrum of one frame
    ///
    /// Applies the window, zero-pads to the FFT size, and returns bins
    /// `0..=fft_size/2` (exploiting symmetry of real-valued input).
    pub fn compute_spectrum(&self, frame: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); self.fft_size];
        for (slot, (&sample, &w)) in buffer.iter_mut().zip(frame.iter().zip(&self.window)) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process(&mut buffer);
        buffer.truncate(self.num_bins());
        buffer
    }

    /// Compute the power spectrum |X[k]|² of one frame
    pub fn compute_power_spectrum(&self, frame: &[f32]) -> Vec<f32> {
        self.compute_spectrum(frame)
            .iter()
            .map(|c| c.norm_sqr())
            .collect()
    }

    /// Complex spectra for every full frame of `samples`
    pub fn stft(&self, samples: &[f32], hop: usize) -> Vec<Vec<Complex<f32>>> {
        frame_starts(samples.len(), self.frame_length(), hop)
            .map(|start| self.compute_spectrum(&samples[start..start + self.frame_length()]))
            .collect()
    }
}

/// Number of full frames of `frame_length` with the given hop
pub fn frame_count(len: usize, frame_length: usize, hop: usize) -> usize {
    if frame_length == 0 || hop == 0 || len < frame_length {
        return 0;
    }
    (len - frame_length) / hop + 1
}

/// Start offsets of every full frame
pub fn frame_starts(len: usize, frame_length: usize, hop: usize) -> impl Iterator<Item = usize> {
    (0..frame_count(len, frame_length, hop)).map(move |i| i * hop)
}

/// Smallest power of two >= n
pub fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}
