// Spectral module - frequency-domain shape statistics
//
// This module computes per-frame spectral features from magnitude spectra
// and reduces them to frame means. Together they describe the coarse
// spectral envelope of a voice (brightness, spread, tonality).
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::types::SpectralSummary;
use crate::error::ExtractionError;

/// Frames with total magnitude below this are treated as silence
const SILENT_FRAME_MAGNITUDE: f32 = 1e-10;

/// Spectral feature computation functions
pub struct SpectralFeatures {
    sample_rate: u32,
    fft_size: usize,
    rolloff_fraction: f32,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_size` - FFT size the spectra were computed with
    /// * `rolloff_fraction` - Energy fraction below the rolloff (e.g. 0.85)
    pub fn new(sample_rate: u32, fft_size: usize, rolloff_fraction: f32) -> Self {
        Self {
            sample_rate,
            fft_size,
            rolloff_fraction,
        }
    }

    fn bin_width(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size as f32
    }

    /// Compute spectral centroid (weighted mean frequency)
    ///
    /// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
    ///
    /// # Returns
    /// Spectral centroid in Hz
    pub fn compute_centroid(&self, spectrum: &[f32]) -> f32 {
        let bin_width = self.bin_width();

        let weighted_sum: f32 = spectrum
            .iter()
            .enumerate()
            .map(|(i, &mag)| i as f32 * bin_width * mag)
            .sum();

        let magnitude_sum: f32 = spectrum.iter().sum();

        if magnitude_sum > SILENT_FRAME_MAGNITUDE {
            weighted_sum / magnitude_sum
        } else {
            0.0
        }
    }

    /// Compute spectral bandwidth (magnitude-weighted spread around the centroid)
    ///
    /// Formula: bandwidth = sqrt(Σ|X[i]| × (f_i − centroid)² / Σ|X[i]|)
    ///
    /// # Returns
    /// Spectral bandwidth in Hz
    pub fn compute_bandwidth(&self, spectrum: &[f32], centroid: f32) -> f32 {
        let bin_width = self.bin_width();
        let magnitude_sum: f32 = spectrum.iter().sum();
        if magnitude_sum <= SILENT_FRAME_MAGNITUDE {
            return 0.0;
        }

        let spread: f32 = spectrum
            .iter()
            .enumerate()
            .map(|(i, &mag)| {
                let d = i as f32 * bin_width - centroid;
                mag * d * d
            })
            .sum();

        (spread / magnitude_sum).sqrt()
    }

    /// Compute spectral flatness (tonality measure)
    ///
    /// Formula: flatness = geometric_mean(|X[i]|) / arithmetic_mean(|X[i]|)
    ///
    /// Returns value between 0 (tonal) and 1 (noise-like).
    pub fn compute_flatness(&self, spectrum: &[f32]) -> f32 {
        // Filter out zero or near-zero values for geometric mean
        let non_zero: Vec<f32> = spectrum
            .iter()
            .filter(|&&mag| mag > SILENT_FRAME_MAGNITUDE)
            .copied()
            .collect();

        if non_zero.is_empty() {
            return 0.0;
        }

        // Geometric mean: exp(mean(log(x)))
        let log_sum: f32 = non_zero.iter().map(|&mag| mag.ln()).sum();
        let geometric_mean = (log_sum / non_zero.len() as f32).exp();
        let arithmetic_mean: f32 = non_zero.iter().sum::<f32>() / non_zero.len() as f32;

        if arithmetic_mean > SILENT_FRAME_MAGNITUDE {
            (geometric_mean / arithmetic_mean).min(1.0)
        } else {
            0.0
        }
    }

    /// Compute spectral rolloff (frequency below which the configured
    /// fraction of spectral energy is contained)
    ///
    /// # Returns
    /// Rolloff frequency in Hz
    pub fn compute_rolloff(&self, spectrum: &[f32]) -> f32 {
        let total_energy: f32 = spectrum.iter().map(|&mag| mag * mag).sum();

        if total_energy < SILENT_FRAME_MAGNITUDE {
            return 0.0;
        }

        let threshold = self.rolloff_fraction * total_energy;
        let bin_width = self.bin_width();

        let mut cumulative_energy = 0.0;
        for (i, &mag) in spectrum.iter().enumerate() {
            cumulative_energy += mag * mag;
            if cumulative_energy >= threshold {
                return i as f32 * bin_width;
            }
        }

        // If we reach here, return Nyquist frequency
        (spectrum.len() - 1) as f32 * bin_width
    }

    /// Reduce per-frame magnitude spectra to frame-mean statistics
    ///
    /// Silent frames (zero padding) are skipped so padding does not drag the
    /// means toward zero.
    ///
    /// # Errors
    /// `NoSignal` when every frame is silent
    pub fn summarize(&self, spectra: &[Vec<f32>]) -> Result<SpectralSummary, ExtractionError> {
        let mut sums = [0.0f64; 4];
        let mut voiced_frames = 0usize;

        for spectrum in spectra {
            let magnitude_sum: f32 = spectrum.iter().sum();
            if magnitude_sum <= SILENT_FRAME_MAGNITUDE {
                continue;
            }
            let centroid = self.compute_centroid(spectrum);
            sums[0] += centroid as f64;
            sums[1] += self.compute_rolloff(spectrum) as f64;
            sums[2] += self.compute_bandwidth(spectrum, centroid) as f64;
            sums[3] += self.compute_flatness(spectrum) as f64;
            voiced_frames += 1;
        }

        if voiced_frames == 0 {
            return Err(ExtractionError::NoSignal {
                analysis: "spectral",
            });
        }

        let n = voiced_frames as f64;
        Ok(SpectralSummary {
            centroid: (sums[0] / n) as f32,
            rolloff: (sums[1] / n) as f32,
            bandwidth: (sums[2] / n) as f32,
            flatness: (sums[3] / n) as f32,
        })
    }
}
