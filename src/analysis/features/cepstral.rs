// Cepstral module - mel-frequency cepstral coefficients
//
// Pipeline per frame: pre-emphasized signal -> Hamming window -> power
// spectrum -> triangular mel filterbank (HTK mel scale) -> log -> DCT-II.
// c0 (frame log-energy) is dropped so loudness does not dominate the
// identity comparison; c1..cN are summarized as per-coefficient mean and
// population variance across frames.

use super::fft::{frame_count, next_pow2, FftProcessor, WindowKind};
use crate::error::ExtractionError;

/// Floor applied to mel band energies before the log
const ENERGY_FLOOR: f64 = 1e-10;

/// Lower edge of the mel filterbank in Hz
const MEL_LOW_HZ: f64 = 20.0;

/// Cepstral coefficient extractor with precomputed filterbank and DCT basis
pub struct CepstralFeatures {
    fft: FftProcessor,
    hop: usize,
    pre_emphasis: f32,
    /// `[mel_bands][num_bins]` triangular weights
    filterbank: Vec<Vec<f32>>,
    /// `[num_coefficients][mel_bands]` DCT-II rows for c1..cN
    dct: Vec<Vec<f32>>,
}

impl CepstralFeatures {
    /// Create a new cepstral extractor
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate of the normalized waveform
    /// * `frame_length` - Samples per frame
    /// * `hop` - Samples between frame starts
    /// * `mel_bands` - Number of triangular mel filters
    /// * `num_coefficients` - Number of coefficients kept (c1..cN)
    /// * `pre_emphasis` - First-order pre-emphasis coefficient (0 disables)
    pub fn new(
        sample_rate: u32,
        frame_length: usize,
        hop: usize,
        mel_bands: usize,
        num_coefficients: usize,
        pre_emphasis: f32,
    ) -> Self {
        let fft_size = next_pow2(frame_length);
        let fft = FftProcessor::new(fft_size, frame_length, WindowKind::Hamming);
        let filterbank = mel_filterbank(mel_bands, fft_size, sample_rate);
        let dct = dct_basis(num_coefficients, mel_bands);

        Self {
            fft,
            hop,
            pre_emphasis,
            filterbank,
            dct,
        }
    }

    pub fn num_coefficients(&self) -> usize {
        self.dct.len()
    }

    /// Length of the summarized cepstral sub-vector (means + variances)
    pub fn output_len(&self) -> usize {
        2 * self.num_coefficients()
    }

    /// Per-frame cepstral matrix `[num_frames][num_coefficients]`
    pub fn compute_frames(&self, samples: &[f32]) -> Result<Vec<Vec<f32>>, ExtractionError> {
        let frame_length = self.fft.frame_length();
        let num_frames = frame_count(samples.len(), frame_length, self.hop);
        if num_frames == 0 {
            return Err(ExtractionError::TooShortToFrame {
                analysis: "cepstral",
                samples: samples.len(),
                frame_length,
            });
        }

        let emphasized = pre_emphasize(samples, self.pre_emphasis);
        let mut log_mel = vec![0.0f32; self.filterbank.len()];

        let frames = (0..num_frames)
            .map(|i| {
                let start = i * self.hop;
                let power = self
                    .fft
                    .compute_power_spectrum(&emphasized[start..start + frame_length]);

                for (slot, filter) in log_mel.iter_mut().zip(&self.filterbank) {
                    let energy: f64 = filter
                        .iter()
                        .zip(&power)
                        .map(|(&w, &p)| w as f64 * p as f64)
                        .sum();
                    *slot = energy.max(ENERGY_FLOOR).ln() as f32;
                }

                self.dct
                    .iter()
                    .map(|row| row.iter().zip(&log_mel).map(|(&b, &m)| b * m).sum())
                    .collect()
            })
            .collect();

        Ok(frames)
    }

    /// Summarized cepstral sub-vector: `[means(N), variances(N)]`
    pub fn compute(&self, samples: &[f32]) -> Result<Vec<f32>, ExtractionError> {
        let frames = self.compute_frames(samples)?;
        Ok(mean_and_variance(&frames, self.num_coefficients()))
    }
}

/// First-order pre-emphasis: y[n] = x[n] - a * x[n-1]
pub fn pre_emphasize(samples: &[f32], coefficient: f32) -> Vec<f32> {
    if coefficient == 0.0 {
        return samples.to_vec();
    }
    let mut out = Vec::with_capacity(samples.len());
    let mut prev = 0.0f32;
    for &s in samples {
        out.push(s - coefficient * prev);
        prev = s;
    }
    out
}

/// Per-column mean followed by per-column population variance
fn mean_and_variance(frames: &[Vec<f32>], width: usize) -> Vec<f32> {
    let n = frames.len().max(1) as f64;
    let mut means = vec![0.0f64; width];
    for frame in frames {
        for (m, &v) in means.iter_mut().zip(frame) {
            *m += v as f64;
        }
    }
    for m in &mut means {
        *m /= n;
    }

    let mut variances = vec![0.0f64; width];
    for frame in frames {
        for ((var, &v), &mean) in variances.iter_mut().zip(frame).zip(&means) {
            let d = v as f64 - mean;
            *var += d * d;
        }
    }

    means
        .iter()
        .map(|&m| m as f32)
        .chain(variances.iter().map(|&v| (v / n) as f32))
        .collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank from 20 Hz to Nyquist, `[mel_bands][fft_size/2+1]`
fn mel_filterbank(mel_bands: usize, fft_size: usize, sample_rate: u32) -> Vec<Vec<f32>> {
    let num_bins = fft_size / 2 + 1;
    let nyquist = sample_rate as f64 / 2.0;
    let mel_low = hz_to_mel(MEL_LOW_HZ.min(nyquist));
    let mel_high = hz_to_mel(nyquist);

    let bin_indices: Vec<usize> = (0..mel_bands + 2)
        .map(|i| {
            let mel = mel_low + i as f64 * (mel_high - mel_low) / (mel_bands + 1) as f64;
            let bin = (mel_to_hz(mel) * fft_size as f64 / sample_rate as f64).floor() as isize;
            bin.clamp(0, num_bins as isize - 1) as usize
        })
        .collect();

    (0..mel_bands)
        .map(|m| {
            let mut filter = vec![0.0f32; num_bins];
            let (left, center, right) = (bin_indices[m], bin_indices[m + 1], bin_indices[m + 2]);

            if center > left {
                for (k, w) in filter.iter_mut().enumerate().take(center + 1).skip(left) {
                    *w = (k - left) as f32 / (center - left) as f32;
                }
            }
            if right > center {
                for (k, w) in filter.iter_mut().enumerate().take(right + 1).skip(center) {
                    *w = (right - k) as f32 / (right - center) as f32;
                }
            }
            filter
        })
        .collect()
}

/// Orthonormal DCT-II rows for coefficients 1..=num_coefficients
fn dct_basis(num_coefficients: usize, mel_bands: usize) -> Vec<Vec<f32>> {
    let n = mel_bands.max(1) as f64;
    let scale = (2.0 / n).sqrt();
    (1..=num_coefficients)
        .map(|k| {
            (0..mel_bands)
                .map(|m| {
                    let angle = std::f64::consts::PI * k as f64 * (m as f64 + 0.5) / n;
                    (scale * angle.cos()) as f32
                })
                .collect()
        })
        .collect()
}
