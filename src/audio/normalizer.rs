// WaveformNormalizer - fixed rate, fixed length waveforms
//
// Every waveform entering the feature extractor has exactly
// target_sample_rate × target_duration samples. Unusable input (empty,
// non-finite, too short, silent) is rejected here so extraction never sees
// it.

use crate::audio::{resample, rms, Waveform};
use crate::config::{NormalizerConfig, TrimStrategy};
use crate::error::AudioError;

/// Overlap between candidate windows when scanning for the loudest segment
const LOUDEST_SCAN_OVERLAP: f32 = 0.3;

/// Trims/pads decoded audio to the configured rate and duration
#[derive(Debug, Clone)]
pub struct WaveformNormalizer {
    config: NormalizerConfig,
}

impl WaveformNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Number of samples in every normalized waveform
    pub fn target_len(&self) -> usize {
        self.config.target_len()
    }

    /// Normalize a decoded mono waveform
    ///
    /// # Returns
    /// * `Ok(Waveform)` - exactly `target_len()` samples at the target rate
    /// * `Err(AudioError)` - input empty, non-finite, too short or silent
    pub fn normalize(&self, input: &Waveform) -> Result<Waveform, AudioError> {
        self.validate(input)?;

        let target_rate = self.config.target_sample_rate;
        let resampled = resample::resample_mono(&input.samples, input.sample_rate, target_rate)?;

        let samples = match self.config.trim {
            TrimStrategy::Center => fit_centered(&resampled, self.target_len()),
            TrimStrategy::Loudest => fit_loudest(&resampled, self.target_len()),
        };
        // Trimmed input: the kept window must carry signal as well
        if samples.len() < resampled.len() {
            self.check_level(rms(&samples))?;
        }

        tracing::debug!(
            input_rate = input.sample_rate,
            input_len = input.len(),
            output_len = samples.len(),
            "normalized waveform"
        );

        Ok(Waveform::new(samples, target_rate))
    }

    fn validate(&self, input: &Waveform) -> Result<(), AudioError> {
        if input.is_empty() {
            return Err(AudioError::Empty);
        }
        if input.sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate {
                sample_rate: input.sample_rate,
            });
        }
        if let Some(index) = input.samples.iter().position(|s| !s.is_finite()) {
            return Err(AudioError::NonFinite { index });
        }

        let duration_secs = input.duration_secs();
        if duration_secs < self.config.min_duration_secs {
            return Err(AudioError::TooShort {
                duration_secs,
                min_secs: self.config.min_duration_secs,
            });
        }

        self.check_level(input.rms())
    }

    fn check_level(&self, level: f32) -> Result<(), AudioError> {
        if level < self.config.silence_rms_floor {
            return Err(AudioError::Silent {
                rms: level,
                floor: self.config.silence_rms_floor,
            });
        }
        Ok(())
    }
}

/// Take the middle `target_len` samples, or zero-pad evenly (extra on the right)
fn fit_centered(samples: &[f32], target_len: usize) -> Vec<f32> {
    if samples.len() >= target_len {
        let start = (samples.len() - target_len) / 2;
        return samples[start..start + target_len].to_vec();
    }

    let padding = target_len - samples.len();
    let pad_left = padding / 2;
    let mut out = vec![0.0f32; target_len];
    out[pad_left..pad_left + samples.len()].copy_from_slice(samples);
    out
}

/// Keep the highest-energy `target_len` window; short input is centered
fn fit_loudest(samples: &[f32], target_len: usize) -> Vec<f32> {
    if samples.len() <= target_len {
        return fit_centered(samples, target_len);
    }

    let hop = ((target_len as f32 * (1.0 - LOUDEST_SCAN_OVERLAP)) as usize).max(1);
    let mut starts: Vec<usize> = (0..=samples.len() - target_len).step_by(hop).collect();
    // Always consider the tail window so the end of the recording is reachable.
    let last = samples.len() - target_len;
    if starts.last() != Some(&last) {
        starts.push(last);
    }

    let mut best_start = 0;
    let mut best_energy = f32::MIN;
    for start in starts {
        let energy = rms(&samples[start..start + target_len]);
        if energy > best_energy {
            best_energy = energy;
            best_start = start;
        }
    }

    samples[best_start..best_start + target_len].to_vec()
}
