// Jitter module - pitch-period irregularity
//
// Estimates the fundamental period of each analysis window from the peak of
// its normalized autocorrelation, then reports local jitter: the mean
// absolute difference between consecutive voiced periods divided by the
// mean period. The value is informational and carries no decision weight.

use super::fft::frame_starts;
use crate::error::ExtractionError;

/// Candidate peaks within this fraction of the best peak are considered,
/// and the shortest lag among them wins (avoids octave errors)
const PEAK_TOLERANCE: f32 = 0.9;

/// Autocorrelation pitch tracker
pub struct JitterEstimator {
    sample_rate: u32,
    window: usize,
    hop: usize,
    lag_min: usize,
    lag_max: usize,
    voicing_threshold: f32,
}

impl JitterEstimator {
    /// Create a new jitter estimator
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `window` - Analysis window length in samples
    /// * `hop` - Samples between windows
    /// * `pitch_min_hz` / `pitch_max_hz` - Pitch search range
    /// * `voicing_threshold` - Minimum normalized peak for a voiced window
    pub fn new(
        sample_rate: u32,
        window: usize,
        hop: usize,
        pitch_min_hz: f32,
        pitch_max_hz: f32,
        voicing_threshold: f32,
    ) -> Self {
        let sr = sample_rate as f32;
        let lag_min = ((sr / pitch_max_hz.max(1.0)).floor() as usize).max(2);
        let lag_max = ((sr / pitch_min_hz.max(1.0)).ceil() as usize)
            .min(window.saturating_sub(2))
            .max(lag_min);

        Self {
            sample_rate,
            window,
            hop,
            lag_min,
            lag_max,
            voicing_threshold,
        }
    }

    /// Pitch period in seconds for one window, or `None` if unvoiced
    pub fn estimate_period(&self, frame: &[f32]) -> Option<f32> {
        // r[i] holds the correlation at lag (lag_min - 1 + i)
        let first_lag = self.lag_min - 1;
        let r: Vec<f32> = (first_lag..=self.lag_max + 1)
            .map(|lag| normalized_autocorrelation(frame, lag))
            .collect();

        let best = r[1..r.len() - 1].iter().cloned().fold(f32::MIN, f32::max);
        if best < self.voicing_threshold {
            return None;
        }

        // shortest local peak close to the best one
        let i = (1..r.len() - 1)
            .find(|&i| r[i] >= PEAK_TOLERANCE * best && r[i] >= r[i - 1] && r[i] >= r[i + 1])?;

        // parabolic interpolation around the peak
        let (a, b, c) = (r[i - 1], r[i], r[i + 1]);
        let denom = a - 2.0 * b + c;
        let offset = if denom.abs() > f32::EPSILON {
            (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        };

        let lag = (first_lag + i) as f32 + offset;
        Some(lag / self.sample_rate as f32)
    }

    /// Per-window pitch periods (`None` for unvoiced windows)
    pub fn track(&self, samples: &[f32]) -> Vec<Option<f32>> {
        frame_starts(samples.len(), self.window, self.hop)
            .map(|start| self.estimate_period(&samples[start..start + self.window]))
            .collect()
    }

    /// Local jitter over the waveform (0.0 with fewer than two voiced windows)
    pub fn compute(&self, samples: &[f32]) -> Result<f32, ExtractionError> {
        if samples.len() < self.window {
            return Err(ExtractionError::TooShortToFrame {
                analysis: "jitter",
                samples: samples.len(),
                frame_length: self.window,
            });
        }

        let periods = self.track(samples);
        Ok(local_jitter(&periods))
    }
}

/// Mean |P_i - P_{i-1}| over adjacent voiced windows, divided by mean period
pub fn local_jitter(periods: &[Option<f32>]) -> f32 {
    let voiced: Vec<f32> = periods.iter().flatten().copied().collect();
    if voiced.len() < 2 {
        return 0.0;
    }

    let diffs: Vec<f32> = periods
        .windows(2)
        .filter_map(|w| match (w[0], w[1]) {
            (Some(a), Some(b)) => Some((b - a).abs()),
            _ => None,
        })
        .collect();
    if diffs.is_empty() {
        return 0.0;
    }

    let mean_period = voiced.iter().sum::<f32>() / voiced.len() as f32;
    let mean_diff = diffs.iter().sum::<f32>() / diffs.len() as f32;
    if mean_period > 0.0 {
        mean_diff / mean_period
    } else {
        0.0
    }
}

/// Autocorrelation at `lag` normalized by the energies of both segments
fn normalized_autocorrelation(frame: &[f32], lag: usize) -> f32 {
    if lag >= frame.len() {
        return 0.0;
    }
    let (head, tail) = (&frame[..frame.len() - lag], &frame[lag..]);
    let mut cross = 0.0f32;
    let mut e_head = 0.0f32;
    let mut e_tail = 0.0f32;
    for (&x, &y) in head.iter().zip(tail) {
        cross += x * y;
        e_head += x * x;
        e_tail += y * y;
    }
    let denom = (e_head * e_tail).sqrt();
    if denom > 1e-12 {
        cross / denom
    } else {
        0.0
    }
}
