// Phase module - unwrapped-phase continuity statistics
//
// For each STFT bin the phase track is demodulated by the bin-centre
// advance (2π·k·hop/N per frame), unwrapped along time, and differenced
// twice. The first difference is the partial's frequency offset from the
// bin centre; the second is how abruptly that offset changes. Natural
// speech keeps it small between hops, vocoder and stitched output jumps.
//
// Only bins within DYNAMIC_RANGE_DB of the loudest bin count, each weighted
// by its weakest magnitude over the frames involved. Noise-floor bins carry
// uniformly random phase and would otherwise swamp the voiced partials.

use rustfft::num_complex::Complex;
use std::f64::consts::PI;

use super::types::PhaseSummary;

/// Minimum number of STFT frames needed for a second difference
pub const MIN_FRAMES: usize = 3;

/// Bins further than this below the STFT peak are ignored
pub const DYNAMIC_RANGE_DB: f32 = 50.0;

/// Unwrap a phase track in place (numpy `unwrap` semantics, period 2π)
///
/// Consecutive jumps larger than π are shifted by multiples of 2π so the
/// track becomes continuous.
pub fn unwrap_phase(phase: &mut [f64]) {
    let mut correction = 0.0;
    let mut prev_raw = match phase.first() {
        Some(&p) => p,
        None => return,
    };

    for p in phase.iter_mut().skip(1) {
        let raw = *p;
        let d = raw - prev_raw;
        let mut wrapped = (d + PI).rem_euclid(2.0 * PI) - PI;
        if wrapped == -PI && d > 0.0 {
            wrapped = PI;
        }
        if d.abs() >= PI {
            correction += wrapped - d;
        }
        *p = raw + correction;
        prev_raw = raw;
    }
}

/// Running magnitude-weighted mean and spread
#[derive(Default)]
struct Weighted {
    sum: f64,
    sum_sq: f64,
    weight: f64,
}

impl Weighted {
    fn add(&mut self, weight: f32, value: f64) {
        let w = weight as f64;
        self.sum += w * value;
        self.sum_sq += w * value * value;
        self.weight += w;
    }

    fn mean(&self) -> f64 {
        self.sum / self.weight
    }

    fn std(&self) -> f64 {
        let mean = self.mean();
        (self.sum_sq / self.weight - mean * mean).max(0.0).sqrt()
    }
}

/// Summarize phase continuity over an STFT (`[frames][bins]`)
///
/// # Arguments
/// * `spectra` - Complex spectra, one per frame
/// * `hop` - Samples between frame starts
/// * `fft_size` - FFT size the spectra were computed with
///
/// Returns `None` when there are fewer than [`MIN_FRAMES`] frames or no
/// bin rises above the dynamic-range floor.
pub fn summarize(
    spectra: &[Vec<Complex<f32>>],
    hop: usize,
    fft_size: usize,
) -> Option<PhaseSummary> {
    if spectra.len() < MIN_FRAMES || fft_size == 0 {
        return None;
    }
    let num_bins = spectra.iter().map(Vec::len).min().unwrap_or(0);

    let peak = spectra
        .iter()
        .flat_map(|frame| frame[..num_bins].iter().map(|c| c.norm()))
        .fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return None;
    }
    let floor = peak * 10f32.powf(-DYNAMIC_RANGE_DB / 20.0);

    let mut track = vec![0.0f64; spectra.len()];
    let mut magnitudes = vec![0.0f32; spectra.len()];
    let mut d1 = Weighted::default();
    let mut d2 = Weighted::default();

    for bin in 0..num_bins {
        let advance = 2.0 * PI * bin as f64 * hop as f64 / fft_size as f64;
        for (t, frame) in spectra.iter().enumerate() {
            let c = frame[bin];
            magnitudes[t] = c.norm();
            track[t] = (c.im as f64).atan2(c.re as f64) - advance * t as f64;
        }
        unwrap_phase(&mut track);

        for t in 0..track.len() - 1 {
            let weight = magnitudes[t].min(magnitudes[t + 1]);
            if weight >= floor {
                d1.add(weight, (track[t + 1] - track[t]).abs());
            }
        }
        for t in 0..track.len() - 2 {
            let weight = magnitudes[t].min(magnitudes[t + 1]).min(magnitudes[t + 2]);
            if weight >= floor {
                d2.add(weight, (track[t + 2] - 2.0 * track[t + 1] + track[t]).abs());
            }
        }
    }

    if d2.weight <= 0.0 {
        return None;
    }

    Some(PhaseSummary {
        discontinuity: d2.mean() as f32,
        discontinuity_std: d2.std() as f32,
        unwrapped_derivative_mean: d1.mean() as f32,
    })
}
