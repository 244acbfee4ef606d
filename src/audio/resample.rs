// Resample - mono sample rate conversion for the waveform normalizer
//
// Wraps rubato's synchronous FFT resampler. Input is fed in fixed-size
// chunks with trailing zeros until the resampler has produced its delay
// plus the expected number of output frames; the delay is then dropped so
// the output is time-aligned with the input.

use rubato::{FftFixedIn, Resampler};

use crate::error::AudioError;

/// Input frames per resampler call
const CHUNK: usize = 1024;

/// FFT sub-chunks per chunk
const SUB_CHUNKS: usize = 2;

/// Resample mono audio from `sr_in` to `sr_out`
///
/// Output length is `round(input.len() * sr_out / sr_in)`. Same-rate input
/// is returned unchanged.
pub fn resample_mono(input: &[f32], sr_in: u32, sr_out: u32) -> Result<Vec<f32>, AudioError> {
    if sr_in == 0 {
        return Err(AudioError::InvalidSampleRate { sample_rate: sr_in });
    }
    if sr_out == 0 {
        return Err(AudioError::InvalidSampleRate {
            sample_rate: sr_out,
        });
    }
    if sr_in == sr_out || input.is_empty() {
        return Ok(input.to_vec());
    }

    let mut resampler =
        FftFixedIn::<f32>::new(sr_in as usize, sr_out as usize, CHUNK, SUB_CHUNKS, 1)?;

    let expected_len = (input.len() as f64 * sr_out as f64 / sr_in as f64).round() as usize;
    let delay = resampler.output_delay();
    let needed = expected_len + delay;
    let mut out = Vec::with_capacity(needed + CHUNK);

    let mut pos = 0;
    while out.len() < needed {
        let frames_in = resampler.input_frames_next();
        let mut chunk = vec![0.0f32; frames_in];
        if pos < input.len() {
            let end = (pos + frames_in).min(input.len());
            chunk[..end - pos].copy_from_slice(&input[pos..end]);
        }
        pos += frames_in;

        let block = vec![chunk];
        let frames = resampler.process(&block, None)?;
        if frames[0].is_empty() {
            return Err(AudioError::ResampleFailed {
                reason: "resampler produced no output".to_string(),
            });
        }
        out.extend_from_slice(&frames[0]);
    }

    Ok(out[delay..needed].to_vec())
}
