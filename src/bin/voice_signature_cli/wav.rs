// WAV decoding for the CLI harness
//
// Integer PCM is scaled to [-1, 1]; multichannel audio is downmixed by
// averaging the channels of each frame.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use voice_signature::Waveform;

pub fn load_wav(path: &Path) -> Result<Waveform> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(anyhow!("{} declares zero channels", path.display()));
    }

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f32>>>()?,
        hound::SampleFormat::Int => {
            let max = int_full_scale(spec.bits_per_sample).ok_or_else(|| {
                anyhow!(
                    "Unsupported bits per sample {} in {}",
                    spec.bits_per_sample,
                    path.display()
                )
            })?;
            reader
                .samples::<i32>()
                .map(|sample| {
                    sample
                        .map(|value| value as f32 / max)
                        .map_err(|err| anyhow!(err))
                })
                .collect::<Result<Vec<f32>>>()?
        }
    };

    let samples = downmix(&interleaved, spec.channels as usize);
    Ok(Waveform::new(samples, spec.sample_rate))
}

/// Largest positive sample value for a supported integer bit depth
fn int_full_scale(bits_per_sample: u16) -> Option<f32> {
    match bits_per_sample {
        8 | 16 | 24 | 32 => Some(((1i64 << (bits_per_sample - 1)) - 1) as f32),
        _ => None,
    }
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
