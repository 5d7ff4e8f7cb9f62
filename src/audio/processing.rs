use anyhow::Result;
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use crate::engine::PcmBuffer;

pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        params,
        samples.len(),
        1, // mono
    )?;

    let input = vec![samples.to_vec()];
    let output = resampler.process(&input, None)?;

    Ok(output.into_iter().next().unwrap_or_default())
}

/// Converts a channel-major buffer into the interleaved layout an output
/// device consumes: every channel resampled to `device_rate`, then mapped
/// onto `device_channels` (mono is copied to every device channel).
pub fn to_device_layout(buffer: &PcmBuffer, device_rate: u32, device_channels: u16) -> Result<Vec<f32>> {
    if buffer.is_empty() || device_channels == 0 {
        return Ok(Vec::new());
    }

    let resampled = buffer
        .channels
        .iter()
        .map(|channel| resample(channel, buffer.sample_rate, device_rate))
        .collect::<Result<Vec<_>>>()?;

    Ok(interleave(&resampled, device_channels as usize))
}

/// Device channel `c` takes source channel `c % source_channels`.
pub fn interleave(channels: &[Vec<f32>], device_channels: usize) -> Vec<f32> {
    if channels.is_empty() || device_channels == 0 {
        return Vec::new();
    }

    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * device_channels);
    for frame in 0..frames {
        for c in 0..device_channels {
            out.push(channels[c % channels.len()][frame]);
        }
    }
    out
}

/// Converts normalized samples back to 16-bit PCM, clamping out-of-range values.
pub fn to_i16(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
