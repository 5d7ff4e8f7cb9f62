use std::path::Path;

use anyhow::{Context, Result};

use crate::engine::PcmBuffer;

/// Writes the buffer as a 16-bit PCM WAV file at its own rate and channel count.
pub fn write_wav(buffer: &PcmBuffer, path: &Path) -> Result<()> {
    if buffer.channel_count() == 0 {
        anyhow::bail!("Cannot write a WAV file with no channels");
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for frame in 0..buffer.frame_count() {
        for channel in &buffer.channels {
            writer.write_sample(super::processing::to_i16(channel[frame]))?;
        }
    }
    writer.finalize()?;

    tracing::info!(
        "Wrote {} ({} frames, {:.2}s)",
        path.display(),
        buffer.frame_count(),
        buffer.duration().as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hello.wav");
        let buffer = PcmBuffer {
            sample_rate: 24_000,
            channels: vec![vec![0.0, 0.5, -1.0]],
        };

        write_wav(&buffer, &path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24_000);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16384, -32768]);
    }
}
