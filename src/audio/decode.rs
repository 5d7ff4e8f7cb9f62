use base64::{engine::general_purpose, Engine as _};

use crate::engine::{PcmBuffer, SpeechError};

/// Decode a base64 payload of little-endian signed 16-bit PCM into a
/// channel-major buffer normalized to [-1.0, 1.0].
pub fn decode_base64_pcm(
    payload: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<PcmBuffer, SpeechError> {
    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| SpeechError::Decode(e.to_string()))?;
    decode_pcm_i16(&bytes, sample_rate, channels)
}

/// Samples are assembled pairwise with `i16::from_le_bytes`, so the source
/// slice never has to be 2-byte aligned. A trailing odd byte is ignored.
pub fn decode_pcm_i16(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<PcmBuffer, SpeechError> {
    if channels == 0 {
        return Err(SpeechError::Decode("channel count must be at least 1".into()));
    }
    if bytes.len() % 2 != 0 {
        tracing::debug!("PCM payload has odd length {}, dropping last byte", bytes.len());
    }

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let num_channels = channels as usize;
    let frame_count = samples.len() / num_channels;

    let channel_data = (0..num_channels)
        .map(|channel| {
            (0..frame_count)
                .map(|i| samples[i * num_channels + channel] as f32 / 32768.0)
                .collect()
        })
        .collect();

    tracing::debug!(
        "Decoded {} frames x {} channel(s) at {}Hz",
        frame_count,
        num_channels,
        sample_rate
    );

    Ok(PcmBuffer {
        sample_rate,
        channels: channel_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_bytes(values: &[i16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn normalizes_known_values() {
        let bytes = le_bytes(&[0, 16384, -32768, 32767]);
        let buffer = decode_pcm_i16(&bytes, 24_000, 1).unwrap();

        assert_eq!(buffer.sample_rate, 24_000);
        assert_eq!(buffer.channel_count(), 1);
        let expected = [0.0f32, 0.5, -1.0, 0.999_969];
        for (got, want) in buffer.channels[0].iter().zip(expected) {
            assert!((got - want).abs() < 1e-5, "{got} != {want}");
        }
    }

    #[test]
    fn deinterleaves_stereo() {
        let bytes = le_bytes(&[16384, -16384, 8192, -8192, 0]);
        let buffer = decode_pcm_i16(&bytes, 24_000, 2).unwrap();

        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.channels[0], vec![0.5, 0.25]);
        assert_eq!(buffer.channels[1], vec![-0.5, -0.25]);
    }

    #[test]
    fn unaligned_slice_decodes_like_aligned_copy() {
        let mut backing = vec![0xAAu8];
        backing.extend(le_bytes(&[16384, -32768]));
        let unaligned = &backing[1..];

        let buffer = decode_pcm_i16(unaligned, 24_000, 1).unwrap();
        assert_eq!(buffer.channels[0], vec![0.5, -1.0]);
    }

    #[test]
    fn odd_trailing_byte_is_ignored() {
        let mut bytes = le_bytes(&[16384]);
        bytes.push(0x7F);
        let buffer = decode_pcm_i16(&bytes, 24_000, 1).unwrap();
        assert_eq!(buffer.channels[0], vec![0.5]);
    }

    #[test]
    fn decodes_base64_payload() {
        // [0, 16384] little-endian
        let buffer = decode_base64_pcm("AAAAQA==", 24_000, 1).unwrap();
        assert_eq!(buffer.channels[0], vec![0.0, 0.5]);
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            decode_base64_pcm("not base64!", 24_000, 1),
            Err(SpeechError::Decode(_))
        ));
    }
}
