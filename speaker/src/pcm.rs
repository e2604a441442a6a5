use crate::error::SpeakerError;

/// Decodes raw PCM16 signed little-endian audio into normalized f32 samples.
///
/// Each int16 sample is divided by 32768.0, so i16::MIN maps to exactly
/// -1.0 and i16::MAX to just under +1.0. The divisor is 32768 rather than
/// 32767 to match the reference embedding model's input normalization;
/// the resulting asymmetry is intentional.
///
/// Sample rate and channel count are not encoded in raw PCM and are not
/// validated here. The embedding model assumes 16kHz mono.
///
/// Empty buffers and buffers with an odd byte count are rejected rather
/// than truncated, so a malformed upload surfaces as a clear input error
/// instead of a garbled embedding.
pub fn decode_pcm16(audio: &[u8]) -> Result<Vec<f32>, SpeakerError> {
    if audio.is_empty() {
        return Err(SpeakerError::EmptyAudio);
    }
    if audio.len() % 2 != 0 {
        return Err(SpeakerError::OddByteLength { len: audio.len() });
    }

    let n_samples = audio.len() / 2;
    let mut samples = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let lo = audio[2 * i];
        let hi = audio[2 * i + 1];
        let s = (lo as i16) | ((hi as i16) << 8);
        samples.push(s as f32 / 32768.0);
    }
    Ok(samples)
}
