//! Channel mixing utilities (multichannel to mono conversion)

use crate::error::AnalysisError;

/// Average interleaved multichannel samples down to mono
///
/// # Arguments
///
/// * `interleaved` - Interleaved samples (`frame0_ch0, frame0_ch1, ...`)
/// * `channels` - Number of interleaved channels
///
/// # Returns
///
/// One mono sample per frame. A trailing partial frame is dropped.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `channels` is zero
pub fn downmix(interleaved: &[f32], channels: usize) -> Result<Vec<f32>, AnalysisError> {
    match channels {
        0 => Err(AnalysisError::InvalidInput(
            "Channel count must be > 0".to_string(),
        )),
        1 => Ok(interleaved.to_vec()),
        _ => {
            log::debug!("Downmixing {} channels to mono", channels);
            let scale = 1.0 / channels as f32;
            Ok(interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() * scale)
                .collect())
        }
    }
}
