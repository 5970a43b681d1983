//! Sample rate conversion using rubato

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::window::{time_to_samples, AnalysisWindow};
use crate::error::AnalysisError;

/// Input kept on each side of a window before resampling, in seconds
///
/// Covers the sinc filter's support so samples inside the window are not
/// affected by the clip edges.
const WINDOW_MARGIN_SECONDS: f64 = 0.05;

/// Resample mono audio from `from_rate` to `to_rate`
///
/// Uses a band-limited sinc resampler over the whole signal as a single chunk.
/// The resampler's group delay is removed so the output stays time-aligned
/// with the input.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for zero sample rates and
/// `AnalysisError::ResampleError` if rubato fails
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AnalysisError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid sample rates for resampling: {} -> {}",
            from_rate, to_rate
        )));
    }

    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    log::debug!(
        "Resampling {} samples: {} Hz -> {} Hz",
        samples.len(),
        from_rate,
        to_rate
    );

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, samples.len(), 1)
        .map_err(|e| AnalysisError::ResampleError(e.to_string()))?;

    let delay = resampler.output_delay();
    let input = [samples];
    let mut output = resampler
        .process(&input[..], None)
        .map_err(|e| AnalysisError::ResampleError(e.to_string()))?
        .remove(0);

    // Flush the delay line
    let tail = resampler
        .process_partial::<Vec<f32>>(None, None)
        .map_err(|e| AnalysisError::ResampleError(e.to_string()))?
        .remove(0);
    output.extend(tail);

    let expected_len = (samples.len() as f64 * ratio).round() as usize;
    Ok(output.into_iter().skip(delay).take(expected_len).collect())
}

/// Resample only the part of `samples` covered by `window`
///
/// The window is resolved at `from_rate`, widened by a short margin, resampled,
/// and the margin is trimmed again at `to_rate`. Cost scales with the window
/// length instead of the whole signal.
///
/// # Errors
///
/// Returns `AnalysisError::EmptyWindow` if the window contains no samples,
/// otherwise the same as [`resample`]
pub fn resample_window(
    samples: &[f32],
    from_rate: u32,
    to_rate: u32,
    window: &AnalysisWindow,
) -> Result<Vec<f32>, AnalysisError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid sample rates for resampling: {} -> {}",
            from_rate, to_rate
        )));
    }

    let (start, end) = window.sample_range(from_rate, samples.len());
    if start == end {
        return Err(AnalysisError::EmptyWindow { start, end });
    }

    // Whole periods of the rate ratio keep the clip on the full signal's output grid
    let period = (from_rate / gcd(from_rate, to_rate)) as usize;
    let margin = time_to_samples(WINDOW_MARGIN_SECONDS, from_rate).div_ceil(period) * period;
    let lo = start.saturating_sub(margin);
    let hi = (end + margin).min(samples.len());
    let resampled = resample(&samples[lo..hi], from_rate, to_rate)?;

    let ratio = to_rate as f64 / from_rate as f64;
    let skip = (((start - lo) as f64 * ratio).round() as usize).min(resampled.len());
    let keep = ((end - start) as f64 * ratio).round() as usize;
    let stop = (skip + keep).min(resampled.len());
    if skip == stop {
        return Err(AnalysisError::EmptyWindow { start, end });
    }

    log::debug!(
        "Resampled window [{}, {}) with margin [{}, {}) to {} samples",
        start,
        end,
        lo,
        hi,
        stop - skip
    );

    Ok(resampled[skip..stop].to_vec())
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
