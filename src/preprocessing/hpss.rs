//! Harmonic-percussive source separation (HPSS)
//!
//! Separates the sustained (harmonic) part of a signal from transients so that
//! drums do not smear the pitch-class profile.
//!
//! Algorithm:
//! 1. STFT with a periodic Hann window (centred frames)
//! 2. Median filter the magnitude across time (harmonic estimate) and across
//!    frequency (percussive estimate)
//! 3. Soft Wiener mask: `H^p / (H^p + P^p)`
//! 4. Inverse STFT of the masked spectrum with window-square normalisation
//!
//! # Reference
//!
//! Fitzgerald, D. (2010). Harmonic/Percussive Separation using Median Filtering.
//! *Proceedings of the 13th International Conference on Digital Audio Effects (DAFx-10)*.

use rustfft::{num_complex::Complex32, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::dsp::periodic_hann;
use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// HPSS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpssConfig {
    /// STFT frame size (default: 2048)
    pub frame_size: usize,

    /// STFT hop size (default: 512)
    pub hop_size: usize,

    /// Median filter length in frames and in bins (default: 31)
    pub kernel_size: usize,

    /// Soft mask exponent (default: 2.0)
    pub mask_power: f32,
}

impl Default for HpssConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            kernel_size: 31,
            mask_power: 2.0,
        }
    }
}

/// Decompose a magnitude spectrogram into harmonic and percussive estimates
///
/// # Arguments
///
/// * `magnitude_spec` - Magnitude spectrogram, `[frame][bin]`
/// * `kernel_size` - Median filter length (frames for harmonic, bins for percussive)
///
/// # Returns
///
/// Tuple of (harmonic, percussive) spectrograms with the input's shape
pub fn hpss_decompose(
    magnitude_spec: &[Vec<f32>],
    kernel_size: usize,
) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>), AnalysisError> {
    if kernel_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "HPSS kernel size must be > 0".to_string(),
        ));
    }

    let n_frames = magnitude_spec.len();
    let n_bins = magnitude_spec.first().map_or(0, Vec::len);
    if magnitude_spec.iter().any(|frame| frame.len() != n_bins) {
        return Err(AnalysisError::InvalidInput(
            "Spectrogram frames must all have the same number of bins".to_string(),
        ));
    }

    log::debug!(
        "Decomposing spectrogram with HPSS: {} frames x {} bins, kernel {}",
        n_frames,
        n_bins,
        kernel_size
    );

    let half = kernel_size / 2;
    let mut scratch = Vec::with_capacity(kernel_size);

    // Harmonic: median along time for each bin
    let mut harmonic = vec![vec![0.0f32; n_bins]; n_frames];
    for bin in 0..n_bins {
        for t in 0..n_frames {
            let lo = t.saturating_sub(half);
            let hi = (t + half + 1).min(n_frames);
            scratch.clear();
            scratch.extend((lo..hi).map(|i| magnitude_spec[i][bin]));
            harmonic[t][bin] = median(&mut scratch);
        }
    }

    // Percussive: median along frequency for each frame
    let mut percussive = vec![vec![0.0f32; n_bins]; n_frames];
    for (t, frame) in magnitude_spec.iter().enumerate() {
        for bin in 0..n_bins {
            let lo = bin.saturating_sub(half);
            let hi = (bin + half + 1).min(n_bins);
            scratch.clear();
            scratch.extend_from_slice(&frame[lo..hi]);
            percussive[t][bin] = median(&mut scratch);
        }
    }

    Ok((harmonic, percussive))
}

/// Extract the harmonic component of a mono signal
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `config` - HPSS configuration
///
/// # Returns
///
/// Harmonic signal with the same length as `samples`
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the STFT parameters are invalid
pub fn harmonic_component(samples: &[f32], config: &HpssConfig) -> Result<Vec<f32>, AnalysisError> {
    let n_fft = config.frame_size;
    let hop = config.hop_size;

    if n_fft < 2 || hop == 0 || hop > n_fft {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid HPSS STFT parameters: frame_size={}, hop_size={}",
            n_fft, hop
        )));
    }

    if samples.is_empty() {
        return Ok(Vec::new());
    }

    log::debug!(
        "Extracting harmonic component: {} samples, frame={}, hop={}",
        samples.len(),
        n_fft,
        hop
    );

    let window = periodic_hann(n_fft);
    let pad = n_fft / 2;
    let n_frames = 1 + samples.len() / hop;
    let n_bins = n_fft / 2 + 1;

    let mut planner = FftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(n_fft);
    let inverse = planner.plan_fft_inverse(n_fft);

    // Step 1: STFT (centred frames, zero padded)
    let mut spectra = Vec::with_capacity(n_frames);
    for t in 0..n_frames {
        let mut frame: Vec<Complex32> = (0..n_fft)
            .map(|i| {
                let idx = (t * hop + i) as isize - pad as isize;
                let x = if idx >= 0 && (idx as usize) < samples.len() {
                    samples[idx as usize]
                } else {
                    0.0
                };
                Complex32::new(x * window[i], 0.0)
            })
            .collect();
        forward.process(&mut frame);
        spectra.push(frame);
    }

    let magnitude: Vec<Vec<f32>> = spectra
        .iter()
        .map(|frame| frame[..n_bins].iter().map(|c| c.norm()).collect())
        .collect();

    // Step 2: median filtering
    let (harmonic, percussive) = hpss_decompose(&magnitude, config.kernel_size)?;

    // Step 3: soft mask, applied symmetrically to keep the spectrum Hermitian
    for (t, frame) in spectra.iter_mut().enumerate() {
        for bin in 0..n_bins {
            let h = harmonic[t][bin].powf(config.mask_power);
            let p = percussive[t][bin].powf(config.mask_power);
            let denom = h + p;
            let mask = if denom > EPSILON { h / denom } else { 0.5 };

            frame[bin] *= mask;
            let mirror = n_fft - bin;
            if bin > 0 && mirror > bin && mirror < n_fft {
                frame[mirror] *= mask;
            }
        }
    }

    // Step 4: inverse STFT with overlap-add
    let padded_len = samples.len() + 2 * pad;
    let mut output = vec![0.0f32; padded_len + n_fft];
    let mut window_sum = vec![0.0f32; padded_len + n_fft];
    let scale = 1.0 / n_fft as f32;

    for (t, frame) in spectra.iter_mut().enumerate() {
        inverse.process(frame);
        let offset = t * hop;
        for i in 0..n_fft {
            output[offset + i] += frame[i].re * scale * window[i];
            window_sum[offset + i] += window[i] * window[i];
        }
    }

    Ok((0..samples.len())
        .map(|i| {
            let ws = window_sum[i + pad];
            if ws > EPSILON {
                output[i + pad] / ws
            } else {
                0.0
            }
        })
        .collect())
}

/// Median of `values` (upper median for even lengths); reorders the slice
fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mid = values.len() / 2;
    let (_, m, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    *m
}
