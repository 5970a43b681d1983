//! Shared DSP helpers

/// Periodic Hann window of length `n`
///
/// `w[i] = 0.5 - 0.5 * cos(2πi / n)`, the DFT-even form used for STFT frames and
/// spectral kernels.
pub(crate) fn periodic_hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos())
        .collect()
}
