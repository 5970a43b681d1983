//! Constant-Q transform
//!
//! Log-frequency magnitude spectrogram with a fixed number of bins per octave.
//!
//! Algorithm:
//! 1. Build one kernel per bin of the top octave: a Hann-windowed complex
//!    exponential of length `Q * sr / f`, L1-normalised
//! 2. Transform the kernels to the frequency domain once and drop the smallest
//!    coefficients (sparse spectral kernels)
//! 3. For each octave, from the top down: FFT centred frames of the signal,
//!    take the inner product with every spectral kernel, then low-pass and
//!    decimate the signal by 2 and halve the hop for the next octave
//!
//! Because frequency and sample rate halve together, the same kernel set serves
//! every octave.
//!
//! # Reference
//!
//! Brown, J. C., & Puckette, M. S. (1992). An efficient algorithm for the calculation
//! of a constant Q transform. *The Journal of the Acoustical Society of America*,
//! 92(5), 2698-2701.

use std::sync::Arc;

use rustfft::{num_complex::Complex32, Fft, FftPlanner};

use crate::dsp::periodic_hann;
use crate::error::AnalysisError;

/// Equivalent noise bandwidth of the Hann window, in bins
const HANN_BANDWIDTH: f32 = 1.500_18;

/// Taps of the decimation low-pass filter
const LOWPASS_TAPS: usize = 127;

/// Low-pass cutoff in cycles per input sample (new Nyquist is 0.25)
const LOWPASS_CUTOFF: f32 = 0.24;

/// Non-zero coefficients of one spectral kernel
#[derive(Debug, Clone)]
struct SparseKernel {
    coefficients: Vec<(usize, Complex32)>,
}

impl SparseKernel {
    fn apply(&self, spectrum: &[Complex32]) -> f32 {
        self.coefficients
            .iter()
            .map(|&(j, k)| spectrum[j] * k)
            .sum::<Complex32>()
            .norm()
    }
}

/// Constant-Q kernel bank for one sample rate
pub struct ConstantQ {
    bins_per_octave: usize,
    n_octaves: usize,
    hop_size: usize,
    n_fft: usize,
    fft: Arc<dyn Fft<f32>>,
    kernels: Vec<SparseKernel>,
    lowpass: Vec<f32>,
}

impl std::fmt::Debug for ConstantQ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantQ")
            .field("bins_per_octave", &self.bins_per_octave)
            .field("n_octaves", &self.n_octaves)
            .field("hop_size", &self.hop_size)
            .field("n_fft", &self.n_fft)
            .finish()
    }
}

impl ConstantQ {
    /// Build the kernel bank
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `fmin` - Centre frequency of the lowest bin in Hz
    /// * `bins_per_octave` - Frequency resolution
    /// * `n_octaves` - Requested octave count; reduced if the top octave would
    ///   exceed the Nyquist frequency
    /// * `hop_size` - Hop between frames at the input rate; must be divisible by
    ///   `2^(n_octaves - 1)` after any reduction
    /// * `filter_scale` - Kernel length scale (1.0 = nominal constant-Q length)
    /// * `sparsity` - Fraction of each kernel's magnitude that may be discarded
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the parameters cannot produce a transform
    pub fn new(
        sample_rate: u32,
        fmin: f32,
        bins_per_octave: usize,
        n_octaves: usize,
        hop_size: usize,
        filter_scale: f32,
        sparsity: f32,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
        }
        if !(fmin.is_finite() && fmin > 0.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "Minimum frequency must be positive, got {}",
                fmin
            )));
        }
        if bins_per_octave == 0 || n_octaves == 0 || hop_size == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "bins_per_octave, n_octaves and hop_size must be > 0 (got {}, {}, {})",
                bins_per_octave, n_octaves, hop_size
            )));
        }
        if !(filter_scale.is_finite() && filter_scale > 0.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "Filter scale must be positive, got {}",
                filter_scale
            )));
        }
        if !(0.0..1.0).contains(&sparsity) {
            return Err(AnalysisError::InvalidInput(format!(
                "Kernel sparsity must be in [0, 1), got {}",
                sparsity
            )));
        }

        let sr = sample_rate as f32;
        let q = filter_scale / (2.0f32.powf(1.0 / bins_per_octave as f32) - 1.0);

        // Drop octaves whose filters would reach past Nyquist
        let mut octaves = n_octaves;
        while octaves > 0 {
            let top_bin = (octaves * bins_per_octave - 1) as f32;
            let f_top = fmin * 2.0f32.powf(top_bin / bins_per_octave as f32);
            if f_top * (1.0 + 0.5 * HANN_BANDWIDTH / q) <= sr / 2.0 {
                break;
            }
            octaves -= 1;
        }

        if octaves == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Sample rate {} Hz is too low for a constant-Q octave starting at {:.2} Hz",
                sample_rate, fmin
            )));
        }
        if octaves < n_octaves {
            log::warn!(
                "Reducing constant-Q range from {} to {} octaves at {} Hz",
                n_octaves,
                octaves,
                sample_rate
            );
        }

        let decimation = 1usize << (octaves - 1);
        if hop_size % decimation != 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Hop size {} must be divisible by {} for {} octaves",
                hop_size, decimation, octaves
            )));
        }

        // Kernels for the top octave at the input rate
        let f_top_octave = fmin * 2.0f32.powi(octaves as i32 - 1);
        let freqs: Vec<f32> = (0..bins_per_octave)
            .map(|k| f_top_octave * 2.0f32.powf(k as f32 / bins_per_octave as f32))
            .collect();
        let lengths: Vec<usize> = freqs.iter().map(|&f| (q * sr / f).ceil() as usize).collect();
        let n_fft = lengths.iter().copied().max().unwrap_or(1).next_power_of_two();

        log::debug!(
            "Constant-Q: {} octaves x {} bins from {:.2} Hz, Q={:.2}, n_fft={}",
            octaves,
            bins_per_octave,
            fmin,
            q,
            n_fft
        );

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n_fft);

        let kernels = freqs
            .iter()
            .zip(&lengths)
            .map(|(&freq, &len)| spectral_kernel(freq, len, sr, n_fft, &*fft, sparsity))
            .collect();

        Ok(Self {
            bins_per_octave,
            n_octaves: octaves,
            hop_size,
            n_fft,
            fft,
            kernels,
            lowpass: lowpass_filter(LOWPASS_TAPS, LOWPASS_CUTOFF),
        })
    }

    /// Octaves actually analysed (after Nyquist reduction)
    pub fn n_octaves(&self) -> usize {
        self.n_octaves
    }

    /// Total number of constant-Q bins
    pub fn n_bins(&self) -> usize {
        self.n_octaves * self.bins_per_octave
    }

    /// Number of frames produced for a signal of `len` samples
    pub fn n_frames(&self, len: usize) -> usize {
        1 + len / self.hop_size
    }

    /// Compute the constant-Q magnitude spectrogram
    ///
    /// # Returns
    ///
    /// `[frame][bin]` magnitudes, bins ordered from `fmin` upwards. A sinusoid of
    /// amplitude `A` at a bin's centre frequency yields a magnitude of about `A / 2`.
    pub fn magnitudes(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        let n_frames = self.n_frames(samples.len());
        let n_bins = self.n_bins();
        let mut spectrogram = vec![vec![0.0f32; n_bins]; n_frames];

        let mut signal = samples.to_vec();
        let mut buffer = vec![Complex32::new(0.0, 0.0); self.n_fft];
        let mut scratch = vec![Complex32::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        let half = (self.n_fft / 2) as isize;

        for level in 0..self.n_octaves {
            let octave = self.n_octaves - 1 - level;
            let hop = self.hop_size >> level;
            let first_bin = octave * self.bins_per_octave;

            for (t, frame) in spectrogram.iter_mut().enumerate() {
                let start = (t * hop) as isize - half;
                for (i, slot) in buffer.iter_mut().enumerate() {
                    let idx = start + i as isize;
                    let x = if idx >= 0 && (idx as usize) < signal.len() {
                        signal[idx as usize]
                    } else {
                        0.0
                    };
                    *slot = Complex32::new(x, 0.0);
                }
                self.fft.process_with_scratch(&mut buffer, &mut scratch);

                for (k, kernel) in self.kernels.iter().enumerate() {
                    frame[first_bin + k] = kernel.apply(&buffer);
                }
            }

            if level + 1 < self.n_octaves {
                signal = self.downsample(&signal);
            }
        }

        spectrogram
    }

    /// Zero-phase low-pass then keep every second sample
    fn downsample(&self, signal: &[f32]) -> Vec<f32> {
        let center = (self.lowpass.len() / 2) as isize;
        let out_len = signal.len().div_ceil(2);
        (0..out_len)
            .map(|i| {
                let base = (2 * i) as isize - center;
                self.lowpass
                    .iter()
                    .enumerate()
                    .filter_map(|(m, &h)| {
                        let idx = base + m as isize;
                        (idx >= 0 && (idx as usize) < signal.len()).then(|| h * signal[idx as usize])
                    })
                    .sum()
            })
            .collect()
    }
}

/// Frequency-domain kernel for one bin, conjugated and scaled so that
/// `sum(X[j] * S[j])` equals the time-domain inner product with the kernel
fn spectral_kernel(
    freq: f32,
    len: usize,
    sample_rate: f32,
    n_fft: usize,
    fft: &dyn Fft<f32>,
    sparsity: f32,
) -> SparseKernel {
    let window = periodic_hann(len);
    let norm: f32 = window.iter().sum();
    let offset = (n_fft - len) / 2;
    let omega = 2.0 * std::f32::consts::PI * freq / sample_rate;

    let mut buffer = vec![Complex32::new(0.0, 0.0); n_fft];
    for (n, &w) in window.iter().enumerate() {
        let phase = omega * (n as f32 - len as f32 / 2.0);
        buffer[offset + n] = Complex32::from_polar(w / norm, phase);
    }
    fft.process(&mut buffer);

    let scale = 1.0 / n_fft as f32;
    let spectrum: Vec<Complex32> = buffer.iter().map(|c| c.conj() * scale).collect();

    // Discard the smallest coefficients carrying at most `sparsity` of the total magnitude
    let mut magnitudes: Vec<f32> = spectrum.iter().map(|c| c.norm()).collect();
    magnitudes.sort_by(|a, b| a.total_cmp(b));
    let total: f32 = magnitudes.iter().sum();
    let mut threshold = 0.0f32;
    let mut acc = 0.0f32;
    for &m in &magnitudes {
        acc += m;
        if acc > sparsity * total {
            break;
        }
        threshold = m;
    }

    SparseKernel {
        coefficients: spectrum
            .into_iter()
            .enumerate()
            .filter(|(_, c)| c.norm() > threshold)
            .collect(),
    }
}

/// Hann-windowed sinc low-pass with unit DC gain
fn lowpass_filter(taps: usize, cutoff: f32) -> Vec<f32> {
    let center = (taps - 1) as f32 / 2.0;
    let mut h: Vec<f32> = (0..taps)
        .map(|m| {
            let x = m as f32 - center;
            let sinc = if x == 0.0 {
                2.0 * cutoff
            } else {
                (2.0 * std::f32::consts::PI * cutoff * x).sin() / (std::f32::consts::PI * x)
            };
            let window =
                0.5 - 0.5 * (2.0 * std::f32::consts::PI * m as f32 / (taps - 1) as f32).cos();
            sinc * window
        })
        .collect();

    let sum: f32 = h.iter().sum();
    for x in &mut h {
        *x /= sum;
    }
    h
}
