//! Configuration parameters for key estimation

use serde::{Deserialize, Serialize};

use crate::preprocessing::hpss::HpssConfig;
use crate::preprocessing::window::AnalysisWindow;

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    // Constant-Q transform
    /// Reference tuning of A4 in Hz (default: 440.0)
    pub reference_a4_hz: f32,

    /// MIDI note of the lowest constant-Q bin (default: 24, C1 at ~32.7 Hz)
    pub min_midi_note: u8,

    /// Constant-Q bins per octave (default: 24, quarter-tone resolution)
    /// Must be a multiple of 12 so bins fold evenly onto pitch classes
    pub bins_per_octave: usize,

    /// Number of octaves analysed above `min_midi_note` (default: 7)
    /// Reduced automatically when the sample rate cannot support the top octave
    pub n_octaves: usize,

    /// Hop size between chroma frames in samples (default: 512)
    /// Must be divisible by 2^(n_octaves - 1)
    pub hop_size: usize,

    /// Filter length scale relative to the nominal constant-Q length (default: 1.0)
    pub filter_scale: f32,

    /// Fraction of each spectral kernel's magnitude that may be discarded (default: 0.01)
    pub kernel_sparsity: f32,

    // Key selection
    /// A candidate is an alternate key when its correlation exceeds
    /// `alternate_ratio * best` (default: 0.9)
    pub alternate_ratio: f64,

    // File analysis
    /// Sample rate audio files are resampled to before analysis (default: 11025 Hz)
    /// `None` analyses at the decoded rate
    pub analysis_sample_rate: Option<u32>,

    /// Window of a decoded file that is analysed (default: first 22 seconds)
    pub analysis_window: AnalysisWindow,

    /// Harmonic separation applied to decoded files (default: enabled)
    /// `None` analyses the full mix
    pub harmonic_separation: Option<HpssConfig>,
}

impl AnalysisConfig {
    /// Frequency of the lowest constant-Q bin in Hz
    pub fn fmin(&self) -> f32 {
        self.reference_a4_hz * 2.0f32.powf((self.min_midi_note as f32 - 69.0) / 12.0)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_a4_hz: 440.0,
            min_midi_note: 24,
            bins_per_octave: 24,
            n_octaves: 7,
            hop_size: 512,
            filter_scale: 1.0,
            kernel_sparsity: 0.01,
            alternate_ratio: 0.9,
            analysis_sample_rate: Some(11025),
            analysis_window: AnalysisWindow::new(None, Some(22.0)),
            harmonic_separation: Some(HpssConfig::default()),
        }
    }
}
