//! # Keyfinder DSP
//!
//! Musical key estimation for audio recordings, plus diatonic chord lookup and
//! chord progression generation for the detected (or any) key.
//!
//! ## Features
//!
//! - **Chroma Extraction**: Constant-Q transform (24 bins/octave, 7 octaves from C1)
//!   folded to 12 pitch classes
//! - **Key Detection**: Pearson correlation with Krumhansl-Schmuckler profiles for all
//!   24 keys, best key plus a near-best alternate
//! - **Harmonic Separation**: Median-filter HPSS to suppress drums before analysis
//! - **Chords**: Diatonic triads, canonical progressions, seeded random keys
//!
//! ## Quick Start
//!
//! ```no_run
//! use keyfinder_dsp::estimate_key;
//!
//! // Load audio samples (mono, f32, normalized)
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 22050;
//!
//! // Analyze the first 30 seconds
//! let estimate = estimate_key(&samples, sample_rate, None, Some(30.0))?;
//!
//! println!("{}", estimate.summary());
//! # Ok::<(), keyfinder_dsp::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Audio Input → Windowing → Constant-Q Chroma → Template Correlation → Key Selection
//! ```
//!
//! `analyze_file` adds decoding, resampling and harmonic separation in front.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::Path;

pub mod analysis;
pub mod chords;
pub mod config;
mod dsp;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::result::{Key, KeyCandidate, KeyEstimate, Mode, PitchClass};
pub use chords::{diatonic_chords, get_chords, random_chords, random_progression, Chord, ChordQuality};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use features::chroma::ChromaVector;
pub use preprocessing::window::AnalysisWindow;

use features::chroma::extract_chroma;
use features::key::{detect_key, KRUMHANSL_SCHMUCKLER};
use io::decoder::decode_audio;
use preprocessing::hpss::harmonic_component;
use preprocessing::resample::resample_window;

/// Estimate the key of a mono waveform
///
/// Uses the default analysis parameters. The window bounds are in seconds;
/// `None` means the start / end of the waveform, and bounds outside the
/// waveform are clipped to it.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `start_time` - Window start in seconds
/// * `end_time` - Window end in seconds
///
/// # Errors
///
/// - `AnalysisError::EmptyWindow` if the window contains no samples
/// - `AnalysisError::DegenerateInput` if the window has no pitched content (e.g. silence).
///   The chroma vector counts as flat when its variance is at most `f64::EPSILON`
///   times its sum of squares, so a spread below roughly 1e-8 of its level is
///   degenerate too.
/// - `AnalysisError::InvalidInput` for a zero sample rate or non-finite samples
///
/// # Example
///
/// ```no_run
/// use keyfinder_dsp::estimate_key;
///
/// let samples = vec![0.0f32; 22050 * 10];
/// match estimate_key(&samples, 22050, Some(2.0), Some(8.0)) {
///     Ok(estimate) => println!("{}", estimate.summary()),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn estimate_key(
    samples: &[f32],
    sample_rate: u32,
    start_time: Option<f64>,
    end_time: Option<f64>,
) -> Result<KeyEstimate, AnalysisError> {
    estimate_key_with_config(
        samples,
        sample_rate,
        AnalysisWindow::new(start_time, end_time),
        &AnalysisConfig::default(),
    )
}

/// Estimate the key of a mono waveform with explicit analysis parameters
///
/// The waveform is analysed as given: `config.analysis_sample_rate`,
/// `config.analysis_window` and `config.harmonic_separation` only apply to
/// [`analyze_file`].
///
/// # Errors
///
/// Same as [`estimate_key`], plus `AnalysisError::InvalidInput` for constant-Q
/// parameters the sample rate cannot support
pub fn estimate_key_with_config(
    samples: &[f32],
    sample_rate: u32,
    window: AnalysisWindow,
    config: &AnalysisConfig,
) -> Result<KeyEstimate, AnalysisError> {
    log::debug!(
        "Starting key estimation: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
    }

    let windowed = window.apply(samples, sample_rate)?;

    if windowed.iter().any(|s| !s.is_finite()) {
        return Err(AnalysisError::InvalidInput(
            "Audio samples contain NaN or infinite values".to_string(),
        ));
    }

    let chroma = extract_chroma(windowed, sample_rate, config)?;
    detect_key(&chroma, &KRUMHANSL_SCHMUCKLER, config.alternate_ratio)
}

/// Decode an audio file and estimate its key
///
/// Pipeline: decode (mono) → `config.analysis_window` → resample to
/// `config.analysis_sample_rate` → harmonic separation (if configured) → key estimation.
/// Only the window (plus a short filter margin) is resampled.
///
/// # Errors
///
/// `AnalysisError::DecodingError` or `AnalysisError::ResampleError` for I/O and
/// conversion failures, otherwise the same as [`estimate_key_with_config`]
///
/// # Example
///
/// ```no_run
/// use keyfinder_dsp::{analyze_file, AnalysisConfig};
///
/// let estimate = analyze_file("song.mp3", &AnalysisConfig::default())?;
/// println!("{}", estimate.summary());
/// # Ok::<(), keyfinder_dsp::AnalysisError>(())
/// ```
pub fn analyze_file(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<KeyEstimate, AnalysisError> {
    let path = path.as_ref();
    let audio = decode_audio(path)?;

    let resampled;
    let (windowed, sample_rate) = match config.analysis_sample_rate {
        Some(rate) if rate != audio.sample_rate => {
            log::debug!("Resampling {} Hz -> {} Hz", audio.sample_rate, rate);
            resampled =
                resample_window(&audio.samples, audio.sample_rate, rate, &config.analysis_window)?;
            (&resampled[..], rate)
        }
        _ => (
            config.analysis_window.apply(&audio.samples, audio.sample_rate)?,
            audio.sample_rate,
        ),
    };

    let harmonic;
    let input = match &config.harmonic_separation {
        Some(hpss) => {
            harmonic = harmonic_component(windowed, hpss)?;
            &harmonic[..]
        }
        None => windowed,
    };

    log::debug!(
        "Analysing {} ({:.2}s at {} Hz)",
        path.display(),
        input.len() as f64 / sample_rate as f64,
        sample_rate
    );

    estimate_key_with_config(input, sample_rate, AnalysisWindow::full(), config)
}
