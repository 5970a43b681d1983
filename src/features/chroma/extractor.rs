//! Chroma vector extraction
//!
//! Converts a constant-Q magnitude spectrogram to 12-element chroma vectors and
//! sums them into a single pitch-class energy profile.
//!
//! # Example
//!
//! ```no_run
//! use keyfinder_dsp::features::chroma::extract_chroma;
//! use keyfinder_dsp::AnalysisConfig;
//!
//! let samples = vec![0.0f32; 11025 * 5];
//! let chroma = extract_chroma(&samples, 11025, &AnalysisConfig::default())?;
//! println!("{}", chroma.prominence_table());
//! # Ok::<(), keyfinder_dsp::AnalysisError>(())
//! ```

use super::cqt::ConstantQ;
use super::normalization::normalize_max;
use super::ChromaVector;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Fold one constant-Q frame onto the 12 pitch classes
///
/// With `m = bins_per_octave / 12` bins per semitone, bin `j` belongs to the
/// semitone `(j + m/2) / m` above the lowest bin, so each pitch class collects
/// its centre bin plus the bins within half a semitone of it (for `m = 2`: the
/// centre bin and the quarter-tone bin below).
///
/// # Arguments
///
/// * `cqt_frame` - Constant-Q magnitudes, lowest bin first
/// * `bins_per_octave` - Must be a multiple of 12
/// * `fmin_pitch_class` - Pitch class of the lowest bin (0 = C)
pub fn fold_to_chroma(cqt_frame: &[f32], bins_per_octave: usize, fmin_pitch_class: usize) -> [f32; 12] {
    let per_semitone = (bins_per_octave / 12).max(1);
    let mut chroma = [0.0f32; 12];
    for (j, &mag) in cqt_frame.iter().enumerate() {
        let semitone = (j + per_semitone / 2) / per_semitone;
        chroma[(semitone + fmin_pitch_class) % 12] += mag;
    }
    chroma
}

/// Compute per-frame chroma vectors, each normalized to a maximum of 1.0
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Constant-Q parameters
///
/// # Returns
///
/// One 12-element chroma vector per frame (`1 + len / hop_size` frames)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the constant-Q parameters are invalid
pub fn chromagram(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<Vec<[f32; 12]>, AnalysisError> {
    if config.bins_per_octave == 0 || config.bins_per_octave % 12 != 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "bins_per_octave must be a multiple of 12, got {}",
            config.bins_per_octave
        )));
    }

    log::debug!(
        "Extracting chroma: {} samples at {} Hz, {} bins/octave",
        samples.len(),
        sample_rate,
        config.bins_per_octave
    );

    let cqt = ConstantQ::new(
        sample_rate,
        config.fmin(),
        config.bins_per_octave,
        config.n_octaves,
        config.hop_size,
        config.filter_scale,
        config.kernel_sparsity,
    )?;

    let fmin_pitch_class = config.min_midi_note as usize % 12;
    let frames = cqt
        .magnitudes(samples)
        .iter()
        .map(|frame| {
            let mut chroma = fold_to_chroma(frame, config.bins_per_octave, fmin_pitch_class);
            normalize_max(&mut chroma);
            chroma
        })
        .collect();

    Ok(frames)
}

/// Extract the chroma energy vector of a signal
///
/// Sums the per-frame normalized chroma over all frames, so each frame
/// contributes its pitch-class shape regardless of loudness.
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Constant-Q parameters
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the constant-Q parameters are invalid
pub fn extract_chroma(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<ChromaVector, AnalysisError> {
    let frames = chromagram(samples, sample_rate, config)?;

    let mut energy = [0.0f64; 12];
    for frame in &frames {
        for (acc, &value) in energy.iter_mut().zip(frame) {
            *acc += value as f64;
        }
    }

    log::debug!("Chroma energy over {} frames: {:?}", frames.len(), energy);

    Ok(ChromaVector::new(energy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::PitchClass;

    fn tone(freqs: &[f32], sample_rate: u32, seconds: f32) -> Vec<f32> {
        let len = (sample_rate as f32 * seconds) as usize;
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                freqs
                    .iter()
                    .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                    .sum::<f32>()
                    / freqs.len() as f32
            })
            .collect()
    }

    #[test]
    fn test_fold_quarter_tone_bins() {
        // 24 bins: even bins are semitone centres, odd bins quarter tones above
        let mut frame = vec![0.0f32; 24];
        frame[0] = 1.0; // C
        frame[1] = 0.5; // quarter tone above C -> folds to C#
        frame[23] = 0.25; // quarter tone below C (next octave) -> folds to C
        let chroma = fold_to_chroma(&frame, 24, 0);
        assert_eq!(chroma[0], 1.25);
        assert_eq!(chroma[1], 0.5);
        assert_eq!(chroma.iter().sum::<f32>(), 1.75);
    }

    #[test]
    fn test_fold_semitone_bins_with_offset() {
        // 12 bins starting at A
        let mut frame = vec![0.0f32; 12];
        frame[0] = 1.0;
        frame[3] = 2.0;
        let chroma = fold_to_chroma(&frame, 12, 9);
        assert_eq!(chroma[9], 1.0); // A
        assert_eq!(chroma[0], 2.0); // C
    }

    #[test]
    fn test_chromagram_frames_normalized() {
        let samples = tone(&[440.0], 11025, 1.0);
        let frames = chromagram(&samples, 11025, &AnalysisConfig::default()).unwrap();
        assert_eq!(frames.len(), 1 + samples.len() / 512);
        for frame in &frames {
            let max = frame.iter().copied().fold(0.0f32, f32::max);
            assert!((max - 1.0).abs() < 1e-5, "frame max should be 1.0, got {}", max);
        }
    }

    #[test]
    fn test_single_tone_dominates() {
        for (freq, pitch) in [
            (261.63, PitchClass::C),
            (440.0, PitchClass::A),
            (369.99, PitchClass::FSharp),
        ] {
            let chroma = extract_chroma(&tone(&[freq], 11025, 2.0), 11025, &AnalysisConfig::default())
                .unwrap();
            assert_eq!(chroma.dominant(), pitch, "tone at {} Hz", freq);
        }
    }

    #[test]
    fn test_triad_energy() {
        // C4, E4, G4
        let samples = tone(&[261.63, 329.63, 392.0], 11025, 2.0);
        let chroma = extract_chroma(&samples, 11025, &AnalysisConfig::default()).unwrap();
        let rel = chroma.relative();

        for pc in [0, 4, 7] {
            assert!(rel[pc] > 0.7, "chord tone {} too weak: {:.3}", pc, rel[pc]);
        }
        for pc in [2, 6, 9, 10] {
            assert!(rel[pc] < 0.3, "non-chord tone {} too strong: {:.3}", pc, rel[pc]);
        }
    }

    #[test]
    fn test_silence_has_no_energy() {
        let chroma = extract_chroma(&vec![0.0; 11025], 11025, &AnalysisConfig::default()).unwrap();
        assert_eq!(*chroma.as_array(), [0.0; 12]);
    }

    #[test]
    fn test_rejects_uneven_bins_per_octave() {
        let config = AnalysisConfig {
            bins_per_octave: 36 + 1,
            ..AnalysisConfig::default()
        };
        assert!(chromagram(&[0.0; 1024], 11025, &config).is_err());
    }
}
