//! Integration tests for key estimation and chord generation

use keyfinder_dsp::chords::{progressions, render_progressions};
use keyfinder_dsp::{
    analyze_file, diatonic_chords, estimate_key, get_chords, random_chords, random_progression,
    AnalysisConfig, AnalysisError, AnalysisWindow, Key, Mode, PitchClass,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

const SAMPLE_RATE: u32 = 11025;

/// Frequency of `pitch` in octave 4 (C4 = 261.63 Hz) at A4 = 440 Hz
fn freq(pitch: PitchClass, octave: i32) -> f32 {
    let midi = 12 * (octave + 1) + pitch.index() as i32;
    440.0 * 2.0f32.powf((midi as f32 - 69.0) / 12.0)
}

/// Sum of equal-amplitude sines, peak-normalized to 0.8
fn synth(freqs: &[f32], sample_rate: u32, seconds: f32) -> Vec<f32> {
    let len = (sample_rate as f32 * seconds) as usize;
    let scale = 0.8 / freqs.len() as f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            freqs
                .iter()
                .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                .sum::<f32>()
                * scale
        })
        .collect()
}

fn temp_wav(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("keyfinder_dsp_{}_{}.wav", name, std::process::id()))
}

/// Write a 16-bit stereo WAV with the same signal on both channels
fn write_stereo_wav(path: &PathBuf, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV");
    for &s in samples {
        let v = (s * i16::MAX as f32) as i16;
        writer.write_sample(v).unwrap();
        writer.write_sample(v).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_pure_tones_give_tonic_minor() {
    for pitch in PitchClass::ALL {
        let samples = synth(&[freq(pitch, 4)], SAMPLE_RATE, 3.0);
        let estimate = estimate_key(&samples, SAMPLE_RATE, None, None)
            .unwrap_or_else(|e| panic!("{}: {}", pitch, e));
        // Leakage into the semitone above tips the major/minor tie on the tonic
        assert_eq!(
            estimate.key,
            Key::minor(pitch),
            "tone {} estimated as {}",
            pitch,
            estimate.key
        );
        assert_eq!(estimate.alternate_key(), Some(Key::major(pitch)));
    }
}

#[test]
fn test_major_triad() {
    let samples = synth(
        &[
            freq(PitchClass::C, 4),
            freq(PitchClass::E, 4),
            freq(PitchClass::G, 4),
        ],
        SAMPLE_RATE,
        3.0,
    );
    let estimate = estimate_key(&samples, SAMPLE_RATE, None, None).unwrap();
    assert_eq!(estimate.key, Key::major(PitchClass::C));
    assert!(estimate.correlation > 0.7);
    assert_eq!(estimate.candidates.len(), 24);
    assert!(estimate.summary().starts_with("likely key: C major, correlation: "));
}

#[test]
fn test_minor_triad() {
    let samples = synth(
        &[
            freq(PitchClass::A, 3),
            freq(PitchClass::C, 4),
            freq(PitchClass::E, 4),
        ],
        SAMPLE_RATE,
        3.0,
    );
    let estimate = estimate_key(&samples, SAMPLE_RATE, None, None).unwrap();
    assert_eq!(estimate.key, Key::minor(PitchClass::A));
}

#[test]
fn test_window_selects_section() {
    // C major triad for 3 s, then an A minor triad for 3 s
    let mut samples = synth(
        &[freq(PitchClass::C, 4), freq(PitchClass::E, 4), freq(PitchClass::G, 4)],
        SAMPLE_RATE,
        3.0,
    );
    samples.extend(synth(
        &[freq(PitchClass::A, 3), freq(PitchClass::C, 4), freq(PitchClass::E, 4)],
        SAMPLE_RATE,
        3.0,
    ));

    let first = estimate_key(&samples, SAMPLE_RATE, None, Some(2.5)).unwrap();
    assert_eq!(first.key, Key::major(PitchClass::C));

    let second = estimate_key(&samples, SAMPLE_RATE, Some(3.5), None).unwrap();
    assert_eq!(second.key, Key::minor(PitchClass::A));
}

#[test]
fn test_silence_is_degenerate() {
    let samples = vec![0.0f32; SAMPLE_RATE as usize * 2];
    let result = estimate_key(&samples, SAMPLE_RATE, None, None);
    assert!(matches!(result, Err(AnalysisError::DegenerateInput(_))));
}

#[test]
fn test_empty_window() {
    let samples = synth(&[440.0], SAMPLE_RATE, 2.0);

    let result = estimate_key(&samples, SAMPLE_RATE, Some(1.0), Some(1.0));
    assert!(matches!(result, Err(AnalysisError::EmptyWindow { .. })));

    // Start past the end of the waveform
    let result = estimate_key(&samples, SAMPLE_RATE, Some(5.0), None);
    assert!(matches!(result, Err(AnalysisError::EmptyWindow { .. })));

    let result = estimate_key(&[], SAMPLE_RATE, None, None);
    assert!(matches!(result, Err(AnalysisError::EmptyWindow { start: 0, end: 0 })));
}

#[test]
fn test_invalid_input() {
    let samples = synth(&[440.0], SAMPLE_RATE, 1.0);
    assert!(matches!(
        estimate_key(&samples, 0, None, None),
        Err(AnalysisError::InvalidInput(_))
    ));

    let mut samples = samples;
    samples[100] = f32::NAN;
    assert!(matches!(
        estimate_key(&samples, SAMPLE_RATE, None, None),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn test_analyze_wav_file() {
    let path = temp_wav("triad");
    let samples = synth(
        &[
            freq(PitchClass::G, 3),
            freq(PitchClass::B, 3),
            freq(PitchClass::D, 4),
        ],
        44100,
        4.0,
    );
    write_stereo_wav(&path, &samples, 44100);

    let estimate = analyze_file(&path, &AnalysisConfig::default());
    std::fs::remove_file(&path).ok();

    let estimate = estimate.expect("File analysis should succeed");
    assert_eq!(estimate.key, Key::major(PitchClass::G));
}

#[test]
fn test_analyze_wav_file_without_preprocessing() {
    let path = temp_wav("plain");
    let samples = synth(
        &[
            freq(PitchClass::D, 4),
            freq(PitchClass::F, 4),
            freq(PitchClass::A, 4),
        ],
        SAMPLE_RATE,
        3.0,
    );
    write_stereo_wav(&path, &samples, SAMPLE_RATE);

    let config = AnalysisConfig {
        analysis_sample_rate: None,
        harmonic_separation: None,
        ..AnalysisConfig::default()
    };
    let estimate = analyze_file(&path, &config);
    std::fs::remove_file(&path).ok();

    assert_eq!(estimate.unwrap().key, Key::minor(PitchClass::D));
}

#[test]
fn test_analyze_wav_file_window_before_resampling() {
    let path = temp_wav("window");
    let triad = |root: PitchClass| {
        synth(
            &[
                freq(root, 4),
                freq(root.transpose(4), 4),
                freq(root.transpose(7), 4),
            ],
            44100,
            3.0,
        )
    };
    let mut samples = triad(PitchClass::C);
    samples.extend(triad(PitchClass::FSharp));
    write_stereo_wav(&path, &samples, 44100);

    let config = AnalysisConfig {
        analysis_window: AnalysisWindow::new(Some(3.0), Some(6.0)),
        harmonic_separation: None,
        ..AnalysisConfig::default()
    };
    let estimate = analyze_file(&path, &config);
    std::fs::remove_file(&path).ok();

    assert_eq!(estimate.unwrap().key, Key::major(PitchClass::FSharp));
}

#[test]
fn test_analyze_missing_file() {
    let result = analyze_file("/nonexistent/song.flac", &AnalysisConfig::default());
    assert!(matches!(result, Err(AnalysisError::DecodingError(_))));
}

#[test]
fn test_chord_lookup_for_estimated_key() {
    let samples = synth(
        &[freq(PitchClass::C, 4), freq(PitchClass::E, 4), freq(PitchClass::G, 4)],
        SAMPLE_RATE,
        3.0,
    );
    let estimate = estimate_key(&samples, SAMPLE_RATE, None, None).unwrap();

    let chords: Vec<String> = diatonic_chords(estimate.key)
        .iter()
        .map(|(_, c)| c.to_string())
        .collect();
    assert_eq!(chords, ["C", "Dm", "Em", "F", "G", "Am", "B[dim]"]);
    assert!(get_chords(&estimate.key.name()).unwrap().contains("[7]: B[dim], "));
}

#[test]
fn test_random_progressions_follow_mode() {
    let mut rng = StdRng::seed_from_u64(5);
    for mode in [Mode::Major, Mode::Minor] {
        for _ in 0..20 {
            let (key, text) = random_progression(mode, None, &mut rng).unwrap();
            assert_eq!(key.mode, mode);
            assert_eq!(
                text.matches("[------------------------------]").count(),
                progressions(mode).len()
            );
            assert_eq!(text, render_progressions(key).unwrap());
        }
    }

    let (key, text) = random_chords(&mut rng).unwrap();
    assert_eq!(text, get_chords(&key.name()).unwrap());
}
