//! Canonical chord progressions and random key selection

use rand::Rng;

use super::table::format_block;
use crate::analysis::result::{Key, Mode, PitchClass};
use crate::error::AnalysisError;

/// A chord progression as an ordered list of scale degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    /// Roman numeral label, e.g. "I-V-vi-IV"
    pub name: &'static str,
    /// Scale degrees (1..=7) in playing order
    pub degrees: &'static [u8],
}

/// Progressions offered for major keys
pub const MAJOR_PROGRESSIONS: [Progression; 4] = [
    Progression {
        name: "I-V-vi-IV",
        degrees: &[1, 5, 6, 4],
    },
    Progression {
        name: "I-vi-IV-V",
        degrees: &[1, 6, 4, 5],
    },
    Progression {
        name: "I-IV-V",
        degrees: &[1, 4, 5],
    },
    Progression {
        name: "ii-V-I",
        degrees: &[2, 5, 1],
    },
];

/// Progressions offered for minor keys (degrees of the natural minor scale)
pub const MINOR_PROGRESSIONS: [Progression; 1] = [Progression {
    name: "i-v-VI-iv",
    degrees: &[1, 5, 6, 4],
}];

/// Progressions for `mode`
pub fn progressions(mode: Mode) -> &'static [Progression] {
    match mode {
        Mode::Major => &MAJOR_PROGRESSIONS,
        Mode::Minor => &MINOR_PROGRESSIONS,
    }
}

/// All progressions of `key`'s mode rendered as consecutive chord blocks
pub fn render_progressions(key: Key) -> Result<String, AnalysisError> {
    progressions(key.mode)
        .iter()
        .map(|p| format_block(key, p.degrees))
        .collect()
}

/// Uniformly random key out of all 24
pub fn random_key<R: Rng + ?Sized>(rng: &mut R) -> Key {
    Key::from_index(rng.gen_range(0..Key::COUNT))
}

/// Uniformly random tonic in `mode`
pub fn random_key_in_mode<R: Rng + ?Sized>(mode: Mode, rng: &mut R) -> Key {
    Key {
        tonic: PitchClass::from_index(rng.gen_range(0..12)),
        mode,
    }
}

/// Chord progressions for a requested or random key
///
/// With `key_name`, that key is used and its own mode picks the progressions.
/// Without it, a tonic is chosen uniformly among the 12 keys of `mode`.
///
/// # Errors
///
/// Returns `AnalysisError::UnknownKey` if `key_name` is not one of the 24 keys
///
/// # Example
///
/// ```
/// use keyfinder_dsp::chords::random_progression;
/// use keyfinder_dsp::Mode;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let (key, text) = random_progression(Mode::Minor, None, &mut rng)?;
/// assert_eq!(key.mode, Mode::Minor);
/// assert!(text.contains("[1]: "));
/// # Ok::<(), keyfinder_dsp::AnalysisError>(())
/// ```
pub fn random_progression<R: Rng + ?Sized>(
    mode: Mode,
    key_name: Option<&str>,
    rng: &mut R,
) -> Result<(Key, String), AnalysisError> {
    let key = match key_name {
        Some(name) => name.parse::<Key>()?,
        None => random_key_in_mode(mode, rng),
    };
    log::debug!("Chord progressions for {}", key);
    Ok((key, render_progressions(key)?))
}

/// All seven diatonic chords of a uniformly random key
pub fn random_chords<R: Rng + ?Sized>(rng: &mut R) -> Result<(Key, String), AnalysisError> {
    let key = random_key(rng);
    Ok((key, format_block(key, &[1, 2, 3, 4, 5, 6, 7])?))
}
