//! Diatonic triad table for the 24 major and minor keys
//!
//! Built at compile time from the scale step pattern and the triad quality of
//! each degree. Roots use sharp spelling throughout.

use super::{Chord, ChordQuality};
use crate::analysis::result::{Key, Mode, PitchClass};
use crate::error::AnalysisError;

use super::ChordQuality::{Diminished as Dim, Major as Maj, Minor as Min};

/// Whole/half steps between consecutive degrees of the major scale
const MAJOR_STEPS: [usize; 7] = [2, 2, 1, 2, 2, 2, 1];

/// Whole/half steps between consecutive degrees of the natural minor scale
const MINOR_STEPS: [usize; 7] = [2, 1, 2, 2, 1, 2, 2];

const MAJOR_QUALITIES: [ChordQuality; 7] = [Maj, Min, Min, Maj, Maj, Min, Dim];
const MINOR_QUALITIES: [ChordQuality; 7] = [Min, Dim, Maj, Min, Min, Maj, Maj];

/// Diatonic triads of every key, indexed by [`Key::index`] then degree - 1
pub static CHORD_TABLE: [[Chord; 7]; Key::COUNT] = build_table();

const fn build_table() -> [[Chord; 7]; Key::COUNT] {
    let mut table = [[Chord {
        root: PitchClass::C,
        quality: Maj,
    }; 7]; Key::COUNT];

    let mut k = 0;
    while k < Key::COUNT {
        let key = Key::from_index(k);
        let (steps, qualities) = match key.mode {
            Mode::Major => (&MAJOR_STEPS, &MAJOR_QUALITIES),
            Mode::Minor => (&MINOR_STEPS, &MINOR_QUALITIES),
        };

        let mut offset = 0;
        let mut degree = 0;
        while degree < 7 {
            table[k][degree] = Chord {
                root: key.tonic.transpose(offset),
                quality: qualities[degree],
            };
            offset += steps[degree];
            degree += 1;
        }
        k += 1;
    }

    table
}

/// The seven diatonic triads of `key` as (degree, chord) pairs, degree 1 first
///
/// # Example
///
/// ```
/// use keyfinder_dsp::chords::diatonic_chords;
/// use keyfinder_dsp::{Key, PitchClass};
///
/// let chords = diatonic_chords(Key::major(PitchClass::C));
/// let symbols: Vec<String> = chords.iter().map(|(_, c)| c.to_string()).collect();
/// assert_eq!(symbols, ["C", "Dm", "Em", "F", "G", "Am", "B[dim]"]);
/// ```
pub fn diatonic_chords(key: Key) -> [(u8, Chord); 7] {
    let row = &CHORD_TABLE[key.index()];
    std::array::from_fn(|i| (i as u8 + 1, row[i]))
}

/// Render the chords of `key` at `degrees` as a text block
///
/// ```text
///
/// [-------1----5----6----4-------]
/// [1]: C, [5]: G, [6]: Am, [4]: F,
/// [------------------------------]
/// ```
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a degree outside 1..=7
pub fn format_block(key: Key, degrees: &[u8]) -> Result<String, AnalysisError> {
    let row = &CHORD_TABLE[key.index()];

    let mut block = String::from("\n[-----");
    for degree in degrees {
        block.push_str(&format!("--{}--", degree));
    }
    block.push_str("-----]\n");

    for &degree in degrees {
        let chord = (1..=7)
            .contains(&degree)
            .then(|| row[degree as usize - 1])
            .ok_or_else(|| {
                AnalysisError::InvalidInput(format!("Scale degree must be 1..=7, got {}", degree))
            })?;
        block.push_str(&format!("[{}]: {}, ", degree, chord));
    }
    block.push_str("\n[------------------------------]\n");

    Ok(block)
}

/// Formatted block of all seven diatonic chords of a key given by name
///
/// # Errors
///
/// Returns `AnalysisError::UnknownKey` if `key_name` is not one of the 24
/// "<note> <major|minor>" labels
pub fn get_chords(key_name: &str) -> Result<String, AnalysisError> {
    let key: Key = key_name.parse()?;
    format_block(key, &[1, 2, 3, 4, 5, 6, 7])
}
