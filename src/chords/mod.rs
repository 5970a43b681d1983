//! Diatonic chord lookup and chord progressions
//!
//! - Static table of the seven diatonic triads of all 24 keys
//! - Formatted degree/chord blocks
//! - Canonical progressions and seeded random key selection

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::result::PitchClass;

pub mod progression;
pub mod table;

pub use progression::{
    progressions, random_chords, random_key, random_key_in_mode, random_progression,
    render_progressions, Progression, MAJOR_PROGRESSIONS, MINOR_PROGRESSIONS,
};
pub use table::{diatonic_chords, format_block, get_chords, CHORD_TABLE};

/// Triad quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    /// Major third, perfect fifth
    Major,
    /// Minor third, perfect fifth
    Minor,
    /// Minor third, diminished fifth
    Diminished,
}

impl ChordQuality {
    /// Suffix appended to the root name
    pub const fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "[dim]",
        }
    }
}

/// Triad on a root pitch class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    /// Root pitch class
    pub root: PitchClass,
    /// Triad quality
    pub quality: ChordQuality,
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality.suffix())
    }
}
