//! Key estimation result types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::chroma::ChromaVector;

/// Pitch class names in chromatic order, sharp spelling
pub const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One of the 12 equal-tempered pitch classes (0 = C, ..., 11 = B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    /// C
    C,
    /// C sharp / D flat
    CSharp,
    /// D
    D,
    /// D sharp / E flat
    DSharp,
    /// E
    E,
    /// F
    F,
    /// F sharp / G flat
    FSharp,
    /// G
    G,
    /// G sharp / A flat
    GSharp,
    /// A
    A,
    /// A sharp / B flat
    ASharp,
    /// B
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order starting at C
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class for a chromatic index, wrapping modulo 12
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Chromatic index (0 = C, ..., 11 = B)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Pitch class `semitones` above this one
    pub const fn transpose(self, semitones: usize) -> Self {
        Self::from_index(self.index() + semitones)
    }

    /// Sharp-spelled note name (e.g., "C#")
    pub const fn name(self) -> &'static str {
        PITCH_NAMES[self.index()]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = AnalysisError;

    /// Parse a sharp-spelled note name ("C", "C#", ..., "B")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PITCH_NAMES
            .iter()
            .position(|&name| name == s)
            .map(Self::from_index)
            .ok_or_else(|| AnalysisError::UnknownKey(s.to_string()))
    }
}

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mode {
    /// Major (Ionian)
    Major,
    /// Natural minor (Aeolian)
    Minor,
}

impl Mode {
    /// Lowercase mode name used in key labels
    pub const fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Mode::Major),
            "minor" => Ok(Mode::Minor),
            _ => Err(AnalysisError::UnknownKey(s.to_string())),
        }
    }
}

/// Musical key: a tonic pitch class and a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Tonic pitch class
    pub tonic: PitchClass,
    /// Major or minor
    pub mode: Mode,
}

impl Key {
    /// Number of major and minor keys
    pub const COUNT: usize = 24;

    /// Major key on `tonic`
    pub const fn major(tonic: PitchClass) -> Self {
        Self {
            tonic,
            mode: Mode::Major,
        }
    }

    /// Minor key on `tonic`
    pub const fn minor(tonic: PitchClass) -> Self {
        Self {
            tonic,
            mode: Mode::Minor,
        }
    }

    /// Key at position `index` of the estimator's iteration order
    ///
    /// 0..12 are the major keys C..B, 12..24 the minor keys C..B.
    pub const fn from_index(index: usize) -> Self {
        let index = index % Self::COUNT;
        if index < 12 {
            Self::major(PitchClass::from_index(index))
        } else {
            Self::minor(PitchClass::from_index(index - 12))
        }
    }

    /// Position in the estimator's iteration order (major C..B, then minor C..B)
    pub const fn index(self) -> usize {
        match self.mode {
            Mode::Major => self.tonic.index(),
            Mode::Minor => 12 + self.tonic.index(),
        }
    }

    /// All 24 keys in iteration order
    pub fn all() -> impl Iterator<Item = Key> {
        (0..Self::COUNT).map(Self::from_index)
    }

    /// Key label, e.g. "C major" or "F# minor"
    ///
    /// # Example
    ///
    /// ```
    /// use keyfinder_dsp::{Key, PitchClass};
    ///
    /// assert_eq!(Key::major(PitchClass::C).name(), "C major");
    /// assert_eq!(Key::minor(PitchClass::FSharp).name(), "F# minor");
    /// ```
    pub fn name(&self) -> String {
        format!("{} {}", self.tonic, self.mode)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}

impl FromStr for Key {
    type Err = AnalysisError;

    /// Parse one of the 24 key labels, e.g. "C major" or "F# minor"
    ///
    /// Only the exact labels produced by [`Key::name`] are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|key| key.name() == s)
            .ok_or_else(|| AnalysisError::UnknownKey(s.to_string()))
    }
}

/// A key together with its template correlation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyCandidate {
    /// Candidate key
    pub key: Key,
    /// Pearson correlation with the rotated template, rounded to 3 decimals
    pub correlation: f64,
}

/// Result of a key estimation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimate {
    /// Best matching key
    pub key: Key,

    /// Correlation of the best key
    pub correlation: f64,

    /// Last candidate (in iteration order) scoring above 90% of the best
    pub alternate: Option<KeyCandidate>,

    /// All 24 candidates in iteration order (major C..B, minor C..B)
    pub candidates: Vec<KeyCandidate>,

    /// Chroma energy the candidates were scored from
    pub chroma: ChromaVector,
}

impl KeyEstimate {
    /// Alternate key, if one scored close to the best
    pub fn alternate_key(&self) -> Option<Key> {
        self.alternate.map(|c| c.key)
    }

    /// Correlation for `key`
    pub fn correlation_of(&self, key: Key) -> Option<f64> {
        self.candidates
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.correlation)
    }

    /// Human-readable estimate
    ///
    /// ```text
    /// likely key: C major, correlation: 0.936
    /// also possible: A minor, correlation: 0.876
    /// ```
    pub fn summary(&self) -> String {
        let mut out = format!("likely key: {}, correlation: {}", self.key, self.correlation);
        if let Some(alt) = &self.alternate {
            out.push_str(&format!(
                "\nalso possible: {}, correlation: {}",
                alt.key, alt.correlation
            ));
        }
        out
    }

    /// One `"<key>\t<correlation>"` line per candidate, in iteration order
    pub fn correlation_table(&self) -> String {
        self.candidates
            .iter()
            .map(|c| format!("{}\t{:6.3}", c.key, c.correlation))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name() {
        assert_eq!(Key::major(PitchClass::C).name(), "C major");
        assert_eq!(Key::major(PitchClass::CSharp).name(), "C# major");
        assert_eq!(Key::minor(PitchClass::A).name(), "A minor");
        assert_eq!(Key::minor(PitchClass::B).to_string(), "B minor");
    }

    #[test]
    fn test_key_index_order() {
        assert_eq!(Key::from_index(0), Key::major(PitchClass::C));
        assert_eq!(Key::from_index(11), Key::major(PitchClass::B));
        assert_eq!(Key::from_index(12), Key::minor(PitchClass::C));
        assert_eq!(Key::from_index(23), Key::minor(PitchClass::B));

        for (i, key) in Key::all().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn test_key_parse() {
        assert_eq!("C major".parse::<Key>(), Ok(Key::major(PitchClass::C)));
        assert_eq!("G# minor".parse::<Key>(), Ok(Key::minor(PitchClass::GSharp)));
        assert_eq!("A# major".parse::<Key>(), Ok(Key::major(PitchClass::ASharp)));
        assert_eq!("F#".parse::<PitchClass>(), Ok(PitchClass::FSharp));
        assert_eq!("minor".parse::<Mode>(), Ok(Mode::Minor));
    }

    #[test]
    fn test_key_parse_rejects_unknown() {
        for name in [
            "Db major",
            "c major",
            "C maj",
            "Cb major",
            "E# minor",
            "g# MINOR",
            "  A   minor ",
            // Cyrillic "С" must not alias Latin "C"
            "\u{0421} major",
            "H major",
            "C dorian",
            "C",
            "C major extra",
            "",
            "C## major",
        ] {
            assert!(
                matches!(name.parse::<Key>(), Err(AnalysisError::UnknownKey(_))),
                "{:?} should be unknown",
                name
            );
        }
        assert!("Bb".parse::<PitchClass>().is_err());
        assert!("min".parse::<Mode>().is_err());
    }

    #[test]
    fn test_key_name_roundtrip() {
        for key in Key::all() {
            assert_eq!(key.name().parse::<Key>(), Ok(key));
        }
    }

    fn estimate(alternate: Option<KeyCandidate>) -> KeyEstimate {
        let candidates = Key::all()
            .map(|key| KeyCandidate {
                key,
                correlation: if key.index() == 0 { 0.936 } else { -0.25 },
            })
            .collect();
        KeyEstimate {
            key: Key::major(PitchClass::C),
            correlation: 0.936,
            alternate,
            candidates,
            chroma: ChromaVector::new([0.0; 12]),
        }
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            estimate(None).summary(),
            "likely key: C major, correlation: 0.936"
        );

        let alt = KeyCandidate {
            key: Key::minor(PitchClass::A),
            correlation: 0.876,
        };
        let est = estimate(Some(alt));
        assert_eq!(
            est.summary(),
            "likely key: C major, correlation: 0.936\nalso possible: A minor, correlation: 0.876"
        );
        assert_eq!(est.alternate_key(), Some(Key::minor(PitchClass::A)));
    }

    #[test]
    fn test_correlation_table() {
        let est = estimate(None);
        let table = est.correlation_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 24);
        assert_eq!(lines[0], "C major\t 0.936");
        assert_eq!(lines[23], "B minor\t-0.250");
        assert_eq!(est.correlation_of(Key::minor(PitchClass::E)), Some(-0.25));
    }

    #[test]
    fn test_pitch_class_transpose() {
        assert_eq!(PitchClass::A.transpose(3), PitchClass::C);
        assert_eq!(PitchClass::B.transpose(1), PitchClass::C);
        assert_eq!(PitchClass::C.transpose(24), PitchClass::C);
    }
}
