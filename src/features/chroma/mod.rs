//! Chroma extraction modules
//!
//! Extract pitch-class distribution (12 semitones) from audio:
//! - Constant-Q transform (multi-rate, sparse spectral kernels)
//! - Folding of constant-Q bins onto pitch classes
//! - Per-frame normalization

pub mod cqt;
pub mod extractor;
pub mod normalization;

pub use cqt::ConstantQ;
pub use extractor::{chromagram, extract_chroma, fold_to_chroma};

use serde::{Deserialize, Serialize};

use crate::analysis::result::PitchClass;

/// Pitch-class energy summed over an analysis window
///
/// Index 0 is C, index 11 is B. Energies are non-negative and unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChromaVector {
    energy: [f64; 12],
}

impl ChromaVector {
    /// Wrap 12 energies in chromatic order starting at C
    pub fn new(energy: [f64; 12]) -> Self {
        Self { energy }
    }

    /// Energies in chromatic order
    pub fn as_array(&self) -> &[f64; 12] {
        &self.energy
    }

    /// Energy of one pitch class
    pub fn energy(&self, pitch: PitchClass) -> f64 {
        self.energy[pitch.index()]
    }

    /// Energies read starting at `offset` and wrapping around
    ///
    /// `rotated(t)[m] == energy[(t + m) % 12]`, i.e. the profile as seen from tonic `t`.
    pub fn rotated(&self, offset: usize) -> [f64; 12] {
        std::array::from_fn(|m| self.energy[(offset + m) % 12])
    }

    /// Pitch class with the most energy (first one on ties)
    pub fn dominant(&self) -> PitchClass {
        let mut best = 0;
        for (i, &e) in self.energy.iter().enumerate() {
            if e > self.energy[best] {
                best = i;
            }
        }
        PitchClass::from_index(best)
    }

    /// Energies relative to the strongest pitch class
    ///
    /// All zeros when the vector carries no energy.
    pub fn relative(&self) -> [f64; 12] {
        let max = self.energy.iter().copied().fold(0.0f64, f64::max);
        if max > 0.0 {
            self.energy.map(|e| e / max)
        } else {
            [0.0; 12]
        }
    }

    /// One `"<pitch>\t<relative energy>"` line per pitch class
    pub fn prominence_table(&self) -> String {
        PitchClass::ALL
            .iter()
            .zip(self.relative())
            .map(|(pitch, rel)| format!("{}\t{:5.3}", pitch, rel))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> ChromaVector {
        ChromaVector::new(std::array::from_fn(|i| i as f64))
    }

    #[test]
    fn test_rotated() {
        let chroma = ramp();
        assert_eq!(chroma.rotated(0), *chroma.as_array());

        let rotated = chroma.rotated(9);
        assert_eq!(rotated[0], 9.0);
        assert_eq!(rotated[2], 11.0);
        assert_eq!(rotated[3], 0.0);
        assert_eq!(rotated[11], 8.0);
    }

    #[test]
    fn test_dominant_and_relative() {
        let chroma = ramp();
        assert_eq!(chroma.dominant(), PitchClass::B);

        let rel = chroma.relative();
        assert_eq!(rel[11], 1.0);
        assert_eq!(rel[0], 0.0);
        assert!((rel[1] - 1.0 / 11.0).abs() < 1e-12);

        assert_eq!(ChromaVector::new([0.0; 12]).relative(), [0.0; 12]);
    }

    #[test]
    fn test_prominence_table() {
        let mut energy = [0.0; 12];
        energy[0] = 2.0;
        energy[7] = 1.0;
        let table = ChromaVector::new(energy).prominence_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "C\t1.000");
        assert_eq!(lines[1], "C#\t0.000");
        assert_eq!(lines[7], "G\t0.500");
    }
}
