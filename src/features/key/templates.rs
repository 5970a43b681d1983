//! Krumhansl-Schmuckler key templates
//!
//! Defines tonal profiles for 24 keys (12 major + 12 minor). Each profile lists
//! the relative importance of the 12 scale steps above the tonic; the profile
//! for tonic `t` is the base profile rotated by `t`.
//!
//! # Reference
//!
//! Krumhansl, C. L. (1990). *Cognitive Foundations of Musical Pitch*. Oxford University Press.

use crate::analysis::result::Mode;

/// Major key profile (tonic first)
pub const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Minor key profile (tonic first)
pub const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Key templates for all 24 keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyTemplates {
    /// Major profile, tonic first
    pub major: [f64; 12],

    /// Minor profile, tonic first
    pub minor: [f64; 12],
}

/// Process-wide Krumhansl-Schmuckler templates
pub static KRUMHANSL_SCHMUCKLER: KeyTemplates = KeyTemplates::new();

impl KeyTemplates {
    /// Templates with the Krumhansl-Schmuckler profiles
    pub const fn new() -> Self {
        Self {
            major: MAJOR_PROFILE,
            minor: MINOR_PROFILE,
        }
    }

    /// Profile for `mode`, tonic first
    pub fn profile(&self, mode: Mode) -> &[f64; 12] {
        match mode {
            Mode::Major => &self.major,
            Mode::Minor => &self.minor,
        }
    }

    /// Profile for `mode` laid out over absolute pitch classes for tonic `tonic`
    ///
    /// `template(mode, t)[(t + m) % 12] == profile(mode)[m]`
    pub fn template(&self, mode: Mode, tonic: usize) -> [f64; 12] {
        let profile = self.profile(mode);
        std::array::from_fn(|pc| profile[(pc + 12 - tonic % 12) % 12])
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_peak_on_tonic() {
        let templates = KeyTemplates::new();
        for mode in [Mode::Major, Mode::Minor] {
            let profile = templates.profile(mode);
            let max = profile.iter().copied().fold(f64::MIN, f64::max);
            assert_eq!(profile[0], max);
        }
    }

    #[test]
    fn test_template_rotation() {
        let templates = KeyTemplates::new();

        // G major: tonic weight on G, dominant weight on D
        let g_major = templates.template(Mode::Major, 7);
        assert_eq!(g_major[7], 6.35);
        assert_eq!(g_major[2], 5.19);

        // A minor: minor third on C
        let a_minor = templates.template(Mode::Minor, 9);
        assert_eq!(a_minor[9], 6.33);
        assert_eq!(a_minor[0], 5.38);

        assert_eq!(templates.template(Mode::Major, 0), MAJOR_PROFILE);
    }

    #[test]
    fn test_shared_templates() {
        assert_eq!(KRUMHANSL_SCHMUCKLER, KeyTemplates::default());
    }
}
