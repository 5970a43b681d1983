//! Key detection modules
//!
//! Detect musical key using:
//! - Krumhansl-Schmuckler profiles (24 keys)
//! - Pearson correlation of the chroma vector against each rotated profile
//! - Best key plus an optional alternate close to it

pub mod detector;
pub mod templates;

pub use detector::{detect_key, pearson, round_correlation, score_keys, select_key};
pub use templates::{KeyTemplates, KRUMHANSL_SCHMUCKLER, MAJOR_PROFILE, MINOR_PROFILE};
