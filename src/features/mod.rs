//! Feature extraction modules
//!
//! This module contains the tonal feature extraction algorithms:
//! - Chroma extraction (constant-Q transform folded to 12 pitch classes)
//! - Key detection

pub mod chroma;
pub mod key;
