//! Audio preprocessing modules
//!
//! This module contains utilities for preparing audio for key estimation:
//! - Analysis window selection (time offsets to sample ranges)
//! - Channel mixing (multichannel to mono)
//! - Sample rate conversion
//! - Harmonic-percussive separation

pub mod channel_mixer;
pub mod hpss;
pub mod resample;
pub mod window;
