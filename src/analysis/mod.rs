//! Analysis result types
//!
//! Pitch classes, modes, keys, and the key estimate returned by the pipeline.

pub mod result;
