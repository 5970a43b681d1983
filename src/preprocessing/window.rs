//! Analysis window selection
//!
//! Converts start/end offsets in seconds to sample indices and slices the
//! waveform. Bounds outside the waveform are clipped rather than rejected.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Time range of a waveform to analyse, in seconds
///
/// `None` bounds default to the start or end of the waveform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    /// Start offset in seconds
    pub start: Option<f64>,
    /// End offset in seconds (exclusive)
    pub end: Option<f64>,
}

impl AnalysisWindow {
    /// Window between optional start and end offsets
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// Window covering the whole waveform
    pub fn full() -> Self {
        Self::default()
    }

    /// Resolve the window to a `[start, end)` sample range clipped to `len` samples
    ///
    /// Returns `(start, start)` when the end precedes the start.
    pub fn sample_range(&self, sample_rate: u32, len: usize) -> (usize, usize) {
        let start = self
            .start
            .map(|t| time_to_samples(t, sample_rate).min(len))
            .unwrap_or(0);
        let end = self
            .end
            .map(|t| time_to_samples(t, sample_rate).min(len))
            .unwrap_or(len);
        (start, end.max(start))
    }

    /// Slice `samples` to this window
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::EmptyWindow` if the window contains no samples
    pub fn apply<'a>(&self, samples: &'a [f32], sample_rate: u32) -> Result<&'a [f32], AnalysisError> {
        let (start, end) = self.sample_range(sample_rate, samples.len());
        if start == end {
            return Err(AnalysisError::EmptyWindow { start, end });
        }

        log::debug!(
            "Analysis window: samples [{}, {}) of {} ({:.2}s)",
            start,
            end,
            samples.len(),
            (end - start) as f64 / sample_rate as f64
        );

        Ok(&samples[start..end])
    }
}

/// Convert a time offset to a sample index: `round(seconds * sample_rate)`
///
/// Negative offsets clamp to 0.
pub fn time_to_samples(seconds: f64, sample_rate: u32) -> usize {
    let index = (seconds * sample_rate as f64).round();
    if index > 0.0 {
        index as usize
    } else {
        0
    }
}
