//! Key detection algorithm
//!
//! Correlates a chroma energy vector with the Krumhansl-Schmuckler profiles
//! rotated to each of the 12 tonics, then picks the best key and an alternate.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use super::templates::KeyTemplates;
use crate::analysis::result::{Key, KeyCandidate, KeyEstimate, Mode, PitchClass};
use crate::error::AnalysisError;
use crate::features::chroma::ChromaVector;

/// Decimal places correlations are rounded to before ranking
const CORRELATION_DECIMALS: i32 = 3;

/// Pearson correlation coefficient of two equally long vectors
///
/// `cov(x, y) / (std(x) * std(y))`
///
/// # Errors
///
/// Returns `AnalysisError::DegenerateInput` if either vector has zero variance
/// and `AnalysisError::InvalidInput` if the lengths differ or are below 2
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, AnalysisError> {
    if x.len() != y.len() || x.len() < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "Correlation needs two vectors of equal length >= 2, got {} and {}",
            x.len(),
            y.len()
        )));
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut x_var = 0.0;
    let mut y_var = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let xd = xi - x_mean;
        let yd = yi - y_mean;
        cov += xd * yd;
        x_var += xd * xd;
        y_var += yd * yd;
    }

    if is_zero_variance(x_var, x) || is_zero_variance(y_var, y) {
        return Err(AnalysisError::DegenerateInput(
            "vector has zero variance, correlation is undefined".to_string(),
        ));
    }

    Ok(cov / (x_var * y_var).sqrt())
}

/// Variance is zero up to rounding in the mean
///
/// `var` is the sum of squared deviations. It counts as zero when it is at most
/// `f64::EPSILON` times the sum of squares, i.e. when the spread is below
/// roughly 1e-8 of the values' level. Chroma is accumulated from `f32` frames,
/// so differences that small carry no pitch information.
fn is_zero_variance(var: f64, values: &[f64]) -> bool {
    let scale: f64 = values.iter().map(|v| v * v).sum();
    var <= f64::EPSILON * scale
}

/// Round a correlation to 3 decimals, ties to even
pub fn round_correlation(r: f64) -> f64 {
    let factor = 10f64.powi(CORRELATION_DECIMALS);
    (r * factor).round_ties_even() / factor
}

/// Score all 24 keys against a chroma vector
///
/// For tonic `t` the chroma is read starting at `t` and wrapping around, then
/// correlated with the mode's profile.
///
/// # Returns
///
/// 24 candidates in iteration order: major C..B, then minor C..B
///
/// # Errors
///
/// Returns `AnalysisError::DegenerateInput` if the chroma vector has zero
/// variance (silence, or equal energy in every pitch class) and
/// `AnalysisError::InvalidInput` if it contains non-finite values
pub fn score_keys(
    chroma: &ChromaVector,
    templates: &KeyTemplates,
) -> Result<Vec<KeyCandidate>, AnalysisError> {
    if chroma.as_array().iter().any(|e| !e.is_finite()) {
        return Err(AnalysisError::InvalidInput(
            "Chroma vector contains non-finite values".to_string(),
        ));
    }

    let energy = chroma.as_array();
    let mean = energy.iter().sum::<f64>() / 12.0;
    let var: f64 = energy.iter().map(|e| (e - mean) * (e - mean)).sum();
    if is_zero_variance(var, energy) {
        return Err(AnalysisError::DegenerateInput(format!(
            "chroma vector has zero variance ({:?}), key correlation is undefined",
            energy
        )));
    }

    let mut candidates = Vec::with_capacity(Key::COUNT);
    for mode in [Mode::Major, Mode::Minor] {
        let profile = templates.profile(mode);
        for tonic in PitchClass::ALL {
            let test = chroma.rotated(tonic.index());
            let correlation = round_correlation(pearson(profile, &test)?);
            candidates.push(KeyCandidate {
                key: Key { tonic, mode },
                correlation,
            });
        }
    }

    Ok(candidates)
}

/// Pick the best and alternate keys from scored candidates
///
/// - Best: the first candidate with the maximum correlation.
/// - Alternate: the *last* candidate, in the given order, whose correlation is
///   strictly above `alternate_ratio * best` and not equal to the best
///   correlation. This is not necessarily the second-highest candidate.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `candidates` is empty
pub fn select_key(
    candidates: &[KeyCandidate],
    alternate_ratio: f64,
) -> Result<(KeyCandidate, Option<KeyCandidate>), AnalysisError> {
    let mut iter = candidates.iter();
    let mut best = *iter
        .next()
        .ok_or_else(|| AnalysisError::InvalidInput("No key candidates to select from".to_string()))?;
    for candidate in iter {
        if candidate.correlation > best.correlation {
            best = *candidate;
        }
    }

    let threshold = best.correlation * alternate_ratio;
    let mut alternate = None;
    for candidate in candidates {
        if candidate.correlation > threshold && candidate.correlation != best.correlation {
            alternate = Some(*candidate);
        }
    }

    Ok((best, alternate))
}

/// Detect the musical key of a chroma energy vector
///
/// # Arguments
///
/// * `chroma` - Chroma energy summed over the analysis window
/// * `templates` - Key profiles
/// * `alternate_ratio` - Fraction of the best correlation an alternate must exceed
///
/// # Errors
///
/// Returns `AnalysisError::DegenerateInput` if the chroma vector has zero variance
///
/// # Example
///
/// ```
/// use keyfinder_dsp::features::chroma::ChromaVector;
/// use keyfinder_dsp::features::key::{detect_key, KRUMHANSL_SCHMUCKLER};
///
/// let chroma = ChromaVector::new([
///     10.654, 4.31, 6.304, 4.362, 8.18, 7.274, 4.672, 7.862, 4.926, 8.724, 4.434, 5.696,
/// ]);
/// let estimate = detect_key(&chroma, &KRUMHANSL_SCHMUCKLER, 0.9)?;
/// assert_eq!(estimate.key.name(), "C major");
/// assert_eq!(estimate.alternate_key().map(|k| k.name()), Some("A minor".to_string()));
/// # Ok::<(), keyfinder_dsp::AnalysisError>(())
/// ```
pub fn detect_key(
    chroma: &ChromaVector,
    templates: &KeyTemplates,
    alternate_ratio: f64,
) -> Result<KeyEstimate, AnalysisError> {
    let candidates = score_keys(chroma, templates)?;
    let (best, alternate) = select_key(&candidates, alternate_ratio)?;

    log::debug!(
        "Detected key: {} (r={:.3}), alternate: {}",
        best.key,
        best.correlation,
        alternate
            .map(|c| format!("{} (r={:.3})", c.key, c.correlation))
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(KeyEstimate {
        key: best.key,
        correlation: best.correlation,
        alternate,
        candidates,
        chroma: *chroma,
    })
}
