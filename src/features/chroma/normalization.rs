//! Chroma normalization strategies

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Scale a chroma frame so its largest bin is 1.0 (max / L-infinity norm)
///
/// Frames whose maximum is below epsilon are left untouched, so silent frames
/// contribute nothing instead of amplified noise.
///
/// # Arguments
///
/// * `chroma` - Chroma frame, modified in place
pub fn normalize_max(chroma: &mut [f32]) {
    let max = chroma.iter().copied().fold(0.0f32, f32::max);
    if max > EPSILON {
        for x in chroma.iter_mut() {
            *x /= max;
        }
    }
}
