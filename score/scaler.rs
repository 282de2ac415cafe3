//! Feature standardization against stored reference statistics.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScaleError {
    #[error(
        "Standardization needs equal lengths, got {features} features, {means} means and {stds} standard deviations."
    )]
    LengthMismatch {
        features: usize,
        means: usize,
        stds: usize,
    },
}

/// A zero standard deviation is replaced by 1 so the feature is only centered.
#[inline]
pub fn effective_std(std: f64) -> f64 {
    if std == 0.0 { 1.0 } else { std }
}

/// Standardizes `features` position by position: `(x - mean) / std`.
pub fn standardize(features: &[f64], means: &[f64], stds: &[f64]) -> Result<Vec<f64>, ScaleError> {
    if features.len() != means.len() || features.len() != stds.len() {
        return Err(ScaleError::LengthMismatch {
            features: features.len(),
            means: means.len(),
            stds: stds.len(),
        });
    }

    Ok(features
        .iter()
        .zip(means)
        .zip(stds)
        .map(|((&x, &mean), &std)| (x - mean) / effective_std(std))
        .collect())
}
