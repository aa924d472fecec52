use crate::error::{BlendError, Result};

/// Resolves the blend weights for datasets of the given lengths.
///
/// Without explicit weights each dataset is weighted by its share of the
/// total length, e.g. lengths 2000/3000/5000 give `[0.2, 0.3, 0.5]`.
/// Explicit weights need one entry per dataset and are rescaled to sum to 1.
pub fn normalize_weights(weights: Option<&[f64]>, lengths: &[usize]) -> Result<Vec<f64>> {
    match weights {
        Some(raw) => {
            if raw.len() != lengths.len() {
                return Err(BlendError::Configuration(format!(
                    "got {} weights for {} datasets",
                    raw.len(),
                    lengths.len()
                )));
            }
            normalize(raw)
        }
        None => normalize(&proportional_weights(lengths)),
    }
}

pub fn proportional_weights(lengths: &[usize]) -> Vec<f64> {
    let total: usize = lengths.iter().sum();
    if total == 0 {
        return vec![0.0; lengths.len()];
    }
    lengths
        .iter()
        .map(|&len| len as f64 / total as f64)
        .collect()
}

/// Divides every weight by the sum. No clamping or rounding is applied.
pub fn normalize(weights: &[f64]) -> Result<Vec<f64>> {
    if let Some((idx, weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(BlendError::InvalidWeight(format!(
            "weight {idx} is {weight}, weights must be finite and non-negative"
        )));
    }

    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Err(BlendError::InvalidWeight(format!(
            "weights sum to {sum}, at least one dataset needs a positive weight"
        )));
    }

    Ok(weights.iter().map(|w| w / sum).collect())
}
