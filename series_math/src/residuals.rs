//! Residual statistics used to size uncertainty intervals

use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Root mean squared difference between observations and fitted values
pub fn residual_std(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    if actual.len() != fitted.len() || actual.is_empty() {
        return Err(MathError::InvalidInput(
            "Actual and fitted values must have the same non-zero length".to_string(),
        ));
    }

    let n = actual.len() as f64;
    let mse = actual
        .iter()
        .zip(fitted.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum::<f64>()
        / n;

    Ok(mse.sqrt())
}

/// Two-sided normal quantile for an interval covering `width` of the mass.
///
/// `interval_multiplier(0.95)` is roughly 1.96.
pub fn interval_multiplier(width: f64) -> Result<f64> {
    if !(width > 0.0 && width < 1.0) {
        return Err(MathError::InvalidInput(
            "Interval width must be between 0 and 1 (exclusive)".to_string(),
        ));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residual_std() {
        let std = residual_std(&[1.0, 2.0, 3.0], &[1.0, 2.0, 5.0]).unwrap();
        assert!((std - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_residual_std_length_mismatch() {
        assert!(residual_std(&[1.0], &[1.0, 2.0]).is_err());
        assert!(residual_std(&[], &[]).is_err());
    }

    #[test]
    fn test_interval_multiplier() {
        assert!((interval_multiplier(0.95).unwrap() - 1.959964).abs() < 1e-3);
        assert!((interval_multiplier(0.8).unwrap() - 1.281552).abs() < 1e-3);
        assert!(interval_multiplier(1.0).is_err());
        assert!(interval_multiplier(0.0).is_err());
    }
}
