//! Empirical inference from simulation draws.
//!
//! Converts a sample of simulated effect values into a two-sided p-value
//! against the null value 0 and a percentile confidence interval. These two
//! primitives are the only statistical machinery the mediation tests need.
//!
//! # Tie convention
//!
//! Draws exactly equal to 0 belong to neither tail:
//!
//! p = 2 · min(#{s > 0}, #{s < 0}) / n, clipped to 1.
//!
//! An observed estimate of exactly 0 always yields p = 1. NaN or infinite
//! draws and estimates are rejected rather than skipped.
//!
//! # Examples
//!
//! ```
//! use u_mediation::empirical::{empirical_p_value, percentile_interval};
//!
//! let draws = [0.12, 0.18, 0.21, 0.25, 0.19, 0.22, 0.17, 0.24];
//! let p = empirical_p_value(&draws, 0.20).unwrap();
//! assert_eq!(p, 0.0); // every draw on the same side of 0
//!
//! let (lo, hi) = percentile_interval(&draws, 0.95).unwrap();
//! assert!(lo > 0.0 && lo < hi);
//! ```

use u_numflow::stats;

use crate::error::{MediationError, Result};

/// Two-sided empirical p-value of `estimate` under H₀: effect = 0.
///
/// # Returns
///
/// `Err(EmptyDraws)` if `draws` is empty, `Err(NonFiniteDraws)` if any draw
/// or the estimate is NaN or infinite.
pub fn empirical_p_value(draws: &[f64], estimate: f64) -> Result<f64> {
    require_finite(draws)?;
    if !estimate.is_finite() {
        return Err(MediationError::NonFiniteDraws {
            quantity: "observed estimate",
        });
    }
    if estimate == 0.0 {
        return Ok(1.0);
    }

    let above = draws.iter().filter(|&&s| s > 0.0).count();
    let below = draws.iter().filter(|&&s| s < 0.0).count();
    let p = 2.0 * above.min(below) as f64 / draws.len() as f64;

    Ok(p.min(1.0))
}

/// Percentile confidence interval: the `(1-conf)/2` and `(1+conf)/2`
/// empirical quantiles of `draws`.
///
/// # Returns
///
/// `Err(EmptyDraws)` for an empty slice, `Err(NonFiniteDraws)` if any draw
/// is NaN or infinite, `Err(InvalidConfidenceLevel)` when `conf_level` is
/// not in (0, 1).
pub fn percentile_interval(draws: &[f64], conf_level: f64) -> Result<(f64, f64)> {
    validate_conf_level(conf_level)?;
    require_finite(draws)?;
    if let [only] = draws {
        return Ok((*only, *only));
    }
    let lower = stats::quantile(draws, (1.0 - conf_level) / 2.0);
    let upper = stats::quantile(draws, (1.0 + conf_level) / 2.0);
    match (lower, upper) {
        (Some(lower), Some(upper)) => Ok((lower, upper)),
        _ => Err(MediationError::NonFiniteDraws {
            quantity: "simulation draws",
        }),
    }
}

/// Rejects empty draw sets and draws that are NaN or infinite.
fn require_finite(draws: &[f64]) -> Result<()> {
    if draws.is_empty() {
        return Err(MediationError::EmptyDraws);
    }
    if draws.iter().any(|v| !v.is_finite()) {
        return Err(MediationError::NonFiniteDraws {
            quantity: "simulation draws",
        });
    }
    Ok(())
}

/// Elementwise `a - b` over two paired draw sequences.
pub fn paired_difference(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    if a.len() != b.len() {
        return Err(MediationError::mismatch(
            "paired simulation draws",
            a.len(),
            b.len(),
        ));
    }
    Ok(a.iter().zip(b).map(|(&x, &y)| x - y).collect())
}

/// Rejects confidence levels outside the open unit interval.
pub fn validate_conf_level(conf_level: f64) -> Result<()> {
    if conf_level.is_finite() && conf_level > 0.0 && conf_level < 1.0 {
        Ok(())
    } else {
        Err(MediationError::InvalidConfidenceLevel { level: conf_level })
    }
}

// ---------------------------------------------------------------------------
// Column-wise forms (ordered outcomes)
// ---------------------------------------------------------------------------

/// Applies [`empirical_p_value`] to each column against its own estimate.
pub fn column_p_values(columns: &[Vec<f64>], estimates: &[f64]) -> Result<Vec<f64>> {
    if columns.len() != estimates.len() {
        return Err(MediationError::mismatch(
            "estimate/draw categories",
            estimates.len(),
            columns.len(),
        ));
    }
    columns
        .iter()
        .zip(estimates)
        .map(|(col, &est)| empirical_p_value(col, est))
        .collect()
}

/// Applies [`percentile_interval`] to each column; returns `(lower, upper)` rows.
pub fn column_intervals(columns: &[Vec<f64>], conf_level: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut lower = Vec::with_capacity(columns.len());
    let mut upper = Vec::with_capacity(columns.len());
    for col in columns {
        let (lo, hi) = percentile_interval(col, conf_level)?;
        lower.push(lo);
        upper.push(hi);
    }
    Ok((lower, upper))
}
