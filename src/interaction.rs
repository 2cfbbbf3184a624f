//! Treatment × mediator interaction test.
//!
//! Tests H₀: ACME(1) = ACME(0), i.e. whether the mediation effect differs
//! between treated and control arms. Only meaningful when the outcome model
//! includes the treatment × mediator term.
//!
//! # Algorithm
//!
//! diff = d1 − d0, diff draws = d1.sims − d0.sims. The p-value is the
//! two-sided empirical p-value of the diff draws and the interval is their
//! percentile interval.
//!
//! # Examples
//!
//! ```
//! use u_mediation::fit::ContinuousMediation;
//! use u_mediation::interaction::continuous_interaction_test;
//!
//! let d1: Vec<f64> = (0..200).map(|i| 0.30 + (i % 10) as f64 * 0.001).collect();
//! let d0: Vec<f64> = (0..200).map(|i| 0.10 + (i % 7) as f64 * 0.001).collect();
//! let fit = ContinuousMediation::new(0.30, 0.10, 0.25, 0.25)
//!     .with_draws(d1, d0, vec![0.25; 200], vec![0.25; 200])
//!     .with_interaction(true);
//!
//! let t = continuous_interaction_test(&fit, None).unwrap();
//! assert!((t.statistic - 0.20).abs() < 1e-12);
//! assert_eq!(t.p_value, 0.0);
//! ```

use crate::empirical::validate_conf_level;
use crate::error::{MediationError, Result};
use crate::fit::{ContinuousMediation, Effect, MediationFit, OrderedMediation};
use crate::hypothesis::{HypothesisTest, OrderedHypothesisTest, TestReport};

/// Name of the tested difference.
pub const INTERACTION_STATISTIC: &str = "ACME(1) - ACME(0)";

/// Runs the interaction test on any supported fit.
///
/// `conf_level` defaults to the level stored in the fit.
///
/// # Errors
///
/// - `UnsupportedInputType` for fits other than continuous or ordered.
/// - `MissingSimulationDraws` if any of the four draw vectors is absent.
/// - `MissingInteractionTerm` if the outcome model has no interaction.
pub fn test_treatment_interaction(
    fit: &MediationFit,
    conf_level: Option<f64>,
) -> Result<TestReport> {
    match fit {
        MediationFit::Continuous(f) => {
            let test = continuous_interaction_test(f, conf_level)?;
            Ok(TestReport::Continuous(test))
        }
        MediationFit::Ordered(f) => {
            let test = ordered_interaction_test(f, conf_level)?;
            Ok(TestReport::Ordered(test))
        }
        MediationFit::Other { .. } => Err(fit.unsupported()),
    }
}

/// Interaction test for a continuous-outcome fit.
pub fn continuous_interaction_test(
    fit: &ContinuousMediation,
    conf_level: Option<f64>,
) -> Result<HypothesisTest> {
    fit.require_all_draws()?;
    if !fit.interaction {
        return Err(MediationError::MissingInteractionTerm);
    }
    let conf_level = conf_level.unwrap_or(fit.conf_level);
    validate_conf_level(conf_level)?;

    let diff = fit.estimate(Effect::Acme1) - fit.estimate(Effect::Acme0);
    let diff_sims = crate::empirical::paired_difference(
        fit.draws(Effect::Acme1)?,
        fit.draws(Effect::Acme0)?,
    )?;

    tracing::debug!(
        statistic = diff,
        sims = diff_sims.len(),
        conf_level,
        "treatment interaction test"
    );

    HypothesisTest::from_draws(
        INTERACTION_STATISTIC,
        diff,
        &diff_sims,
        conf_level,
        format!("estimates from {}", fit.label),
    )
}

/// Interaction test for an ordered-outcome fit, one entry per category.
pub fn ordered_interaction_test(
    fit: &OrderedMediation,
    conf_level: Option<f64>,
) -> Result<OrderedHypothesisTest> {
    fit.require_all_draws()?;
    if !fit.interaction {
        return Err(MediationError::MissingInteractionTerm);
    }
    let conf_level = conf_level.unwrap_or(fit.conf_level);
    validate_conf_level(conf_level)?;

    let diff = elementwise_difference(fit.estimate(Effect::Acme1), fit.estimate(Effect::Acme0))?;
    let acme_treated = fit.draws(Effect::Acme1)?;
    let diff_sims = acme_treated.difference(fit.draws(Effect::Acme0)?)?;

    tracing::debug!(
        categories = fit.categories.len(),
        sims = diff_sims.n_sims(),
        conf_level,
        "ordered treatment interaction test"
    );

    OrderedHypothesisTest::from_draws(
        INTERACTION_STATISTIC,
        diff,
        &diff_sims,
        conf_level,
        format!("estimates from {}", fit.label),
        &fit.categories,
    )
}

/// Elementwise `a - b` over per-category estimates.
pub(crate) fn elementwise_difference(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    if a.len() != b.len() {
        return Err(MediationError::mismatch(
            "estimate categories",
            a.len(),
            b.len(),
        ));
    }
    Ok(a.iter().zip(b).map(|(&x, &y)| x - y).collect())
}
