//! Moderated-mediation test.
//!
//! Tests whether mediation effects differ between two covariate strata by
//! re-running the estimator at each stratum and comparing the results.
//!
//! # Algorithm
//!
//! 1. Clone the fit's [`FitRequest`], force full draws, and set the
//!    simulation count.
//! 2. Snapshot the generator, estimate at `covariates_1`, restore the
//!    snapshot, estimate at `covariates_2`. Both runs consume the same random
//!    sequence (common random numbers), which shrinks the variance of the
//!    differences.
//! 3. For each effect, diff = effect(covariates_1) − effect(covariates_2)
//!    with draws differenced elementwise; p-value and interval as in
//!    [`empirical`](crate::empirical).
//!
//! With a treatment × mediator interaction, four records are returned
//! (ACME treated, ACME control, ADE treated, ADE control). Without it,
//! ACME and ADE do not depend on the treatment arm and two records are
//! returned (ACME from the treated arm, ADE from the control arm).
//!
//! # Examples
//!
//! ```
//! use u_mediation::estimator::Estimator;
//! use u_mediation::linear::{LinearMediationEstimator, LinearModel};
//! use u_mediation::moderation::{test_moderated_mediation, Covariates, ModerationOptions};
//! use u_mediation::request::FitRequest;
//! use u_mediation::rng::SimRng;
//!
//! let estimator = LinearMediationEstimator::new()
//!     .with_model("med", LinearModel::new()
//!         .with_term("treat", 1.0, 0.1)
//!         .with_term("treat:age", 0.05, 0.01))
//!     .with_model("out", LinearModel::new().with_term("m", 0.6, 0.05))
//!     .with_covariate("age", 40.0);
//!
//! let mut rng = SimRng::seed_from_u64(42);
//! let request = FitRequest::new("med", "out", "treat", "m").with_sims(300);
//! let fit = estimator.estimate(&request, &mut rng).unwrap();
//!
//! let young = Covariates::from([("age".to_string(), 20.0)]);
//! let old = Covariates::from([("age".to_string(), 60.0)]);
//! let result = test_moderated_mediation(
//!     &fit, &estimator, &mut rng, &young, &old, &ModerationOptions::default(),
//! ).unwrap();
//!
//! assert_eq!(result.len(), 2);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::empirical::{paired_difference, validate_conf_level};
use crate::error::{MediationError, Result};
use crate::estimator::{run_estimator, Estimator};
use crate::fit::{ContinuousMediation, Effect, MediationFit, OrderedMediation};
use crate::hypothesis::{HypothesisTest, ModeratedMediation, OrderedHypothesisTest};
use crate::interaction::elementwise_difference;
use crate::rng::SimRng;

/// Covariate name → value assignment defining one stratum.
pub type Covariates = BTreeMap<String, f64>;

/// Below this many draws, percentile intervals are unreliable.
const MIN_RELIABLE_SIMS: usize = 100;

/// Options for [`test_moderated_mediation`]. Unset fields fall back to the
/// values stored in the fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationOptions {
    /// Simulation count for the re-evaluations.
    pub sims: Option<usize>,
    /// Confidence level for the reported intervals.
    pub conf_level: Option<f64>,
}

impl ModerationOptions {
    pub fn with_sims(mut self, sims: usize) -> Self {
        self.sims = Some(sims);
        self
    }

    pub fn with_conf_level(mut self, conf_level: f64) -> Self {
        self.conf_level = Some(conf_level);
        self
    }
}

/// Effects compared, in output order.
fn compared_effects(interaction: bool) -> &'static [Effect] {
    if interaction {
        &Effect::ALL
    } else {
        &[Effect::Acme1, Effect::Ade0]
    }
}

fn statistic_name(effect: Effect, interaction: bool) -> String {
    let family = effect.family();
    let base = format!("{family}(covariates.1) - {family}(covariates.2)");
    if interaction {
        format!("{base} ({})", effect.arm())
    } else {
        base
    }
}

/// Runs the moderated-mediation test.
///
/// # Errors
///
/// - `UnsupportedInputType` for fits other than continuous or ordered.
/// - `MissingFitRequest` if the fit does not carry its request.
/// - `InvalidConfidenceLevel` for a level outside (0, 1).
/// - `Estimator` with the estimator's own error if either re-evaluation fails.
/// - `FitKindMismatch` / `MissingSimulationDraws` if a re-evaluation returns
///   an unusable fit.
/// - `OutcomeLevelMismatch` / `DimensionMismatch` if an ordered re-evaluation
///   reports different outcome levels than the original fit.
pub fn test_moderated_mediation<E: Estimator + ?Sized>(
    fit: &MediationFit,
    estimator: &E,
    rng: &mut SimRng,
    covariates_1: &Covariates,
    covariates_2: &Covariates,
    options: &ModerationOptions,
) -> Result<ModeratedMediation> {
    let (fit_sims, fit_conf_level, label) = match fit {
        MediationFit::Continuous(f) => (f.sims, f.conf_level, f.label.as_str()),
        MediationFit::Ordered(f) => (f.sims, f.conf_level, f.label.as_str()),
        MediationFit::Other { .. } => return Err(fit.unsupported()),
    };
    let request = fit.request().ok_or(MediationError::MissingFitRequest)?;
    let interaction = fit.has_interaction();
    let sims = options.sims.unwrap_or(fit_sims);
    let conf_level = options.conf_level.unwrap_or(fit_conf_level);
    validate_conf_level(conf_level)?;
    if sims < MIN_RELIABLE_SIMS {
        tracing::warn!(sims, "few simulation draws; intervals will be coarse");
    }

    let base = request.clone().retaining_draws().with_sims(sims);
    let request_1 = base.clone().with_covariates(covariates_1.clone());
    let request_2 = base.with_covariates(covariates_2.clone());

    let state = rng.snapshot();
    tracing::debug!(covariates = ?covariates_1, sims, "re-evaluating at covariates.1");
    let out_1 = run_estimator(estimator, &request_1, rng)?;
    rng.restore(&state);
    tracing::trace!("generator restored for second re-evaluation");
    tracing::debug!(covariates = ?covariates_2, sims, "re-evaluating at covariates.2");
    let out_2 = run_estimator(estimator, &request_2, rng)?;

    let data_name = format!("estimates from {label}");
    match fit {
        MediationFit::Continuous(_) => {
            let out_1 = expect_continuous(out_1)?;
            let out_2 = expect_continuous(out_2)?;
            continuous_records(&out_1, &out_2, interaction, conf_level, &data_name)
                .map(ModeratedMediation::Continuous)
        }
        MediationFit::Ordered(original) => {
            let out_1 = expect_ordered(out_1)?;
            let out_2 = expect_ordered(out_2)?;
            check_levels(&original.categories, &out_1.categories)?;
            check_levels(&original.categories, &out_2.categories)?;
            ordered_records(
                &out_1,
                &out_2,
                interaction,
                conf_level,
                &data_name,
                &original.categories,
            )
            .map(ModeratedMediation::Ordered)
        }
        MediationFit::Other { .. } => Err(fit.unsupported()),
    }
}

fn expect_continuous(fit: MediationFit) -> Result<ContinuousMediation> {
    match fit {
        MediationFit::Continuous(f) => Ok(f),
        other => Err(MediationError::FitKindMismatch {
            expected: "continuous",
            found: other.kind().to_string(),
        }),
    }
}

fn expect_ordered(fit: MediationFit) -> Result<OrderedMediation> {
    match fit {
        MediationFit::Ordered(f) => Ok(f),
        other => Err(MediationError::FitKindMismatch {
            expected: "ordered",
            found: other.kind().to_string(),
        }),
    }
}

/// Re-evaluations must report the outcome levels of the original fit.
fn check_levels(original: &[String], found: &[String]) -> Result<()> {
    if original == found {
        return Ok(());
    }
    if original.len() != found.len() {
        return Err(MediationError::mismatch(
            "outcome categories",
            original.len(),
            found.len(),
        ));
    }
    Err(MediationError::OutcomeLevelMismatch {
        expected: original.join(", "),
        found: found.join(", "),
    })
}

fn continuous_records(
    out_1: &ContinuousMediation,
    out_2: &ContinuousMediation,
    interaction: bool,
    conf_level: f64,
    data_name: &str,
) -> Result<Vec<HypothesisTest>> {
    compared_effects(interaction)
        .iter()
        .map(|&effect| {
            let diff = out_1.estimate(effect) - out_2.estimate(effect);
            let diff_sims = paired_difference(out_1.draws(effect)?, out_2.draws(effect)?)?;
            HypothesisTest::from_draws(
                statistic_name(effect, interaction),
                diff,
                &diff_sims,
                conf_level,
                data_name,
            )
        })
        .collect()
}

fn ordered_records(
    out_1: &OrderedMediation,
    out_2: &OrderedMediation,
    interaction: bool,
    conf_level: f64,
    data_name: &str,
    categories: &[String],
) -> Result<Vec<OrderedHypothesisTest>> {
    compared_effects(interaction)
        .iter()
        .map(|&effect| {
            let diff = elementwise_difference(out_1.estimate(effect), out_2.estimate(effect))?;
            if diff.len() != categories.len() {
                return Err(MediationError::mismatch(
                    "outcome categories",
                    categories.len(),
                    diff.len(),
                ));
            }
            let diff_sims = out_1.draws(effect)?.difference(out_2.draws(effect)?)?;
            OrderedHypothesisTest::from_draws(
                statistic_name(effect, interaction),
                diff,
                &diff_sims,
                conf_level,
                data_name,
                categories,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;
    use crate::fit::{outcome_levels, EffectDraws};
    use crate::linear::{LinearMediationEstimator, LinearModel, INTERCEPT};
    use crate::request::FitRequest;

    fn linear_estimator(interaction: bool) -> LinearMediationEstimator {
        let mut outcome = LinearModel::new()
            .with_term(INTERCEPT, 0.2, 0.05)
            .with_term("treat", 0.4, 0.08)
            .with_term("m", 0.6, 0.05)
            .with_term("treat:age", 0.01, 0.002);
        if interaction {
            outcome = outcome.with_term("treat:m", 0.2, 0.04);
        }
        LinearMediationEstimator::new()
            .with_model(
                "med",
                LinearModel::new()
                    .with_term(INTERCEPT, 1.0, 0.1)
                    .with_term("treat", 0.5, 0.05)
                    .with_term("age", 0.02, 0.005)
                    .with_term("treat:age", 0.03, 0.003),
            )
            .with_model("out", outcome)
            .with_covariate("age", 40.0)
    }

    fn base_fit(est: &LinearMediationEstimator, rng: &mut SimRng) -> MediationFit {
        let req = FitRequest::new("med", "out", "treat", "m").with_sims(400);
        est.estimate(&req, rng).unwrap()
    }

    fn age(value: f64) -> Covariates {
        Covariates::from([("age".to_string(), value)])
    }

    fn continuous(result: &ModeratedMediation) -> &[HypothesisTest] {
        match result {
            ModeratedMediation::Continuous(v) => v,
            ModeratedMediation::Ordered(_) => panic!("expected continuous records"),
        }
    }

    #[test]
    fn record_counts_follow_interaction() {
        for (interaction, expected) in [(false, 2), (true, 4)] {
            let est = linear_estimator(interaction);
            let mut rng = SimRng::seed_from_u64(1);
            let fit = base_fit(&est, &mut rng);
            let result = test_moderated_mediation(
                &fit,
                &est,
                &mut rng,
                &age(20.0),
                &age(60.0),
                &ModerationOptions::default(),
            )
            .unwrap();
            assert_eq!(result.len(), expected, "interaction = {interaction}");
        }
    }

    #[test]
    fn labels_and_order() {
        let est = linear_estimator(true);
        let mut rng = SimRng::seed_from_u64(2);
        let fit = base_fit(&est, &mut rng);
        let result = test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &age(20.0),
            &age(60.0),
            &ModerationOptions::default(),
        )
        .unwrap();
        let names: Vec<&str> = continuous(&result)
            .iter()
            .map(|t| t.statistic_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "ACME(covariates.1) - ACME(covariates.2) (treated)",
                "ACME(covariates.1) - ACME(covariates.2) (control)",
                "ADE(covariates.1) - ADE(covariates.2) (treated)",
                "ADE(covariates.1) - ADE(covariates.2) (control)",
            ]
        );
        let first = &continuous(&result)[0];
        assert_eq!(
            first.method,
            "Test of ACME(covariates.1) - ACME(covariates.2) (treated) = 0"
        );
        assert_eq!(first.data_name, "estimates from mediate(med, out)");

        let est = linear_estimator(false);
        let fit = base_fit(&est, &mut rng);
        let result = test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &age(20.0),
            &age(60.0),
            &ModerationOptions::default(),
        )
        .unwrap();
        let names: Vec<&str> = continuous(&result)
            .iter()
            .map(|t| t.statistic_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "ACME(covariates.1) - ACME(covariates.2)",
                "ADE(covariates.1) - ADE(covariates.2)",
            ]
        );
    }

    #[test]
    fn identical_strata_give_zero_differences() {
        for interaction in [false, true] {
            let est = linear_estimator(interaction);
            let mut rng = SimRng::seed_from_u64(3);
            let fit = base_fit(&est, &mut rng);
            let result = test_moderated_mediation(
                &fit,
                &est,
                &mut rng,
                &age(35.0),
                &age(35.0),
                &ModerationOptions::default(),
            )
            .unwrap();
            for t in continuous(&result) {
                assert_eq!(t.statistic, 0.0, "{}", t.statistic_name);
                assert_eq!(t.p_value, 1.0, "{}", t.statistic_name);
                assert_eq!(t.conf_int, (0.0, 0.0), "{}", t.statistic_name);
            }
        }
    }

    #[test]
    fn strong_moderation_detected() {
        let est = linear_estimator(false);
        let mut rng = SimRng::seed_from_u64(4);
        let fit = base_fit(&est, &mut rng);
        let result = test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &age(20.0),
            &age(60.0),
            &ModerationOptions::default().with_sims(500),
        )
        .unwrap();
        let acme = &continuous(&result)[0];
        // a(20) − a(60) = 0.03·(20 − 60) = −1.2, times βₘ = 0.6
        assert!(acme.statistic < -0.5, "ACME diff = {}", acme.statistic);
        assert!(acme.p_value < 0.05, "p = {}", acme.p_value);
        assert!(acme.conf_int.1 < 0.0);
    }

    #[test]
    fn options_override_fit_defaults() {
        let est = linear_estimator(false);
        let mut rng = SimRng::seed_from_u64(5);
        let fit = base_fit(&est, &mut rng);
        let result = test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &age(20.0),
            &age(60.0),
            &ModerationOptions::default().with_conf_level(0.8),
        )
        .unwrap();
        assert!(continuous(&result).iter().all(|t| t.conf_level == 0.8));

        let result = test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &age(20.0),
            &age(60.0),
            &ModerationOptions::default(),
        )
        .unwrap();
        assert!(continuous(&result).iter().all(|t| t.conf_level == 0.95));
    }

    #[test]
    fn common_random_numbers_beat_independent_streams() {
        let est = linear_estimator(false);
        let mut rng = SimRng::seed_from_u64(6);
        let fit = base_fit(&est, &mut rng);
        let crn = test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &age(38.0),
            &age(42.0),
            &ModerationOptions::default(),
        )
        .unwrap();
        let crn_width = {
            let t = &continuous(&crn)[0];
            t.conf_int.1 - t.conf_int.0
        };

        // Same comparison without restoring the generator between runs.
        let req = fit.request().unwrap().clone().retaining_draws();
        let a = est
            .estimate(&req.clone().with_covariates(age(38.0)), &mut rng)
            .map(expect_continuous)
            .unwrap()
            .unwrap();
        let b = est
            .estimate(&req.with_covariates(age(42.0)), &mut rng)
            .map(expect_continuous)
            .unwrap()
            .unwrap();
        let indep = continuous_records(&a, &b, false, 0.95, "x").unwrap();
        let indep_width = indep[0].conf_int.1 - indep[0].conf_int.0;

        assert!(
            crn_width < indep_width,
            "crn width {crn_width} should be below independent width {indep_width}"
        );
    }

    #[test]
    fn missing_request_rejected() {
        let fit: MediationFit = ContinuousMediation::new(0.1, 0.1, 0.1, 0.1).into();
        let est = linear_estimator(false);
        let err = test_moderated_mediation(
            &fit,
            &est,
            &mut SimRng::seed_from_u64(0),
            &age(1.0),
            &age(2.0),
            &ModerationOptions::default(),
        );
        assert!(matches!(err, Err(MediationError::MissingFitRequest)));
    }

    #[test]
    fn unsupported_fit_rejected() {
        let fit = MediationFit::Other {
            design: "parallel".into(),
        };
        let est = linear_estimator(false);
        let err = test_moderated_mediation(
            &fit,
            &est,
            &mut SimRng::seed_from_u64(0),
            &age(1.0),
            &age(2.0),
            &ModerationOptions::default(),
        );
        assert!(matches!(
            err,
            Err(MediationError::UnsupportedInputType { .. })
        ));
    }

    #[test]
    fn estimator_errors_propagate_verbatim() {
        let est = linear_estimator(false);
        let mut rng = SimRng::seed_from_u64(7);
        let fit = base_fit(&est, &mut rng);
        let bad = Covariates::from([("income".to_string(), 1.0)]);
        let err = test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &age(20.0),
            &bad,
            &ModerationOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "covariate 'income' is not a variable of the fitted models"
        );
        match err {
            MediationError::Estimator(inner) => {
                assert!(inner.is::<crate::linear::LinearEstimatorError>());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // Ordered outcomes
    // -----------------------------------------------------------------------

    #[derive(Debug)]
    struct NeverFits;

    impl fmt::Display for NeverFits {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("never fits")
        }
    }

    impl std::error::Error for NeverFits {}

    /// Ordered-outcome estimator whose per-category effects scale with the
    /// covariate `w`; ADE columns carry a fixed offset so they differ from ACME.
    struct ScaledOrderedEstimator {
        interaction: bool,
    }

    impl Estimator for ScaledOrderedEstimator {
        type Error = NeverFits;

        fn estimate(
            &self,
            request: &FitRequest,
            rng: &mut SimRng,
        ) -> std::result::Result<MediationFit, NeverFits> {
            let w = request.covariates.get("w").copied().unwrap_or(1.0);
            let cats = outcome_levels(["1", "2", "3"]);
            let base = [0.10, 0.02, -0.12];
            let mut columns = |scale: f64, offset: f64| -> EffectDraws {
                let cols: Vec<Vec<f64>> = base
                    .iter()
                    .map(|&b| {
                        (0..request.sims)
                            .map(|_| scale * (b + rng.normal(0.0, 0.01)) + offset)
                            .collect::<Vec<f64>>()
                    })
                    .collect();
                EffectDraws::from_columns(cols).unwrap()
            };
            let d1 = columns(w, 0.0);
            let d0 = columns(0.5 * w, 0.0);
            let z1 = columns(1.0, 0.3 * w);
            let z0 = columns(1.0, 0.2 * w);
            let mean = |d: &EffectDraws| -> Vec<f64> {
                d.columns()
                    .iter()
                    .map(|c| c.iter().sum::<f64>() / c.len() as f64)
                    .collect()
            };
            let fit = OrderedMediation::new(cats, mean(&d1), mean(&d0), mean(&z1), mean(&z0))
                .unwrap()
                .with_draws(d1, d0, z1, z0)
                .unwrap()
                .with_interaction(self.interaction)
                .with_request(request.clone())
                .with_label("ordered.fit");
            Ok(fit.into())
        }
    }

    fn ordered_result(interaction: bool, w1: f64, w2: f64) -> ModeratedMediation {
        let est = ScaledOrderedEstimator { interaction };
        let mut rng = SimRng::seed_from_u64(8);
        let req = FitRequest::new("m", "y", "t", "med").with_sims(300);
        let fit = est.estimate(&req, &mut rng).unwrap();
        let cov = |w: f64| Covariates::from([("w".to_string(), w)]);
        test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &cov(w1),
            &cov(w2),
            &ModerationOptions::default(),
        )
        .unwrap()
    }

    fn ordered(result: &ModeratedMediation) -> &[OrderedHypothesisTest] {
        match result {
            ModeratedMediation::Ordered(v) => v,
            ModeratedMediation::Continuous(_) => panic!("expected ordered records"),
        }
    }

    #[test]
    fn ordered_record_counts_and_shapes() {
        for (interaction, expected) in [(false, 2), (true, 4)] {
            let result = ordered_result(interaction, 2.0, 1.0);
            let tests = ordered(&result);
            assert_eq!(tests.len(), expected);
            for t in tests {
                assert_eq!(t.statistic.len(), 3);
                assert_eq!(t.p_value.len(), 3);
                assert_eq!(t.lower.len(), 3);
                assert_eq!(t.upper.len(), 3);
                assert_eq!(t.categories, vec!["1", "2", "3"]);
            }
        }
    }

    #[test]
    fn ordered_ade_pairs_its_own_statistic_and_draws() {
        let result = ordered_result(false, 2.0, 1.0);
        let ade = &ordered(&result)[1];
        assert_eq!(ade.statistic_name, "ADE(covariates.1) - ADE(covariates.2)");
        // z0 offset 0.2·w → difference 0.2 in every category
        for (j, &s) in ade.statistic.iter().enumerate() {
            assert!((s - 0.2).abs() < 1e-9, "category {j}: {s}");
            assert!(ade.lower[j] > 0.19 && ade.upper[j] < 0.21);
            assert_eq!(ade.p_value[j], 0.0);
        }
    }

    #[test]
    fn ordered_identical_strata() {
        let result = ordered_result(true, 1.5, 1.5);
        for t in ordered(&result) {
            let name = &t.statistic_name;
            assert!(t.statistic.iter().all(|&s| s == 0.0), "{name}");
            assert!(t.p_value.iter().all(|&p| p == 1.0), "{name}");
        }
    }

    /// Wraps [`ScaledOrderedEstimator`] and rewrites each fit it returns.
    struct Reshaped<F> {
        inner: ScaledOrderedEstimator,
        reshape: F,
    }

    impl<F> Estimator for Reshaped<F>
    where
        F: Fn(&FitRequest, OrderedMediation) -> OrderedMediation,
    {
        type Error = NeverFits;

        fn estimate(
            &self,
            request: &FitRequest,
            rng: &mut SimRng,
        ) -> std::result::Result<MediationFit, NeverFits> {
            match self.inner.estimate(request, rng)? {
                MediationFit::Ordered(fit) => Ok((self.reshape)(request, fit).into()),
                other => Ok(other),
            }
        }
    }

    /// Original fit from the plain estimator, re-evaluations from `reshape`.
    fn reshaped_result<F>(reshape: F) -> Result<ModeratedMediation>
    where
        F: Fn(&FitRequest, OrderedMediation) -> OrderedMediation,
    {
        let inner = ScaledOrderedEstimator { interaction: false };
        let mut rng = SimRng::seed_from_u64(9);
        let req = FitRequest::new("m", "y", "t", "med").with_sims(200);
        let fit = inner.estimate(&req, &mut rng).unwrap();
        let est = Reshaped { inner, reshape };
        let cov = |w: f64| Covariates::from([("w".to_string(), w)]);
        test_moderated_mediation(
            &fit,
            &est,
            &mut rng,
            &cov(2.0),
            &cov(1.0),
            &ModerationOptions::default(),
        )
    }

    #[test]
    fn relabelled_levels_rejected() {
        // Only the second stratum (w = 1) comes back with different labels.
        let err = reshaped_result(|req, mut fit| {
            if req.covariates.get("w") == Some(&1.0) {
                fit.categories = outcome_levels(["a", "b", "c"]);
            }
            fit
        })
        .unwrap_err();
        match err {
            MediationError::OutcomeLevelMismatch { expected, found } => {
                assert_eq!(expected, "1, 2, 3");
                assert_eq!(found, "a, b, c");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn dropped_level_rejected() {
        let err = reshaped_result(|_, mut fit| {
            fit.categories.pop();
            fit
        });
        assert!(matches!(
            err,
            Err(MediationError::DimensionMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn ordered_refit_without_draws_rejected() {
        let err = reshaped_result(|_, mut fit| {
            fit.z0_sims = None;
            fit
        });
        match err {
            Err(MediationError::MissingSimulationDraws { quantity }) => {
                assert_eq!(quantity, "z0.sims")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unchanged_levels_accepted() {
        let result = reshaped_result(|_, fit| fit).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn kind_mismatch_detected() {
        struct Flipping;
        impl Estimator for Flipping {
            type Error = NeverFits;
            fn estimate(
                &self,
                _: &FitRequest,
                _: &mut SimRng,
            ) -> std::result::Result<MediationFit, NeverFits> {
                Ok(MediationFit::Other {
                    design: "multilevel".into(),
                })
            }
        }
        let fit: MediationFit = ContinuousMediation::new(0.0, 0.0, 0.0, 0.0)
            .with_request(FitRequest::new("m", "y", "t", "med"))
            .into();
        let err = test_moderated_mediation(
            &fit,
            &Flipping,
            &mut SimRng::seed_from_u64(0),
            &age(1.0),
            &age(2.0),
            &ModerationOptions::default(),
        );
        assert!(matches!(
            err,
            Err(MediationError::FitKindMismatch {
                expected: "continuous",
                ..
            })
        ));
    }
}
