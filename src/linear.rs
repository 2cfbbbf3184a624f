//! Quasi-Bayesian estimator for a linear mediator model and a linear outcome
//! model.
//!
//! # Models
//!
//! Mediator: M = α₀ + αₜ·t + Σ γ_w·w + Σ α_{t:w}·t·w
//!
//! Outcome: Y = β₀ + βₜ·t + βₘ·M + β_{t:m}·t·M + Σ δ_w·w + Σ β_{t:w}·t·w
//!
//! # Algorithm
//!
//! Each simulation draws every coefficient independently from
//! N(estimate, se²) and evaluates, at the requested covariate values,
//!
//! - a = αₜ + Σ α_{t:w}·w (treatment effect on the mediator)
//! - ACME(t) = a·(βₘ + β_{t:m}·t)
//! - ADE(t) = βₜ + β_{t:m}·M̄(t) + Σ β_{t:w}·w
//!
//! where M̄(t) is the predicted mediator mean under treatment t. Point
//! estimates are the means of the draws.
//!
//! # References
//!
//! Imai, Keele & Tingley (2010). "A general approach to causal mediation
//! analysis". Psychological Methods, 15(4), 309–334.
//!
//! # Examples
//!
//! ```
//! use u_mediation::estimator::Estimator;
//! use u_mediation::fit::MediationFit;
//! use u_mediation::linear::{LinearMediationEstimator, LinearModel};
//! use u_mediation::request::FitRequest;
//! use u_mediation::rng::SimRng;
//!
//! let estimator = LinearMediationEstimator::new()
//!     .with_model("med", LinearModel::new().with_term("treat", 2.0, 0.1))
//!     .with_model("out", LinearModel::new().with_term("m", 0.5, 0.05));
//! let request = FitRequest::new("med", "out", "treat", "m").with_sims(200);
//!
//! let mut rng = SimRng::seed_from_u64(1);
//! let MediationFit::Continuous(fit) = estimator.estimate(&request, &mut rng).unwrap() else {
//!     unreachable!()
//! };
//! assert!((fit.d1 - 1.0).abs() < 0.1);
//! assert!(!fit.interaction);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use u_numflow::stats;

use crate::estimator::Estimator;
use crate::fit::{ContinuousMediation, MediationFit};
use crate::request::FitRequest;
use crate::rng::SimRng;

/// Intercept term name.
pub const INTERCEPT: &str = "(Intercept)";

/// Errors raised while fitting.
#[derive(Debug, Error)]
pub enum LinearEstimatorError {
    #[error("no fitted model registered under '{name}'")]
    UnknownModel { name: String },

    #[error("covariate '{name}' is not a variable of the fitted models")]
    UnknownCovariate { name: String },

    #[error("model '{model}' has no '{term}' term")]
    MissingTerm { model: String, term: String },

    #[error("simulation count must be positive")]
    ZeroSims,
}

/// Coefficient estimates and standard errors of a fitted linear model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: BTreeMap<String, f64>,
    pub std_errors: BTreeMap<String, f64>,
}

impl LinearModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a term with its estimate and standard error.
    pub fn with_term(mut self, term: impl Into<String>, estimate: f64, std_error: f64) -> Self {
        let term = term.into();
        self.coefficients.insert(term.clone(), estimate);
        self.std_errors.insert(term, std_error);
        self
    }

    pub fn has_term(&self, term: &str) -> bool {
        self.coefficients.contains_key(term)
    }

    /// One draw of every coefficient from its normal approximation.
    fn draw(&self, rng: &mut SimRng) -> Coefficients {
        let values = self
            .coefficients
            .iter()
            .map(|(term, &est)| {
                let se = self.std_errors.get(term).copied().unwrap_or(0.0);
                (term.clone(), rng.normal(est, se))
            })
            .collect();
        Coefficients(values)
    }
}

/// A single coefficient draw; absent terms read as 0.
struct Coefficients(BTreeMap<String, f64>);

impl Coefficients {
    fn get(&self, term: &str) -> f64 {
        self.0.get(term).copied().unwrap_or(0.0)
    }

    fn interaction(&self, a: &str, b: &str) -> f64 {
        self.get(&format!("{a}:{b}"))
    }
}

/// Registry of fitted linear models plus the covariate values effects are
/// evaluated at when a request does not override them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearMediationEstimator {
    pub models: BTreeMap<String, LinearModel>,
    pub covariate_means: BTreeMap<String, f64>,
}

impl LinearMediationEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, name: impl Into<String>, model: LinearModel) -> Self {
        self.models.insert(name.into(), model);
        self
    }

    /// Declares a covariate and its default (sample mean) value.
    pub fn with_covariate(mut self, name: impl Into<String>, mean: f64) -> Self {
        self.covariate_means.insert(name.into(), mean);
        self
    }

    fn model(&self, name: &str) -> Result<&LinearModel, LinearEstimatorError> {
        self.models
            .get(name)
            .ok_or_else(|| LinearEstimatorError::UnknownModel {
                name: name.to_string(),
            })
    }

    /// Covariate values for `request`: declared means overridden by the request.
    fn covariate_values(
        &self,
        request: &FitRequest,
    ) -> Result<BTreeMap<String, f64>, LinearEstimatorError> {
        let mut values = self.covariate_means.clone();
        for (name, &value) in &request.covariates {
            let slot = values
                .get_mut(name)
                .ok_or_else(|| LinearEstimatorError::UnknownCovariate {
                    name: name.clone(),
                })?;
            *slot = value;
        }
        Ok(values)
    }
}

/// Effects from one coefficient draw.
struct EffectDraw {
    d1: f64,
    d0: f64,
    z1: f64,
    z0: f64,
}

fn simulate_once(
    mediator: &Coefficients,
    outcome: &Coefficients,
    request: &FitRequest,
    covariates: &BTreeMap<String, f64>,
) -> EffectDraw {
    let t = request.treat.as_str();
    let m = request.mediator.as_str();

    let mediator_mean = |treat: f64| -> f64 {
        let mut mean = mediator.get(INTERCEPT) + mediator.get(t) * treat;
        for (w, &x) in covariates {
            mean += (mediator.get(w) + mediator.interaction(t, w) * treat) * x;
        }
        mean
    };
    let m1 = mediator_mean(1.0);
    let m0 = mediator_mean(0.0);
    let a = m1 - m0;

    let beta_m = outcome.get(m);
    let beta_tm = outcome.interaction(t, m);
    let moderated_direct: f64 = covariates
        .iter()
        .map(|(w, &x)| outcome.interaction(t, w) * x)
        .sum();
    let direct = |m_bar: f64| outcome.get(t) + beta_tm * m_bar + moderated_direct;

    EffectDraw {
        d1: a * (beta_m + beta_tm),
        d0: a * beta_m,
        z1: direct(m1),
        z0: direct(m0),
    }
}

impl Estimator for LinearMediationEstimator {
    type Error = LinearEstimatorError;

    fn estimate(
        &self,
        request: &FitRequest,
        rng: &mut SimRng,
    ) -> Result<MediationFit, Self::Error> {
        if request.sims == 0 {
            return Err(LinearEstimatorError::ZeroSims);
        }
        let mediator_model = self.model(&request.mediator_model)?;
        let outcome_model = self.model(&request.outcome_model)?;
        if !mediator_model.has_term(&request.treat) {
            return Err(LinearEstimatorError::MissingTerm {
                model: request.mediator_model.clone(),
                term: request.treat.clone(),
            });
        }
        if !outcome_model.has_term(&request.mediator) {
            return Err(LinearEstimatorError::MissingTerm {
                model: request.outcome_model.clone(),
                term: request.mediator.clone(),
            });
        }
        let covariates = self.covariate_values(request)?;
        let interaction = outcome_model.has_term(&request.interaction_term());

        let n = request.sims;
        let mut d1 = Vec::with_capacity(n);
        let mut d0 = Vec::with_capacity(n);
        let mut z1 = Vec::with_capacity(n);
        let mut z0 = Vec::with_capacity(n);
        for _ in 0..n {
            let alpha = mediator_model.draw(rng);
            let beta = outcome_model.draw(rng);
            let e = simulate_once(&alpha, &beta, request, &covariates);
            d1.push(e.d1);
            d0.push(e.d0);
            z1.push(e.z1);
            z0.push(e.z0);
        }

        let mean = |v: &[f64]| stats::mean(v).ok_or(LinearEstimatorError::ZeroSims);
        let mut fit = ContinuousMediation::new(mean(&d1)?, mean(&d0)?, mean(&z1)?, mean(&z0)?)
            .with_interaction(interaction)
            .with_conf_level(request.conf_level)
            .with_request(request.clone())
            .with_label(format!(
                "mediate({}, {})",
                request.mediator_model, request.outcome_model
            ));
        fit.sims = n;
        if request.retain_draws {
            fit = fit.with_draws(d1, d0, z1, z0);
        }

        tracing::debug!(
            sims = n,
            interaction,
            acme_treated = fit.d1,
            ade_control = fit.z0,
            "linear mediation fit"
        );
        Ok(MediationFit::Continuous(fit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Zero standard errors make every draw equal to the point value.
    fn exact_estimator(with_interaction: bool) -> LinearMediationEstimator {
        let mut outcome = LinearModel::new()
            .with_term(INTERCEPT, 0.3, 0.0)
            .with_term("treat", 1.0, 0.0)
            .with_term("m", 0.5, 0.0)
            .with_term("w", 0.7, 0.0);
        if with_interaction {
            outcome = outcome.with_term("treat:m", 0.25, 0.0);
        }
        LinearMediationEstimator::new()
            .with_model(
                "med",
                LinearModel::new()
                    .with_term(INTERCEPT, 1.0, 0.0)
                    .with_term("treat", 2.0, 0.0)
                    .with_term("treat:w", 1.0, 0.0),
            )
            .with_model("out", outcome)
            .with_covariate("w", 0.0)
    }

    fn request() -> FitRequest {
        FitRequest::new("med", "out", "treat", "m").with_sims(50)
    }

    fn continuous(fit: MediationFit) -> ContinuousMediation {
        match fit {
            MediationFit::Continuous(f) => f,
            other => panic!("expected continuous fit, got {}", other.kind()),
        }
    }

    #[test]
    fn exact_effects_with_interaction() {
        let est = exact_estimator(true);
        let req = request().with_covariate("w", 3.0);
        let fit = continuous(est.estimate(&req, &mut SimRng::seed_from_u64(0)).unwrap());

        // a = 2 + 1·3 = 5; M̄(0) = 1, M̄(1) = 6
        assert!((fit.d1 - 3.75).abs() < 1e-9, "d1 = {}", fit.d1);
        assert!((fit.d0 - 2.5).abs() < 1e-9, "d0 = {}", fit.d0);
        assert!((fit.z1 - 2.5).abs() < 1e-9, "z1 = {}", fit.z1);
        assert!((fit.z0 - 1.25).abs() < 1e-9, "z0 = {}", fit.z0);
        assert!(fit.interaction);
        assert_eq!(fit.sims, 50);
    }

    #[test]
    fn no_interaction_collapses_arms() {
        let est = exact_estimator(false);
        let mut rng = SimRng::seed_from_u64(0);
        let fit = continuous(est.estimate(&request(), &mut rng).unwrap());
        assert!(!fit.interaction);
        assert!((fit.d1 - fit.d0).abs() < 1e-12);
        assert!((fit.z1 - fit.z0).abs() < 1e-12);
        // w defaults to its declared mean of 0 → a = 2
        assert!((fit.d1 - 1.0).abs() < 1e-9, "d1 = {}", fit.d1);
    }

    #[test]
    fn draws_retained_only_on_request() {
        let est = exact_estimator(true);
        let mut rng = SimRng::seed_from_u64(3);
        let fit = continuous(est.estimate(&request(), &mut rng).unwrap());
        assert!(fit.d1_sims.is_none());

        let req = request().retaining_draws();
        let fit = continuous(est.estimate(&req, &mut rng).unwrap());
        assert!(fit.require_all_draws().is_ok());
        assert_eq!(fit.d1_sims.as_ref().map(Vec::len), Some(50));
    }

    #[test]
    fn fit_carries_request() {
        let est = exact_estimator(true);
        let req = request().with_covariate("w", 1.0);
        let fit = continuous(est.estimate(&req, &mut SimRng::seed_from_u64(0)).unwrap());
        assert_eq!(fit.request.as_ref(), Some(&req));
        assert_eq!(fit.label, "mediate(med, out)");
    }

    #[test]
    fn same_state_same_fit() {
        let est = LinearMediationEstimator::new()
            .with_model("med", LinearModel::new().with_term("treat", 1.0, 0.3))
            .with_model("out", LinearModel::new().with_term("m", 0.4, 0.1));
        let req = request().retaining_draws();
        let a = est.estimate(&req, &mut SimRng::seed_from_u64(9)).unwrap();
        let b = est.estimate(&req, &mut SimRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_covariate_rejected() {
        let est = exact_estimator(true);
        let req = request().with_covariate("age", 40.0);
        assert!(matches!(
            est.estimate(&req, &mut SimRng::seed_from_u64(0)),
            Err(LinearEstimatorError::UnknownCovariate { name }) if name == "age"
        ));
    }

    #[test]
    fn unknown_model_rejected() {
        let est = exact_estimator(true);
        let req = FitRequest::new("nope", "out", "treat", "m");
        assert!(matches!(
            est.estimate(&req, &mut SimRng::seed_from_u64(0)),
            Err(LinearEstimatorError::UnknownModel { .. })
        ));
    }

    #[test]
    fn missing_terms_rejected() {
        let est = exact_estimator(true);
        let req = FitRequest::new("med", "out", "dose", "m");
        assert!(matches!(
            est.estimate(&req, &mut SimRng::seed_from_u64(0)),
            Err(LinearEstimatorError::MissingTerm { term, .. }) if term == "dose"
        ));
        let req = FitRequest::new("med", "out", "treat", "stress");
        assert!(matches!(
            est.estimate(&req, &mut SimRng::seed_from_u64(0)),
            Err(LinearEstimatorError::MissingTerm { term, .. }) if term == "stress"
        ));
    }

    #[test]
    fn zero_sims_rejected() {
        let est = exact_estimator(true);
        assert!(matches!(
            est.estimate(&request().with_sims(0), &mut SimRng::seed_from_u64(0)),
            Err(LinearEstimatorError::ZeroSims)
        ));
    }
}
