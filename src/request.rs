//! Fit requests: the explicit, re-issuable description of one estimator run.
//!
//! A fitted result keeps the [`FitRequest`] that produced it. The
//! moderated-mediation test clones that request and changes only the
//! covariate overrides, the simulation count, and the draw-retention flag
//! before handing it back to the estimator.
//!
//! # Examples
//!
//! ```
//! use u_mediation::request::FitRequest;
//!
//! let base = FitRequest::new("med.fit", "out.fit", "treat", "job_seek")
//!     .with_sims(500)
//!     .with_covariate("age", 40.0);
//! let rerun = base.clone().with_covariates([("age", 25.0)]).retaining_draws();
//!
//! assert_eq!(rerun.covariates["age"], 25.0);
//! assert!(rerun.retain_draws);
//! assert!(!base.retain_draws);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default number of simulation draws.
pub const DEFAULT_SIMS: usize = 1000;

/// Default confidence level.
pub const DEFAULT_CONF_LEVEL: f64 = 0.95;

/// Everything an estimator needs to (re)produce a mediation fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRequest {
    /// Reference to the fitted mediator model.
    pub mediator_model: String,
    /// Reference to the fitted outcome model.
    pub outcome_model: String,
    /// Treatment variable name.
    pub treat: String,
    /// Mediator variable name.
    pub mediator: String,
    /// Covariate values at which effects are evaluated.
    #[serde(default)]
    pub covariates: BTreeMap<String, f64>,
    /// Number of simulation draws.
    pub sims: usize,
    /// Whether the full simulation draws are kept in the result.
    #[serde(default)]
    pub retain_draws: bool,
    /// Confidence level for the fit's own intervals.
    pub conf_level: f64,
}

impl FitRequest {
    /// Creates a request with default simulation count and confidence level.
    pub fn new(
        mediator_model: impl Into<String>,
        outcome_model: impl Into<String>,
        treat: impl Into<String>,
        mediator: impl Into<String>,
    ) -> Self {
        Self {
            mediator_model: mediator_model.into(),
            outcome_model: outcome_model.into(),
            treat: treat.into(),
            mediator: mediator.into(),
            covariates: BTreeMap::new(),
            sims: DEFAULT_SIMS,
            retain_draws: false,
            conf_level: DEFAULT_CONF_LEVEL,
        }
    }

    /// Sets the simulation count.
    pub fn with_sims(mut self, sims: usize) -> Self {
        self.sims = sims;
        self
    }

    /// Sets the confidence level.
    pub fn with_conf_level(mut self, conf_level: f64) -> Self {
        self.conf_level = conf_level;
        self
    }

    /// Adds or replaces a single covariate override.
    pub fn with_covariate(mut self, name: impl Into<String>, value: f64) -> Self {
        self.covariates.insert(name.into(), value);
        self
    }

    /// Replaces the covariate overrides wholesale.
    pub fn with_covariates<I, K>(mut self, covariates: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.covariates = covariates.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    /// Forces full simulation draws to be kept.
    pub fn retaining_draws(mut self) -> Self {
        self.retain_draws = true;
        self
    }

    /// Name of the treatment × mediator interaction term.
    pub fn interaction_term(&self) -> String {
        format!("{}:{}", self.treat, self.mediator)
    }
}
