//! Error types for mediation significance tests.

use thiserror::Error;

/// Errors raised by the mediation test procedures.
///
/// Every variant is terminal for the call that produced it: a test either
/// returns all of its records or fails with one of these.
#[derive(Debug, Error)]
pub enum MediationError {
    // === Input Errors ===
    /// The fitted result is not a design these tests understand.
    #[error("unsupported fit type '{design}': expected a continuous or ordered mediation fit")]
    UnsupportedInputType { design: String },

    /// One or more simulation-draw vectors were not retained by the fit.
    #[error("simulation draws for {quantity} are missing: refit the model retaining full draws")]
    MissingSimulationDraws { quantity: String },

    /// The outcome model has no treatment × mediator interaction term.
    #[error("outcome model has no treatment-mediator interaction term: refit including it")]
    MissingInteractionTerm,

    /// The fit does not carry the request that produced it, so it cannot be re-evaluated.
    #[error("fit carries no fit request: it cannot be re-evaluated at new covariate values")]
    MissingFitRequest,

    // === Numeric Errors ===
    /// An empirical p-value or interval was requested over zero draws.
    #[error("cannot compute an empirical statistic from zero simulation draws")]
    EmptyDraws,

    /// A draw or the observed estimate is NaN or infinite.
    #[error("non-finite value in {quantity}: empirical statistics need finite draws")]
    NonFiniteDraws { quantity: &'static str },

    /// Confidence level outside the open interval (0, 1).
    #[error("confidence level must lie in (0, 1), got {level}")]
    InvalidConfidenceLevel { level: f64 },

    /// Estimates, draws, or categories disagree in size.
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Re-evaluation produced different outcome levels than the original fit.
    #[error("re-evaluated fit has outcome levels [{found}], expected [{expected}]")]
    OutcomeLevelMismatch { expected: String, found: String },

    /// Re-evaluation produced a different kind of fit than the original.
    #[error("re-evaluated fit is of type '{found}', expected '{expected}'")]
    FitKindMismatch {
        expected: &'static str,
        found: String,
    },

    // === Estimator Errors ===
    /// Failure raised by the estimator during re-evaluation, passed through untouched.
    #[error(transparent)]
    Estimator(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl MediationError {
    pub(crate) fn missing_draws(quantity: impl Into<String>) -> Self {
        Self::MissingSimulationDraws {
            quantity: quantity.into(),
        }
    }

    pub(crate) fn mismatch(context: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MediationError>;
