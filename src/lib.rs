//! # u-mediation
//!
//! Significance tests for causal mediation effects, computed from the
//! simulation draws a mediation fit already carries.
//!
//! Two procedures are provided:
//!
//! - **Treatment interaction test**: does the average causal mediation
//!   effect (ACME) differ between treated and control arms?
//! - **Moderated-mediation test**: do ACME and the average direct effect
//!   (ADE) differ between two covariate strata? The estimator is re-run at
//!   each stratum with common random numbers.
//!
//! Both work for continuous outcomes (scalar effects) and ordered
//! categorical outcomes (one effect per outcome level).
//!
//! ## Modules
//!
//! - [`empirical`] — Empirical p-values and percentile intervals from draws
//! - [`fit`] — Fitted mediation results (continuous, ordered)
//! - [`request`] — Re-issuable fit requests
//! - [`rng`] — Simulation generator with state snapshots
//! - [`estimator`] — Estimator trait
//! - [`linear`] — Quasi-Bayesian linear/linear mediation estimator
//! - [`interaction`] — Treatment × mediator interaction test
//! - [`moderation`] — Moderated-mediation test
//! - [`hypothesis`] — Test result records
//! - [`report`] — Text rendering of results
//!
//! ## Design Philosophy
//!
//! - **Explicit state**: randomness flows through a caller-owned generator;
//!   re-evaluation goes through a cloned request value
//! - **All or nothing**: a test returns every record it promises or an error
//! - **Research-backed**: follows Imai, Keele & Tingley (2010) and
//!   Tingley et al. (2014), *mediation: R Package for Causal Mediation Analysis*

pub mod empirical;
pub mod error;
pub mod estimator;
pub mod fit;
pub mod hypothesis;
pub mod interaction;
pub mod linear;
pub mod moderation;
pub mod report;
pub mod request;
pub mod rng;

pub use error::MediationError;
pub use estimator::Estimator;
pub use fit::{ContinuousMediation, EffectDraws, MediationFit, OrderedMediation};
pub use hypothesis::{HypothesisTest, ModeratedMediation, OrderedHypothesisTest, TestReport};
pub use interaction::test_treatment_interaction;
pub use moderation::{test_moderated_mediation, Covariates, ModerationOptions};
pub use request::FitRequest;
pub use rng::SimRng;
