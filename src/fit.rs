//! Fitted mediation results, as produced by an [`Estimator`](crate::estimator::Estimator).
//!
//! A fit carries point estimates and (optionally) the simulation draws for
//! four effects:
//!
//! | field | effect                                   |
//! |-------|------------------------------------------|
//! | `d1`  | ACME with treatment held at 1 (treated)  |
//! | `d0`  | ACME with treatment held at 0 (control)  |
//! | `z1`  | ADE with mediator at its treated value   |
//! | `z0`  | ADE with mediator at its control value   |
//!
//! Continuous outcomes give one scalar per effect; ordered outcomes give one
//! value per outcome category (the effect on Pr(Y = level)).

use std::collections::BTreeSet;

use crate::error::{MediationError, Result};
use crate::request::{FitRequest, DEFAULT_CONF_LEVEL};

/// One of the four mediation effects a fit reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// ACME under treatment.
    Acme1,
    /// ACME under control.
    Acme0,
    /// ADE under treatment.
    Ade1,
    /// ADE under control.
    Ade0,
}

impl Effect {
    /// All four effects, in reporting order.
    pub const ALL: [Effect; 4] = [Effect::Acme1, Effect::Acme0, Effect::Ade1, Effect::Ade0];

    /// Name of the draw vector holding this effect's simulations.
    pub fn sims_name(self) -> &'static str {
        match self {
            Effect::Acme1 => "d1.sims",
            Effect::Acme0 => "d0.sims",
            Effect::Ade1 => "z1.sims",
            Effect::Ade0 => "z0.sims",
        }
    }

    /// "ACME" or "ADE".
    pub fn family(self) -> &'static str {
        match self {
            Effect::Acme1 | Effect::Acme0 => "ACME",
            Effect::Ade1 | Effect::Ade0 => "ADE",
        }
    }

    /// Treatment arm the effect is evaluated under.
    pub fn arm(self) -> &'static str {
        match self {
            Effect::Acme1 | Effect::Ade1 => "treated",
            Effect::Acme0 | Effect::Ade0 => "control",
        }
    }
}

// ---------------------------------------------------------------------------
// Continuous outcomes
// ---------------------------------------------------------------------------

/// Mediation fit for a continuous (or binary) outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousMediation {
    pub d1: f64,
    pub d0: f64,
    pub z1: f64,
    pub z0: f64,
    pub d1_sims: Option<Vec<f64>>,
    pub d0_sims: Option<Vec<f64>>,
    pub z1_sims: Option<Vec<f64>>,
    pub z0_sims: Option<Vec<f64>>,
    /// Outcome model includes the treatment × mediator term.
    pub interaction: bool,
    /// Confidence level used at fit time.
    pub conf_level: f64,
    /// Number of simulations used at fit time.
    pub sims: usize,
    /// Request that produced this fit, if known.
    pub request: Option<FitRequest>,
    /// Data-source name used in reports.
    pub label: String,
}

impl ContinuousMediation {
    /// Creates a fit from point estimates only; draws are attached separately.
    pub fn new(d1: f64, d0: f64, z1: f64, z0: f64) -> Self {
        Self {
            d1,
            d0,
            z1,
            z0,
            d1_sims: None,
            d0_sims: None,
            z1_sims: None,
            z0_sims: None,
            interaction: false,
            conf_level: DEFAULT_CONF_LEVEL,
            sims: 0,
            request: None,
            label: "mediation fit".to_string(),
        }
    }

    /// Attaches all four draw vectors (`sims` is taken from `d1_sims`).
    pub fn with_draws(
        mut self,
        d1_sims: Vec<f64>,
        d0_sims: Vec<f64>,
        z1_sims: Vec<f64>,
        z0_sims: Vec<f64>,
    ) -> Self {
        self.sims = d1_sims.len();
        self.d1_sims = Some(d1_sims);
        self.d0_sims = Some(d0_sims);
        self.z1_sims = Some(z1_sims);
        self.z0_sims = Some(z0_sims);
        self
    }

    pub fn with_interaction(mut self, interaction: bool) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_conf_level(mut self, conf_level: f64) -> Self {
        self.conf_level = conf_level;
        self
    }

    pub fn with_request(mut self, request: FitRequest) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Point estimate of `effect`.
    pub fn estimate(&self, effect: Effect) -> f64 {
        match effect {
            Effect::Acme1 => self.d1,
            Effect::Acme0 => self.d0,
            Effect::Ade1 => self.z1,
            Effect::Ade0 => self.z0,
        }
    }

    /// Simulation draws of `effect`, or `MissingSimulationDraws`.
    pub fn draws(&self, effect: Effect) -> Result<&[f64]> {
        let sims = match effect {
            Effect::Acme1 => &self.d1_sims,
            Effect::Acme0 => &self.d0_sims,
            Effect::Ade1 => &self.z1_sims,
            Effect::Ade0 => &self.z0_sims,
        };
        sims.as_deref()
            .ok_or_else(|| MediationError::missing_draws(effect.sims_name()))
    }

    /// Fails unless every draw vector is present.
    pub fn require_all_draws(&self) -> Result<()> {
        for effect in Effect::ALL {
            self.draws(effect)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ordered outcomes
// ---------------------------------------------------------------------------

/// Simulation draws for an ordered outcome: `n_sims × n_categories`,
/// stored column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDraws {
    columns: Vec<Vec<f64>>,
}

impl EffectDraws {
    /// Builds from per-category columns of equal length.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != n) {
                return Err(MediationError::mismatch("draw column length", n, bad.len()));
            }
        }
        Ok(Self { columns })
    }

    /// Builds from per-simulation rows (one entry per category).
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let k = rows.first().map_or(0, Vec::len);
        let mut columns = vec![Vec::with_capacity(rows.len()); k];
        for row in rows {
            if row.len() != k {
                return Err(MediationError::mismatch("draw row width", k, row.len()));
            }
            for (col, &v) in columns.iter_mut().zip(row) {
                col.push(v);
            }
        }
        Ok(Self { columns })
    }

    pub fn n_sims(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn n_categories(&self) -> usize {
        self.columns.len()
    }

    /// Draws for category `j`.
    pub fn column(&self, j: usize) -> Option<&[f64]> {
        self.columns.get(j).map(Vec::as_slice)
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Elementwise `self - other`.
    pub fn difference(&self, other: &EffectDraws) -> Result<EffectDraws> {
        if self.n_categories() != other.n_categories() {
            return Err(MediationError::mismatch(
                "draw categories",
                self.n_categories(),
                other.n_categories(),
            ));
        }
        let columns = self
            .columns
            .iter()
            .zip(&other.columns)
            .map(|(a, b)| crate::empirical::paired_difference(a, b))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }
}

/// Sorted unique outcome levels from observed labels.
pub fn outcome_levels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels
        .into_iter()
        .map(Into::into)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Mediation fit for an ordered categorical outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMediation {
    pub d1: Vec<f64>,
    pub d0: Vec<f64>,
    pub z1: Vec<f64>,
    pub z0: Vec<f64>,
    pub d1_sims: Option<EffectDraws>,
    pub d0_sims: Option<EffectDraws>,
    pub z1_sims: Option<EffectDraws>,
    pub z0_sims: Option<EffectDraws>,
    pub interaction: bool,
    pub conf_level: f64,
    pub sims: usize,
    /// Outcome levels, one per estimate entry.
    pub categories: Vec<String>,
    pub request: Option<FitRequest>,
    pub label: String,
}

impl OrderedMediation {
    /// Creates a fit from per-category point estimates.
    ///
    /// # Returns
    ///
    /// `Err(DimensionMismatch)` if any estimate vector's length differs from
    /// the number of categories.
    pub fn new(
        categories: Vec<String>,
        d1: Vec<f64>,
        d0: Vec<f64>,
        z1: Vec<f64>,
        z0: Vec<f64>,
    ) -> Result<Self> {
        let k = categories.len();
        for (name, est) in [("d1", &d1), ("d0", &d0), ("z1", &z1), ("z0", &z0)] {
            if est.len() != k {
                return Err(MediationError::mismatch(
                    format!("{name} estimate categories"),
                    k,
                    est.len(),
                ));
            }
        }
        Ok(Self {
            d1,
            d0,
            z1,
            z0,
            d1_sims: None,
            d0_sims: None,
            z1_sims: None,
            z0_sims: None,
            interaction: false,
            conf_level: DEFAULT_CONF_LEVEL,
            sims: 0,
            categories,
            request: None,
            label: "mediation fit".to_string(),
        })
    }

    /// Attaches draws; each matrix must have one column per category.
    pub fn with_draws(
        mut self,
        d1_sims: EffectDraws,
        d0_sims: EffectDraws,
        z1_sims: EffectDraws,
        z0_sims: EffectDraws,
    ) -> Result<Self> {
        let k = self.categories.len();
        let all = [&d1_sims, &d0_sims, &z1_sims, &z0_sims];
        for (effect, draws) in Effect::ALL.iter().zip(all) {
            if draws.n_categories() != k {
                return Err(MediationError::mismatch(
                    format!("{} categories", effect.sims_name()),
                    k,
                    draws.n_categories(),
                ));
            }
        }
        self.sims = d1_sims.n_sims();
        self.d1_sims = Some(d1_sims);
        self.d0_sims = Some(d0_sims);
        self.z1_sims = Some(z1_sims);
        self.z0_sims = Some(z0_sims);
        Ok(self)
    }

    pub fn with_interaction(mut self, interaction: bool) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_conf_level(mut self, conf_level: f64) -> Self {
        self.conf_level = conf_level;
        self
    }

    pub fn with_request(mut self, request: FitRequest) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn estimate(&self, effect: Effect) -> &[f64] {
        match effect {
            Effect::Acme1 => &self.d1,
            Effect::Acme0 => &self.d0,
            Effect::Ade1 => &self.z1,
            Effect::Ade0 => &self.z0,
        }
    }

    pub fn draws(&self, effect: Effect) -> Result<&EffectDraws> {
        let sims = match effect {
            Effect::Acme1 => &self.d1_sims,
            Effect::Acme0 => &self.d0_sims,
            Effect::Ade1 => &self.z1_sims,
            Effect::Ade0 => &self.z0_sims,
        };
        sims.as_ref()
            .ok_or_else(|| MediationError::missing_draws(effect.sims_name()))
    }

    pub fn require_all_draws(&self) -> Result<()> {
        for effect in Effect::ALL {
            self.draws(effect)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// Any fitted result a test may be handed.
#[derive(Debug, Clone, PartialEq)]
pub enum MediationFit {
    Continuous(ContinuousMediation),
    Ordered(OrderedMediation),
    /// A design the tests do not cover (multilevel, parallel, ...).
    Other { design: String },
}

impl MediationFit {
    /// Short name of the fit type.
    pub fn kind(&self) -> &str {
        match self {
            MediationFit::Continuous(_) => "continuous",
            MediationFit::Ordered(_) => "ordered",
            MediationFit::Other { design } => design,
        }
    }

    /// Whether the outcome model has a treatment × mediator term.
    pub fn has_interaction(&self) -> bool {
        match self {
            MediationFit::Continuous(f) => f.interaction,
            MediationFit::Ordered(f) => f.interaction,
            MediationFit::Other { .. } => false,
        }
    }

    pub fn request(&self) -> Option<&FitRequest> {
        match self {
            MediationFit::Continuous(f) => f.request.as_ref(),
            MediationFit::Ordered(f) => f.request.as_ref(),
            MediationFit::Other { .. } => None,
        }
    }

    pub(crate) fn unsupported(&self) -> MediationError {
        MediationError::UnsupportedInputType {
            design: self.kind().to_string(),
        }
    }
}

impl From<ContinuousMediation> for MediationFit {
    fn from(fit: ContinuousMediation) -> Self {
        MediationFit::Continuous(fit)
    }
}

impl From<OrderedMediation> for MediationFit {
    fn from(fit: OrderedMediation) -> Self {
        MediationFit::Ordered(fit)
    }
}
