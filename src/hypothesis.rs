//! Hypothesis-test records returned by the mediation tests.
//!
//! Records are built once per test call and never mutated afterwards. The
//! null value is always 0 and the alternative always two-sided.

use crate::empirical::{column_intervals, column_p_values, empirical_p_value, percentile_interval};
use crate::error::Result;
use crate::fit::EffectDraws;

/// Alternative hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    TwoSided,
}

impl Alternative {
    pub fn as_str(self) -> &'static str {
        match self {
            Alternative::TwoSided => "two.sided",
        }
    }
}

/// Test of a scalar difference in mediation effects.
#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisTest {
    /// Name of the tested quantity, e.g. `ACME(1) - ACME(0)`.
    pub statistic_name: String,
    /// Point estimate of the difference.
    pub statistic: f64,
    /// Two-sided empirical p-value.
    pub p_value: f64,
    /// Percentile interval `(lower, upper)`.
    pub conf_int: (f64, f64),
    pub conf_level: f64,
    pub null_value: f64,
    pub alternative: Alternative,
    /// Description of the tested equality.
    pub method: String,
    /// Where the estimates came from.
    pub data_name: String,
}

impl HypothesisTest {
    /// Builds a record from a difference estimate and its draws.
    pub(crate) fn from_draws(
        statistic_name: impl Into<String>,
        statistic: f64,
        draws: &[f64],
        conf_level: f64,
        data_name: impl Into<String>,
    ) -> Result<Self> {
        let statistic_name = statistic_name.into();
        let p_value = empirical_p_value(draws, statistic)?;
        let conf_int = percentile_interval(draws, conf_level)?;
        Ok(Self {
            method: format!("Test of {statistic_name} = 0"),
            statistic_name,
            statistic,
            p_value,
            conf_int,
            conf_level,
            null_value: 0.0,
            alternative: Alternative::TwoSided,
            data_name: data_name.into(),
        })
    }
}

/// Test of a per-category difference for an ordered outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedHypothesisTest {
    pub statistic_name: String,
    /// One estimate per category.
    pub statistic: Vec<f64>,
    /// One p-value per category.
    pub p_value: Vec<f64>,
    /// Lower interval bound per category (row 1 of the 2×k interval).
    pub lower: Vec<f64>,
    /// Upper interval bound per category (row 2 of the 2×k interval).
    pub upper: Vec<f64>,
    pub conf_level: f64,
    pub null_value: f64,
    pub alternative: Alternative,
    pub method: String,
    pub data_name: String,
    /// Outcome levels, aligned with every per-category vector.
    pub categories: Vec<String>,
}

impl OrderedHypothesisTest {
    pub(crate) fn from_draws(
        statistic_name: impl Into<String>,
        statistic: Vec<f64>,
        draws: &EffectDraws,
        conf_level: f64,
        data_name: impl Into<String>,
        categories: &[String],
    ) -> Result<Self> {
        let statistic_name = statistic_name.into();
        let p_value = column_p_values(draws.columns(), &statistic)?;
        let (lower, upper) = column_intervals(draws.columns(), conf_level)?;
        Ok(Self {
            method: format!("Test of {statistic_name} = 0"),
            statistic_name,
            statistic,
            p_value,
            lower,
            upper,
            conf_level,
            null_value: 0.0,
            alternative: Alternative::TwoSided,
            data_name: data_name.into(),
            categories: categories.to_vec(),
        })
    }

    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    /// The confidence interval as a 2×k matrix: `[lower, upper]`.
    pub fn conf_int(&self) -> [&[f64]; 2] {
        [self.lower.as_slice(), self.upper.as_slice()]
    }
}

/// Result of a single-record test on either outcome type.
#[derive(Debug, Clone, PartialEq)]
pub enum TestReport {
    Continuous(HypothesisTest),
    Ordered(OrderedHypothesisTest),
}

impl TestReport {
    pub fn as_continuous(&self) -> Option<&HypothesisTest> {
        match self {
            TestReport::Continuous(t) => Some(t),
            TestReport::Ordered(_) => None,
        }
    }

    pub fn as_ordered(&self) -> Option<&OrderedHypothesisTest> {
        match self {
            TestReport::Ordered(t) => Some(t),
            TestReport::Continuous(_) => None,
        }
    }
}

/// Result of a moderated-mediation test: 4 records when the outcome model
/// has a treatment × mediator interaction (ACME treated, ACME control,
/// ADE treated, ADE control), otherwise 2 (ACME, ADE).
#[derive(Debug, Clone, PartialEq)]
pub enum ModeratedMediation {
    Continuous(Vec<HypothesisTest>),
    Ordered(Vec<OrderedHypothesisTest>),
}

impl ModeratedMediation {
    pub fn len(&self) -> usize {
        match self {
            ModeratedMediation::Continuous(v) => v.len(),
            ModeratedMediation::Ordered(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records as [`TestReport`]s, in order.
    pub fn reports(&self) -> Vec<TestReport> {
        match self {
            ModeratedMediation::Continuous(v) => {
                v.iter().cloned().map(TestReport::Continuous).collect()
            }
            ModeratedMediation::Ordered(v) => v.iter().cloned().map(TestReport::Ordered).collect(),
        }
    }
}
