//! Plain-text rendering of test records.
//!
//! Scalar tests print as a short block: method, data source, estimate with
//! p-value, the alternative, and the confidence interval. Ordered tests
//! print the same header followed by a table with one column per outcome
//! level, headed `Pr(Y=<level>)`. Numbers are shown to 3 significant digits.
//!
//! # Examples
//!
//! ```
//! use u_mediation::report::format_signif;
//!
//! assert_eq!(format_signif(0.123456, 3), "0.123");
//! assert_eq!(format_signif(1234.5, 3), "1230");
//! assert_eq!(format_signif(0.0, 3), "0");
//! ```

use std::fmt;

use comfy_table::presets::NOTHING;
use comfy_table::Table;

use crate::hypothesis::{HypothesisTest, ModeratedMediation, OrderedHypothesisTest, TestReport};

/// Significant digits used in reports.
pub const REPORT_DIGITS: usize = 3;

/// Formats `x` to `digits` significant digits, dropping trailing zeros.
///
/// Very small or very large magnitudes switch to scientific notation.
pub fn format_signif(x: f64, digits: usize) -> String {
    if !x.is_finite() {
        return x.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let digits = digits.max(1);
    let magnitude = x.abs().log10().floor() as i32;
    if !(-5..15).contains(&magnitude) {
        return format!("{:.*e}", digits - 1, x);
    }

    let exponent = digits as i32 - 1 - magnitude;
    let rounded = if exponent >= 0 {
        let scale = 10f64.powi(exponent);
        (x * scale).round() / scale
    } else {
        let step = 10f64.powi(-exponent);
        (x / step).round() * step
    };
    let decimals = exponent.max(0) as usize;
    let text = format!("{rounded:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn signif(x: f64) -> String {
    format_signif(x, REPORT_DIGITS)
}

fn percent(level: f64) -> String {
    format_signif(level * 100.0, 6)
}

fn write_header(f: &mut fmt::Formatter<'_>, method: &str, data_name: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "\t{method}")?;
    writeln!(f)?;
    writeln!(f, "data:  {data_name}")
}

fn write_alternative(f: &mut fmt::Formatter<'_>, name: &str, null_value: f64) -> fmt::Result {
    writeln!(
        f,
        "alternative hypothesis: true {name} is not equal to {}",
        signif(null_value)
    )
}

impl fmt::Display for HypothesisTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, &self.method, &self.data_name)?;
        writeln!(
            f,
            "{} = {}, p-value = {}",
            self.statistic_name,
            signif(self.statistic),
            signif(self.p_value)
        )?;
        write_alternative(f, &self.statistic_name, self.null_value)?;
        let level = percent(self.conf_level);
        let (lower, upper) = (signif(self.conf_int.0), signif(self.conf_int.1));
        writeln!(f, "{level} percent confidence interval:")?;
        writeln!(f, " {lower} {upper}")
    }
}

impl OrderedHypothesisTest {
    /// Table with one column per outcome level.
    pub fn table(&self) -> Table {
        let lower_tail = (1.0 - self.conf_level) / 2.0;
        let upper_tail = (1.0 + self.conf_level) / 2.0;

        let mut header = vec![String::new()];
        header.extend(self.categories.iter().map(|c| format!("Pr(Y={c})")));

        let row = |label: String, values: &[f64]| -> Vec<String> {
            std::iter::once(label)
                .chain(values.iter().map(|&v| signif(v)))
                .collect()
        };

        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_header(header);
        table.add_row(row("estimate".to_string(), &self.statistic));
        table.add_row(row(format!("{} %", percent(lower_tail)), &self.lower));
        table.add_row(row(format!("{} %", percent(upper_tail)), &self.upper));
        table.add_row(row("p-value".to_string(), &self.p_value));
        table
    }
}

impl fmt::Display for OrderedHypothesisTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, &self.method, &self.data_name)?;
        write_alternative(f, &self.statistic_name, self.null_value)?;
        let level = percent(self.conf_level);
        writeln!(f, "{level} percent confidence interval")?;
        writeln!(f)?;
        writeln!(f, "{}", self.table())
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestReport::Continuous(t) => fmt::Display::fmt(t, f),
            TestReport::Ordered(t) => fmt::Display::fmt(t, f),
        }
    }
}

impl fmt::Display for ModeratedMediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in self.reports() {
            write!(f, "{report}")?;
        }
        Ok(())
    }
}
