//! Cell formatters for descriptive tables.
//!
//! - numeric columns: `"median (Q1-Q3) | N"` ([`format_median_iqr`]) or `"mean (SD) | N"`
//!   ([`format_mean_std`])
//! - binary columns: `"count (percent) | N"` ([`format_count_percent`])
//!
//! Columns with too few observations format as [`Summary::NotAvailable`] (`"N/A"`). Field
//! widths are pure functions of the data so that cells of one table column line up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// A formatted summary cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// Formatted statistics.
    Value(String),
    /// Too few non-missing observations to summarize.
    NotAvailable,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(s) => f.write_str(s),
            Self::NotAvailable => f.write_str("N/A"),
        }
    }
}

/// Formatting parameters for numeric summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericFormat {
    /// Decimal places for the statistics.
    pub decimals: usize,
    /// Minimum field width of the trailing `N`.
    pub min_width: usize,
    /// Minimum non-missing count below which the cell is `N/A`.
    pub min_count: usize,
}

impl Default for NumericFormat {
    fn default() -> Self {
        Self {
            decimals: 1,
            min_width: 4,
            min_count: 3,
        }
    }
}

/// Formatting parameters for count/percent summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryFormat {
    /// Decimal places for the percentage.
    pub decimals: usize,
    /// Minimum field width of the count and the trailing `N`.
    pub min_width: usize,
    /// Minimum non-missing count below which the cell is `N/A`.
    pub min_count: usize,
}

impl Default for BinaryFormat {
    fn default() -> Self {
        Self {
            decimals: 1,
            min_width: 4,
            min_count: 1,
        }
    }
}

/// Number of decimal digits of `n`, the minimum width used for counts in a table column.
///
/// Empty columns get width 1.
pub fn min_field_width(n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    (n as f64).log10().trunc() as usize + 1
}

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be sorted ascending and non-empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// `"median (Q1-Q3) | N"`.
///
/// Each statistic is right-aligned in a field of `trunc(log10(max(Q3, 1))) + 2 + decimals`
/// characters; `N` is right-aligned in `min_width`.
pub fn format_median_iqr(values: &[&Value], format: &NumericFormat) -> Summary {
    let mut observed = numeric_values(values);
    if observed.len() < format.min_count || observed.is_empty() {
        return Summary::NotAvailable;
    }
    observed.sort_by(f64::total_cmp);

    let q1 = quantile(&observed, 0.25);
    let median = quantile(&observed, 0.5);
    let q3 = quantile(&observed, 0.75);
    let width = stat_width(q3, format.decimals);
    let dp = format.decimals;
    Summary::Value(format!(
        "{median:>width$.dp$} ({q1:>width$.dp$}-{q3:>width$.dp$}) | {}",
        format_count(observed.len() as u64, format.min_width)
    ))
}

/// `"mean (SD) | N"`, with the sample standard deviation.
///
/// Field width is `trunc(log10(max(mean, 1))) + 2 + decimals`.
pub fn format_mean_std(values: &[&Value], format: &NumericFormat) -> Summary {
    let observed = numeric_values(values);
    if observed.len() < format.min_count || observed.len() < 2 {
        return Summary::NotAvailable;
    }
    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let var = observed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let sd = var.sqrt();
    let width = stat_width(mean, format.decimals);
    let dp = format.decimals;
    Summary::Value(format!(
        "{mean:>width$.dp$} ({sd:>width$.dp$}) | {}",
        format_count(observed.len() as u64, format.min_width)
    ))
}

/// `"count (percent) | N"`.
///
/// `count` and `N` are right-aligned in `min_width`; the percentage is right-aligned in 4
/// characters, except that a percentage rounding to exactly 100 renders as `100.`.
pub fn format_count_percent(values: &[&Value], format: &BinaryFormat) -> Summary {
    let observed = numeric_values(values);
    if observed.len() < format.min_count || observed.is_empty() {
        return Summary::NotAvailable;
    }
    let sum: f64 = observed.iter().sum();
    let percent = 100.0 * sum / observed.len() as f64;
    let dp = format.decimals;
    let rounded = format!("{percent:.dp$}");
    let percent = if rounded.parse::<f64>().is_ok_and(|p| p == 100.0) {
        "100.".to_string()
    } else {
        format!("{percent:>4.dp$}")
    };
    Summary::Value(format!(
        "{} ({percent}) | {}",
        format_count(sum.trunc() as u64, format.min_width),
        format_count(observed.len() as u64, format.min_width)
    ))
}

fn numeric_values(values: &[&Value]) -> Vec<f64> {
    values.iter().filter_map(|v| v.as_f64()).collect()
}

fn stat_width(scale: f64, decimals: usize) -> usize {
    (scale.max(1.0).log10().trunc() as usize)
        .saturating_add(2)
        .saturating_add(decimals)
}

/// Render a count the way C's `%*g` does: plain digits below one million, six significant
/// digits in exponent form above.
fn format_count(n: u64, width: usize) -> String {
    let digits = if n < 1_000_000 {
        n.to_string()
    } else {
        let sci = format!("{:.5e}", n as f64);
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let exponent: i32 = exponent.parse().unwrap_or(0);
        format!("{mantissa}e{}{:02}", if exponent < 0 { '-' } else { '+' }, exponent.abs())
    };
    format!("{digits:>width$}")
}
