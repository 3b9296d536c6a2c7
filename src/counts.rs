//! Frequency and co-occurrence summaries over binary / one-hot columns.
//!
//! These feed frequency bar charts ([`proportions`]), upset plots ([`upset_counts`]) and
//! population pyramids ([`pyramid_counts`]). Chart construction itself is not done here.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::dictionary::{Dictionary, FieldType};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::labels::variable_label_for;
use crate::types::DataSet;

/// Maximum length of long labels.
pub const LONG_LABEL_MAX_LEN: usize = 1000;
/// Maximum length of short (axis) labels.
pub const SHORT_LABEL_MAX_LEN: usize = 40;
/// Usual `max_variables` for [`proportions`].
pub const DEFAULT_MAX_VARIABLES: usize = 10;
/// Usual `n_variables` for [`upset_counts`].
pub const DEFAULT_UPSET_VARIABLES: usize = 5;

/// Share of records with a hot indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proportion {
    /// Column name.
    pub variable: String,
    /// `sum / count` over non-missing values.
    pub proportion: f64,
    /// Label trimmed to [`LONG_LABEL_MAX_LEN`].
    pub label: String,
    /// Label trimmed to [`SHORT_LABEL_MAX_LEN`].
    pub short_label: String,
}

/// Proportion of hot values for each indicator column of `frame`, highest first.
///
/// Columns declared `numeric` and columns without any non-missing numeric value (e.g. the
/// stratification column) are skipped. Ties keep frame order. At most `max_variables` entries
/// are returned.
pub fn proportions(frame: &DataSet, dictionary: &Dictionary, max_variables: usize) -> Vec<Proportion> {
    let mut out: Vec<Proportion> = frame
        .column_names()
        .filter(|name| {
            dictionary
                .get(name)
                .is_none_or(|f| f.field_type != FieldType::Numeric)
        })
        .filter_map(|name| {
            let values = frame.column(name)?;
            let (sum, count) = values
                .iter()
                .filter_map(|v| v.as_f64())
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            (count > 0).then(|| Proportion {
                variable: name.to_string(),
                proportion: sum / count as f64,
                label: variable_label_for(dictionary, name, LONG_LABEL_MAX_LEN),
                short_label: variable_label_for(dictionary, name, SHORT_LABEL_MAX_LEN),
            })
        })
        .collect();
    out.sort_by(|a, b| b.proportion.total_cmp(&a.proportion));
    out.truncate(max_variables);
    out
}

/// Where [`upset_counts`] takes its variables from.
#[derive(Debug, Clone, Copy)]
pub enum UpsetVariables<'a> {
    /// The highest proportions, in their (descending) order.
    Proportions(&'a [Proportion]),
    /// An explicit list, in the given order.
    Explicit(&'a [String]),
}

/// Hot count of a single variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableCount {
    /// Column name.
    pub variable: String,
    /// Records where the variable is hot.
    pub count: usize,
    /// Label trimmed to [`LONG_LABEL_MAX_LEN`].
    pub label: String,
    /// Label trimmed to [`SHORT_LABEL_MAX_LEN`].
    pub short_label: String,
}

/// Number of records whose hot variables are exactly `variables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intersection {
    /// Hot variables, in variable order.
    pub variables: Vec<String>,
    /// Long labels of `variables`.
    pub labels: Vec<String>,
    /// Records with exactly this combination.
    pub count: usize,
}

/// Input for an upset plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsetCounts {
    /// Per-variable hot counts, highest first.
    pub counts: Vec<VariableCount>,
    /// Distinct non-empty combinations of hot variables.
    pub intersections: Vec<Intersection>,
}

/// Count single variables and their co-occurrence patterns.
///
/// From proportions, the top `n_variables` are used; an explicit list is used whole. Variables
/// without any hot record are dropped, and missing values count as not hot. Intersections span
/// every remaining variable. They are ordered by count (descending), then by the position of
/// their first hot variable (ascending), then by the position of the first variable they do not
/// contain (descending), then by size (descending), then by membership pattern. The two
/// position keys only look at the first `n_variables` remaining variables; when none of those
/// is hot (or none is cold) the key is 0.
pub fn upset_counts(
    frame: &DataSet,
    dictionary: &Dictionary,
    variables: UpsetVariables<'_>,
    n_variables: usize,
) -> AnalyticsResult<UpsetCounts> {
    let requested: Vec<&str> = match variables {
        UpsetVariables::Proportions(p) => p
            .iter()
            .take(n_variables)
            .map(|p| p.variable.as_str())
            .collect(),
        UpsetVariables::Explicit(v) => v.iter().map(String::as_str).collect(),
    };

    let mut columns: Vec<(&str, Vec<bool>)> = Vec::new();
    for name in requested {
        let values = frame.column(name).ok_or_else(|| AnalyticsError::UnknownField {
            name: name.to_string(),
            message: "upset variable is not a column of the frame".to_string(),
        })?;
        let hot: Vec<bool> = values
            .iter()
            .map(|v| v.indicator().unwrap_or(false))
            .collect();
        if hot.iter().any(|h| *h) {
            columns.push((name, hot));
        }
    }

    let label = |name: &str| variable_label_for(dictionary, name, LONG_LABEL_MAX_LEN);
    let short_label = |name: &str| variable_label_for(dictionary, name, SHORT_LABEL_MAX_LEN);

    let mut counts: Vec<VariableCount> = columns
        .iter()
        .map(|(name, hot)| VariableCount {
            variable: name.to_string(),
            count: hot.iter().filter(|h| **h).count(),
            label: label(*name),
            short_label: short_label(*name),
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    let mut patterns: HashMap<Vec<bool>, usize> = HashMap::new();
    for row in 0..frame.row_count() {
        let pattern: Vec<bool> = columns.iter().map(|(_, hot)| hot[row]).collect();
        if pattern.iter().any(|h| *h) {
            *patterns.entry(pattern).or_insert(0) += 1;
        }
    }
    let keys = n_variables.min(columns.len());
    let mut patterns: Vec<(Vec<bool>, usize)> = patterns.into_iter().collect();
    patterns.sort_by(|(pa, ca), (pb, cb)| {
        cb.cmp(ca)
            .then_with(|| first_hot(&pa[..keys]).cmp(&first_hot(&pb[..keys])))
            .then_with(|| first_cold(&pb[..keys]).cmp(&first_cold(&pa[..keys])))
            .then_with(|| size(pb).cmp(&size(pa)))
            .then_with(|| pb.cmp(pa))
    });

    let intersections = patterns
        .into_iter()
        .map(|(pattern, count)| {
            let members: Vec<&str> = columns
                .iter()
                .zip(&pattern)
                .filter(|(_, hot)| **hot)
                .map(|((name, _), _)| *name)
                .collect();
            Intersection {
                labels: members.iter().map(|&m| label(m)).collect(),
                variables: members.iter().map(|m| m.to_string()).collect(),
                count,
            }
        })
        .collect();

    tracing::debug!(variables = counts.len(), "computed upset counts");
    Ok(UpsetCounts {
        counts,
        intersections,
    })
}

fn first_hot(pattern: &[bool]) -> usize {
    pattern.iter().position(|h| *h).unwrap_or(0)
}

fn first_cold(pattern: &[bool]) -> usize {
    pattern.iter().position(|h| !*h).unwrap_or(0)
}

fn size(pattern: &[bool]) -> usize {
    pattern.iter().filter(|h| **h).count()
}

/// Column names feeding a population pyramid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidColumns {
    /// Splits bars left/right (e.g. sex).
    pub side: String,
    /// Bar position (e.g. age group).
    pub y_axis: String,
    /// Stacking within a bar (e.g. outcome).
    pub stack_group: String,
}

/// One stacked bar segment of a population pyramid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PyramidBar {
    /// Value of the side column.
    pub side: String,
    /// Value of the y-axis column.
    pub y_axis: String,
    /// Value of the stacking column.
    pub stack_group: String,
    /// Number of records.
    pub value: usize,
    /// `true` when `side` is the left side.
    pub left_side: bool,
}

/// Record counts per (side, y, stack) for the two requested sides, ordered by y.
///
/// Records missing any of the three values are not counted. Numeric y labels sort
/// numerically; other labels sort lexicographically.
pub fn pyramid_counts(
    frame: &DataSet,
    columns: &PyramidColumns,
    left_side: &str,
    right_side: &str,
) -> AnalyticsResult<Vec<PyramidBar>> {
    let idx = |name: &str| {
        frame
            .schema
            .index_of(name)
            .ok_or_else(|| AnalyticsError::UnknownField {
                name: name.to_string(),
                message: "pyramid column is not a column of the frame".to_string(),
            })
    };
    let side_idx = idx(&columns.side)?;
    let y_idx = idx(&columns.y_axis)?;
    let stack_idx = idx(&columns.stack_group)?;

    let groups = frame.reduce_rows(BTreeMap::new(), |mut acc, row| {
        let key = (row[side_idx].label(), row[y_idx].label(), row[stack_idx].label());
        if let (Some(s), Some(y), Some(g)) = key {
            *acc.entry((s, y, g)).or_insert(0usize) += 1;
        }
        acc
    });

    let mut bars: Vec<PyramidBar> = groups
        .into_iter()
        .filter(|((s, _, _), _)| s == left_side || s == right_side)
        .map(|((s, y, g), value)| PyramidBar {
            left_side: s == left_side,
            side: s,
            y_axis: y,
            stack_group: g,
            value,
        })
        .collect();
    bars.sort_by(|a, b| compare_labels(&a.y_axis, &b.y_axis));
    Ok(bars)
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::{proportions, pyramid_counts, upset_counts, PyramidColumns, UpsetVariables};
    use crate::dictionary::{Dictionary, FieldDescriptor, FieldType};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn dictionary() -> Dictionary {
        Dictionary::new(vec![
            FieldDescriptor::new("compl_a", FieldType::Binary, "Anaemia"),
            FieldDescriptor::new("compl_b", FieldType::Binary, "Bacteraemia"),
            FieldDescriptor::new("compl_c", FieldType::Binary, "Cardiac arrest"),
        ])
        .unwrap()
    }

    fn frame() -> DataSet {
        let b = |v: Option<bool>| v.map_or(Value::Null, Value::Bool);
        let rows = [
            [Some(true), Some(true), Some(false)],
            [Some(true), Some(true), None],
            [Some(true), Some(false), Some(true)],
            [Some(false), Some(false), Some(false)],
            [None, Some(true), Some(false)],
        ];
        DataSet::new(
            Schema::new(vec![
                Field::new("compl_a", DataType::Bool),
                Field::new("compl_b", DataType::Bool),
                Field::new("compl_c", DataType::Bool),
            ]),
            rows.iter().map(|r| r.iter().map(|v| b(*v)).collect()).collect(),
        )
    }

    #[test]
    fn proportions_are_sorted_and_truncated() {
        let out = proportions(&frame(), &dictionary(), 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].variable, "compl_a");
        assert_eq!(out[0].proportion, 0.75);
        assert_eq!(out[0].label, "<b>Anaemia</b>");
        assert_eq!(out[1].variable, "compl_b");
        assert_eq!(out[1].proportion, 0.6);
    }

    #[test]
    fn upset_counts_and_intersections() {
        let props = proportions(&frame(), &dictionary(), 10);
        let out = upset_counts(&frame(), &dictionary(), UpsetVariables::Proportions(&props), 5)
            .unwrap();
        let counts: Vec<(&str, usize)> = out
            .counts
            .iter()
            .map(|c| (c.variable.as_str(), c.count))
            .collect();
        assert_eq!(counts, vec![("compl_a", 3), ("compl_b", 3), ("compl_c", 1)]);

        let inter: Vec<(Vec<&str>, usize)> = out
            .intersections
            .iter()
            .map(|i| (i.variables.iter().map(String::as_str).collect(), i.count))
            .collect();
        assert_eq!(
            inter,
            vec![
                (vec!["compl_a", "compl_b"], 2),
                (vec!["compl_a", "compl_c"], 1),
                (vec!["compl_b"], 1),
            ]
        );
    }

    #[test]
    fn explicit_upset_variables_are_not_truncated() {
        let vars: Vec<String> = ["compl_a", "compl_b", "compl_c"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let out = upset_counts(&frame(), &dictionary(), UpsetVariables::Explicit(&vars), 1)
            .unwrap();
        assert_eq!(out.counts.len(), 3);
        let inter: Vec<(Vec<&str>, usize)> = out
            .intersections
            .iter()
            .map(|i| (i.variables.iter().map(String::as_str).collect(), i.count))
            .collect();
        assert_eq!(
            inter,
            vec![
                (vec!["compl_a", "compl_b"], 2),
                (vec!["compl_a", "compl_c"], 1),
                (vec!["compl_b"], 1),
            ]
        );
    }

    #[test]
    fn upset_rejects_unknown_variable() {
        let vars = vec!["nope".to_string()];
        assert!(upset_counts(&frame(), &dictionary(), UpsetVariables::Explicit(&vars), 5).is_err());
    }

    #[test]
    fn pyramid_counts_group_and_sort() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("sex", DataType::Utf8),
                Field::new("age", DataType::Utf8),
                Field::new("outcome", DataType::Utf8),
            ]),
            vec![
                vec![Value::utf8("Male"), Value::utf8("20"), Value::utf8("Death")],
                vec![Value::utf8("Female"), Value::utf8("5"), Value::utf8("Death")],
                vec![Value::utf8("Male"), Value::utf8("20"), Value::utf8("Death")],
                vec![Value::utf8("Other"), Value::utf8("5"), Value::utf8("Death")],
                vec![Value::utf8("Male"), Value::Null, Value::utf8("Death")],
            ],
        );
        let cols = PyramidColumns {
            side: "sex".into(),
            y_axis: "age".into(),
            stack_group: "outcome".into(),
        };
        let bars = pyramid_counts(&ds, &cols, "Female", "Male").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!((bars[0].side.as_str(), bars[0].y_axis.as_str()), ("Female", "5"));
        assert!(bars[0].left_side);
        assert_eq!((bars[1].side.as_str(), bars[1].value), ("Male", 2));
        assert!(!bars[1].left_side);
    }
}
