//! Descriptive frame builder.
//!
//! Turns a raw working table into the cleaned, one-hot encoded frame consumed by
//! [`crate::table::descriptive_table`] and the frequency summaries in [`crate::counts`].

use serde::{Deserialize, Serialize};

use crate::codec::{decode, encode, CodecOptions};
use crate::dictionary::{Dictionary, FieldType};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::selection::{select_fields, SelectionOptions};
use crate::types::{DataSet, DataType, Field, Value};

/// Category labels treated as explicit negative answers.
///
/// Matching is case-insensitive. The vocabulary is a reporting policy, so it is injectable
/// (e.g. deserialized from JSON configuration) rather than fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NegativeResponses(Vec<String>);

impl NegativeResponses {
    /// Build a table from labels; they are lowercased once here.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        Self(labels.iter().map(|s| s.as_ref().to_lowercase()).collect())
    }

    /// Returns `true` if `label` is a negative response.
    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.0.iter().any(|n| n.to_lowercase() == label)
    }
}

impl Default for NegativeResponses {
    fn default() -> Self {
        Self::new(&["no", "never smoked"])
    }
}

/// Options for [`build_descriptive_frame`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptiveOptions {
    /// Stratification column, kept in categorical form.
    pub group_by: Option<String>,
    /// Which dictionary fields to keep.
    pub selection: SelectionOptions,
    /// One-hot naming.
    pub codec: CodecOptions,
    /// Drop indicator columns whose category is a negative response.
    pub exclude_negative_responses: bool,
    /// The negative-response vocabulary.
    pub negative_responses: NegativeResponses,
    /// Label that replaces missing values of `group_by`.
    pub unknown_label: String,
}

impl Default for DescriptiveOptions {
    fn default() -> Self {
        Self {
            group_by: None,
            selection: SelectionOptions::default(),
            codec: CodecOptions::default(),
            exclude_negative_responses: true,
            negative_responses: NegativeResponses::default(),
            unknown_label: "Unknown".to_string(),
        }
    }
}

/// Build the cleaned, encoded working frame for descriptive summaries.
///
/// Steps:
///
/// 1. keep the fields chosen by [`select_fields`], plus `group_by` (or its indicator columns),
/// 2. drop all-missing columns (never `group_by` or its indicators),
/// 3. one-hot encode every categorical dictionary field except `group_by`,
/// 4. decode `group_by` back to a categorical column if it arrived as indicators,
/// 5. optionally drop negative-response indicator columns,
/// 6. drop all-missing columns again, except `group_by`,
/// 7. replace missing `group_by` values with `options.unknown_label`.
///
/// Returns [`AnalyticsError::UnknownField`] if `group_by` cannot be found in the frame, either
/// as a column or as indicator columns.
pub fn build_descriptive_frame(
    raw: &DataSet,
    dictionary: &Dictionary,
    options: &DescriptiveOptions,
) -> AnalyticsResult<DataSet> {
    let group_by = options.group_by.as_deref();
    let mut include = select_fields(raw, dictionary, &options.selection);

    let group_columns = match group_by {
        Some(by) => resolve_group_columns(raw, dictionary, by, &options.codec)?,
        None => Vec::new(),
    };
    let missing: Vec<String> = group_columns
        .iter()
        .filter(|c| !include.contains(c))
        .cloned()
        .collect();
    include = missing.into_iter().chain(include).collect();

    // The stratification column survives even when empty so every record gets a group.
    let mut df = raw.select(&include).drop_null_columns_except(&group_columns);

    let categorical: Vec<&str> = dictionary
        .names_of_type(&FieldType::Categorical)
        .filter(|name| Some(*name) != group_by)
        .collect();
    df = encode(&df, dictionary, &categorical, &options.codec)?;

    if let Some(by) = group_by {
        if !df.has_column(by) {
            df = decode(&df, dictionary, &[by], &options.codec)?;
        }
    }

    if options.exclude_negative_responses {
        let negative: Vec<String> = df
            .column_names()
            .filter(|c| is_negative_column(c, options))
            .map(str::to_string)
            .collect();
        tracing::debug!(dropped = negative.len(), "excluding negative responses");
        df = df.drop_columns(&negative);
    }

    df = df.drop_null_columns_except(group_by.as_slice());

    if let Some(by) = group_by {
        df = fill_group_missing(&df, by, &options.unknown_label);
    }

    tracing::debug!(
        rows = df.row_count(),
        columns = df.schema.fields.len(),
        group_by = group_by.unwrap_or(""),
        "built descriptive frame"
    );
    Ok(df)
}

/// Columns that carry `by` in `raw`: the column itself or, failing that, its indicators.
fn resolve_group_columns(
    raw: &DataSet,
    dictionary: &Dictionary,
    by: &str,
    codec: &CodecOptions,
) -> AnalyticsResult<Vec<String>> {
    if raw.has_column(by) {
        return Ok(vec![by.to_string()]);
    }
    let indicators: Vec<String> = raw
        .column_names()
        .filter(|c| codec.category_of(by, c).is_some())
        .map(str::to_string)
        .collect();
    if !indicators.is_empty() {
        return Ok(indicators);
    }
    let message = if dictionary.contains(by) {
        "declared in the dictionary but has no data in the frame"
    } else {
        "not a frame column and not declared in the dictionary"
    };
    Err(AnalyticsError::UnknownField {
        name: by.to_string(),
        message: message.to_string(),
    })
}

fn is_negative_column(column: &str, options: &DescriptiveOptions) -> bool {
    column
        .rsplit_once(options.codec.separator.as_str())
        .is_some_and(|(_, label)| options.negative_responses.matches(label))
}

fn fill_group_missing(df: &DataSet, by: &str, unknown_label: &str) -> DataSet {
    let Some(values) = df.column(by) else {
        return df.clone();
    };
    let missing = values.iter().filter(|v| v.label().is_none()).count();
    if missing > 0 {
        tracing::warn!(group_by = by, missing, "filling missing group values");
    }
    let filled = values
        .into_iter()
        .map(|v| v.label().map_or_else(|| Value::utf8(unknown_label), Value::Utf8))
        .collect();
    df.with_column(Field::new(by, DataType::Utf8), filled)
}
