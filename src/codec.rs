//! Categorical <-> one-hot codec.
//!
//! [`encode`] expands a categorical column `C` with categories `c1..ck` into indicator columns
//! `C___c1 .. C___ck`. A missing categorical value becomes a row where *every* indicator of `C`
//! is missing, never a row of zeros. [`decode`] is the exact inverse: a row whose indicators
//! are all false, or that contains any missing indicator, decodes to missing.
//!
//! Missingness is carried as an explicit missing variant during expansion, so a
//! real category whose label happens to equal [`CodecOptions::missing_label`] is encoded like any
//! other category.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::selection::ONE_HOT_SEPARATOR;
use crate::types::{DataSet, DataType, Field, Value};

/// Options shared by [`encode`] and [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Delimiter between field name and category label in indicator column names.
    pub separator: String,
    /// Name used for the missing category in diagnostics (e.g. conflict reports).
    pub missing_label: String,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            separator: ONE_HOT_SEPARATOR.to_string(),
            missing_label: "nan".to_string(),
        }
    }
}

impl CodecOptions {
    fn validate(&self) -> AnalyticsResult<()> {
        if self.separator.is_empty() {
            return Err(AnalyticsError::InvalidOption {
                message: "one-hot separator must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Indicator column name for `label` of `field`.
    pub fn indicator_name(&self, field: &str, label: &str) -> String {
        format!("{field}{}{label}", self.separator)
    }

    /// Category label of an indicator column of `field`, if `column` is one.
    pub fn category_of<'a>(&self, field: &str, column: &'a str) -> Option<&'a str> {
        column
            .strip_prefix(field)
            .and_then(|rest| rest.strip_prefix(self.separator.as_str()))
    }
}

/// A categorical cell before expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Category {
    Label(String),
    Missing,
}

impl From<&Value> for Category {
    fn from(v: &Value) -> Self {
        v.label().map_or(Self::Missing, Self::Label)
    }
}

/// Expand each column of `dataset` named in `categorical_fields` into one-hot indicators.
///
/// Indicator columns are `Bool`, created per field in sorted label order. Rows where the
/// categorical value was missing get `Null` in every indicator of that field. The output
/// columns follow the dictionary's declaration order, then columns unknown to the dictionary
/// in their previous relative order. Names in `categorical_fields` that are not columns are
/// ignored.
pub fn encode<S: AsRef<str>>(
    dataset: &DataSet,
    dictionary: &Dictionary,
    categorical_fields: &[S],
    options: &CodecOptions,
) -> AnalyticsResult<DataSet> {
    options.validate()?;
    let wanted: HashSet<&str> = categorical_fields.iter().map(AsRef::as_ref).collect();
    let columns: Vec<String> = dataset
        .column_names()
        .filter(|c| wanted.contains(c))
        .map(str::to_string)
        .collect();

    let mut out = dataset.drop_columns(&columns);
    for field in &columns {
        let cells: Vec<Category> = dataset
            .column(field)
            .unwrap_or_default()
            .into_iter()
            .map(Category::from)
            .collect();
        let labels: BTreeSet<&str> = cells
            .iter()
            .filter_map(|c| match c {
                Category::Label(l) => Some(l.as_str()),
                Category::Missing => None,
            })
            .collect();

        for label in &labels {
            let values = cells
                .iter()
                .map(|c| match c {
                    Category::Label(l) => Value::Bool(l == label),
                    Category::Missing => Value::Null,
                })
                .collect();
            out = out.with_column(
                Field::new(options.indicator_name(field, label), DataType::Bool),
                values,
            );
        }
        tracing::debug!(field = %field, categories = labels.len(), "expanded categorical field");
    }

    let order = dictionary.order_columns(out.column_names());
    Ok(out.select(&order))
}

/// Collapse the indicator columns of each field in `categorical_fields` back into one `Utf8`
/// column named after the field.
///
/// A row decodes to missing when none of its indicators is hot or when any indicator is itself
/// missing. Returns [`AnalyticsError::OneHotConflict`] when a row has more than one hot
/// candidate (counting the recomputed missing flag), since that can only come from corrupted
/// input. A field without any indicator columns decodes to an all-missing column.
///
/// The decoded column is always `Utf8` (an `Int64` category `1` comes back as `"1"`), and the
/// output columns follow dictionary order like [`encode`]. `decode(encode(df))` therefore
/// reproduces `df` exactly when its categorical columns are text and its columns are already
/// in dictionary order.
pub fn decode<S: AsRef<str>>(
    dataset: &DataSet,
    dictionary: &Dictionary,
    categorical_fields: &[S],
    options: &CodecOptions,
) -> AnalyticsResult<DataSet> {
    options.validate()?;
    let mut out = dataset.clone();
    for field in categorical_fields {
        let field = field.as_ref();
        let indicators: Vec<(String, usize)> = out
            .schema
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| options.category_of(field, &f.name).is_some())
            .map(|(i, f)| (f.name.clone(), i))
            .collect();

        let mut values = Vec::with_capacity(out.row_count());
        for (row_idx, row) in out.rows.iter().enumerate() {
            let mut hot: Vec<&str> = Vec::new();
            let mut any_missing = false;
            for (name, idx) in &indicators {
                match row[*idx].indicator() {
                    Some(true) => hot.push(name.as_str()),
                    Some(false) => {}
                    None => any_missing = true,
                }
            }
            let missing = hot.is_empty() || any_missing;
            if hot.len() + usize::from(missing) > 1 {
                let mut hot: Vec<String> = hot.iter().map(|s| s.to_string()).collect();
                if missing {
                    hot.push(options.indicator_name(field, &options.missing_label));
                }
                return Err(AnalyticsError::OneHotConflict {
                    field: field.to_string(),
                    row: row_idx,
                    hot,
                });
            }
            let value = match hot.first() {
                Some(name) if !missing => options
                    .category_of(field, name)
                    .map_or(Value::Null, Value::utf8),
                _ => Value::Null,
            };
            values.push(value);
        }

        let names: Vec<&str> = indicators.iter().map(|(n, _)| n.as_str()).collect();
        out = out
            .drop_columns(&names)
            .with_column(Field::new(field, DataType::Utf8), values);
        tracing::debug!(field, indicators = names.len(), "collapsed one-hot columns");
    }

    let order = dictionary.order_columns(out.column_names());
    Ok(out.select(&order))
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, CodecOptions};
    use crate::dictionary::{Dictionary, FieldDescriptor, FieldType};
    use crate::error::AnalyticsError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn dictionary() -> Dictionary {
        Dictionary::new(vec![
            FieldDescriptor::new("subjid", FieldType::Other("text".into()), "Subject"),
            FieldDescriptor::new("demog_sex", FieldType::Categorical, "Sex"),
            FieldDescriptor::new("demog_sex___Female", FieldType::Binary, "Female")
                .with_parent("demog_sex"),
            FieldDescriptor::new("demog_sex___Male", FieldType::Binary, "Male")
                .with_parent("demog_sex"),
            FieldDescriptor::new("demog_age", FieldType::Numeric, "Age"),
        ])
        .unwrap()
    }

    fn frame() -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("subjid", DataType::Utf8),
                Field::new("demog_sex", DataType::Utf8),
                Field::new("demog_age", DataType::Float64),
            ]),
            vec![
                vec![Value::utf8("p1"), Value::utf8("Male"), Value::Float64(40.0)],
                vec![Value::utf8("p2"), Value::Null, Value::Float64(51.0)],
                vec![Value::utf8("p3"), Value::utf8("Female"), Value::Null],
            ],
        )
    }

    #[test]
    fn encode_expands_and_masks_missing_rows() {
        let out = encode(&frame(), &dictionary(), &["demog_sex"], &CodecOptions::default()).unwrap();
        assert_eq!(
            out.column_names().collect::<Vec<_>>(),
            vec!["subjid", "demog_sex___Female", "demog_sex___Male", "demog_age"]
        );
        assert_eq!(out.rows[0][1..3], [Value::Bool(false), Value::Bool(true)]);
        assert_eq!(out.rows[1][1..3], [Value::Null, Value::Null]);
        assert_eq!(out.rows[2][1..3], [Value::Bool(true), Value::Bool(false)]);
    }

    #[test]
    fn roundtrip_restores_values_and_missingness() {
        let opts = CodecOptions::default();
        let encoded = encode(&frame(), &dictionary(), &["demog_sex"], &opts).unwrap();
        let decoded = decode(&encoded, &dictionary(), &["demog_sex"], &opts).unwrap();
        assert_eq!(decoded, frame());
    }

    #[test]
    fn decode_yields_text_in_dictionary_order() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("demog_sex", DataType::Int64),
                Field::new("subjid", DataType::Utf8),
            ]),
            vec![
                vec![Value::Int64(1), Value::utf8("p1")],
                vec![Value::Null, Value::utf8("p2")],
            ],
        );
        let opts = CodecOptions::default();
        let encoded = encode(&ds, &dictionary(), &["demog_sex"], &opts).unwrap();
        assert_eq!(
            encoded.column_names().collect::<Vec<_>>(),
            vec!["subjid", "demog_sex___1"]
        );
        let decoded = decode(&encoded, &dictionary(), &["demog_sex"], &opts).unwrap();
        assert_eq!(decoded.column_names().collect::<Vec<_>>(), vec!["subjid", "demog_sex"]);
        assert_eq!(decoded.schema.fields[1].data_type, DataType::Utf8);
        assert_eq!(decoded.column("demog_sex").unwrap(), vec![&Value::utf8("1"), &Value::Null]);
    }

    #[test]
    fn label_equal_to_missing_label_is_an_ordinary_category() {
        let ds = DataSet::new(
            Schema::new(vec![Field::new("x", DataType::Utf8)]),
            vec![vec![Value::utf8("nan")], vec![Value::Null]],
        );
        let dict = Dictionary::new(vec![]).unwrap();
        let opts = CodecOptions::default();
        let encoded = encode(&ds, &dict, &["x"], &opts).unwrap();
        assert_eq!(encoded.column_names().collect::<Vec<_>>(), vec!["x___nan"]);
        assert_eq!(encoded.rows, vec![vec![Value::Bool(true)], vec![Value::Null]]);
        assert_eq!(decode(&encoded, &dict, &["x"], &opts).unwrap(), ds);
    }

    #[test]
    fn decode_treats_partial_missing_as_missing() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("x___a", DataType::Bool),
                Field::new("x___b", DataType::Bool),
            ]),
            vec![
                vec![Value::Bool(false), Value::Null],
                vec![Value::Bool(false), Value::Bool(false)],
                vec![Value::Int64(0), Value::Int64(1)],
            ],
        );
        let dict = Dictionary::new(vec![]).unwrap();
        let out = decode(&ds, &dict, &["x"], &CodecOptions::default()).unwrap();
        assert_eq!(out.column_names().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(
            out.column("x").unwrap(),
            vec![&Value::Null, &Value::Null, &Value::utf8("b")]
        );
    }

    #[test]
    fn decode_rejects_two_hot_indicators() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("x___a", DataType::Bool),
                Field::new("x___b", DataType::Bool),
            ]),
            vec![
                vec![Value::Bool(true), Value::Bool(false)],
                vec![Value::Bool(true), Value::Bool(true)],
            ],
        );
        let dict = Dictionary::new(vec![]).unwrap();
        let err = decode(&ds, &dict, &["x"], &CodecOptions::default()).unwrap_err();
        match err {
            AnalyticsError::OneHotConflict { field, row, hot } => {
                assert_eq!(field, "x");
                assert_eq!(row, 1);
                assert_eq!(hot, vec!["x___a", "x___b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_rejects_hot_indicator_next_to_missing_one() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("x___a", DataType::Bool),
                Field::new("x___b", DataType::Bool),
            ]),
            vec![vec![Value::Bool(true), Value::Null]],
        );
        let dict = Dictionary::new(vec![]).unwrap();
        let err = decode(&ds, &dict, &["x"], &CodecOptions::default()).unwrap_err();
        assert!(err.to_string().contains("x___nan"));
    }

    #[test]
    fn empty_separator_is_rejected() {
        let opts = CodecOptions {
            separator: String::new(),
            ..Default::default()
        };
        let err = encode(&frame(), &dictionary(), &["demog_sex"], &opts).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidOption { .. }));
    }
}
