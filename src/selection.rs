//! Variable selection from the field dictionary.
//!
//! [`select_fields`] produces the ordered variable list every other component works from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::dictionary::{Dictionary, FieldType};
use crate::types::DataSet;

/// One-hot delimiter used when matching exclusion suffixes.
pub const ONE_HOT_SEPARATOR: &str = "___";

/// Filters applied by [`select_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionOptions {
    /// Section prefixes; a field matches when its name starts with `section + "_"`.
    pub include_sections: Vec<String>,
    /// Declared types to keep.
    pub include_types: Vec<FieldType>,
    /// Suffixes to exclude, each matched against `"___" + suffix`.
    pub exclude_suffixes: Vec<String>,
    /// Fields unioned in regardless of the filters above.
    pub required_fields: Vec<String>,
    /// Union in the subject identifier field.
    pub include_id: bool,
    /// Name of the subject identifier field.
    pub id_field: String,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            include_sections: vec!["demog".to_string()],
            include_types: vec![FieldType::Binary, FieldType::Categorical, FieldType::Numeric],
            exclude_suffixes: ["_units", "addi", "otherl2", "item", "_oth", "_unlisted", "otherl3"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            required_fields: Vec::new(),
            include_id: false,
            id_field: "subjid".to_string(),
        }
    }
}

impl SelectionOptions {
    /// Default filters restricted to the given sections.
    pub fn for_sections<S: AsRef<str>>(sections: &[S]) -> Self {
        Self {
            include_sections: sections.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }
}

/// Select the variables of `dataset` described by `options`.
///
/// The result follows the dictionary's declaration order, has no duplicates, and silently
/// omits fields that are not columns of `dataset`. Field types outside
/// `options.include_types` never match.
pub fn select_fields(
    dataset: &DataSet,
    dictionary: &Dictionary,
    options: &SelectionOptions,
) -> Vec<String> {
    let prefixes: Vec<String> = options
        .include_sections
        .iter()
        .map(|s| format!("{s}_"))
        .collect();
    let suffixes: Vec<String> = options
        .exclude_suffixes
        .iter()
        .map(|s| format!("{ONE_HOT_SEPARATOR}{s}"))
        .collect();
    let required: HashSet<&str> = options.required_fields.iter().map(String::as_str).collect();

    let selected: Vec<String> = dictionary
        .fields()
        .iter()
        .filter(|f| {
            let name = f.field_name.as_str();
            let matches_filters = prefixes.iter().any(|p| name.starts_with(p.as_str()))
                && options.include_types.contains(&f.field_type)
                && !suffixes.iter().any(|s| name.ends_with(s.as_str()));
            matches_filters
                || required.contains(name)
                || (options.include_id && name == options.id_field)
        })
        .map(|f| f.field_name.clone())
        .filter(|name| dataset.has_column(name))
        .collect();

    tracing::debug!(
        sections = ?options.include_sections,
        selected = selected.len(),
        "selected dictionary fields"
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::{select_fields, SelectionOptions};
    use crate::dictionary::{Dictionary, FieldDescriptor, FieldType};
    use crate::types::{DataSet, DataType, Field, Schema};

    fn dictionary() -> Dictionary {
        Dictionary::new(vec![
            FieldDescriptor::new("subjid", FieldType::Other("text".into()), "Subject"),
            FieldDescriptor::new("demog_age", FieldType::Numeric, "Age"),
            FieldDescriptor::new("demog_notes", FieldType::Other("text".into()), "Notes"),
            FieldDescriptor::new("demog_sex", FieldType::Categorical, "Sex"),
            FieldDescriptor::new("demog_sex___oth", FieldType::Binary, "Other"),
            FieldDescriptor::new("compl_anaemia", FieldType::Binary, "Anaemia"),
        ])
        .unwrap()
    }

    fn frame(names: &[&str]) -> DataSet {
        let fields = names.iter().map(|n| Field::new(*n, DataType::Utf8)).collect();
        DataSet::new(Schema::new(fields), Vec::new())
    }

    #[test]
    fn filters_by_section_type_and_suffix() {
        let ds = frame(&[
            "compl_anaemia",
            "demog_sex___oth",
            "demog_sex",
            "demog_notes",
            "demog_age",
            "subjid",
        ]);
        let out = select_fields(&ds, &dictionary(), &SelectionOptions::default());
        assert_eq!(out, vec!["demog_age", "demog_sex"]);
    }

    #[test]
    fn id_field_is_unioned_when_requested() {
        let ds = frame(&["subjid", "demog_age"]);
        let opts = SelectionOptions {
            include_id: true,
            ..Default::default()
        };
        let out = select_fields(&ds, &dictionary(), &opts);
        assert_eq!(out, vec!["subjid", "demog_age"]);
    }

    #[test]
    fn fields_absent_from_frame_are_dropped() {
        let ds = frame(&["demog_sex"]);
        let opts = SelectionOptions {
            required_fields: vec!["compl_anaemia".into()],
            ..Default::default()
        };
        let out = select_fields(&ds, &dictionary(), &opts);
        assert_eq!(out, vec!["demog_sex"]);
    }
}
