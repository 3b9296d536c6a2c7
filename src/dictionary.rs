//! The field dictionary: one descriptor per data column.
//!
//! Field names are namespaced by section (`compl_anaemia` belongs to section `compl`), and the
//! one-hot children of a categorical field share the prefix `field_name + "___"`. The
//! dictionary is read-only to every component of this crate.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Declared type of a dictionary field.
///
/// `Other` keeps any type outside the analytic set (free text, dates, ...). Selection filters
/// never match it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Continuous measurement, summarized as median (IQR).
    Numeric,
    /// 0/1 column (including one-hot indicators), summarized as count (%).
    Binary,
    /// Labelled categories, one-hot encoded before summarizing.
    Categorical,
    /// Grouping header without data of its own.
    Section,
    /// Any other declared type, kept verbatim.
    Other(String),
}

impl FieldType {
    /// Canonical lowercase name of the type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Numeric => "numeric",
            Self::Binary => "binary",
            Self::Categorical => "categorical",
            Self::Section => "section",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" => Self::Numeric,
            "binary" => Self::Binary,
            "categorical" => Self::Categorical,
            "section" => Self::Section,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the field dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique column identifier.
    pub field_name: String,
    /// Declared type.
    pub field_type: FieldType,
    /// Display text; may start with a conditional "If ...:" prefix.
    #[serde(default)]
    pub field_label: String,
    /// Name of the parent field (section or categorical question), if any.
    #[serde(default)]
    pub parent: Option<String>,
}

impl FieldDescriptor {
    /// Create a descriptor without a parent.
    pub fn new(
        field_name: impl Into<String>,
        field_type: FieldType,
        field_label: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            field_label: field_label.into(),
            parent: None,
        }
    }

    /// Builder-style setter for the parent reference.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Ordered, name-unique set of [`FieldDescriptor`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    /// Build a dictionary, keeping declaration order.
    ///
    /// Blank parents are normalized to `None`. Returns [`AnalyticsError::DuplicateField`] if a
    /// `field_name` appears twice.
    pub fn new(fields: Vec<FieldDescriptor>) -> AnalyticsResult<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        let mut out = Vec::with_capacity(fields.len());
        for (i, mut field) in fields.into_iter().enumerate() {
            if field.parent.as_deref().is_some_and(|p| p.trim().is_empty()) {
                field.parent = None;
            }
            if index.insert(field.field_name.clone(), i).is_some() {
                return Err(AnalyticsError::DuplicateField {
                    name: field.field_name,
                });
            }
            out.push(field);
        }
        Ok(Self { fields: out, index })
    }

    /// All descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the dictionary has no descriptors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Returns `true` if `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declaration position of a field.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Names of all fields of the given type, in declaration order.
    pub fn names_of_type<'a>(&'a self, field_type: &'a FieldType) -> impl Iterator<Item = &'a str> {
        self.fields
            .iter()
            .filter(move |f| &f.field_type == field_type)
            .map(|f| f.field_name.as_str())
    }

    /// Label of a descriptor's parent, if the parent is declared.
    pub fn parent_label(&self, field: &FieldDescriptor) -> Option<&str> {
        let parent = field.parent.as_deref()?;
        self.get(parent).map(|p| p.field_label.as_str())
    }

    /// Reorder column names: dictionary order first, then names absent from the dictionary in
    /// their original relative order.
    pub fn order_columns<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let names: Vec<&str> = names.into_iter().collect();
        let mut known: Vec<(usize, &str)> = names
            .iter()
            .filter_map(|n| self.position(n).map(|p| (p, *n)))
            .collect();
        known.sort_by_key(|(p, _)| *p);
        known
            .into_iter()
            .map(|(_, n)| n.to_string())
            .chain(
                names
                    .iter()
                    .filter(|n| !self.contains(n))
                    .map(|n| n.to_string()),
            )
            .collect()
    }
}
