//! Core data model types for the working table.
//!
//! A working table is an in-memory [`DataSet`]: a [`Schema`] (ordered, typed [`Field`]s) plus
//! row-major [`Value`] storage. The *semantic* type of a column (numeric, binary, categorical,
//! one-hot) comes from the [`crate::dictionary::Dictionary`], not from the storage type here.
//!
//! Every operation returns a new dataset; inputs are never mutated.

use std::collections::HashSet;

/// Storage type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean (binary and one-hot indicator columns).
    Bool,
    /// UTF-8 string (categorical labels, identifiers, free text).
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single cell in a [`DataSet`].
///
/// [`Value::Null`] is the only representation of a missing value; it is distinct from
/// `Bool(false)` / `Int64(0)` for binary columns and from every label of a categorical column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Convenience constructor for string cells.
    pub fn utf8(s: impl Into<String>) -> Self {
        Self::Utf8(s.into())
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the cell. Booleans count as `0.0` / `1.0`; strings, nulls and
    /// non-finite floats are `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) if !v.is_finite() => None,
            Self::Float64(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Null | Self::Utf8(_) => None,
        }
    }

    /// Indicator view of the cell: `None` when missing, otherwise whether the cell equals 1.
    pub fn indicator(&self) -> Option<bool> {
        match self {
            Self::Null => None,
            Self::Float64(v) if v.is_nan() => None,
            Self::Bool(b) => Some(*b),
            Self::Int64(v) => Some(*v == 1),
            Self::Float64(v) => Some(*v == 1.0),
            Self::Utf8(s) => Some(s == "1" || s.eq_ignore_ascii_case("true")),
        }
    }

    /// Category label of the cell, or `None` when missing.
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Float64(v) if v.is_nan() => None,
            Self::Int64(v) => Some(v.to_string()),
            Self::Float64(v) => Some(v.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Utf8(s) => Some(s.clone()),
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.field_names()
    }

    /// Returns `true` if the dataset has a column called `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.schema.index_of(name).is_some()
    }

    /// Borrow all cells of a column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Number of non-missing cells in a column (0 for unknown columns).
    pub fn non_null_count(&self, name: &str) -> usize {
        self.column(name)
            .map(|values| values.iter().filter(|v| !v.is_null()).count())
            .unwrap_or(0)
    }

    /// Project onto `names`, in that order. Names that are not columns are skipped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let mut seen = HashSet::new();
        let idxs: Vec<usize> = names
            .iter()
            .filter_map(|n| self.schema.index_of(n.as_ref()))
            .filter(|idx| seen.insert(*idx))
            .collect();
        self.project(&idxs)
    }

    /// Remove the listed columns. Unknown names are ignored.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let drop: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        let idxs: Vec<usize> = (0..self.schema.fields.len())
            .filter(|&i| !drop.contains(self.schema.fields[i].name.as_str()))
            .collect();
        self.project(&idxs)
    }

    /// Remove every column whose cells are all missing.
    ///
    /// A dataset without rows loses all of its columns.
    pub fn drop_null_columns(&self) -> Self {
        self.drop_null_columns_except::<&str>(&[])
    }

    /// Like [`DataSet::drop_null_columns`], but the columns named in `keep` always stay.
    pub fn drop_null_columns_except<S: AsRef<str>>(&self, keep: &[S]) -> Self {
        let keep: HashSet<&str> = keep.iter().map(AsRef::as_ref).collect();
        let idxs: Vec<usize> = (0..self.schema.fields.len())
            .filter(|&i| {
                keep.contains(self.schema.fields[i].name.as_str())
                    || self.rows.iter().any(|row| !row[i].is_null())
            })
            .collect();
        self.project(&idxs)
    }

    /// Return a copy with `values` set as column `field.name`.
    ///
    /// An existing column of the same name is replaced in place; otherwise the column is
    /// appended at the end.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` differs from the row count.
    pub fn with_column(&self, field: Field, values: Vec<Value>) -> Self {
        assert!(
            values.len() == self.rows.len(),
            "column length {} does not match row count {}",
            values.len(),
            self.rows.len()
        );
        let mut out = self.clone();
        match out.schema.index_of(&field.name) {
            Some(idx) => {
                out.schema.fields[idx] = field;
                for (row, v) in out.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                out.schema.fields.push(field);
                for (row, v) in out.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        out
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Reduce (fold) all rows into an accumulator value.
    ///
    /// This is similar to `Iterator::fold`, but provides each row as `&[Value]`.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }

    fn project(&self, idxs: &[usize]) -> Self {
        let fields = idxs.iter().map(|&i| self.schema.fields[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| idxs.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Self::new(Schema::new(fields), rows)
    }
}
