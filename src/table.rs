//! Descriptive table assembly.
//!
//! [`descriptive_table`] turns a frame produced by
//! [`crate::frame::build_descriptive_frame`] into a grid of formatted cells:
//!
//! - rows: every numeric and binary dictionary field present in the frame, plus the parents of
//!   those fields as header rows, in dictionary order; optionally a leading totals row,
//! - columns: `Variable`, `All`, then one column per observed value of `group_by`.
//!
//! Output is deterministic: rows follow the dictionary, group columns follow the caller's
//! preferred order and then first appearance in the frame.

use std::collections::HashSet;
use std::fmt;

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use serde::{Deserialize, Serialize, Serializer};

use crate::dictionary::{Dictionary, FieldDescriptor, FieldType};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::labels::{table_row_label, TABLE_LABEL_MAX_LEN};
use crate::selection::ONE_HOT_SEPARATOR;
use crate::summary::{
    format_count_percent, format_median_iqr, min_field_width, BinaryFormat, NumericFormat, Summary,
};
use crate::types::DataSet;

/// Legend explaining the row markers of a descriptive table.
pub const LEGEND: &str = "<b>KEY</b><br>(*) Count (%) | N<br>(+) Median (IQR) | N";

/// Header of the label column.
pub const VARIABLE_COLUMN: &str = "Variable";
/// Header of the whole-population column.
pub const ALL_COLUMN: &str = "All";
/// Label of the totals row.
pub const TOTALS_LABEL: &str = "<b>Totals</b>";

/// Options for [`descriptive_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Stratification column.
    pub group_by: Option<String>,
    /// Preferred order of group columns; values not observed are skipped.
    pub group_order: Vec<String>,
    /// Prepend a totals row with record counts per column.
    pub include_totals: bool,
    /// Numeric cell format. `min_width` is recomputed per table column.
    pub numeric: NumericFormat,
    /// Binary cell format. `min_width` is recomputed per table column.
    pub binary: BinaryFormat,
    /// Maximum row label length.
    pub label_max_len: usize,
    /// One-hot delimiter, used to indent indicator rows under their question.
    pub separator: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            group_by: None,
            group_order: Vec::new(),
            include_totals: true,
            numeric: NumericFormat::default(),
            binary: BinaryFormat::default(),
            label_max_len: TABLE_LABEL_MAX_LEN,
            separator: ONE_HOT_SEPARATOR.to_string(),
        }
    }
}

/// One cell of a [`DescriptiveTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCell {
    /// Nothing to show (header rows).
    Blank,
    /// Row label.
    Label(String),
    /// Record count (totals row).
    Count(usize),
    /// Formatted statistics or `N/A`.
    Summary(Summary),
}

impl fmt::Display for TableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => Ok(()),
            Self::Label(s) => f.write_str(s),
            Self::Count(n) => write!(f, "{n}"),
            Self::Summary(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for TableCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A table row; `field` is `None` for the totals row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Dictionary field the row summarizes.
    pub field: Option<String>,
    /// Label cell followed by one cell per data column.
    pub cells: Vec<TableCell>,
}

/// Formatted descriptive table. Every row has one cell per entry of `columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptiveTable {
    /// `Variable`, `All`, then one column per group.
    pub columns: Vec<String>,
    /// Totals row (if requested), then field rows in dictionary order.
    pub rows: Vec<TableRow>,
}

impl DescriptiveTable {
    /// Rendered cell text of the row for `field` under `column`.
    pub fn cell(&self, field: &str, column: &str) -> Option<String> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.field.as_deref() == Some(field))
            .map(|r| r.cells[col].to_string())
    }

    /// The totals row, if present.
    pub fn totals(&self) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.field.is_none())
    }

    /// Plain-text rendering with markup removed, for terminals and logs.
    pub fn to_text_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(
                self.columns
                    .iter()
                    .map(|c| Cell::new(c).add_attribute(Attribute::Bold)),
            );
        for row in &self.rows {
            table.add_row(row.cells.iter().map(|c| Cell::new(strip_markup(&c.to_string()))));
        }
        for idx in 1..self.columns.len() {
            if let Some(column) = table.column_mut(idx) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }
        table.to_string()
    }
}

fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Build the descriptive table and its legend.
///
/// `frame` is usually the output of [`crate::frame::build_descriptive_frame`]. Returns
/// [`AnalyticsError::UnknownField`] if `options.group_by` is not a column of `frame`.
/// Columns without enough observations are not errors; they format as `N/A`.
pub fn descriptive_table(
    frame: &DataSet,
    dictionary: &Dictionary,
    options: &TableOptions,
) -> AnalyticsResult<(DescriptiveTable, String)> {
    let rows = row_fields(frame, dictionary);

    let mut columns = vec![VARIABLE_COLUMN.to_string(), ALL_COLUMN.to_string()];
    let mut subsets = vec![frame.clone()];
    if let Some(by) = options.group_by.as_deref() {
        let idx = frame
            .schema
            .index_of(by)
            .ok_or_else(|| AnalyticsError::UnknownField {
                name: by.to_string(),
                message: "group_by is not a column of the frame".to_string(),
            })?;
        for group in group_values(frame, idx, &options.group_order) {
            subsets.push(frame.filter_rows(|row| row[idx].label().as_deref() == Some(group.as_str())));
            columns.push(group);
        }
    }

    let mut table_rows: Vec<TableRow> = rows
        .iter()
        .map(|field| TableRow {
            field: Some(field.field_name.clone()),
            cells: vec![TableCell::Label(table_row_label(
                field,
                options.label_max_len,
                &options.separator,
            ))],
        })
        .collect();

    for subset in &subsets {
        let width = min_field_width(subset.row_count());
        let numeric = NumericFormat {
            min_width: width,
            ..options.numeric
        };
        let binary = BinaryFormat {
            min_width: width,
            ..options.binary
        };
        for (row, field) in table_rows.iter_mut().zip(&rows) {
            row.cells.push(summarize(subset, field, &numeric, &binary));
        }
    }

    if options.include_totals {
        let mut cells = vec![TableCell::Label(TOTALS_LABEL.to_string())];
        cells.extend(subsets.iter().map(|s| TableCell::Count(s.row_count())));
        table_rows.insert(0, TableRow { field: None, cells });
    }

    tracing::debug!(
        rows = table_rows.len(),
        columns = ?columns,
        "assembled descriptive table"
    );
    Ok((
        DescriptiveTable {
            columns,
            rows: table_rows,
        },
        LEGEND.to_string(),
    ))
}

/// Numeric and binary fields present in `frame`, plus their parents, in dictionary order.
fn row_fields<'a>(frame: &DataSet, dictionary: &'a Dictionary) -> Vec<&'a FieldDescriptor> {
    let summarized: Vec<&FieldDescriptor> = dictionary
        .fields()
        .iter()
        .filter(|f| matches!(f.field_type, FieldType::Numeric | FieldType::Binary))
        .filter(|f| frame.has_column(&f.field_name))
        .collect();
    let mut index: HashSet<&str> = summarized.iter().map(|f| f.field_name.as_str()).collect();
    index.extend(summarized.iter().filter_map(|f| f.parent.as_deref()));
    dictionary
        .fields()
        .iter()
        .filter(|f| index.contains(f.field_name.as_str()))
        .collect()
}

/// Observed group labels: preferred order first, then first appearance.
fn group_values(frame: &DataSet, idx: usize, preferred: &[String]) -> Vec<String> {
    let mut observed: Vec<String> = Vec::new();
    for row in &frame.rows {
        if let Some(label) = row[idx].label() {
            if !observed.contains(&label) {
                observed.push(label);
            }
        }
    }
    let mut ordered: Vec<String> = preferred
        .iter()
        .filter(|p| observed.contains(p))
        .cloned()
        .collect();
    ordered.extend(observed.into_iter().filter(|o| !preferred.contains(o)));
    ordered
}

fn summarize(
    subset: &DataSet,
    field: &FieldDescriptor,
    numeric: &NumericFormat,
    binary: &BinaryFormat,
) -> TableCell {
    match &field.field_type {
        FieldType::Numeric => subset
            .column(&field.field_name)
            .map_or(TableCell::Blank, |v| {
                TableCell::Summary(format_median_iqr(&v, numeric))
            }),
        FieldType::Binary => subset
            .column(&field.field_name)
            .map_or(TableCell::Blank, |v| {
                TableCell::Summary(format_count_percent(&v, binary))
            }),
        FieldType::Categorical | FieldType::Section | FieldType::Other(_) => TableCell::Blank,
    }
}
