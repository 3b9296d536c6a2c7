//! CSV ingestion.

use std::collections::HashSet;
use std::path::Path;

use crate::dictionary::{Dictionary, FieldDescriptor, FieldType};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Read a field dictionary from a CSV file.
///
/// Expected headers: `field_name`, `field_type`, `field_label`, `parent`. `field_label` and
/// `parent` may be absent; other columns are ignored.
pub fn read_dictionary_csv(path: impl AsRef<Path>) -> AnalyticsResult<Dictionary> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(::csv::Trim::All)
        .from_path(path)?;
    read_dictionary_from_reader(&mut rdr)
}

/// Read a field dictionary from an existing CSV reader.
pub fn read_dictionary_from_reader<R: std::io::Read>(
    rdr: &mut ::csv::Reader<R>,
) -> AnalyticsResult<Dictionary> {
    let fields = rdr
        .deserialize::<FieldDescriptor>()
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(fields = fields.len(), "read field dictionary");
    Dictionary::new(fields)
}

/// Read a working table from a CSV file, typing columns through `dictionary`.
pub fn read_frame_csv(path: impl AsRef<Path>, dictionary: &Dictionary) -> AnalyticsResult<DataSet> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    read_frame_from_reader(&mut rdr, dictionary)
}

/// Read a working table from an existing CSV reader.
///
/// Rules:
///
/// - CSV must have headers, and header names must be unique.
/// - Every column is kept, in file order.
/// - `numeric` fields parse as finite [`DataType::Float64`] (`inf`, `NaN` and overflowing
///   literals are errors), `binary` fields as [`DataType::Bool`] (true/false/1/0/yes/no),
///   everything else is [`DataType::Utf8`].
/// - Empty cells are [`Value::Null`].
pub fn read_frame_from_reader<R: std::io::Read>(
    rdr: &mut ::csv::Reader<R>,
    dictionary: &Dictionary,
) -> AnalyticsResult<DataSet> {
    let headers = rdr.headers()?.clone();

    let mut seen = HashSet::with_capacity(headers.len());
    let mut fields = Vec::with_capacity(headers.len());
    for name in headers.iter() {
        if !seen.insert(name) {
            return Err(AnalyticsError::SchemaMismatch {
                message: format!("duplicate column '{name}' in csv header"),
            });
        }
        fields.push(Field::new(name, column_type(dictionary, name)));
    }
    let schema = Schema::new(fields);

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based, and the header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (idx, field) in schema.fields.iter().enumerate() {
            let raw = record.get(idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, &field.data_type, raw)?);
        }
        rows.push(row);
    }

    tracing::info!(
        rows = rows.len(),
        columns = schema.fields.len(),
        "read working table"
    );
    Ok(DataSet::new(schema, rows))
}

fn column_type(dictionary: &Dictionary, name: &str) -> DataType {
    match dictionary.get(name).map(|f| &f.field_type) {
        Some(FieldType::Numeric) => DataType::Float64,
        Some(FieldType::Binary) => DataType::Bool,
        _ => DataType::Utf8,
    }
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: &DataType,
    raw: &str,
) -> AnalyticsResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| AnalyticsError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };
    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Value::Float64(v)),
            Ok(_) => Err(parse_error("expected a finite number".to_string())),
            Err(e) => Err(parse_error(e.to_string())),
        },
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
