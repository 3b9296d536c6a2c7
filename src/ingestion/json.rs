//! JSON ingestion of field dictionaries.

use crate::dictionary::{Dictionary, FieldDescriptor};
use crate::error::{AnalyticsError, AnalyticsResult};

/// Read a field dictionary from a JSON array of descriptor objects.
///
/// ```
/// use crf_analytics::ingestion::read_dictionary_json;
///
/// let dict = read_dictionary_json(
///     r#"[{"field_name": "demog_age", "field_type": "numeric", "field_label": "Age"}]"#,
/// )
/// .unwrap();
/// assert!(dict.contains("demog_age"));
/// ```
pub fn read_dictionary_json(input: &str) -> AnalyticsResult<Dictionary> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnalyticsError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }
    let fields: Vec<FieldDescriptor> = serde_json::from_str(trimmed)?;
    tracing::info!(fields = fields.len(), "read field dictionary");
    Dictionary::new(fields)
}
