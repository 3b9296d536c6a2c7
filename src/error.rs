use thiserror::Error;

/// Convenience result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Error type returned by the analytics layer.
///
/// Every failure is a deterministic function of the input (schema or data bugs); nothing here is
/// transient or worth retrying.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have the shape that was asked for (missing columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A cell could not be parsed into the type its dictionary entry requires.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Two dictionary entries share a `field_name`.
    #[error("duplicate field '{name}' in dictionary")]
    DuplicateField { name: String },

    /// A field the caller requires is in neither the frame nor the dictionary.
    #[error("unknown field '{name}': {message}")]
    UnknownField { name: String, message: String },

    /// A row of one-hot indicators has more than one hot column after missing-collapse.
    #[error("one-hot conflict in '{field}' at row {row}: hot columns {hot:?}")]
    OneHotConflict {
        field: String,
        row: usize,
        hot: Vec<String>,
    },

    /// An option value cannot be used (e.g. an empty one-hot separator).
    #[error("invalid option: {message}")]
    InvalidOption { message: String },
}
