//! Loading dictionaries and working tables.
//!
//! - [`csv`]: field dictionaries and dictionary-typed working tables from CSV
//! - [`json`]: field dictionaries from a JSON array
//!
//! Working tables arrive with one column per CSV header. Cell types follow the dictionary
//! (see [`read_frame_from_reader`]); columns the dictionary does not know stay text.

pub mod csv;
pub mod json;

pub use self::csv::{read_dictionary_csv, read_dictionary_from_reader, read_frame_csv, read_frame_from_reader};
pub use self::json::read_dictionary_json;
