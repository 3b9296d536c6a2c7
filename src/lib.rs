//! `crf-analytics` turns case-record-form (CRF) data into descriptive summaries, driven by a
//! field dictionary.
//!
//! The dictionary ([`dictionary::Dictionary`]) declares every column of the working table: its
//! type (`numeric`, `binary`, `categorical`, `section`, ...), its display label and its parent.
//! Everything downstream is a function of the dictionary plus an in-memory
//! [`types::DataSet`].
//!
//! ## Pipeline
//!
//! 1. [`selection::select_fields`]: choose variables by section prefix, type and suffix.
//! 2. [`codec::encode`] / [`codec::decode`]: categorical columns to one-hot indicators
//!    (`field___label`) and back, with missingness preserved in both directions.
//! 3. [`frame::build_descriptive_frame`]: select, clean, encode and prepare a stratification
//!    column.
//! 4. [`table::descriptive_table`]: `median (IQR) | N` and `count (%) | N` cells per group,
//!    with a totals row and a legend.
//!
//! [`counts`] adds frequency, co-occurrence and population-pyramid summaries, and
//! [`ingestion`] reads dictionaries and working tables from CSV (dictionaries also from JSON).
//!
//! ## Example
//!
//! ```rust
//! use crf_analytics::dictionary::{Dictionary, FieldDescriptor, FieldType};
//! use crf_analytics::frame::{build_descriptive_frame, DescriptiveOptions};
//! use crf_analytics::selection::SelectionOptions;
//! use crf_analytics::table::{descriptive_table, TableOptions};
//! use crf_analytics::types::{DataSet, DataType, Field, Schema, Value};
//!
//! # fn main() -> Result<(), crf_analytics::AnalyticsError> {
//! let dictionary = Dictionary::new(vec![
//!     FieldDescriptor::new("demog", FieldType::Section, "Demographics"),
//!     FieldDescriptor::new("demog_age", FieldType::Numeric, "Age").with_parent("demog"),
//!     FieldDescriptor::new("outco_outcome", FieldType::Categorical, "Outcome"),
//! ])?;
//! let raw = DataSet::new(
//!     Schema::new(vec![
//!         Field::new("demog_age", DataType::Float64),
//!         Field::new("outco_outcome", DataType::Utf8),
//!     ]),
//!     vec![
//!         vec![Value::Float64(31.0), Value::utf8("Discharged")],
//!         vec![Value::Float64(47.0), Value::utf8("Death")],
//!         vec![Value::Float64(52.0), Value::Null],
//!     ],
//! );
//!
//! let frame = build_descriptive_frame(
//!     &raw,
//!     &dictionary,
//!     &DescriptiveOptions {
//!         group_by: Some("outco_outcome".into()),
//!         selection: SelectionOptions::for_sections(&["demog"]),
//!         ..Default::default()
//!     },
//! )?;
//! let (table, _legend) = descriptive_table(
//!     &frame,
//!     &dictionary,
//!     &TableOptions {
//!         group_by: Some("outco_outcome".into()),
//!         ..Default::default()
//!     },
//! )?;
//!
//! assert_eq!(table.columns, vec!["Variable", "All", "Discharged", "Death", "Unknown"]);
//! assert_eq!(table.cell("demog_age", "All").as_deref(), Some("47.0 (39.0-49.5) | 3"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory dataset types
//! - [`dictionary`]: field descriptors and lookups
//! - [`selection`], [`codec`], [`frame`]: preparing the working frame
//! - [`summary`], [`labels`], [`table`]: formatting descriptive tables
//! - [`counts`]: frequency and co-occurrence summaries
//! - [`ingestion`]: CSV/JSON loading
//! - [`error`]: the shared error type
//!
//! The library only emits `tracing` events; installing a subscriber is up to the caller.

pub mod codec;
pub mod counts;
pub mod dictionary;
pub mod error;
pub mod frame;
pub mod ingestion;
pub mod labels;
pub mod selection;
pub mod summary;
pub mod table;
pub mod types;

pub use error::{AnalyticsError, AnalyticsResult};
