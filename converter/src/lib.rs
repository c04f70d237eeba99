//! # cl-convert - experiment log to continual-learning progress table
//!
//! Remaps a flat experiment-log CSV into the wide, fixed-schema
//! `progress.tsv` read by the continual-learning reporting tool, plus a
//! sidecar `config.json` describing the run.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  CSV log    │────▶│   Parser    │────▶│  Transform  │────▶│ progress.tsv │
//! │ (any enc.)  │     │ (auto-det.) │     │ (rule table)│     │ config.json  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cl_convert::{convert, ConvertOptions};
//!
//! let report = convert(&ConvertOptions {
//!     input: "runs/progress.csv".into(),
//!     ..ConvertOptions::default()
//! }).unwrap();
//! println!("Wrote {} rows", report.rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Input/output records and the run config
//! - [`schema`] - Output column list
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Derivation rules, row transformer, pipeline
//! - [`writer`] - TSV and JSON output
//! - [`logs`] - Progress log

// Core modules
pub mod error;
pub mod models;
pub mod schema;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod writer;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, TransformError, WriteError};

// =============================================================================
// Re-exports - Models & schema
// =============================================================================

pub use models::{InputRecord, OutputRecord, RunConfig};

pub use schema::{output_columns, EvalMode, SlotMetric, TASKS};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{parse_bytes, parse_log_file, ParseResult};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    convert,
    convert_parsed,
    transform_records,
    ConvertOptions,
    ConvertReport,
};

pub use transform::row::transform_row;
