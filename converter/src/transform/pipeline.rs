//! High-level pipeline: parse the log, transform every row, write both files.
//!
//! # Example
//!
//! ```rust,ignore
//! use cl_convert::{convert, ConvertOptions};
//!
//! let report = convert(&ConvertOptions {
//!     input: "progress.csv".into(),
//!     ..ConvertOptions::default()
//! })?;
//! println!("{}", report.progress_path.display());
//! ```
//!
//! All rows are held in memory until the single write at the end. Logs span a
//! few hundred epochs; switch to appending rows as they are produced if that
//! ever stops being true.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::row::{missing_tasks, transform_row};
use crate::error::{PipelineResult, TransformResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning, log_warning_indent};
use crate::models::{InputRecord, OutputRecord, RunConfig};
use crate::parser::{discover_task_columns, parse_log_file, ParseResult};
use crate::schema::{output_columns, TASKS};
use crate::writer::{write_config, write_progress};

pub const DEFAULT_OUTPUT_DIR: &str = "saved_logs/cl/cl_custom";
pub const DEFAULT_METHOD: &str = "cotasp";

/// Options for one conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Experiment-log CSV to read
    pub input: PathBuf,

    /// Directory receiving `progress.tsv` and `config.json`
    pub output_dir: PathBuf,

    /// Written to `cl_method` in `config.json`
    pub method: String,

    /// Input delimiter (auto-detect if not specified)
    pub delimiter: Option<char>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            method: DEFAULT_METHOD.to_string(),
            delimiter: None,
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct ConvertReport {
    pub rows: usize,
    pub columns: usize,
    /// Rows lacking the return/success pair of at least one task
    pub incomplete_rows: usize,
    pub progress_path: PathBuf,
    pub config_path: PathBuf,
}

/// Run the whole conversion.
pub fn convert(options: &ConvertOptions) -> PipelineResult<ConvertReport> {
    log_info(format!("📖 Reading {}", options.input.display()));
    let parsed = parse_log_file(&options.input, options.delimiter)?;
    convert_parsed(parsed, &options.output_dir, &options.method)
}

/// Convert already-parsed input.
pub fn convert_parsed(
    parsed: ParseResult,
    output_dir: &Path,
    method: &str,
) -> PipelineResult<ConvertReport> {
    report_input(&parsed);

    log_info("⚙️  Transforming rows...");
    let records = transform_records(&parsed.records)?;

    let incomplete_rows = parsed
        .records
        .iter()
        .filter(|r| !missing_tasks(r).is_empty())
        .count();
    if incomplete_rows > 0 {
        log_warning(format!(
            "{} of {} rows lack some task columns (left blank)",
            incomplete_rows,
            records.len()
        ));
    }
    log_success(format!("Transformed {} rows", records.len()));

    let progress_path = write_progress(output_dir, &records)?;
    log_success(format!("Wrote {}", progress_path.display()));

    let config_path = write_config(output_dir, &RunConfig::for_method(method))?;
    log_success(format!("Wrote {}", config_path.display()));

    Ok(ConvertReport {
        rows: records.len(),
        columns: output_columns().len(),
        incomplete_rows,
        progress_path,
        config_path,
    })
}

/// Transform every row, in input order.
pub fn transform_records(records: &[InputRecord]) -> TransformResult<Vec<OutputRecord>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| transform_row(record, index))
        .collect()
}

fn report_input(parsed: &ParseResult) {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Delimiter: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} rows, {} columns", parsed.records.len(), parsed.headers.len()));

    let tasks = discover_task_columns(&parsed.headers);
    log_info(format!("📋 Task columns: {}/{} complete", tasks.complete.len(), TASKS.len()));
    for &i in &tasks.complete {
        log_info_indent(format!("[{:2}] {}", i, TASKS[i]), 1);
    }
    for &i in &tasks.partial {
        log_warning_indent(format!("{}-{}: only one of return/success present", i, TASKS[i]), 1);
    }
    for column in &tasks.unknown {
        log_warning_indent(format!("{}: not a known task, ignored", column), 1);
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::fs;
    use tempfile::tempdir;

    const LOG: &str = "\
x,steps_per_task,avg_return,0-hammer-v1/return,0-hammer-v1/success,1-push-wall-v1/return,1-push-wall-v1/success
50000,1000000,80,100,1.0,,
1050000,1000000,85,110,1.0,40.5,0.5
";

    fn run(log: &str) -> (tempfile::TempDir, PipelineResult<ConvertReport>) {
        crate::logs::set_quiet(true);
        let dir = tempdir().unwrap();
        let input = dir.path().join("progress.csv");
        fs::write(&input, log).unwrap();

        let options = ConvertOptions {
            input,
            output_dir: dir.path().join("out/cl_custom"),
            method: "ewc".to_string(),
            delimiter: None,
        };
        let result = convert(&options);
        (dir, result)
    }

    fn read_tsv(path: &Path) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_path(path)
            .unwrap();
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    fn column(name: &str) -> usize {
        crate::schema::column_position(name).unwrap()
    }

    #[test]
    fn test_default_options() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.output_dir, PathBuf::from("saved_logs/cl/cl_custom"));
        assert_eq!(opts.method, "cotasp");
        assert!(opts.delimiter.is_none());
    }

    #[test]
    fn test_end_to_end() {
        let (_dir, result) = run(LOG);
        let report = result.unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.columns, 290);
        assert_eq!(report.incomplete_rows, 2);

        let (headers, rows) = read_tsv(&report.progress_path);
        assert_eq!(headers, output_columns());
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(&first[column("epoch")], "1");
        // Integer input column passes through as an integer
        assert_eq!(&first[column("test/stochastic/0/hammer-v1/return/avg")], "100");
        assert_eq!(&first[column("test/stochastic/10/hammer-v1/return/avg")], "95.0");
        assert_eq!(&first[column("train/active_env")], "0");
        assert_eq!(&first[column("train/return/avg")], "80");
        assert_eq!(&first[column("current_task_steps")], "1000000");
        // push-wall cells were empty in row 1
        assert_eq!(&first[column("test/stochastic/1/push-wall-v1/return/avg")], "");

        let second = &rows[1];
        assert_eq!(&second[column("epoch")], "2");
        assert_eq!(&second[column("train/active_env")], "1");
        assert_eq!(&second[column("test/stochastic/1/push-wall-v1/return/avg")], "40.5");
        assert_eq!(&second[column("walltime")], "1050000");

        let config = fs::read_to_string(&report.config_path).unwrap();
        let config: RunConfig = serde_json::from_str(&config).unwrap();
        assert_eq!(config.cl_method, "ewc");
    }

    #[test]
    fn test_schema_is_input_independent() {
        let (_a, first) = run(LOG);
        let (_b, second) = run("avg_return\n3\n");

        let (h1, _) = read_tsv(&first.unwrap().progress_path);
        let (h2, rows) = read_tsv(&second.unwrap().progress_path);
        assert_eq!(h1, h2);
        assert_eq!(&rows[0][column("test/stochastic/average_success")], "0.0");
        assert_eq!(&rows[0][column("test/deterministic/average_success")], "0.0");
    }

    #[test]
    fn test_missing_input_fails() {
        crate::logs::set_quiet(true);
        let options = ConvertOptions {
            input: PathBuf::from("/definitely/not/here.csv"),
            ..ConvertOptions::default()
        };
        assert!(matches!(convert(&options), Err(PipelineError::Csv(_))));
    }

    #[test]
    fn test_zero_steps_per_task_fails() {
        let (_dir, result) = run("x,steps_per_task\n10,0\n");
        assert!(matches!(result, Err(PipelineError::Transform(_))));
    }

    #[test]
    fn test_epoch_follows_row_position() {
        let records: Vec<InputRecord> = (0..5).map(|_| InputRecord::new()).collect();
        let out = transform_records(&records).unwrap();
        for (i, record) in out.iter().enumerate() {
            assert_eq!(record.get("epoch"), Some(&serde_json::json!(i as i64 + 1)));
        }
    }
}
