//! cl-convert CLI - Convert an experiment-log CSV to `progress.tsv`
//!
//! ```bash
//! cl-convert --input runs/progress.csv
//! cl-convert --input runs/progress.csv --output saved_logs/cl/cl_160 --method packnet
//! ```
//!
//! `--output` and `--method` fall back to `CL_CONVERT_OUTPUT` / `CL_CONVERT_METHOD`,
//! which may be set in a `.env` file.

use clap::Parser;
use cl_convert::transform::pipeline::{DEFAULT_METHOD, DEFAULT_OUTPUT_DIR};
use cl_convert::{convert, logs, ConvertOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cl-convert")]
#[command(about = "Convert an experiment-log CSV to the continual-learning progress.tsv format", long_about = None)]
struct Cli {
    /// Input CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, env = "CL_CONVERT_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Method name written to config.json
    #[arg(short, long, env = "CL_CONVERT_METHOD", default_value = DEFAULT_METHOD)]
    method: String,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Don't print progress to stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logs::set_quiet(cli.quiet);

    let options = ConvertOptions {
        input: cli.input,
        output_dir: cli.output,
        method: cli.method,
        delimiter: cli.delimiter,
    };

    match convert(&options) {
        Ok(report) => {
            println!("Conversion complete! Saved to {}", report.progress_path.display());
            println!("Config saved to {}", report.config_path.display());
        }
        Err(e) => {
            eprintln!("{}", failure_line(&e));
            std::process::exit(1);
        }
    }
}

fn failure_line(error: &impl std::fmt::Display) -> String {
    format!("Error: {}", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cl_convert::error::{CsvError, PipelineError};

    #[test]
    fn test_failure_line() {
        let error = PipelineError::from(CsvError::EmptyFile);
        assert_eq!(failure_line(&error), "Error: CSV error: CSV file is empty");
    }

    #[test]
    fn test_delimiter_flag() {
        let cli = Cli::try_parse_from(["cl-convert", "-i", "log.csv", "-d", ";"]).unwrap();
        assert_eq!(cli.delimiter, Some(';'));
        assert_eq!(cli.method, DEFAULT_METHOD);
    }
}
