//! Table writer: `progress.tsv` and `config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{WriteError, WriteResult};
use crate::models::{format_cell, OutputRecord, RunConfig};
use crate::schema::output_columns;

pub const PROGRESS_FILE: &str = "progress.tsv";
pub const CONFIG_FILE: &str = "config.json";

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> WriteResult<()> {
    fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Serialize `records` as tab-separated text: header row, then one row per record.
pub fn write_progress_tsv<W: std::io::Write>(out: W, records: &[OutputRecord]) -> WriteResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(out);

    writer.write_record(output_columns())?;
    for record in records {
        writer.write_record(record.to_row().into_iter().map(format_cell))?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

/// Write `{dir}/progress.tsv`, returning its path.
pub fn write_progress(dir: &Path, records: &[OutputRecord]) -> WriteResult<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(PROGRESS_FILE);

    let file = fs::File::create(&path).map_err(|source| WriteError::Io {
        path: path.clone(),
        source,
    })?;
    write_progress_tsv(std::io::BufWriter::new(file), records)?;

    Ok(path)
}

/// Write `{dir}/config.json` (2-space indented), returning its path.
pub fn write_config(dir: &Path, config: &RunConfig) -> WriteResult<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(CONFIG_FILE);

    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json).map_err(|source| WriteError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
