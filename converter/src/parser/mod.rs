//! Experiment-log CSV reader with encoding and delimiter auto-detection.
//!
//! Each data row becomes an [`InputRecord`]. Every cell is typed on its own
//! (integer, float or text). Empty cells and the usual missing-value markers
//! (`NA`, `nan`, `null`, ...) are dropped, so the column is absent for that row.
//! The column only decides how integer literals are kept: a column with any
//! float or missing cell holds floats throughout.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{float_cell, int_cell, InputRecord};
use crate::schema::TASKS;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub records: Vec<InputRecord>,
    /// Detected encoding
    pub encoding: String,
    /// Detected or requested delimiter
    pub delimiter: char,
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => {
                return Err(CsvError::EncodingError {
                    encoding: encoding.to_string(),
                    message: "unsupported encoding".to_string(),
                })
            }
        },
    };

    Ok(decoded)
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when the header has no candidate separator.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse an experiment log file with auto-detection.
///
/// `delimiter` overrides delimiter detection when given.
pub fn parse_log_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CsvError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bytes(&bytes, delimiter)
}

/// Parse raw CSV bytes with auto-detection.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    parse_str(&content, delimiter, encoding)
}

/// Parse decoded CSV content.
pub fn parse_str(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    let delimiter_byte = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(CsvError::InvalidDelimiter(delimiter))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|col| ColumnKind::infer(rows.iter().map(|row| cell(row, col))))
        .collect();

    let records = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .zip(&kinds)
                .enumerate()
                .map(|(col, (header, kind))| (header.clone(), kind.value(cell(row, col))))
                .collect::<InputRecord>()
        })
        .collect();

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// Missing-value markers, read the way pandas reads them by default.
pub const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether `cell` stands for a missing value.
pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_MARKERS.contains(&cell)
}

/// Numeric representation shared by the integer cells of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
}

impl ColumnKind {
    /// `Float` as soon as one cell is a float or missing. Text cells don't count.
    pub fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut kind = ColumnKind::Integer;
        for cell in cells {
            if is_missing(cell) {
                kind = ColumnKind::Float;
            } else if cell.parse::<i64>().is_err() && cell.parse::<f64>().is_ok() {
                kind = ColumnKind::Float;
            }
        }
        kind
    }

    /// Typed value of `cell`. Missing cells (NaN included) become `Null` and
    /// are dropped by [`InputRecord`].
    pub fn value(self, cell: &str) -> Value {
        if is_missing(cell) {
            return Value::Null;
        }
        if let Ok(i) = cell.parse::<i64>() {
            return match self {
                ColumnKind::Integer => int_cell(i),
                ColumnKind::Float => float_cell(i as f64),
            };
        }
        match cell.parse::<f64>() {
            Ok(f) if f.is_nan() => Value::Null,
            Ok(f) => float_cell(f),
            Err(_) => Value::String(cell.to_string()),
        }
    }
}

static TASK_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)-(.+)/(return|success)$").expect("task column pattern is valid")
});

/// Per-task columns found in a header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskColumns {
    /// Task indices with both `/return` and `/success` columns
    pub complete: Vec<usize>,
    /// Task indices with only one of the two columns
    pub partial: Vec<usize>,
    /// Task-like columns whose index/name pair is not in the task list
    pub unknown: Vec<String>,
}

/// Classify the `{index}-{task}/{return|success}` columns of `headers`.
pub fn discover_task_columns(headers: &[String]) -> TaskColumns {
    let mut returns = BTreeSet::new();
    let mut successes = BTreeSet::new();
    let mut unknown = Vec::new();

    for header in headers {
        let Some(caps) = TASK_COLUMN.captures(header) else {
            continue;
        };
        let known = caps[1]
            .parse::<usize>()
            .ok()
            .filter(|&i| TASKS.get(i).is_some_and(|name| *name == &caps[2]));

        match (known, &caps[3]) {
            (Some(i), "return") => {
                returns.insert(i);
            }
            (Some(i), _) => {
                successes.insert(i);
            }
            (None, _) => unknown.push(header.clone()),
        }
    }

    TaskColumns {
        complete: returns.intersection(&successes).copied().collect(),
        partial: returns.symmetric_difference(&successes).copied().collect(),
        unknown,
    }
}
