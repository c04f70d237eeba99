//! Domain models for the conversion pipeline.
//!
//! - [`InputRecord`] - One row of the experiment log
//! - [`OutputRecord`] - One row of `progress.tsv`
//! - [`RunConfig`] - Hyperparameters written to `config.json`
//!
//! Cell values are `serde_json::Value`s so that integer and float cells keep
//! their type from input to output (`1000` stays `1000`, `95.0` stays `95.0`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{TransformError, TransformResult};
use crate::schema::output_columns;

// =============================================================================
// Cell helpers
// =============================================================================

/// Float cell. Non-finite results are kept as text, as a TSV reader would print them.
pub fn float_cell(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(n) => Value::Number(n),
        None if value.is_nan() => Value::String("nan".to_string()),
        None if value > 0.0 => Value::String("inf".to_string()),
        None => Value::String("-inf".to_string()),
    }
}

/// Numeric value of a cell, reading back the non-finite text of [`float_cell`].
pub fn cell_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if matches!(s.as_str(), "inf" | "-inf") => s.parse().ok(),
        _ => None,
    }
}

/// Integer cell.
pub fn int_cell(value: i64) -> Value {
    Value::Number(Number::from(value))
}

/// Render a cell the way it appears in the TSV. `Null` is the blank cell.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Input
// =============================================================================

/// One row of the experiment log.
///
/// Columns whose cell was empty are simply not present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InputRecord {
    fields: Map<String, Value>,
}

impl InputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object. `null` and empty-string members are dropped.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map.into_iter().collect()),
            _ => None,
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        if is_blank(&value) {
            return;
        }
        self.fields.insert(column.into(), value);
    }

    /// Raw value of `column`, if the row has one.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Numeric value of `column`, erroring if it is present but not a number.
    pub fn number(&self, column: &str, row: usize) -> TransformResult<Option<f64>> {
        match self.fields.get(column) {
            None => Ok(None),
            Some(value) => cell_f64(value)
                .map(Some)
                .ok_or_else(|| not_numeric(column, value, row)),
        }
    }

    /// Integer value of `column`, truncating floats toward zero.
    pub fn integer(&self, column: &str, row: usize) -> TransformResult<Option<i64>> {
        match self.fields.get(column) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .or_else(|| cell_f64(value).map(|f| f.trunc() as i64))
                .map(Some)
                .ok_or_else(|| not_numeric(column, value, row)),
        }
    }

    /// Raw numeric value of `column`, keeping its integer/float type.
    pub fn numeric_value(&self, column: &str, row: usize) -> TransformResult<Option<Value>> {
        match self.fields.get(column) {
            None => Ok(None),
            Some(value) if cell_f64(value).is_some() => Ok(Some(value.clone())),
            Some(value) => Err(not_numeric(column, value, row)),
        }
    }
}

impl FromIterator<(String, Value)> for InputRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = InputRecord::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn not_numeric(column: &str, value: &Value, row: usize) -> TransformError {
    TransformError::NotNumeric {
        row,
        column: column.to_string(),
        value: format_cell(value),
    }
}

// =============================================================================
// Output
// =============================================================================

static BLANK: Value = Value::Null;

/// One row of `progress.tsv`.
///
/// Unset columns are absent and serialize as blank cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputRecord {
    cells: Map<String, Value>,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.cells.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.cells.get(column).and_then(cell_f64)
    }

    pub fn is_set(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Cells in schema order, `Null` for unset columns.
    pub fn to_row(&self) -> Vec<&Value> {
        output_columns()
            .iter()
            .map(|c| self.cells.get(c).unwrap_or(&BLANK))
            .collect()
    }
}

// =============================================================================
// Run configuration
// =============================================================================

/// Hyperparameters describing the run, written once to `config.json`.
///
/// All values are fixed apart from `cl_method`. Field order is the key order
/// of the emitted JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub cl_method: String,
    pub use_popart: bool,
    pub env_name: String,
    pub policy_type: String,
    pub hidden_dim: u32,
    pub replay_buffer_size: u64,
    pub batch_size: u32,
    pub rollout_batch_size: u32,
    pub steps_per_task: u64,
    pub lr_actor: f64,
    pub lr_critic: f64,
    pub gamma: f64,
    pub tau: f64,
    pub alpha: f64,
    pub train_alpha: bool,
    pub target_entropy: Option<f64>,
    pub use_cuda: bool,
    pub seed: u64,
    pub target_update_interval: u32,
    pub automatic_regularization: bool,
}

impl RunConfig {
    pub fn for_method(method: impl Into<String>) -> Self {
        Self {
            cl_method: method.into(),
            ..Self::default()
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cl_method: "cotasp".to_string(),
            use_popart: false,
            env_name: "MetaWorld-CL".to_string(),
            policy_type: "sac".to_string(),
            hidden_dim: 256,
            replay_buffer_size: 1_000_000,
            batch_size: 256,
            rollout_batch_size: 1,
            steps_per_task: 1_000_000,
            lr_actor: 0.0003,
            lr_critic: 0.0003,
            gamma: 0.99,
            tau: 0.005,
            alpha: 0.2,
            train_alpha: true,
            target_entropy: None,
            use_cuda: true,
            seed: 0,
            target_update_interval: 1,
            automatic_regularization: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_cells_are_absent() {
        let record = InputRecord::from_value(json!({
            "x": 5,
            "avg_return": "",
            "steps_per_task": null
        }))
        .unwrap();

        assert!(record.contains("x"));
        assert!(!record.contains("avg_return"));
        assert!(!record.contains("steps_per_task"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_number_accessors() {
        let record = InputRecord::from_value(json!({
            "x": 50000.7,
            "steps_per_task": 1000000,
            "label": "abc"
        }))
        .unwrap();

        assert_eq!(record.number("x", 0).unwrap(), Some(50000.7));
        assert_eq!(record.integer("x", 0).unwrap(), Some(50000));
        assert_eq!(record.integer("steps_per_task", 0).unwrap(), Some(1_000_000));
        assert_eq!(record.number("missing", 0).unwrap(), None);

        let err = record.number("label", 4).unwrap_err();
        assert!(err.to_string().contains("Row 4"));
    }

    #[test]
    fn test_numeric_value_keeps_type() {
        let record = InputRecord::from_value(json!({"a": 100, "b": 0.5})).unwrap();
        assert_eq!(record.numeric_value("a", 0).unwrap(), Some(json!(100)));
        assert_eq!(record.numeric_value("b", 0).unwrap(), Some(json!(0.5)));
    }

    #[test]
    fn test_infinite_cells_stay_numeric() {
        let mut record = InputRecord::new();
        record.insert("r", float_cell(f64::INFINITY));

        assert_eq!(record.number("r", 0).unwrap(), Some(f64::INFINITY));
        assert_eq!(record.numeric_value("r", 0).unwrap(), Some(json!("inf")));
        assert_eq!(cell_f64(&json!("-inf")), Some(f64::NEG_INFINITY));
        assert_eq!(cell_f64(&json!("abc")), None);
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&Value::Null), "");
        assert_eq!(format_cell(&int_cell(1000)), "1000");
        assert_eq!(format_cell(&float_cell(95.0)), "95.0");
        assert_eq!(format_cell(&float_cell(0.2)), "0.2");
        assert_eq!(format_cell(&float_cell(f64::INFINITY)), "inf");
        assert_eq!(format_cell(&Value::Bool(true)), "True");
    }

    #[test]
    fn test_output_row_has_every_column() {
        let mut record = OutputRecord::new();
        record.set("epoch", int_cell(1));
        let row = record.to_row();

        assert_eq!(row.len(), output_columns().len());
        assert_eq!(row[242], &json!(1));
        assert_eq!(row[0], &Value::Null);
    }

    #[test]
    fn test_config_key_order() {
        let json = serde_json::to_string(&RunConfig::for_method("ewc")).unwrap();
        assert!(json.starts_with(r#"{"cl_method":"ewc","use_popart":false"#));
        assert!(json.contains(r#""target_entropy":null"#));
        assert!(json.ends_with(r#""automatic_regularization":false}"#));
    }
}
