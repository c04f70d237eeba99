//! Output column schema for `progress.tsv`.
//!
//! The downstream reporting tool reads columns by name and position, so the
//! column list is a fixed function of two constants: the ten MetaWorld task
//! names and the twenty evaluation slots. It never depends on the input.
//!
//! # Layout
//!
//! ```text
//! test/stochastic/{0..19}/{task}/{6 metrics}      120 columns
//! test/stochastic/average_success                   1
//! test/deterministic/{0..19}/{task}/{6 metrics}   120
//! test/deterministic/average_success                1
//! epoch .. train/loss_q2                           23
//! train/alpha/{0..19}                              20
//! train/loss_reg .. walltime                        5
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// MetaWorld task list, in task-index order.
pub const TASKS: [&str; 10] = [
    "hammer-v1",
    "push-wall-v1",
    "faucet-close-v1",
    "push-back-v1",
    "stick-pull-v1",
    "handle-press-side-v1",
    "push-v1",
    "shelf-place-v1",
    "window-close-v1",
    "peg-unplug-side-v1",
];

/// Number of evaluation slots: original tasks 0-9, replays 10-19.
pub const NUM_SLOTS: usize = 20;

/// Training scalars emitted right after the two test blocks.
pub const TRAIN_SCALAR_COLUMNS: [&str; 23] = [
    "epoch",
    "train/return/avg",
    "train/return/std",
    "train/return/max",
    "train/return/min",
    "train/ep_length",
    "total_env_steps",
    "current_task_steps",
    "train/q1_vals/avg",
    "train/q1_vals/std",
    "train/q1_vals/max",
    "train/q1_vals/min",
    "train/q2_vals/avg",
    "train/q2_vals/std",
    "train/q2_vals/max",
    "train/q2_vals/min",
    "train/log_pi/avg",
    "train/log_pi/std",
    "train/log_pi/max",
    "train/log_pi/min",
    "train/loss_pi",
    "train/loss_q1",
    "train/loss_q2",
];

/// Training scalars with no counterpart in the input log.
///
/// A subset of [`TRAIN_SCALAR_COLUMNS`]; always written as `0.0`.
pub const ZERO_PLACEHOLDER_COLUMNS: [&str; 15] = [
    "train/q1_vals/avg",
    "train/q1_vals/std",
    "train/q1_vals/max",
    "train/q1_vals/min",
    "train/q2_vals/avg",
    "train/q2_vals/std",
    "train/q2_vals/max",
    "train/q2_vals/min",
    "train/log_pi/avg",
    "train/log_pi/std",
    "train/log_pi/max",
    "train/log_pi/min",
    "train/loss_pi",
    "train/loss_q1",
    "train/loss_q2",
];

/// Columns emitted after the alpha block.
pub const TRAILING_COLUMNS: [&str; 5] = [
    "train/loss_reg",
    "train/agem_violation",
    "train/success",
    "train/active_env",
    "walltime",
];

/// Evaluation regime of a test column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalMode {
    Stochastic,
    Deterministic,
}

impl EvalMode {
    /// Both modes, in schema order.
    pub const ALL: [EvalMode; 2] = [EvalMode::Stochastic, EvalMode::Deterministic];

    pub fn as_str(self) -> &'static str {
        match self {
            EvalMode::Stochastic => "stochastic",
            EvalMode::Deterministic => "deterministic",
        }
    }
}

/// Per-slot metric, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotMetric {
    ReturnAvg,
    ReturnStd,
    ReturnMax,
    ReturnMin,
    EpLength,
    Success,
}

impl SlotMetric {
    pub const ALL: [SlotMetric; 6] = [
        SlotMetric::ReturnAvg,
        SlotMetric::ReturnStd,
        SlotMetric::ReturnMax,
        SlotMetric::ReturnMin,
        SlotMetric::EpLength,
        SlotMetric::Success,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            SlotMetric::ReturnAvg => "return/avg",
            SlotMetric::ReturnStd => "return/std",
            SlotMetric::ReturnMax => "return/max",
            SlotMetric::ReturnMin => "return/min",
            SlotMetric::EpLength => "ep_length",
            SlotMetric::Success => "success",
        }
    }
}

/// Task name evaluated in `slot`.
pub fn task_for_slot(slot: usize) -> &'static str {
    TASKS[slot % TASKS.len()]
}

/// `test/{mode}/{slot}/{task}/{metric}`
pub fn slot_column(mode: EvalMode, slot: usize, metric: SlotMetric) -> String {
    format!(
        "test/{}/{}/{}/{}",
        mode.as_str(),
        slot,
        task_for_slot(slot),
        metric.suffix()
    )
}

/// `test/{mode}/average_success`
pub fn average_success_column(mode: EvalMode) -> String {
    format!("test/{}/average_success", mode.as_str())
}

/// `train/alpha/{index}`
pub fn alpha_column(index: usize) -> String {
    format!("train/alpha/{}", index)
}

/// Input column holding the raw return of task `task_index`.
pub fn input_return_column(task_index: usize) -> String {
    format!("{}-{}/return", task_index, TASKS[task_index])
}

/// Input column holding the raw success rate of task `task_index`.
pub fn input_success_column(task_index: usize) -> String {
    format!("{}-{}/success", task_index, TASKS[task_index])
}

static COLUMNS: Lazy<Vec<String>> = Lazy::new(build_columns);

static COLUMN_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect()
});

fn build_columns() -> Vec<String> {
    let mut columns = Vec::new();

    for mode in EvalMode::ALL {
        for slot in 0..NUM_SLOTS {
            for metric in SlotMetric::ALL {
                columns.push(slot_column(mode, slot, metric));
            }
        }
        columns.push(average_success_column(mode));
    }

    columns.extend(TRAIN_SCALAR_COLUMNS.iter().map(|c| c.to_string()));
    columns.extend((0..NUM_SLOTS).map(alpha_column));
    columns.extend(TRAILING_COLUMNS.iter().map(|c| c.to_string()));

    columns
}

/// The ordered output column list.
pub fn output_columns() -> &'static [String] {
    &COLUMNS
}

/// Position of `name` in [`output_columns`], if it belongs to the schema.
pub fn column_position(name: &str) -> Option<usize> {
    COLUMN_INDEX.get(name).copied()
}
