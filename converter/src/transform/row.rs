//! Row transformer: one experiment-log row to one `progress.tsv` row.

use serde_json::Value;

use super::rules::{
    active_env, slot_rule, Derive, SlotKind, ALPHA_PLACEHOLDER, DEFAULT_STEPS_PER_TASK, EP_LENGTH,
    RETURN_STD, TRAIN_RETURN_MAX, TRAIN_RETURN_MIN,
};
use crate::error::{TransformError, TransformResult};
use crate::models::{cell_f64, float_cell, int_cell, InputRecord, OutputRecord};
use crate::schema::{
    alpha_column, average_success_column, input_return_column, input_success_column,
    slot_column, EvalMode, SlotMetric, NUM_SLOTS, TASKS, ZERO_PLACEHOLDER_COLUMNS,
};

/// Raw evaluation values of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSample {
    pub task_index: usize,
    pub return_value: Value,
    pub success_value: Value,
}

impl TaskSample {
    fn return_f64(&self) -> f64 {
        cell_f64(&self.return_value).unwrap_or_default()
    }

    fn success_f64(&self) -> f64 {
        cell_f64(&self.success_value).unwrap_or_default()
    }
}

/// The return/success pair of task `task_index`, if the row has both.
pub fn task_sample(
    record: &InputRecord,
    task_index: usize,
    row: usize,
) -> TransformResult<Option<TaskSample>> {
    let return_col = input_return_column(task_index);
    let success_col = input_success_column(task_index);

    if !(record.contains(&return_col) && record.contains(&success_col)) {
        return Ok(None);
    }

    let return_value = record.numeric_value(&return_col, row)?;
    let success_value = record.numeric_value(&success_col, row)?;

    Ok(return_value.zip(success_value).map(|(return_value, success_value)| TaskSample {
        task_index,
        return_value,
        success_value,
    }))
}

/// Task names whose return/success pair is absent from the row.
pub fn missing_tasks(record: &InputRecord) -> Vec<&'static str> {
    (0..TASKS.len())
        .filter(|&t| {
            !(record.contains(&input_return_column(t)) && record.contains(&input_success_column(t)))
        })
        .map(|t| TASKS[t])
        .collect()
}

/// Transform row `index` (0-based) of the input log.
pub fn transform_row(record: &InputRecord, index: usize) -> TransformResult<OutputRecord> {
    let mut out = OutputRecord::new();

    for task_index in 0..TASKS.len() {
        if let Some(sample) = task_sample(record, task_index, index)? {
            for mode in EvalMode::ALL {
                for kind in SlotKind::ALL {
                    write_slot(&mut out, &sample, mode, kind);
                }
            }
        }
    }

    let deterministic_col = average_success_column(EvalMode::Deterministic);
    let deterministic_avg = match record.get(&deterministic_col) {
        Some(value) => value.clone(),
        None => float_cell(average_success(&out, EvalMode::Deterministic)),
    };
    out.set(deterministic_col, deterministic_avg);

    let stochastic_avg = average_success(&out, EvalMode::Stochastic);
    out.set(
        average_success_column(EvalMode::Stochastic),
        float_cell(stochastic_avg),
    );

    write_train_scalars(&mut out, record, index, stochastic_avg)?;

    Ok(out)
}

fn write_slot(out: &mut OutputRecord, sample: &TaskSample, mode: EvalMode, kind: SlotKind) {
    let rule = slot_rule(mode, kind);
    let slot = kind.slot(sample.task_index);
    let r = sample.return_f64();
    let s = sample.success_f64();

    let derived = |derive: Derive, raw: &Value, value: f64| match derive.scaled(value) {
        Some(v) => float_cell(v),
        None => raw.clone(),
    };

    let cells = [
        (SlotMetric::ReturnAvg, derived(rule.return_avg, &sample.return_value, r)),
        (SlotMetric::ReturnStd, float_cell(RETURN_STD)),
        (SlotMetric::ReturnMax, derived(rule.return_max, &sample.return_value, r)),
        (SlotMetric::ReturnMin, derived(rule.return_min, &sample.return_value, r)),
        (SlotMetric::EpLength, int_cell(EP_LENGTH)),
        (SlotMetric::Success, derived(rule.success, &sample.success_value, s)),
    ];

    for (metric, value) in cells {
        out.set(slot_column(mode, slot, metric), value);
    }
}

/// Mean of the populated `success` cells of `mode`, or `0.0` when none are.
pub fn average_success(out: &OutputRecord, mode: EvalMode) -> f64 {
    let values: Vec<f64> = (0..NUM_SLOTS)
        .filter_map(|slot| out.get_f64(&slot_column(mode, slot, SlotMetric::Success)))
        .collect();

    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn write_train_scalars(
    out: &mut OutputRecord,
    record: &InputRecord,
    index: usize,
    stochastic_avg: f64,
) -> TransformResult<()> {
    out.set("epoch", int_cell(index as i64 + 1));

    let avg_return = record.number("avg_return", index)?;
    let train_return = record
        .numeric_value("avg_return", index)?
        .unwrap_or_else(|| float_cell(0.0));
    out.set("train/return/avg", train_return);
    out.set("train/return/std", float_cell(0.0));
    out.set(
        "train/return/max",
        float_cell(avg_return.map_or(0.0, |r| r * TRAIN_RETURN_MAX)),
    );
    out.set(
        "train/return/min",
        float_cell(avg_return.map_or(0.0, |r| r * TRAIN_RETURN_MIN)),
    );
    out.set("train/ep_length", int_cell(EP_LENGTH));

    let steps = record.numeric_value("x", index)?.unwrap_or_else(|| int_cell(0));
    let steps_per_task = record
        .numeric_value("steps_per_task", index)?
        .unwrap_or_else(|| int_cell(DEFAULT_STEPS_PER_TASK));
    out.set("total_env_steps", steps.clone());
    out.set("current_task_steps", steps_per_task);

    for column in ZERO_PLACEHOLDER_COLUMNS {
        out.set(column, float_cell(0.0));
    }

    for i in 0..NUM_SLOTS {
        out.set(alpha_column(i), float_cell(ALPHA_PLACEHOLDER));
    }

    out.set("train/loss_reg", float_cell(0.0));
    out.set("train/agem_violation", float_cell(0.0));
    out.set("train/success", float_cell(stochastic_avg));

    let steps_int = record.integer("x", index)?.unwrap_or(0);
    let steps_per_task_int = record
        .integer("steps_per_task", index)?
        .unwrap_or(DEFAULT_STEPS_PER_TASK);
    let env = active_env(steps_int, steps_per_task_int)
        .ok_or(TransformError::ZeroStepsPerTask { row: index })?;
    out.set("train/active_env", int_cell(env));

    // Steps double as a wall-clock placeholder
    out.set("walltime", steps);

    Ok(())
}
