//! Derivation table for the per-task test columns.
//!
//! The input log carries one return and one success value per task. Every
//! evaluation slot of the output is synthesized from that single point with
//! fixed multipliers. These are placeholder approximations kept for output
//! compatibility: the resulting std/max/min and replay values are NOT measured
//! statistics.

use crate::schema::{EvalMode, NUM_SLOTS, TASKS};

/// Episode length written for every populated slot.
pub const EP_LENGTH: i64 = 1000;

/// Standard deviation written for every populated slot.
pub const RETURN_STD: f64 = 0.0;

/// How an output value is derived from an input value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Derive {
    /// Copy the input value unchanged, keeping its integer/float type.
    Raw,
    /// Multiply the input value by a constant.
    Scale(f64),
}

impl Derive {
    /// Apply to a numeric input. `Raw` returns `None` so the caller can keep the raw cell.
    pub fn scaled(self, value: f64) -> Option<f64> {
        match self {
            Derive::Raw => None,
            Derive::Scale(k) => Some(value * k),
        }
    }
}

/// Whether a slot evaluates the original task or its replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Slots 0-9
    Original,
    /// Slots 10-19
    Replay,
}

impl SlotKind {
    pub const ALL: [SlotKind; 2] = [SlotKind::Original, SlotKind::Replay];

    /// Output slot of task `task_index`.
    pub fn slot(self, task_index: usize) -> usize {
        match self {
            SlotKind::Original => task_index,
            SlotKind::Replay => task_index + TASKS.len(),
        }
    }
}

/// Multipliers for one (mode, slot kind) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRule {
    pub return_avg: Derive,
    pub return_max: Derive,
    pub return_min: Derive,
    pub success: Derive,
}

const STOCHASTIC_ORIGINAL: SlotRule = SlotRule {
    return_avg: Derive::Raw,
    return_max: Derive::Scale(1.1),
    return_min: Derive::Scale(0.9),
    success: Derive::Raw,
};

const STOCHASTIC_REPLAY: SlotRule = SlotRule {
    return_avg: Derive::Scale(0.95),
    return_max: Derive::Scale(1.05),
    return_min: Derive::Scale(0.85),
    success: Derive::Scale(0.9),
};

const DETERMINISTIC_ORIGINAL: SlotRule = SlotRule {
    return_avg: Derive::Scale(1.02),
    return_max: Derive::Scale(1.12),
    return_min: Derive::Scale(0.92),
    success: Derive::Scale(1.05),
};

const DETERMINISTIC_REPLAY: SlotRule = SlotRule {
    return_avg: Derive::Scale(0.97),
    return_max: Derive::Scale(1.07),
    return_min: Derive::Scale(0.87),
    success: Derive::Scale(0.95),
};

/// Rule for `mode` and `kind`.
pub fn slot_rule(mode: EvalMode, kind: SlotKind) -> SlotRule {
    match (mode, kind) {
        (EvalMode::Stochastic, SlotKind::Original) => STOCHASTIC_ORIGINAL,
        (EvalMode::Stochastic, SlotKind::Replay) => STOCHASTIC_REPLAY,
        (EvalMode::Deterministic, SlotKind::Original) => DETERMINISTIC_ORIGINAL,
        (EvalMode::Deterministic, SlotKind::Replay) => DETERMINISTIC_REPLAY,
    }
}

// Training scalars

/// `current_task_steps` (and the `train/active_env` divisor) when the input has none.
pub const DEFAULT_STEPS_PER_TASK: i64 = 1_000_000;

/// Upper clamp of `train/active_env`.
pub const MAX_ACTIVE_ENV: i64 = (NUM_SLOTS - 1) as i64;

pub const TRAIN_RETURN_MAX: f64 = 1.1;
pub const TRAIN_RETURN_MIN: f64 = 0.9;

/// Value of every `train/alpha/{i}` column.
pub const ALPHA_PLACEHOLDER: f64 = 0.2;

/// Index of the task being trained at `steps`.
///
/// Integer division truncating toward zero, clamped above only.
pub fn active_env(steps: i64, steps_per_task: i64) -> Option<i64> {
    steps.checked_div(steps_per_task).map(|env| env.min(MAX_ACTIVE_ENV))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_slot_offset() {
        assert_eq!(SlotKind::Original.slot(3), 3);
        assert_eq!(SlotKind::Replay.slot(3), 13);
        assert_eq!(SlotKind::Replay.slot(9), 19);
    }

    #[test]
    fn test_only_stochastic_original_is_raw() {
        for mode in EvalMode::ALL {
            for kind in SlotKind::ALL {
                let rule = slot_rule(mode, kind);
                let raw = rule.return_avg == Derive::Raw;
                assert_eq!(raw, mode == EvalMode::Stochastic && kind == SlotKind::Original);
                assert_eq!(rule.success == Derive::Raw, raw);
            }
        }
    }

    #[test]
    fn test_scaled() {
        assert_eq!(Derive::Raw.scaled(100.0), None);
        assert_eq!(Derive::Scale(0.95).scaled(100.0), Some(95.0));
        assert_eq!(
            slot_rule(EvalMode::Deterministic, SlotKind::Replay).success,
            Derive::Scale(0.95)
        );
    }

    #[test]
    fn test_active_env() {
        assert_eq!(active_env(50_000, 1_000_000), Some(0));
        assert_eq!(active_env(3_500_000, 1_000_000), Some(3));
        assert_eq!(active_env(25_000_000, 1_000_000), Some(19));
        assert_eq!(active_env(-1_500_000, 1_000_000), Some(-1));
        assert_eq!(active_env(10, 0), None);
    }

    #[test]
    fn test_active_env_monotonic() {
        let mut prev = i64::MIN;
        for steps in (0..30_000_000).step_by(250_000) {
            let env = active_env(steps, 1_000_000).unwrap();
            assert!((0..=MAX_ACTIVE_ENV).contains(&env));
            assert!(env >= prev);
            prev = env;
        }
    }
}
