//! Transformation module.
//!
//! - Rules: fixed derivation multipliers per evaluation slot
//! - Row: one input row to one output row
//! - Pipeline: parse, transform, write

pub mod pipeline;
pub mod row;
pub mod rules;

pub use pipeline::*;
pub use row::{average_success, missing_tasks, transform_row, TaskSample};
pub use rules::{slot_rule, Derive, SlotKind, SlotRule};
