//! Per-task processing flow.

pub mod task_flow;

pub use task_flow::{process_task, Pacing};
