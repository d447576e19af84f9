//! Business capabilities: answer synthesis and metrics.

pub mod answer_service;
pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};
