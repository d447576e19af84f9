//! Logging setup and run-summary helpers.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::ProcessingOutcome;

/// Initialize the global tracing subscriber. `RUST_LOG` overrides the
/// default `info` level. Safe to call more than once (later calls no-op).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn log_startup(max_concurrent: usize, mock_mode: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 task autopilot starting (workers: {})", max_concurrent);
    if mock_mode {
        info!("⚠️  mock mode: no real platform calls will be made");
    }
    info!("{}", "=".repeat(60));
}

pub fn log_batch_summary(outcomes: &[ProcessingOutcome]) {
    let success = outcomes.iter().filter(|o| o.success).count();
    info!("{}", "─".repeat(60));
    info!("✅ succeeded: {}/{}", success, outcomes.len());
    info!("❌ failed: {}", outcomes.len() - success);
    for outcome in outcomes.iter().filter(|o| !o.success) {
        info!(
            "   task {}: {}",
            outcome.task_id.as_deref().unwrap_or("<no id>"),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    info!("{}", "─".repeat(60));
}
