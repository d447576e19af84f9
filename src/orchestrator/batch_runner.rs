//! Batch runner.
//!
//! Fans the per-task flow out over N tasks with a Semaphore-bounded worker
//! pool and fans every outcome back in. One task's failure contributes a
//! failed outcome and nothing else: no cancellation, no short-circuit, and
//! exactly one outcome per input task. Once a batch starts, every spawned
//! unit runs to completion before this function returns.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::clients::RemoteTaskService;
use crate::models::{ProcessingOutcome, TaskSummary};
use crate::services::Metrics;
use crate::utils::time::now_iso;
use crate::workflow::{process_task, Pacing};

/// Run the task flow over every task, at most `worker_bound` in flight.
pub async fn run_batch(
    service: Arc<dyn RemoteTaskService>,
    metrics: Arc<Metrics>,
    token: &str,
    tasks: Vec<TaskSummary>,
    pacing: Pacing,
    draft: bool,
    cap_secs: u64,
    worker_bound: usize,
) -> Vec<ProcessingOutcome> {
    if tasks.is_empty() {
        return Vec::new();
    }

    let workers = worker_bound.max(1).min(tasks.len());
    info!(
        "batch: {} tasks, {} workers, pacing {}-{} min",
        tasks.len(),
        workers,
        pacing.time_min,
        pacing.time_max
    );

    let semaphore = Arc::new(Semaphore::new(workers));
    let token = Arc::new(token.to_string());
    let mut handles = Vec::with_capacity(tasks.len());

    for task in tasks {
        let semaphore = semaphore.clone();
        let service = service.clone();
        let token = token.clone();

        let handle = tokio::spawn(async move {
            // closed only if the semaphore is dropped, which it never is here
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore closed");
            process_task(service.as_ref(), &token, &task, pacing, draft, cap_secs).await
        });
        handles.push(handle);
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                // a panicked worker still owes the batch an outcome
                error!("batch worker panicked: {}", e);
                ProcessingOutcome {
                    success: false,
                    task_id: None,
                    start: now_iso(),
                    end: now_iso(),
                    simulated_delay_secs: None,
                    error: Some(format!("worker panicked: {}", e)),
                    response: None,
                }
            }
        };
        metrics.record_outcome(&outcome);
        outcomes.push(outcome);
    }

    let success = outcomes.iter().filter(|o| o.success).count();
    info!("batch complete: {}/{} succeeded", success, outcomes.len());
    outcomes
}
