//! One task, start to finish.
//!
//! Pipeline per task: validate id → fetch detail → synthesize answers →
//! pace → submit. Every failure is folded into the returned
//! [`ProcessingOutcome`]; this function never surfaces an `Err` to its
//! caller, so one broken task can never take down its siblings.

use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::clients::RemoteTaskService;
use crate::error::{AppError, AppResult};
use crate::models::{ProcessingOutcome, TaskSummary};
use crate::services::answer_service;
use crate::utils::time::now_iso;

/// Humanized completion-time range, in minutes.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub time_min: u64,
    pub time_max: u64,
}

impl Pacing {
    /// Draw a completion time uniformly from the range, in seconds.
    pub fn draw_secs(&self) -> u64 {
        let lo = self.time_min.max(1) * 60;
        let hi = (self.time_max * 60).max(lo);
        rand::thread_rng().gen_range(lo..=hi)
    }
}

/// Process one task end to end.
///
/// `cap_secs` bounds the real pacing sleep so automated runs stay
/// responsive; the drawn value still lands in the outcome.
pub async fn process_task(
    service: &dyn RemoteTaskService,
    token: &str,
    task: &TaskSummary,
    pacing: Pacing,
    draft: bool,
    cap_secs: u64,
) -> ProcessingOutcome {
    let start = now_iso();
    let mut simulated: Option<u64> = None;

    let result = run_pipeline(service, token, task, pacing, draft, cap_secs, &mut simulated).await;

    let (success, response, error) = match result {
        Ok(response) => (true, Some(response), None),
        Err(e) => {
            error!("task {:?} failed: {}", task.id, e);
            (false, None, Some(e.to_string()))
        }
    };

    ProcessingOutcome {
        success,
        task_id: task.id.clone(),
        start,
        end: now_iso(),
        simulated_delay_secs: simulated,
        error,
        response,
    }
}

async fn run_pipeline(
    service: &dyn RemoteTaskService,
    token: &str,
    task: &TaskSummary,
    pacing: Pacing,
    draft: bool,
    cap_secs: u64,
    simulated: &mut Option<u64>,
) -> AppResult<Value> {
    let task_id = task
        .id
        .as_deref()
        .ok_or_else(|| AppError::input("task without id"))?;

    let detail = service.task_detail(token, task_id).await?;

    let payload = answer_service::build_submission(&detail, task.answers.as_ref(), draft);
    info!(
        "task {}: {} answers synthesized ({})",
        task_id,
        payload.answers.len(),
        if draft { "draft" } else { "final" }
    );

    let drawn = pacing.draw_secs();
    *simulated = Some(drawn);
    let effective = drawn.min(cap_secs);
    info!(
        "task {}: pacing {}s (simulated {}s)",
        task_id, effective, drawn
    );
    tokio::time::sleep(Duration::from_secs(effective)).await;

    let response = service.submit_answer(token, task_id, &payload).await?;
    info!("task {}: submitted ✓", task_id);
    Ok(response)
}
