//! Application facade.
//!
//! The operations surfaced to a web layer (or the binary's self-test): login,
//! assignment listing, single/batch processing and the metrics snapshot.
//! Nothing here ever returns `Err` — every operation folds failure into an
//! [`ApiResponse`] so the boundary stays exception-free.

use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::{EduspClient, MockClient, RemoteTaskService};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{ProcessingOutcome, Session, TaskSummary};
use crate::orchestrator;
use crate::services::{Metrics, MetricsSnapshot};
use crate::workflow::{process_task, Pacing};

/// Result envelope for every surfaced operation.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(payload: T) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            message: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            message: Some(message.into()),
        }
    }
}

/// Which tasks to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    Pending,
    Expired,
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskFilter::Pending),
            "expired" => Ok(TaskFilter::Expired),
            other => Err(format!("unknown filter: {}", other)),
        }
    }
}

pub struct App {
    service: Arc<dyn RemoteTaskService>,
    metrics: Arc<Metrics>,
    config: Config,
}

impl App {
    /// Build the app with the real client, or the offline mock when
    /// `mock_mode` is set.
    pub fn new(config: Config) -> AppResult<Self> {
        let service: Arc<dyn RemoteTaskService> = if config.mock_mode {
            Arc::new(MockClient::new())
        } else {
            Arc::new(EduspClient::new(&config)?)
        };
        Ok(Self::with_service(service, config))
    }

    /// Build the app around any service implementation (capability
    /// substitution; used by tests).
    pub fn with_service(service: Arc<dyn RemoteTaskService>, config: Config) -> Self {
        let metrics = Arc::new(Metrics::new(config.history_limit));
        Self {
            service,
            metrics,
            config,
        }
    }

    pub fn default_pacing(&self) -> Pacing {
        Pacing {
            time_min: self.config.time_min,
            time_max: self.config.time_max,
        }
    }

    /// Authenticate. Empty credentials are rejected before any remote call.
    pub async fn login(&self, ra: &str, password: &str) -> ApiResponse<Session> {
        if ra.trim().is_empty() || password.is_empty() {
            return ApiResponse::err("RA and password are required");
        }

        match self.service.login(ra, password).await {
            Ok(session) => {
                self.metrics.record_login();
                info!("login ok for RA {} (nick: {})", ra, session.nick);
                ApiResponse::ok(session)
            }
            Err(e) => ApiResponse::err(format!("login failed: {}", e)),
        }
    }

    /// Enumerate pending or expired tasks across every enrolled room,
    /// deduplicated by task id. A single room failing to list is tolerated.
    pub async fn list_assignments(
        &self,
        token: &str,
        filter: TaskFilter,
    ) -> ApiResponse<Vec<TaskSummary>> {
        if token.is_empty() {
            return ApiResponse::err("token is required");
        }

        let rooms = match self.service.fetch_rooms(token).await {
            Ok(rooms) => {
                self.metrics.record_room_fetch();
                rooms
            }
            Err(e) => return ApiResponse::err(format!("room listing failed: {}", e)),
        };

        let targets: Vec<String> = rooms
            .into_iter()
            .filter_map(|room| room.id.or(room.name))
            .collect();

        if targets.is_empty() {
            return ApiResponse::ok(Vec::new());
        }

        let expired_only = filter == TaskFilter::Expired;
        let mut found: Vec<TaskSummary> = Vec::new();

        for target in &targets {
            self.metrics.record_task_fetch();
            match self.service.fetch_tasks(token, target, expired_only).await {
                Ok(tasks) => found.extend(tasks),
                Err(e) => {
                    warn!("target {}: task listing failed: {}", target, e);
                    continue;
                }
            }
        }

        // dedupe by id, first occurrence wins; tasks without id are unusable
        let mut seen = std::collections::HashSet::new();
        found.retain(|task| match &task.id {
            Some(id) => seen.insert(id.clone()),
            None => false,
        });

        info!("found {} tasks ({:?})", found.len(), filter);
        ApiResponse::ok(found)
    }

    /// Process a single task. The outcome is always returned; the envelope's
    /// `success` mirrors the outcome's.
    pub async fn process_one(
        &self,
        token: &str,
        task: &TaskSummary,
        pacing: Pacing,
        draft: bool,
    ) -> ApiResponse<ProcessingOutcome> {
        if token.is_empty() {
            return ApiResponse::err("token is required");
        }

        let outcome = process_task(
            self.service.as_ref(),
            token,
            task,
            pacing,
            draft,
            self.config.pacing_cap_secs,
        )
        .await;
        self.metrics.record_outcome(&outcome);

        ApiResponse {
            success: outcome.success,
            message: outcome.error.clone(),
            payload: Some(outcome),
        }
    }

    /// Process many tasks concurrently. Exactly one outcome per input task.
    pub async fn process_batch(
        &self,
        token: &str,
        tasks: Vec<TaskSummary>,
        pacing: Pacing,
        draft: bool,
    ) -> ApiResponse<Vec<ProcessingOutcome>> {
        if token.is_empty() {
            return ApiResponse::err("token is required");
        }
        if tasks.is_empty() {
            return ApiResponse::err("no tasks to process");
        }

        let count = tasks.len();
        let outcomes = orchestrator::run_batch(
            self.service.clone(),
            self.metrics.clone(),
            token,
            tasks,
            pacing,
            draft,
            self.config.pacing_cap_secs,
            self.config.max_concurrent_tasks,
        )
        .await;

        ApiResponse {
            success: true,
            message: Some(format!("processing finished for {} tasks", count)),
            payload: Some(outcomes),
        }
    }

    pub fn metrics_snapshot(&self) -> ApiResponse<MetricsSnapshot> {
        ApiResponse::ok(self.metrics.snapshot())
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_app() -> App {
        let config = Config {
            mock_mode: true,
            pacing_cap_secs: 0,
            ..Config::default()
        };
        App::new(config).unwrap()
    }

    #[tokio::test]
    async fn empty_credentials_fail_without_remote_call() {
        let app = mock_app();
        let response = app.login("123456", "").await;
        assert!(!response.success);
        // the mock would have counted a login had it been reached
        assert_eq!(app.metrics_snapshot().payload.unwrap().logins, 0);
    }

    #[tokio::test]
    async fn login_then_list_then_batch() {
        let app = mock_app();

        let session = app.login("123456", "senha").await.payload.unwrap();
        assert_eq!(session.token, "mock-token-123456");

        let tasks = app
            .list_assignments(&session.token, TaskFilter::Pending)
            .await
            .payload
            .unwrap();
        // two rooms x two tasks, deduped by id down to two
        assert_eq!(tasks.len(), 2);

        let pacing = app.default_pacing();
        let response = app
            .process_batch(&session.token, tasks, pacing, false)
            .await;
        assert!(response.success);
        let outcomes = response.payload.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.success));

        let snap = app.metrics_snapshot().payload.unwrap();
        assert_eq!(snap.logins, 1);
        assert_eq!(snap.submissions, 2);
        assert_eq!(snap.submission_errors, 0);
    }

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!("Pending".parse::<TaskFilter>().unwrap(), TaskFilter::Pending);
        assert_eq!("EXPIRED".parse::<TaskFilter>().unwrap(), TaskFilter::Expired);
        assert!("soon".parse::<TaskFilter>().is_err());
    }
}
