//! The remote task service capability.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;
use crate::models::{Room, Session, SubmissionPayload, TaskDetail, TaskSummary};

/// Operations the task platform exposes.
///
/// Implemented by [`crate::clients::EduspClient`] for the real platform and
/// by [`crate::clients::MockClient`] for offline runs and tests.
#[async_trait]
pub trait RemoteTaskService: Send + Sync {
    /// Authenticate a student. Fails with an auth error on non-success
    /// status or a response missing the token.
    async fn login(&self, ra: &str, password: &str) -> AppResult<Session>;

    /// List the rooms/classes the student is enrolled in.
    async fn fetch_rooms(&self, token: &str) -> AppResult<Vec<Room>>;

    /// List pending (or expired) tasks for one publication target.
    async fn fetch_tasks(
        &self,
        token: &str,
        target: &str,
        expired_only: bool,
    ) -> AppResult<Vec<TaskSummary>>;

    /// Fetch the full question list for one task.
    async fn task_detail(&self, token: &str, task_id: &str) -> AppResult<TaskDetail>;

    /// Submit an answer payload. The remote response is returned verbatim.
    async fn submit_answer(
        &self,
        token: &str,
        task_id: &str,
        payload: &SubmissionPayload,
    ) -> AppResult<Value>;
}
