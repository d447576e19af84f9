//! Offline substitute for the task platform.
//!
//! Returns deterministic canned data so the whole pipeline can run without
//! touching the network. Swapped in behind [`RemoteTaskService`] when
//! `MOCK_MODE=true`, and used directly by the integration tests.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::clients::remote::RemoteTaskService;
use crate::error::{AppError, AppResult};
use crate::models::{Room, Session, SubmissionPayload, TaskDetail, TaskSummary};

#[derive(Debug, Default)]
pub struct MockClient;

impl MockClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteTaskService for MockClient {
    async fn login(&self, ra: &str, _password: &str) -> AppResult<Session> {
        let tail: String = ra.chars().rev().take(3).collect::<Vec<_>>().iter().rev().collect();
        Ok(Session {
            token: format!("mock-token-{}", ra),
            nick: format!("Aluno{}", tail),
        })
    }

    async fn fetch_rooms(&self, _token: &str) -> AppResult<Vec<Room>> {
        Ok(vec![
            Room {
                id: Some("123".to_string()),
                name: Some("Matemática".to_string()),
            },
            Room {
                id: Some("456".to_string()),
                name: Some("Português".to_string()),
            },
        ])
    }

    async fn fetch_tasks(
        &self,
        _token: &str,
        target: &str,
        _expired_only: bool,
    ) -> AppResult<Vec<TaskSummary>> {
        let make = |id: &str, title: &str| TaskSummary {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            room: Some(json!(target)),
            answers: None,
        };
        Ok(vec![
            make("111", "Tarefa 1 (Mock)"),
            make("222", "Tarefa 2 (Mock)"),
        ])
    }

    async fn task_detail(&self, _token: &str, task_id: &str) -> AppResult<TaskDetail> {
        TaskDetail::from_wire(json!({
            "id": task_id,
            "questions": [
                {
                    "id": 1,
                    "type": "multiple_choice",
                    "options": [{"id": "A", "correct": true}, {"id": "B"}],
                }
            ],
        }))
        .map_err(|e| AppError::internal(format!("mock detail: {}", e)))
    }

    async fn submit_answer(
        &self,
        _token: &str,
        task_id: &str,
        payload: &SubmissionPayload,
    ) -> AppResult<Value> {
        Ok(json!({
            "status": "ok",
            "submitted": true,
            "task_id": task_id,
            "payload": serde_json::to_value(payload)?,
        }))
    }
}
