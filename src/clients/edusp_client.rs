//! HTTP client for the EDUSP task platform.
//!
//! Wraps the four remote operations behind [`RemoteTaskService`]. Every
//! request carries the realm/platform identity headers plus the browser-like
//! User-Agent and Origin the official web client sends; authenticated calls
//! add the bearer token as `x-api-key`. Per-call timeouts keep a stalled
//! remote from hanging a worker.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::remote::RemoteTaskService;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Room, Session, SubmissionPayload, TaskDetail, TaskSummary};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);
const ROOMS_TIMEOUT: Duration = Duration::from_secs(15);
const TODO_TIMEOUT: Duration = Duration::from_secs(20);
const DETAIL_TIMEOUT: Duration = Duration::from_secs(15);
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct EduspClient {
    client: reqwest::Client,
    base_url: String,
    origin: String,
}

impl EduspClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::internal(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            origin: config.client_origin.clone(),
        })
    }

    fn default_headers(&self, token: Option<&str>) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("x-api-realm", HeaderValue::from_static("edusp"));
        headers.insert("x-api-platform", HeaderValue::from_static("webclient"));
        headers.insert(
            "Origin",
            HeaderValue::from_str(&self.origin)
                .map_err(|e| AppError::internal(format!("origin header: {}", e)))?,
        );
        headers.insert(
            "Referer",
            HeaderValue::from_str(&format!("{}/", self.origin))
                .map_err(|e| AppError::internal(format!("referer header: {}", e)))?,
        );
        if let Some(token) = token {
            headers.insert(
                "x-api-key",
                HeaderValue::from_str(token)
                    .map_err(|_| AppError::input("token contains invalid characters"))?,
            );
        }
        Ok(headers)
    }
}

#[async_trait]
impl RemoteTaskService for EduspClient {
    async fn login(&self, ra: &str, password: &str) -> AppResult<Session> {
        let url = format!("{}/registration/edusp", self.base_url);
        let body = json!({
            "realm": "edusp",
            "platform": "webclient",
            "id": ra,
            "password": password,
        });

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers(None)?)
            .timeout(LOGIN_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("login rejected: status={} body={:.200}", status, detail);
            return Err(AppError::Auth(format!("status {}", status)));
        }

        let body: Value = response.json().await?;
        let token = body
            .get("auth_token")
            .or_else(|| body.get("token"))
            .or_else(|| body.get("access_token"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::Auth("response carried no auth token".to_string()))?;

        let nick = body
            .get("nick")
            .or_else(|| body.get("name"))
            .or_else(|| body.get("username"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        debug!("login ok, nick={}", nick);
        Ok(Session { token, nick })
    }

    async fn fetch_rooms(&self, token: &str) -> AppResult<Vec<Room>> {
        let url = format!("{}/room/user?list_all=true&with_cards=true", self.base_url);
        let response = self
            .client
            .get(&url)
            .headers(self.default_headers(Some(token))?)
            .timeout(ROOMS_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::remote("/room/user", format!("status {}", status)));
        }

        let body: Value = response.json().await?;
        let rooms = body
            .get("rooms")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|r| serde_json::from_value(r.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(rooms)
    }

    async fn fetch_tasks(
        &self,
        token: &str,
        target: &str,
        expired_only: bool,
    ) -> AppResult<Vec<TaskSummary>> {
        let url = format!("{}/tms/task/todo", self.base_url);
        let expired = if expired_only { "true" } else { "false" };
        let not_expired = if expired_only { "false" } else { "true" };
        let params: Vec<(&str, &str)> = vec![
            ("limit", "100"),
            ("offset", "0"),
            ("is_exam", "false"),
            ("with_answer", "true"),
            ("with_apply_moment", "true"),
            ("publication_target", target),
            ("answer_statuses", "pending"),
            ("answer_statuses", "draft"),
            ("expired_only", expired),
            ("filter_expired", not_expired),
            ("is_essay", "false"),
        ];

        let response = self
            .client
            .get(&url)
            .headers(self.default_headers(Some(token))?)
            .timeout(TODO_TIMEOUT)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::remote(
                "/tms/task/todo",
                format!("status {}", status),
            ));
        }

        let body: Value = response.json().await?;
        Ok(extract_task_list(body))
    }

    async fn task_detail(&self, token: &str, task_id: &str) -> AppResult<TaskDetail> {
        let url = format!("{}/tms/task/{}", self.base_url, task_id);
        let response = self
            .client
            .get(&url)
            .headers(self.default_headers(Some(token))?)
            .timeout(DETAIL_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::remote(
                format!("/tms/task/{}", task_id),
                format!("status {}", status),
            ));
        }

        let body: Value = response.json().await?;
        TaskDetail::from_wire(body)
            .map_err(|e| AppError::remote(format!("/tms/task/{}", task_id), e.to_string()))
    }

    async fn submit_answer(
        &self,
        token: &str,
        task_id: &str,
        payload: &SubmissionPayload,
    ) -> AppResult<Value> {
        let url = format!("{}/tms/task/{}/answer", self.base_url, task_id);
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers(Some(token))?)
            .timeout(SUBMIT_TIMEOUT)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::remote(
                format!("/tms/task/{}/answer", task_id),
                format!("status {}: {:.200}", status, detail),
            ));
        }

        Ok(response.json().await?)
    }
}

/// The todo endpoint returns either a bare list or a `{tasks|data|items}`
/// wrapper depending on platform version.
fn extract_task_list(body: Value) -> Vec<TaskSummary> {
    let list = match body {
        Value::Array(list) => list,
        Value::Object(mut map) => ["tasks", "data", "items"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(list)) => Some(list),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    list.into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect()
}
