//! # EDUSP Task Autopilot
//!
//! Automated completion of assignments on the EDUSP (Sala do Futuro)
//! platform: authenticate, discover pending/expired tasks across the
//! student's rooms, synthesize an answer for every question and submit,
//! optionally fanning out over many tasks at once.
//!
//! ## Layers
//!
//! - `clients/` — the [`clients::RemoteTaskService`] capability with the real
//!   HTTP client and an offline mock behind it
//! - `services/` — answer synthesis (pure, per question) and the shared
//!   metrics collector
//! - `workflow/` — the per-task state machine: fetch → transform → pace →
//!   submit, always returning an outcome
//! - `orchestrator/` — bounded concurrent fan-out over many tasks
//! - `app` — the operations surfaced to a web layer, exception-free

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

pub use app::{ApiResponse, App, TaskFilter};
pub use clients::{EduspClient, MockClient, RemoteTaskService};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    AnswerEntry, ProcessingOutcome, Question, QuestionKind, Room, Session, SubmissionPayload,
    TaskDetail, TaskSummary,
};
pub use services::{Metrics, MetricsSnapshot};
pub use workflow::Pacing;
