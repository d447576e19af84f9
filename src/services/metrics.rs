//! In-process counters and outcome history.
//!
//! Single shared collaborator for the whole pipeline: append/increment only,
//! all mutation behind one mutex. The outcome history is bounded; oldest
//! entries are evicted first.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::ProcessingOutcome;
use crate::utils::time::now_iso;

#[derive(Debug, Default)]
struct MetricsInner {
    logins: u64,
    room_fetches: u64,
    task_fetches: u64,
    submissions: u64,
    submission_errors: u64,
    last_submission: Option<String>,
    history: VecDeque<ProcessingOutcome>,
}

#[derive(Debug)]
pub struct Metrics {
    inner: Mutex<MetricsInner>,
    history_limit: usize,
}

/// Point-in-time counter view, without the history.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub logins: u64,
    pub room_fetches: u64,
    pub task_fetches: u64,
    pub submissions: u64,
    pub submission_errors: u64,
    pub last_submission: Option<String>,
    pub history_len: usize,
}

impl Metrics {
    pub fn new(history_limit: usize) -> Self {
        Self {
            inner: Mutex::new(MetricsInner::default()),
            history_limit,
        }
    }

    pub fn record_login(&self) {
        self.lock().logins += 1;
    }

    pub fn record_room_fetch(&self) {
        self.lock().room_fetches += 1;
    }

    pub fn record_task_fetch(&self) {
        self.lock().task_fetches += 1;
    }

    /// Record one processed outcome: bumps the submission counters and
    /// appends to the bounded history.
    pub fn record_outcome(&self, outcome: &ProcessingOutcome) {
        let mut inner = self.lock();
        if outcome.success {
            inner.submissions += 1;
            inner.last_submission = Some(now_iso());
        } else {
            inner.submission_errors += 1;
        }
        inner.history.push_back(outcome.clone());
        while inner.history.len() > self.history_limit {
            inner.history.pop_front();
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.lock();
        MetricsSnapshot {
            logins: inner.logins,
            room_fetches: inner.room_fetches,
            task_fetches: inner.task_fetches,
            submissions: inner.submissions,
            submission_errors: inner.submission_errors,
            last_submission: inner.last_submission.clone(),
            history_len: inner.history.len(),
        }
    }

    /// Full trailing history, newest last.
    pub fn history(&self) -> Vec<ProcessingOutcome> {
        self.lock().history.iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MetricsInner> {
        // a poisoned metrics lock only means a worker panicked mid-update;
        // the counters are still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
