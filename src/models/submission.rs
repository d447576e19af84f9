//! Submission payload and processing outcome.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One synthesized answer.
///
/// The `answer` shape varies by question type (list, scalar id, keyed map or
/// free text) and must be preserved exactly as the synthesizer produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question_id: Value,
    pub question_type: String,
    pub answer: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
}

/// The answer payload sent to the remote service, built once per task.
///
/// `final` and `status` are complementary; [`SubmissionPayload::new`] is the
/// only constructor, so the invariant cannot be violated.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    pub accessed_on: String,
    pub executed_on: String,
    /// question id -> serialized [`AnswerEntry`], insertion order preserved.
    pub answers: serde_json::Map<String, Value>,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub status: SubmissionStatus,
}

impl SubmissionPayload {
    pub fn new(
        accessed_on: String,
        executed_on: String,
        entries: Vec<(String, AnswerEntry)>,
        draft: bool,
    ) -> Self {
        let mut answers = serde_json::Map::new();
        for (qid, entry) in entries {
            // serializing an AnswerEntry cannot fail
            let value = serde_json::to_value(&entry).unwrap_or(Value::Null);
            answers.insert(qid, value);
        }
        Self {
            accessed_on,
            executed_on,
            answers,
            is_final: !draft,
            status: if draft {
                SubmissionStatus::Draft
            } else {
                SubmissionStatus::Submitted
            },
        }
    }
}

/// Result of processing one task. Immutable once returned; errors are carried
/// as data, never raised past the task flow.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutcome {
    pub success: bool,
    pub task_id: Option<String>,
    pub start: String,
    pub end: String,
    /// The humanized completion time that was drawn, in seconds. The real
    /// sleep is capped well below this; the drawn value is kept for
    /// observability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_delay_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}
