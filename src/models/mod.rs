//! Data model for the task pipeline.

pub mod question;
pub mod submission;
pub mod task;

pub use question::{Question, QuestionKind, QuestionOptions};
pub use submission::{AnswerEntry, ProcessingOutcome, SubmissionPayload, SubmissionStatus};
pub use task::{Room, Session, TaskDetail, TaskSummary};
