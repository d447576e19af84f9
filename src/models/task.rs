//! Session, room and task models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::question::{value_to_id, Question};

/// Authenticated session: bearer token plus display name.
///
/// Obtained once via login and handed to every subsequent remote call; never
/// stored or refreshed.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub nick: String,
}

/// A class/room the student is enrolled in, used only to enumerate task
/// publication targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    #[serde(default, deserialize_with = "de_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Task summary as returned by the todo listing. The upstream is loose about
/// the id field name, so all known aliases are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    #[serde(
        default,
        alias = "task_id",
        alias = "_id",
        deserialize_with = "de_id"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub room: Option<Value>,
    /// Answers already computed upstream (e.g. a saved draft); passed through
    /// to the synthesizer when well-formed.
    #[serde(default)]
    pub answers: Option<serde_json::Map<String, Value>>,
}

/// Full task detail, with questions.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDetail {
    #[serde(default, alias = "task_id", deserialize_with = "de_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub accessed_on: Option<String>,
    #[serde(default)]
    pub executed_on: Option<String>,
    #[serde(default, deserialize_with = "de_questions")]
    pub questions: Vec<Question>,
}

impl TaskDetail {
    /// Parse a detail response, unwrapping the `{ "data": { ... } }` envelope
    /// the API sometimes adds.
    pub fn from_wire(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Some(data) = value.get_mut("data") {
            if data.is_object() {
                value = data.take();
            }
        }
        serde_json::from_value(value)
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(value_to_id))
}

/// Questions that do not even parse as objects are dropped rather than
/// failing the whole detail.
fn de_questions<'de, D>(deserializer: D) -> Result<Vec<Question>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Array(list)) => list
            .into_iter()
            .filter_map(|q| serde_json::from_value(q).ok())
            .collect(),
        _ => Vec::new(),
    })
}
