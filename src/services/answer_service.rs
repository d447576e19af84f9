//! Answer synthesizer.
//!
//! Pure mapping from a question's type and options to the answer payload the
//! grading service expects. The shapes mirror the official client's own
//! answer generation, so every branch here is load-bearing: the odd-index
//! rule for fill-words, the list-vs-map split for choice questions, the
//! HTML-stripped free text, and the generic option map for unknown types.
//!
//! Failure isolation: a malformed question never aborts the task. Every path
//! folds missing or unusable data into an empty answer and moves on.

use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::models::{AnswerEntry, Question, QuestionOptions, SubmissionPayload, TaskDetail};
use crate::utils::time::now_iso;

/// Synthesize one answer entry.
///
/// `provided` is a caller-supplied pre-computed answer for this question
/// (e.g. from a saved draft); when it is an object carrying an `answer`
/// field, that answer is passed through unmodified.
pub fn synthesize(question: &Question, provided: Option<&Value>) -> AnswerEntry {
    let question_id = question.id.clone().unwrap_or(Value::Null);
    let question_type = question.kind_tag.clone();

    if let Some(given) = provided.and_then(|p| p.get("answer")) {
        debug!("question {:?}: using pre-supplied answer", question_id);
        return AnswerEntry {
            question_id,
            question_type,
            answer: given.clone(),
        };
    }

    let answer = match question.typed_options() {
        QuestionOptions::OrderSentences { sentences } => {
            Value::Array(sentences.iter().map(sentence_value).collect())
        }

        QuestionOptions::FillWords { phrase } => {
            // Only the items at odd positions are blanks to be filled.
            let values: Vec<Value> = phrase
                .iter()
                .enumerate()
                .filter(|(i, _)| i % 2 == 1)
                .map(|(_, item)| phrase_value(item))
                .collect();
            Value::Array(values)
        }

        QuestionOptions::FreeText => {
            let raw = question
                .comment
                .as_deref()
                .or(question.value.as_deref())
                .or(question.text.as_deref())
                .unwrap_or("");
            json!({ "0": strip_html(raw) })
        }

        QuestionOptions::FillLetters { answer } => answer.unwrap_or_else(|| json!({})),

        QuestionOptions::Cloud { ids } => Value::Array(ids),

        QuestionOptions::ChoiceList { options } => choose_from_list(&options),

        QuestionOptions::ChoiceMap { options } => choose_from_map(&options),

        QuestionOptions::Other { raw } => map_unknown_options(&raw),
    };

    AnswerEntry {
        question_id,
        question_type,
        answer,
    }
}

/// Build the full submission payload for a fetched task.
///
/// `provided` maps question ids to pre-computed answer structures.
/// Questions without an id cannot be keyed into the answers map and are
/// skipped; everything else gets exactly one entry.
pub fn build_submission(
    detail: &TaskDetail,
    provided: Option<&Map<String, Value>>,
    draft: bool,
) -> SubmissionPayload {
    let mut entries = Vec::with_capacity(detail.questions.len());

    for question in &detail.questions {
        let Some(qid) = question.id_key() else {
            warn!("skipping question without id (type {:?})", question.kind_tag);
            continue;
        };
        let given = provided.and_then(|map| map.get(&qid));
        entries.push((qid, synthesize(question, given)));
    }

    SubmissionPayload::new(
        detail.accessed_on.clone().unwrap_or_else(now_iso),
        detail.executed_on.clone().unwrap_or_else(now_iso),
        entries,
        draft,
    )
}

// ========== per-type helpers ==========

fn sentence_value(item: &Value) -> Value {
    match item {
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("text"))
            .cloned()
            .unwrap_or(Value::Null),
        other => other.clone(),
    }
}

fn phrase_value(item: &Value) -> Value {
    match item {
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("text"))
            .cloned()
            .unwrap_or_else(|| json!("")),
        Value::Null => json!(""),
        other => other.clone(),
    }
}

/// First option flagged correct wins; otherwise the first option in list
/// order. Deterministic by construction.
fn choose_from_list(options: &[Value]) -> Value {
    let chosen = options
        .iter()
        .find(|o| is_correct(o))
        .or_else(|| options.first());

    chosen.map(option_id).unwrap_or(Value::Null)
}

/// Keyed-map form of choice options: the chosen value is the key itself.
/// Falls back to the first key in wire order when nothing is flagged.
fn choose_from_map(options: &Map<String, Value>) -> Value {
    let chosen = options
        .iter()
        .find(|(_, v)| is_correct(v))
        .map(|(k, _)| k)
        .or_else(|| options.keys().next());

    chosen.map(|k| json!(k)).unwrap_or(Value::Null)
}

/// Unknown question types get the generic option map: each option key maps
/// to its `answer` field (default `false`), raw scalars coerce to boolean.
fn map_unknown_options(raw: &Value) -> Value {
    match raw {
        Value::Object(map) => {
            let mut mapped = Map::new();
            for (k, v) in map {
                let entry = match v {
                    Value::Object(inner) => {
                        inner.get("answer").cloned().unwrap_or(json!(false))
                    }
                    scalar => json!(truthy(scalar)),
                };
                mapped.insert(k.clone(), entry);
            }
            Value::Object(mapped)
        }
        Value::Array(list) => {
            let mut mapped = Map::new();
            for item in list {
                if let Value::Object(inner) = item {
                    if let Some(key) = option_key(inner) {
                        let entry = inner.get("answer").cloned().unwrap_or(json!(false));
                        mapped.insert(key, entry);
                    }
                }
            }
            Value::Object(mapped)
        }
        _ => json!({}),
    }
}

fn is_correct(option: &Value) -> bool {
    match option.get("correct") {
        Some(Value::Bool(true)) => true,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

fn option_id(option: &Value) -> Value {
    option
        .get("id")
        .or_else(|| option.get("optionId"))
        .or_else(|| option.get("key"))
        .cloned()
        .unwrap_or(Value::Null)
}

fn option_key(option: &Map<String, Value>) -> Option<String> {
    option
        .get("id")
        .or_else(|| option.get("optionId"))
        .or_else(|| option.get("key"))
        .and_then(|v| crate::models::question::value_to_id(v))
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Strip HTML markup from grading-service text, leaving trimmed plain text.
pub fn strip_html(input: &str) -> String {
    static TAG_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| regex::Regex::new(r"<[^<]+?>").expect("valid regex"));
    re.replace_all(input, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(v: Value) -> Question {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn order_sentences_preserves_order() {
        let q = question(json!({
            "id": 1,
            "type": "order-sentences",
            "options": {"sentences": [{"value": "um"}, {"value": "dois"}, {"text": "três"}]}
        }));
        let entry = synthesize(&q, None);
        assert_eq!(entry.answer, json!(["um", "dois", "três"]));
    }

    #[test]
    fn fill_words_takes_odd_positions_in_order() {
        let q = question(json!({
            "id": 2,
            "type": "fill-words",
            "options": {"phrase": [
                {"value": "a"}, {"value": "b"}, {"value": "c"},
                {"value": "d"}, {"value": "e"}
            ]}
        }));
        let entry = synthesize(&q, None);
        // 5 items -> floor(5/2) == 2 blanks, indices 1 and 3
        assert_eq!(entry.answer, json!(["b", "d"]));
    }

    #[test]
    fn fill_words_accepts_raw_strings() {
        let q = question(json!({
            "id": 2,
            "type": "fillWords",
            "options": {"phrase": ["x", "sol", "y", "lua"]}
        }));
        assert_eq!(synthesize(&q, None).answer, json!(["sol", "lua"]));
    }

    #[test]
    fn free_text_strips_markup_and_trims() {
        let q = question(json!({
            "id": 3,
            "type": "text_ai",
            "comment": "<b>hi</b> there"
        }));
        assert_eq!(synthesize(&q, None).answer, json!({"0": "hi there"}));
    }

    #[test]
    fn free_text_falls_back_through_value_and_text() {
        let q = question(json!({
            "id": 3,
            "type": "essay",
            "text": " <p>resposta</p> "
        }));
        assert_eq!(synthesize(&q, None).answer, json!({"0": "resposta"}));
    }

    #[test]
    fn fill_letters_prefers_options_answer() {
        let q = question(json!({
            "id": 4,
            "type": "fill-letters",
            "options": {"answer": {"0": "c", "1": "a"}},
            "answer": "ignored"
        }));
        assert_eq!(synthesize(&q, None).answer, json!({"0": "c", "1": "a"}));

        let q = question(json!({"id": 4, "type": "fill-letters", "answer": "sa"}));
        assert_eq!(synthesize(&q, None).answer, json!("sa"));

        let q = question(json!({"id": 4, "type": "fill-letters"}));
        assert_eq!(synthesize(&q, None).answer, json!({}));
    }

    #[test]
    fn cloud_passes_ids_through() {
        let q = question(json!({
            "id": 5,
            "type": "cloud",
            "options": {"ids": [7, 9]}
        }));
        assert_eq!(synthesize(&q, None).answer, json!([7, 9]));

        let q = question(json!({"id": 5, "type": "cloud", "options": {}}));
        assert_eq!(synthesize(&q, None).answer, json!([]));
    }

    #[test]
    fn choice_list_picks_first_correct() {
        let q = question(json!({
            "id": 6,
            "type": "multiple_choice",
            "options": [
                {"id": "A"},
                {"id": "B", "correct": true},
                {"id": "C", "correct": true}
            ]
        }));
        // two flagged correct: the first in list order wins
        assert_eq!(synthesize(&q, None).answer, json!("B"));
    }

    #[test]
    fn choice_list_falls_back_to_first_option() {
        let q = question(json!({
            "id": 6,
            "type": "single_choice",
            "options": [{"id": 10}, {"id": 20}]
        }));
        assert_eq!(synthesize(&q, None).answer, json!(10));
    }

    #[test]
    fn choice_list_accepts_numeric_correct_flag() {
        let q = question(json!({
            "id": 6,
            "type": "multiple_choice",
            "options": [{"id": "A", "correct": 0}, {"id": "B", "correct": 1}]
        }));
        assert_eq!(synthesize(&q, None).answer, json!("B"));
    }

    #[test]
    fn choice_map_picks_correct_key_or_first() {
        let q = question(json!({
            "id": 7,
            "type": "multiple_choice",
            "options": {"x": {}, "y": {"correct": true}}
        }));
        assert_eq!(synthesize(&q, None).answer, json!("y"));

        let q = question(json!({
            "id": 7,
            "type": "multiple_choice",
            "options": {"z": {}, "w": {}}
        }));
        // no correct flag: first key in wire order
        assert_eq!(synthesize(&q, None).answer, json!("z"));
    }

    #[test]
    fn unknown_type_maps_options_to_answers() {
        let q = question(json!({
            "id": 8,
            "type": "matrix",
            "options": {
                "a": {"answer": true},
                "b": {},
                "c": "sim",
                "d": 0
            }
        }));
        assert_eq!(
            synthesize(&q, None).answer,
            json!({"a": true, "b": false, "c": true, "d": false})
        );
    }

    #[test]
    fn unknown_type_with_list_options_keys_by_id() {
        let q = question(json!({
            "id": 8,
            "type": "matrix",
            "options": [{"id": "k1", "answer": 3}, {"id": "k2"}]
        }));
        assert_eq!(synthesize(&q, None).answer, json!({"k1": 3, "k2": false}));
    }

    #[test]
    fn pre_supplied_answer_passes_through_unchanged() {
        let q = question(json!({
            "id": 9,
            "type": "multiple_choice",
            "options": [{"id": "A", "correct": true}]
        }));
        let provided = json!({"answer": {"B": true}});
        assert_eq!(synthesize(&q, Some(&provided)).answer, json!({"B": true}));
    }

    #[test]
    fn malformed_options_yield_empty_answer() {
        let q = question(json!({"id": 10, "type": "matrix", "options": 42}));
        assert_eq!(synthesize(&q, None).answer, json!({}));

        let q = question(json!({"id": 11, "type": "multiple_choice", "options": []}));
        assert_eq!(synthesize(&q, None).answer, Value::Null);
    }

    #[test]
    fn build_submission_keys_every_question_once() {
        let detail = TaskDetail::from_wire(json!({
            "id": 99,
            "questions": [
                {"id": 1, "type": "cloud", "options": {"ids": [7, 9]}},
                {"id": 2, "type": "text", "comment": "oi"},
                {"type": "cloud", "options": {}}
            ]
        }))
        .unwrap();

        let payload = build_submission(&detail, None, false);
        assert_eq!(payload.answers.len(), 2);
        assert!(payload.answers.contains_key("1"));
        assert!(payload.answers.contains_key("2"));
        assert!(payload.is_final);
    }

    #[test]
    fn build_submission_is_idempotent() {
        let detail = TaskDetail::from_wire(json!({
            "id": 99,
            "accessed_on": "2026-01-01T00:00:00Z",
            "executed_on": "2026-01-01T00:01:00Z",
            "questions": [
                {"id": 1, "type": "fill-words", "options": {"phrase": ["a", "b", "c", "d"]}},
                {"id": 2, "type": "multiple_choice", "options": [{"id": "A"}, {"id": "B"}]}
            ]
        }))
        .unwrap();

        let first = build_submission(&detail, None, true);
        let second = build_submission(&detail, None, true);
        assert_eq!(first.answers, second.answers);
    }

    #[test]
    fn build_submission_uses_provided_answers() {
        let detail = TaskDetail::from_wire(json!({
            "id": 99,
            "questions": [{"id": 5, "type": "cloud", "options": {"ids": [1]}}]
        }))
        .unwrap();

        let mut provided = Map::new();
        provided.insert("5".to_string(), json!({"answer": [3, 4]}));

        let payload = build_submission(&detail, Some(&provided), false);
        assert_eq!(payload.answers["5"]["answer"], json!([3, 4]));
    }
}
