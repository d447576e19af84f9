//! Question model
//!
//! The upstream wire format carries a free-form `options` object whose shape
//! depends on the question's type tag. All ambiguity is resolved here, at the
//! parse boundary: [`Question::typed_options`] turns the raw JSON into a
//! [`QuestionOptions`] tagged union keyed by the normalized [`QuestionKind`],
//! so the answer synthesizer only ever dispatches on typed data.

use serde::Deserialize;
use serde_json::Value;

/// Normalized question type.
///
/// The platform is inconsistent about separators and casing ("fill-words",
/// "fill_words" and "fillWords" all occur), so tags are compared with
/// separators stripped and case folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    OrderSentences,
    FillWords,
    /// text / text_ai / essay / long_text
    FreeText,
    FillLetters,
    Cloud,
    /// multiple_choice / single_choice
    Choice,
    /// Anything we do not recognize.
    Other,
}

impl QuestionKind {
    pub fn parse(tag: &str) -> Self {
        let norm: String = tag
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match norm.as_str() {
            "ordersentences" => QuestionKind::OrderSentences,
            "fillwords" => QuestionKind::FillWords,
            "text" | "textai" | "essay" | "longtext" => QuestionKind::FreeText,
            "fillletters" => QuestionKind::FillLetters,
            "cloud" => QuestionKind::Cloud,
            "multiplechoice" | "singlechoice" => QuestionKind::Choice,
            _ => QuestionKind::Other,
        }
    }
}

/// Type-specific options, resolved from the raw wire object.
#[derive(Debug, Clone)]
pub enum QuestionOptions {
    OrderSentences { sentences: Vec<Value> },
    FillWords { phrase: Vec<Value> },
    /// The answer text lives on the question itself (`comment`/`value`/`text`).
    FreeText,
    FillLetters { answer: Option<Value> },
    Cloud { ids: Vec<Value> },
    /// Choice options delivered as a list of option objects.
    ChoiceList { options: Vec<Value> },
    /// Choice options delivered as a keyed map (some question subtypes).
    ChoiceMap { options: serde_json::Map<String, Value> },
    /// Unrecognized type: keep the raw object for the generic mapping.
    Other { raw: Value },
}

/// A single question as fetched inside a task detail.
///
/// The loosely-typed fields are parsed leniently: a field of an unexpected
/// shape degrades to `None` instead of failing the whole task detail, so one
/// malformed question never aborts the assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    #[serde(default, alias = "question_id", alias = "qid")]
    pub id: Option<Value>,
    #[serde(
        rename = "type",
        alias = "question_type",
        alias = "kind",
        default,
        deserialize_with = "de_lenient_string"
    )]
    pub kind_tag: String,
    #[serde(default)]
    pub options: Value,
    /// Answer text source for free-text questions.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub text: Option<String>,
    /// Some variants put the sentence/phrase lists on the question itself
    /// instead of inside `options`.
    #[serde(default, deserialize_with = "de_opt_array")]
    pub sentences: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "de_opt_array")]
    pub phrase: Option<Vec<Value>>,
    /// Pre-existing answer (fill-letters fallback).
    #[serde(default)]
    pub answer: Option<Value>,
}

fn de_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn de_opt_array<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Array(list)) => Some(list),
        _ => None,
    })
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        QuestionKind::parse(&self.kind_tag)
    }

    /// Map key / payload id for this question, as the upstream expects it
    /// (numeric ids are stringified for the answers map).
    pub fn id_key(&self) -> Option<String> {
        self.id.as_ref().and_then(value_to_id)
    }

    /// Resolve the raw `options` object into the typed union for this
    /// question's kind.
    pub fn typed_options(&self) -> QuestionOptions {
        match self.kind() {
            QuestionKind::OrderSentences => {
                let sentences = self
                    .options
                    .get("sentences")
                    .and_then(Value::as_array)
                    .cloned()
                    .or_else(|| self.sentences.clone())
                    .unwrap_or_default();
                QuestionOptions::OrderSentences { sentences }
            }
            QuestionKind::FillWords => {
                let phrase = self
                    .options
                    .get("phrase")
                    .and_then(Value::as_array)
                    .cloned()
                    .or_else(|| self.phrase.clone())
                    .unwrap_or_default();
                QuestionOptions::FillWords { phrase }
            }
            QuestionKind::FreeText => QuestionOptions::FreeText,
            QuestionKind::FillLetters => QuestionOptions::FillLetters {
                answer: self
                    .options
                    .get("answer")
                    .cloned()
                    .filter(|v| !v.is_null())
                    .or_else(|| self.answer.clone().filter(|v| !v.is_null())),
            },
            QuestionKind::Cloud => QuestionOptions::Cloud {
                ids: self
                    .options
                    .get("ids")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            },
            QuestionKind::Choice => match &self.options {
                Value::Array(list) => QuestionOptions::ChoiceList {
                    options: list.clone(),
                },
                Value::Object(map) => QuestionOptions::ChoiceMap {
                    options: map.clone(),
                },
                _ => QuestionOptions::ChoiceList {
                    options: Vec::new(),
                },
            },
            QuestionKind::Other => QuestionOptions::Other {
                raw: self.options.clone(),
            },
        }
    }
}

/// Stringify an id value the way the upstream answers map expects.
pub fn value_to_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_tag_variants_collapse() {
        for tag in ["fill-words", "fill_words", "fillWords", "FILL-WORDS"] {
            assert_eq!(QuestionKind::parse(tag), QuestionKind::FillWords);
        }
        for tag in ["multiple_choice", "multiple-choice", "single_choice"] {
            assert_eq!(QuestionKind::parse(tag), QuestionKind::Choice);
        }
        assert_eq!(QuestionKind::parse("text_ai"), QuestionKind::FreeText);
        assert_eq!(QuestionKind::parse("long_text"), QuestionKind::FreeText);
        assert_eq!(QuestionKind::parse("banana"), QuestionKind::Other);
    }

    #[test]
    fn choice_options_keep_wire_shape() {
        let q: Question = serde_json::from_value(json!({
            "id": 1,
            "type": "multiple_choice",
            "options": [{"id": "A"}, {"id": "B"}]
        }))
        .unwrap();
        assert!(matches!(
            q.typed_options(),
            QuestionOptions::ChoiceList { .. }
        ));

        let q: Question = serde_json::from_value(json!({
            "id": 2,
            "type": "multiple_choice",
            "options": {"A": {}, "B": {"correct": true}}
        }))
        .unwrap();
        assert!(matches!(q.typed_options(), QuestionOptions::ChoiceMap { .. }));
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let q: Question = serde_json::from_value(json!({
            "id": 42,
            "type": "cloud",
            "options": {"ids": [7, 9]}
        }))
        .unwrap();
        assert_eq!(q.id_key().as_deref(), Some("42"));
    }

    #[test]
    fn phrase_falls_back_to_question_level() {
        let q: Question = serde_json::from_value(json!({
            "id": 3,
            "type": "fill-words",
            "phrase": [{"value": "a"}, {"value": "b"}]
        }))
        .unwrap();
        match q.typed_options() {
            QuestionOptions::FillWords { phrase } => assert_eq!(phrase.len(), 2),
            other => panic!("unexpected options: {:?}", other),
        }
    }
}
