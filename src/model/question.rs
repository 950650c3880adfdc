use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SessionError;
use crate::model::records::QuestionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    Essay,
    Matching,
    Ordering,
}

/// Kind-dependent options and correct answer of a normalized question.
///
/// For `Matching` the item list holds 2N entries describing N left/right
/// pairs and `correct` is the N-length sequence of chosen right-side values;
/// for `Ordering` the items are the N entries to arrange and `correct` is the
/// intended order. A correct answer that is not a member of the options is
/// kept as-is: it can never match a submitted answer, which is the required
/// behavior for that authoring mistake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestionSpec {
    SingleChoice { options: Vec<String>, correct: String },
    MultipleChoice { options: Vec<String>, correct: Vec<String> },
    Essay,
    Matching { items: Vec<String>, correct: Vec<String> },
    Ordering { items: Vec<String>, correct: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub points: u32,
    pub spec: QuestionSpec,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self.spec {
            QuestionSpec::SingleChoice { .. } => QuestionKind::SingleChoice,
            QuestionSpec::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            QuestionSpec::Essay => QuestionKind::Essay,
            QuestionSpec::Matching { .. } => QuestionKind::Matching,
            QuestionSpec::Ordering { .. } => QuestionKind::Ordering,
        }
    }

    /// Validate and normalize a raw store record into the typed form.
    pub fn normalize(record: QuestionRecord) -> Result<Self, SessionError> {
        let QuestionRecord { id, text, kind, points, options, correct, .. } = record;

        if points <= 0 {
            return Err(SessionError::MalformedQuestion {
                question_id: id,
                reason: format!("point value must be positive, got {points}"),
            });
        }
        let points = points as u32;

        let spec = match kind.as_str() {
            "singleChoice" => QuestionSpec::SingleChoice {
                options,
                correct: correct_string(&correct).ok_or_else(|| malformed(&id, "singleChoice requires a string correct answer"))?,
            },
            "multipleChoice" => QuestionSpec::MultipleChoice {
                options,
                correct: correct_string_list(&correct)
                    .ok_or_else(|| malformed(&id, "multipleChoice requires a string-array correct answer"))?,
            },
            "essay" => QuestionSpec::Essay,
            "matching" => QuestionSpec::Matching {
                items: options,
                correct: correct_string_list(&correct)
                    .ok_or_else(|| malformed(&id, "matching requires a string-array correct answer"))?,
            },
            "ordering" => QuestionSpec::Ordering {
                items: options,
                correct: correct_string_list(&correct)
                    .ok_or_else(|| malformed(&id, "ordering requires a string-array correct answer"))?,
            },
            other => {
                return Err(SessionError::MalformedQuestion {
                    question_id: id,
                    reason: format!("unrecognized question kind '{other}'"),
                });
            }
        };

        Ok(Question { id, text, points, spec })
    }
}

fn malformed(id: &str, reason: &str) -> SessionError {
    SessionError::MalformedQuestion { question_id: id.to_string(), reason: reason.to_string() }
}

fn correct_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn correct_string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<String>>>()
}

/// A student's answer, shaped by the question kind. Single choice and essay
/// carry one string; the other kinds carry position-ordered string sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AnswerValue {
    SingleChoice(String),
    MultipleChoice(Vec<String>),
    Essay(String),
    Matching(Vec<String>),
    Ordering(Vec<String>),
}

impl AnswerValue {
    /// The default (unanswered) value for a question of the given kind.
    pub fn empty(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::SingleChoice => AnswerValue::SingleChoice(String::new()),
            QuestionKind::MultipleChoice => AnswerValue::MultipleChoice(Vec::new()),
            QuestionKind::Essay => AnswerValue::Essay(String::new()),
            QuestionKind::Matching => AnswerValue::Matching(Vec::new()),
            QuestionKind::Ordering => AnswerValue::Ordering(Vec::new()),
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerValue::SingleChoice(_) => QuestionKind::SingleChoice,
            AnswerValue::MultipleChoice(_) => QuestionKind::MultipleChoice,
            AnswerValue::Essay(_) => QuestionKind::Essay,
            AnswerValue::Matching(_) => QuestionKind::Matching,
            AnswerValue::Ordering(_) => QuestionKind::Ordering,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::SingleChoice(text) | AnswerValue::Essay(text) => text.is_empty(),
            AnswerValue::MultipleChoice(items)
            | AnswerValue::Matching(items)
            | AnswerValue::Ordering(items) => items.is_empty(),
        }
    }
}
