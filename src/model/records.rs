use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// Exam metadata as stored by the external document store. Never mutated by
/// this crate once a session has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRecord {
    pub id: String,
    pub title: String,
    pub starts_at: PrimitiveDateTime,
    pub duration_minutes: i64,
    pub question_count: u32,
    /// Passing-score percentage; the configured default applies when absent.
    pub passing_score: Option<u8>,
}

/// Raw question document, prior to [`crate::model::Question::normalize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub exam_id: String,
    pub text: String,
    pub kind: String,
    pub points: i64,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct: serde_json::Value,
}

/// Ephemeral marker that a user is mid-attempt on an exam. At most one active
/// session exists per (user, exam); it is deleted exactly once, on submission
/// or forced termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub exam_id: String,
    pub started_at: PrimitiveDateTime,
    pub answered_count: u32,
    pub marked_count: u32,
}

/// Immutable record of a completed, scored attempt. At most one exists per
/// (user, exam), created by the submit protocol and never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub user_id: String,
    pub exam_id: String,
    pub percentage: u8,
    /// Full answer-ledger snapshot, kept for audit and review.
    pub answers: serde_json::Value,
    pub completed_at: PrimitiveDateTime,
    pub passing_score: u8,
}
