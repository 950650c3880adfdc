use thiserror::Error;

use crate::model::QuestionKind;
use crate::store::StoreError;

/// Error taxonomy for one exam attempt. Policy rejections (`AlreadyCompleted`,
/// `SessionAlreadyActive`, `ExamNotStarted`) are not technical failures: the
/// shell redirects away instead of retrying. Integrity errors
/// (`UnknownQuestion`, `MalformedQuestion`, `AnswerShapeMismatch`) indicate
/// bad data or a programming error and are fatal to the attempt.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to load exam or questions: {message}")]
    LoadFailure { message: String },

    #[error("exam has not started yet")]
    ExamNotStarted,

    #[error("a result already exists for this exam")]
    AlreadyCompleted,

    #[error("an active session already exists for this exam")]
    SessionAlreadyActive,

    #[error("question {question_id} is not part of this session")]
    UnknownQuestion { question_id: String },

    #[error("malformed question {question_id}: {reason}")]
    MalformedQuestion { question_id: String, reason: String },

    #[error("answer for question {question_id} must be a {expected:?} value")]
    AnswerShapeMismatch { question_id: String, expected: QuestionKind },

    #[error("failed to persist the scored result: {message}")]
    SubmissionPersistFailure { message: String },

    #[error("no submit confirmation is pending")]
    SubmitNotPending,

    #[error("the attempt is no longer accepting changes")]
    AttemptClosed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Stable kind discriminant carried on the `Error` event.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::LoadFailure { .. } => "load_failure",
            SessionError::ExamNotStarted => "exam_not_started",
            SessionError::AlreadyCompleted => "already_completed",
            SessionError::SessionAlreadyActive => "session_already_active",
            SessionError::UnknownQuestion { .. } => "unknown_question",
            SessionError::MalformedQuestion { .. } => "malformed_question",
            SessionError::AnswerShapeMismatch { .. } => "answer_shape_mismatch",
            SessionError::SubmissionPersistFailure { .. } => "submission_persist_failure",
            SessionError::SubmitNotPending => "submit_not_pending",
            SessionError::AttemptClosed => "attempt_closed",
            SessionError::Store(_) => "store",
        }
    }
}
