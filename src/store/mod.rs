mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::model::{ExamRecord, QuestionRecord, ResultRecord, SessionRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document conflict: {0}")]
    Conflict(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug)]
pub struct NewSession<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub exam_id: &'a str,
    pub started_at: PrimitiveDateTime,
    pub answered_count: u32,
    pub marked_count: u32,
}

#[derive(Debug)]
pub struct NewResult<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub exam_id: &'a str,
    pub percentage: u8,
    pub answers: serde_json::Value,
    pub completed_at: PrimitiveDateTime,
    pub passing_score: u8,
}

/// The external document-database collaborator. The engine performs exactly
/// one session create per attempt, reads during loading/guarding, and one
/// result create plus one session delete during submission; nothing else
/// mutates external state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_exam(&self, exam_id: &str) -> Result<Option<ExamRecord>, StoreError>;

    async fn list_questions(&self, exam_id: &str) -> Result<Vec<QuestionRecord>, StoreError>;

    async fn find_result(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Option<ResultRecord>, StoreError>;

    async fn find_active_session(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Option<SessionRecord>, StoreError>;

    async fn create_active_session(&self, session: NewSession<'_>) -> Result<String, StoreError>;

    /// Deleting a session that no longer exists is a success: release paths
    /// may run more than once.
    async fn delete_active_session(&self, session_id: &str) -> Result<(), StoreError>;

    async fn create_result(&self, result: NewResult<'_>) -> Result<String, StoreError>;
}
