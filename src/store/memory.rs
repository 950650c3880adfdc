use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::{ExamRecord, QuestionRecord, ResultRecord, SessionRecord};
use crate::store::{DocumentStore, NewResult, NewSession, StoreError};

/// In-process [`DocumentStore`] holding plain maps behind a mutex. Enforces
/// the same uniqueness invariants the real backend provides: one active
/// session and one result per (user, exam). Used by the test suite and as a
/// reference implementation for store adapters.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    exams: HashMap<String, ExamRecord>,
    questions: HashMap<String, Vec<QuestionRecord>>,
    sessions: HashMap<String, SessionRecord>,
    results: Vec<ResultRecord>,
    fail_next_result_write: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_exam(&self, exam: ExamRecord) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.exams.insert(exam.id.clone(), exam);
    }

    pub fn insert_questions(&self, exam_id: &str, questions: Vec<QuestionRecord>) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.questions.insert(exam_id.to_string(), questions);
    }

    /// Make the next `create_result` call fail with a backend error, for
    /// exercising the persist-failure/retry path.
    pub fn fail_next_result_write(&self) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.fail_next_result_write = true;
    }

    pub fn results(&self) -> Vec<ResultRecord> {
        self.inner.lock().expect("memory store poisoned").results.clone()
    }

    pub fn active_session_count(&self) -> usize {
        self.inner.lock().expect("memory store poisoned").sessions.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_exam(&self, exam_id: &str) -> Result<Option<ExamRecord>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.exams.get(exam_id).cloned())
    }

    async fn list_questions(&self, exam_id: &str) -> Result<Vec<QuestionRecord>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.questions.get(exam_id).cloned().unwrap_or_default())
    }

    async fn find_result(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Option<ResultRecord>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .results
            .iter()
            .find(|result| result.user_id == user_id && result.exam_id == exam_id)
            .cloned())
    }

    async fn find_active_session(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .sessions
            .values()
            .find(|session| session.user_id == user_id && session.exam_id == exam_id)
            .cloned())
    }

    async fn create_active_session(&self, session: NewSession<'_>) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        let duplicate = inner
            .sessions
            .values()
            .any(|existing| existing.user_id == session.user_id && existing.exam_id == session.exam_id);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "active session already exists for user {} on exam {}",
                session.user_id, session.exam_id
            )));
        }

        let record = SessionRecord {
            id: session.id.to_string(),
            user_id: session.user_id.to_string(),
            exam_id: session.exam_id.to_string(),
            started_at: session.started_at,
            answered_count: session.answered_count,
            marked_count: session.marked_count,
        };
        inner.sessions.insert(record.id.clone(), record);
        Ok(session.id.to_string())
    }

    async fn delete_active_session(&self, session_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.sessions.remove(session_id);
        Ok(())
    }

    async fn create_result(&self, result: NewResult<'_>) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        if inner.fail_next_result_write {
            inner.fail_next_result_write = false;
            return Err(StoreError::Backend("injected result write failure".to_string()));
        }

        let duplicate = inner
            .results
            .iter()
            .any(|existing| existing.user_id == result.user_id && existing.exam_id == result.exam_id);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "result already exists for user {} on exam {}",
                result.user_id, result.exam_id
            )));
        }

        let record = ResultRecord {
            id: result.id.to_string(),
            user_id: result.user_id.to_string(),
            exam_id: result.exam_id.to_string(),
            percentage: result.percentage,
            answers: result.answers,
            completed_at: result.completed_at,
            passing_score: result.passing_score,
        };
        inner.results.push(record);
        Ok(result.id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    #[tokio::test]
    async fn second_active_session_for_same_pair_conflicts() {
        let store = MemoryStore::new();
        let now = primitive_now_utc();
        let first = NewSession {
            id: "s1",
            user_id: "u1",
            exam_id: "e1",
            started_at: now,
            answered_count: 0,
            marked_count: 0,
        };
        store.create_active_session(first).await.unwrap();

        let second = NewSession {
            id: "s2",
            user_id: "u1",
            exam_id: "e1",
            started_at: now,
            answered_count: 0,
            marked_count: 0,
        };
        let err = store.create_active_session(second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_tolerates_missing_session() {
        let store = MemoryStore::new();
        store.delete_active_session("no-such-session").await.unwrap();
        store.delete_active_session("no-such-session").await.unwrap();
    }

    #[tokio::test]
    async fn injected_result_failure_fires_once() {
        let store = MemoryStore::new();
        store.fail_next_result_write();
        let now = primitive_now_utc();

        let attempt = NewResult {
            id: "r1",
            user_id: "u1",
            exam_id: "e1",
            percentage: 80,
            answers: serde_json::json!([]),
            completed_at: now,
            passing_score: 50,
        };
        let err = store.create_result(attempt).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));

        let retry = NewResult {
            id: "r2",
            user_id: "u1",
            exam_id: "e1",
            percentage: 80,
            answers: serde_json::json!([]),
            completed_at: now,
            passing_score: 50,
        };
        store.create_result(retry).await.unwrap();
        assert_eq!(store.results().len(), 1);
    }
}
