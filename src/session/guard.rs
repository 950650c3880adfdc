use std::sync::Arc;

use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::error::SessionError;
use crate::store::{DocumentStore, NewSession};

/// Enforces "one attempt, one active session" before a controller may exist.
/// Owns the create/delete calls against the external session record.
pub struct SessionGuard {
    store: Arc<dyn DocumentStore>,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Run both admission checks in order (completed result first, then
    /// active session) and create the active session record only when both
    /// pass. Returns the new session id.
    pub async fn register(
        &self,
        user_id: &str,
        exam_id: &str,
        started_at: PrimitiveDateTime,
    ) -> Result<String, SessionError> {
        if self.store.find_result(user_id, exam_id).await?.is_some() {
            tracing::info!(user_id, exam_id, "Session start rejected: attempt already completed");
            metrics::counter!("exam_session_guard_rejections_total", "reason" => "already_completed")
                .increment(1);
            return Err(SessionError::AlreadyCompleted);
        }

        if self.store.find_active_session(user_id, exam_id).await?.is_some() {
            tracing::info!(user_id, exam_id, "Session start rejected: session already active");
            metrics::counter!("exam_session_guard_rejections_total", "reason" => "session_active")
                .increment(1);
            return Err(SessionError::SessionAlreadyActive);
        }

        let session_id = Uuid::new_v4().to_string();
        self.store
            .create_active_session(NewSession {
                id: &session_id,
                user_id,
                exam_id,
                started_at,
                answered_count: 0,
                marked_count: 0,
            })
            .await?;

        tracing::info!(user_id, exam_id, %session_id, "Active exam session registered");
        metrics::counter!("exam_sessions_started_total").increment(1);
        Ok(session_id)
    }

    /// Delete the active session record. Tolerates an already-deleted
    /// session; callers invoke this even when scoring or result persistence
    /// failed, so a crashed submit cannot lock the user out.
    pub async fn release(&self, session_id: &str) -> Result<(), SessionError> {
        self.store.delete_active_session(session_id).await?;
        tracing::info!(session_id, "Active exam session released");
        Ok(())
    }
}
