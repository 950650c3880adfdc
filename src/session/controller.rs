use std::sync::Arc;
use std::time::Duration;

use time::PrimitiveDateTime;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::config::Settings;
use crate::core::time::primitive_now_utc;
use crate::error::SessionError;
use crate::model::{AnswerValue, ExamRecord, Question};
use crate::scoring::{self, ScoreSummary};
use crate::session::events::{BlockReason, ResultSummary, SessionEvent};
use crate::session::guard::SessionGuard;
use crate::session::latch::{SubmitLatch, SubmitTrigger};
use crate::session::ledger::AnswerLedger;
use crate::session::timer::{CountdownTimer, TimerEvent};
use crate::store::{DocumentStore, NewResult};

/// Everything the controller needs, injected by the embedder. No ambient
/// singletons: the store, identity, and event sink all arrive here.
pub struct SessionDeps {
    pub store: Arc<dyn DocumentStore>,
    pub user_id: String,
    pub exam_id: String,
    pub settings: Settings,
    pub events: mpsc::UnboundedSender<SessionEvent>,
}

/// Where the attempt currently stands. `Loading`/`Guarding`/`Blocked`/
/// `Failed` exist only inside [`ExamSessionController::start`]; a constructed
/// controller begins in `InProgress`. `SubmitFailed` keeps the scored answers
/// in memory and accepts [`ExamSessionController::retry_submit`]; it never
/// transitions back to `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Submitting,
    SubmitFailed,
    Submitted,
}

/// First step of the two-step manual submit: the unanswered-count warning the
/// shell shows before asking for the final confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPrompt {
    pub unanswered: usize,
    pub total: usize,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Completed(ResultSummary),
    /// The expiry auto-submit won the race; this confirmation was a no-op.
    AlreadyClaimed,
}

struct PendingResult {
    summary: ScoreSummary,
    snapshot: serde_json::Value,
    completed_at: PrimitiveDateTime,
    trigger: SubmitTrigger,
}

/// Drives one student's attempt at one exam: loads and validates the
/// question set, registers the active session through the guard, owns the
/// answer ledger and countdown timer, and performs the latch-guarded submit
/// protocol exactly once.
pub struct ExamSessionController {
    store: Arc<dyn DocumentStore>,
    guard: SessionGuard,
    user_id: String,
    exam: ExamRecord,
    session_id: String,
    questions: Vec<Question>,
    ledger: AnswerLedger,
    current_index: usize,
    phase: SessionPhase,
    passing_score: u8,
    latch: SubmitLatch,
    timer: CountdownTimer,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    events: mpsc::UnboundedSender<SessionEvent>,
    submit_prompt_open: bool,
    pending: Option<PendingResult>,
}

impl std::fmt::Debug for ExamSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamSessionController")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl ExamSessionController {
    /// Run the `Loading` and `Guarding` phases. On success the active session
    /// is registered, the ledger is initialized, the countdown is running,
    /// and the returned controller is in `InProgress`. Rejections and load
    /// failures are reported on the event channel before the error returns.
    pub async fn start(deps: SessionDeps) -> Result<Self, SessionError> {
        let SessionDeps { store, user_id, exam_id, settings, events } = deps;

        let exam = match store.get_exam(&exam_id).await {
            Ok(Some(exam)) => exam,
            Ok(None) => {
                let err = SessionError::LoadFailure { message: format!("exam {exam_id} not found") };
                return Err(fail_start(&events, err));
            }
            Err(store_err) => {
                let err = SessionError::LoadFailure { message: store_err.to_string() };
                return Err(fail_start(&events, err));
            }
        };

        if exam.duration_minutes <= 0 {
            let err = SessionError::LoadFailure {
                message: format!("exam {exam_id} has non-positive duration {}", exam.duration_minutes),
            };
            return Err(fail_start(&events, err));
        }

        let now = primitive_now_utc();
        if now < exam.starts_at {
            return Err(fail_start(&events, SessionError::ExamNotStarted));
        }

        let raw_questions = match store.list_questions(&exam_id).await {
            Ok(records) => records,
            Err(store_err) => {
                let err = SessionError::LoadFailure { message: store_err.to_string() };
                return Err(fail_start(&events, err));
            }
        };
        if raw_questions.is_empty() {
            let err =
                SessionError::LoadFailure { message: format!("exam {exam_id} has no questions") };
            return Err(fail_start(&events, err));
        }

        let questions = match raw_questions.into_iter().map(Question::normalize).collect::<Result<Vec<_>, _>>() {
            Ok(questions) => questions,
            Err(err) => {
                tracing::error!(%exam_id, error = %err, "Question set failed validation");
                return Err(fail_start(&events, err));
            }
        };

        let guard = SessionGuard::new(store.clone());
        let session_id = match guard.register(&user_id, &exam_id, now).await {
            Ok(session_id) => session_id,
            Err(err @ SessionError::AlreadyCompleted) => {
                send(&events, SessionEvent::Blocked {
                    reason: BlockReason::AlreadyCompleted,
                    redirect_after: Duration::from_secs(
                        settings.engine().blocked_redirect_delay_seconds,
                    ),
                });
                return Err(err);
            }
            Err(err @ SessionError::SessionAlreadyActive) => {
                send(&events, SessionEvent::Blocked {
                    reason: BlockReason::SessionActive,
                    redirect_after: Duration::from_secs(
                        settings.engine().blocked_redirect_delay_seconds,
                    ),
                });
                return Err(err);
            }
            Err(err) => return Err(fail_start(&events, err)),
        };

        let ledger = AnswerLedger::new(&questions);
        let total_seconds = exam.duration_minutes as u64 * 60;
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let timer = CountdownTimer::start(
            total_seconds,
            Duration::from_millis(settings.engine().tick_interval_ms),
            timer_tx,
        );

        let passing_score =
            exam.passing_score.unwrap_or(settings.engine().default_passing_score);

        send(&events, SessionEvent::Loaded { exam: exam.clone(), total_questions: questions.len() });
        tracing::info!(
            %user_id,
            %exam_id,
            %session_id,
            total_questions = questions.len(),
            total_seconds,
            "Exam session in progress"
        );

        Ok(Self {
            store,
            guard,
            user_id,
            exam,
            session_id,
            questions,
            ledger,
            current_index: 0,
            phase: SessionPhase::InProgress,
            passing_score,
            latch: SubmitLatch::new(),
            timer,
            timer_rx,
            events,
            submit_prompt_open: false,
            pending: None,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn exam(&self) -> &ExamRecord {
        &self.exam
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn passing_score(&self) -> u8 {
        self.passing_score
    }

    /// Move to question `index`, clamped to the valid range. Returns the
    /// index actually selected.
    pub fn goto_question(&mut self, index: usize) -> usize {
        self.current_index = index.min(self.questions.len() - 1);
        self.current_index
    }

    pub fn set_answer(&mut self, question_id: &str, value: AnswerValue) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.ledger.set_answer(question_id, value)
    }

    pub fn toggle_mark(&mut self, question_id: &str) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;
        self.ledger.toggle_mark(question_id)
    }

    /// First confirmation step: opens the submit prompt and reports how many
    /// questions are still unanswered. Answers may still be revised while the
    /// prompt is open.
    pub fn begin_submit(&mut self) -> Result<SubmitPrompt, SessionError> {
        self.ensure_in_progress()?;
        self.submit_prompt_open = true;
        Ok(SubmitPrompt { unanswered: self.ledger.unanswered_count(), total: self.ledger.total() })
    }

    pub fn dismiss_submit_prompt(&mut self) {
        self.submit_prompt_open = false;
    }

    /// Second, irreversible confirmation step. Claims the submission latch;
    /// if timer expiry claimed it first this is a no-op.
    pub async fn confirm_submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        if !self.submit_prompt_open {
            return Err(SessionError::SubmitNotPending);
        }
        self.submit_prompt_open = false;

        if !self.latch.claim(SubmitTrigger::Manual) {
            return Ok(SubmitOutcome::AlreadyClaimed);
        }
        self.run_submit(SubmitTrigger::Manual).await.map(SubmitOutcome::Completed)
    }

    /// Next event from the countdown; `None` once the timer task is done.
    pub async fn next_timer_event(&mut self) -> Option<TimerEvent> {
        self.timer_rx.recv().await
    }

    /// Apply a countdown event: forward ticks to the shell, auto-submit on
    /// expiry. Expiry bypasses the confirmation prompt but still races
    /// through the latch, so a concurrent manual submit makes it a no-op.
    pub async fn handle_timer_event(&mut self, event: TimerEvent) -> Result<(), SessionError> {
        match event {
            TimerEvent::Tick { seconds_remaining } => {
                if !self.latch.is_claimed() {
                    self.emit(SessionEvent::Tick { seconds_remaining });
                }
                Ok(())
            }
            TimerEvent::Expired => {
                if !self.latch.claim(SubmitTrigger::Expiry) {
                    return Ok(());
                }
                tracing::info!(
                    session_id = %self.session_id,
                    exam_id = %self.exam.id,
                    "Countdown expired, auto-submitting"
                );
                self.run_submit(SubmitTrigger::Expiry).await.map(|_| ())
            }
        }
    }

    /// Re-attempt result persistence after a `SubmitFailed` outcome. The
    /// latch stays consumed; the scored ledger snapshot is reused as-is.
    pub async fn retry_submit(&mut self) -> Result<ResultSummary, SessionError> {
        if self.phase != SessionPhase::SubmitFailed {
            return Err(SessionError::SubmitNotPending);
        }
        self.phase = SessionPhase::Submitting;
        self.persist_pending().await
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.latch.is_claimed() {
            return Err(SessionError::AttemptClosed);
        }
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        send(&self.events, event);
    }

    /// The submit protocol. Runs at most once per attempt (latch already
    /// claimed by the caller): cancel the timer, score the final ledger
    /// snapshot, persist the result, release the session.
    async fn run_submit(&mut self, trigger: SubmitTrigger) -> Result<ResultSummary, SessionError> {
        self.phase = SessionPhase::Submitting;
        self.submit_prompt_open = false;
        self.timer.cancel();

        let summary = scoring::score(&self.questions, &self.ledger);
        let snapshot = match serde_json::to_value(self.ledger.entries()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // Serialization of the in-memory ledger failing is a
                // programming error, but the session still must not stay
                // locked.
                self.phase = SessionPhase::SubmitFailed;
                let failure =
                    SessionError::SubmissionPersistFailure { message: err.to_string() };
                self.emit(SessionEvent::Error { kind: failure.kind(), message: failure.to_string() });
                return Err(failure);
            }
        };

        self.pending = Some(PendingResult {
            summary,
            snapshot,
            completed_at: primitive_now_utc(),
            trigger,
        });
        self.persist_pending().await
    }

    async fn persist_pending(&mut self) -> Result<ResultSummary, SessionError> {
        let Some(pending) = self.pending.take() else {
            return Err(SessionError::SubmitNotPending);
        };

        let result_id = Uuid::new_v4().to_string();
        let write = self
            .store
            .create_result(NewResult {
                id: &result_id,
                user_id: &self.user_id,
                exam_id: &self.exam.id,
                percentage: pending.summary.percentage,
                answers: pending.snapshot.clone(),
                completed_at: pending.completed_at,
                passing_score: self.passing_score,
            })
            .await;

        // The session record is released no matter how the result write
        // went; a stuck active session would lock the user out permanently.
        if let Err(release_err) = self.guard.release(&self.session_id).await {
            tracing::error!(
                session_id = %self.session_id,
                error = %release_err,
                "Failed to release active session after submit"
            );
        }

        match write {
            Ok(_) => {
                self.phase = SessionPhase::Submitted;
                metrics::counter!("exam_submissions_total", "trigger" => pending.trigger.as_str())
                    .increment(1);
                let passed = pending.summary.passed(self.passing_score);
                let summary = ResultSummary {
                    result_id,
                    score: pending.summary,
                    passing_score: self.passing_score,
                    passed,
                    completed_at: pending.completed_at,
                };
                tracing::info!(
                    session_id = %self.session_id,
                    exam_id = %self.exam.id,
                    user_id = %self.user_id,
                    percentage = summary.score.percentage,
                    trigger = pending.trigger.as_str(),
                    "Exam submitted"
                );
                self.emit(SessionEvent::Submitted { summary: summary.clone() });
                Ok(summary)
            }
            Err(store_err) => {
                self.phase = SessionPhase::SubmitFailed;
                let failure =
                    SessionError::SubmissionPersistFailure { message: store_err.to_string() };
                metrics::counter!("exam_submission_persist_failures_total").increment(1);
                tracing::error!(
                    session_id = %self.session_id,
                    exam_id = %self.exam.id,
                    error = %store_err,
                    "Result write failed, scored answers retained for retry"
                );
                self.pending = Some(pending);
                self.emit(SessionEvent::Error { kind: failure.kind(), message: failure.to_string() });
                Err(failure)
            }
        }
    }
}

fn fail_start(events: &mpsc::UnboundedSender<SessionEvent>, err: SessionError) -> SessionError {
    send(events, SessionEvent::Error { kind: err.kind(), message: err.to_string() });
    err
}

fn send(events: &mpsc::UnboundedSender<SessionEvent>, event: SessionEvent) {
    // A detached shell only loses presentation, never correctness.
    let _ = events.send(event);
}
