use std::time::Duration;

use serde::Serialize;
use time::PrimitiveDateTime;

use crate::model::ExamRecord;
use crate::scoring::ScoreSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    AlreadyCompleted,
    SessionActive,
}

/// What the shell shows on the results view after a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub result_id: String,
    pub score: ScoreSummary,
    pub passing_score: u8,
    pub passed: bool,
    pub completed_at: PrimitiveDateTime,
}

/// Events the controller pushes to the surrounding shell. The shell owns all
/// presentation and navigation; the controller only reports.
#[derive(Debug)]
pub enum SessionEvent {
    Loaded { exam: ExamRecord, total_questions: usize },
    Blocked { reason: BlockReason, redirect_after: Duration },
    Tick { seconds_remaining: u64 },
    Submitted { summary: ResultSummary },
    Error { kind: &'static str, message: String },
}
