mod controller;
mod events;
mod guard;
mod latch;
mod ledger;
mod timer;

pub use controller::{
    ExamSessionController, SessionDeps, SessionPhase, SubmitOutcome, SubmitPrompt,
};
pub use events::{BlockReason, ResultSummary, SessionEvent};
pub use guard::SessionGuard;
pub use latch::{SubmitLatch, SubmitTrigger};
pub use ledger::{AnswerLedger, LedgerEntry};
pub use timer::{CountdownTimer, TimerEvent};
