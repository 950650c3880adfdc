//! Exam-taking session engine: question model, answer ledger, countdown
//! timer, session guard, scoring engine, and the controller driving one
//! student's attempt at one exam against an abstract document store.
//!
//! The hosting application owns routing, auth, and rendering. It constructs
//! an [`session::ExamSessionController`] with an injected
//! [`store::DocumentStore`], forwards user interaction to the controller, and
//! renders the [`session::SessionEvent`] stream it receives back.

pub mod core;
pub mod error;
pub mod model;
pub mod scoring;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::SessionError;
