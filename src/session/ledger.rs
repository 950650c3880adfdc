use std::collections::HashMap;

use serde::Serialize;

use crate::error::SessionError;
use crate::model::{AnswerValue, Question, QuestionKind};

/// One ledger slot. `answered` is derived: it is true exactly when the value
/// is non-empty. `marked` is an independent review flag.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub question_id: String,
    pub kind: QuestionKind,
    pub value: AnswerValue,
    pub answered: bool,
    pub marked: bool,
}

/// Per-question answer/mark store for one attempt. Sized once at
/// initialization from the session's question set; never grows or shrinks.
#[derive(Debug)]
pub struct AnswerLedger {
    entries: Vec<LedgerEntry>,
    index: HashMap<String, usize>,
    answered: usize,
    marked: usize,
}

impl AnswerLedger {
    pub fn new(questions: &[Question]) -> Self {
        let mut entries = Vec::with_capacity(questions.len());
        let mut index = HashMap::with_capacity(questions.len());
        for question in questions {
            index.insert(question.id.clone(), entries.len());
            entries.push(LedgerEntry {
                question_id: question.id.clone(),
                kind: question.kind(),
                value: AnswerValue::empty(question.kind()),
                answered: false,
                marked: false,
            });
        }
        Self { entries, index, answered: 0, marked: 0 }
    }

    /// Replace the answer for a question. The answered flag is recomputed
    /// from the new value alone.
    pub fn set_answer(&mut self, question_id: &str, value: AnswerValue) -> Result<(), SessionError> {
        let slot = self.slot_mut(question_id)?;
        if value.kind() != slot.kind {
            return Err(SessionError::AnswerShapeMismatch {
                question_id: question_id.to_string(),
                expected: slot.kind,
            });
        }

        let was_answered = slot.answered;
        slot.answered = !value.is_empty();
        slot.value = value;
        match (was_answered, slot.answered) {
            (false, true) => self.answered += 1,
            (true, false) => self.answered -= 1,
            _ => {}
        }
        Ok(())
    }

    /// Flip the marked-for-review flag; returns the new state.
    pub fn toggle_mark(&mut self, question_id: &str) -> Result<bool, SessionError> {
        let slot = self.slot_mut(question_id)?;
        slot.marked = !slot.marked;
        let marked = slot.marked;
        if marked {
            self.marked += 1;
        } else {
            self.marked -= 1;
        }
        Ok(marked)
    }

    pub fn get(&self, question_id: &str) -> Option<&LedgerEntry> {
        self.index.get(question_id).map(|&slot| &self.entries[slot])
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answered
    }

    pub fn marked_count(&self) -> usize {
        self.marked
    }

    pub fn unanswered_count(&self) -> usize {
        self.entries.len() - self.answered
    }

    fn slot_mut(&mut self, question_id: &str) -> Result<&mut LedgerEntry, SessionError> {
        match self.index.get(question_id) {
            Some(&slot) => Ok(&mut self.entries[slot]),
            None => {
                Err(SessionError::UnknownQuestion { question_id: question_id.to_string() })
            }
        }
    }
}
