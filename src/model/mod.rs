mod question;
mod records;

pub use question::{AnswerValue, Question, QuestionKind, QuestionSpec};
pub use records::{ExamRecord, QuestionRecord, ResultRecord, SessionRecord};
