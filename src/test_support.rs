use std::sync::Arc;

use serde_json::Value;
use time::Duration;
use tokio::sync::mpsc;

use crate::core::config::Settings;
use crate::core::time::primitive_now_utc;
use crate::model::{ExamRecord, Question, QuestionRecord};
use crate::session::{ExamSessionController, SessionDeps, SessionEvent};
use crate::store::{DocumentStore, MemoryStore, NewResult};

pub(crate) fn question_record(
    id: &str,
    kind: &str,
    points: i64,
    options: &[&str],
    correct: Value,
) -> QuestionRecord {
    QuestionRecord {
        id: id.to_string(),
        exam_id: "e1".to_string(),
        text: format!("question {id}"),
        kind: kind.to_string(),
        points,
        options: options.iter().map(|option| option.to_string()).collect(),
        correct,
    }
}

pub(crate) fn question(
    id: &str,
    kind: &str,
    points: i64,
    options: &[&str],
    correct: Value,
) -> Question {
    Question::normalize(question_record(id, kind, points, options, correct)).expect("valid question")
}

/// One question of every kind, 40 points in total.
pub(crate) fn sample_questions() -> Vec<Question> {
    sample_question_records().into_iter().map(|record| Question::normalize(record).expect("valid question")).collect()
}

pub(crate) fn sample_question_records() -> Vec<QuestionRecord> {
    vec![
        question_record("q1", "singleChoice", 5, &["2", "3", "4"], serde_json::json!("4")),
        question_record("q2", "multipleChoice", 10, &["X", "Y", "Z"], serde_json::json!(["X", "Z"])),
        question_record("q3", "essay", 10, &[], Value::Null),
        question_record("q4", "matching", 8, &["L1", "L2", "R1", "R2"], serde_json::json!(["R1", "R2"])),
        question_record("q5", "ordering", 7, &["A", "B", "C"], serde_json::json!(["B", "A", "C"])),
    ]
}

pub(crate) fn exam_record(id: &str, duration_minutes: i64) -> ExamRecord {
    ExamRecord {
        id: id.to_string(),
        title: "Algebra midterm".to_string(),
        starts_at: primitive_now_utc() - Duration::minutes(5),
        duration_minutes,
        question_count: 5,
        passing_score: None,
    }
}

/// A store holding exam `e1` (60 minutes) with the sample question set.
pub(crate) fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_exam(exam_record("e1", 60));
    store.insert_questions("e1", sample_question_records());
    store
}

pub(crate) async fn insert_result(store: &MemoryStore, user_id: &str, exam_id: &str, percentage: u8) {
    store
        .create_result(NewResult {
            id: &format!("result-{user_id}-{exam_id}"),
            user_id,
            exam_id,
            percentage,
            answers: serde_json::json!([]),
            completed_at: primitive_now_utc(),
            passing_score: 50,
        })
        .await
        .expect("insert result");
}

pub(crate) async fn start_controller(
    store: Arc<MemoryStore>,
    user_id: &str,
) -> (ExamSessionController, mpsc::UnboundedReceiver<SessionEvent>) {
    let (events, rx) = mpsc::unbounded_channel();
    let controller = ExamSessionController::start(SessionDeps {
        store,
        user_id: user_id.to_string(),
        exam_id: "e1".to_string(),
        settings: Settings::default(),
        events,
    })
    .await
    .expect("start controller");
    (controller, rx)
}
