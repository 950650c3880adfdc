//! Pure scoring engine. Borrows the questions and the final ledger, returns
//! per-question correctness plus the aggregate score; no I/O, no mutation.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{AnswerValue, Question, QuestionKind, QuestionSpec};
use crate::session::AnswerLedger;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionScore {
    pub question_id: String,
    pub kind: QuestionKind,
    pub correct: bool,
    pub points_awarded: u32,
    pub points_possible: u32,
    pub needs_manual_grading: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub per_question: Vec<QuestionScore>,
    pub total_points: u32,
    pub max_points: u32,
    pub percentage: u8,
}

impl ScoreSummary {
    pub fn passed(&self, threshold: u8) -> bool {
        self.percentage >= threshold
    }
}

/// Score every question all-or-nothing. Essays are never auto-scored: they
/// award 0 points, stay in the denominator, and are flagged for manual
/// grading, so an essay-heavy exam's automatic percentage is a floor.
pub fn score(questions: &[Question], ledger: &AnswerLedger) -> ScoreSummary {
    let mut per_question = Vec::with_capacity(questions.len());
    let mut total_points = 0u32;
    let mut max_points = 0u32;

    for question in questions {
        let answer = ledger.get(&question.id).map(|entry| &entry.value);
        let needs_manual_grading = question.kind() == QuestionKind::Essay;
        let correct = match answer {
            Some(value) => is_correct(&question.spec, value),
            None => false,
        };

        let points_awarded = if correct { question.points } else { 0 };
        total_points += points_awarded;
        max_points += question.points;

        per_question.push(QuestionScore {
            question_id: question.id.clone(),
            kind: question.kind(),
            correct,
            points_awarded,
            points_possible: question.points,
            needs_manual_grading,
        });
    }

    let percentage = if max_points > 0 {
        ((total_points as f64 / max_points as f64) * 100.0).round() as u8
    } else {
        0
    };

    ScoreSummary { per_question, total_points, max_points, percentage }
}

fn is_correct(spec: &QuestionSpec, answer: &AnswerValue) -> bool {
    match (spec, answer) {
        (QuestionSpec::SingleChoice { correct, .. }, AnswerValue::SingleChoice(choice)) => {
            !choice.is_empty() && choice == correct
        }
        (QuestionSpec::MultipleChoice { correct, .. }, AnswerValue::MultipleChoice(choices)) => {
            // Set equality: same members, any order, no extras, no omissions.
            let chosen: BTreeSet<&str> = choices.iter().map(String::as_str).collect();
            let expected: BTreeSet<&str> = correct.iter().map(String::as_str).collect();
            !expected.is_empty() && chosen == expected
        }
        (QuestionSpec::Matching { correct, .. }, AnswerValue::Matching(sequence))
        | (QuestionSpec::Ordering { correct, .. }, AnswerValue::Ordering(sequence)) => {
            !correct.is_empty() && sequence == correct
        }
        (QuestionSpec::Essay, AnswerValue::Essay(_)) => false,
        // A kind mismatch can never match a correct answer.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerValue;
    use crate::session::AnswerLedger;
    use crate::test_support::{question, sample_questions};

    #[test]
    fn unanswered_exam_scores_zero() {
        let questions = sample_questions();
        let ledger = AnswerLedger::new(&questions);
        let summary = score(&questions, &ledger);
        assert_eq!(summary.total_points, 0);
        assert_eq!(summary.percentage, 0);
        assert!(summary.per_question.iter().all(|result| !result.correct));
    }

    #[test]
    fn example_exam_scores_one_hundred() {
        // Q1 singleChoice correct "4" worth 5, Q2 multipleChoice correct
        // {"X","Z"} worth 10; answering both correctly yields 15/15.
        let questions = vec![
            question("q1", "singleChoice", 5, &["2", "3", "4"], serde_json::json!("4")),
            question("q2", "multipleChoice", 10, &["X", "Y", "Z"], serde_json::json!(["X", "Z"])),
        ];
        let mut ledger = AnswerLedger::new(&questions);
        ledger.set_answer("q1", AnswerValue::SingleChoice("4".to_string())).unwrap();
        ledger
            .set_answer("q2", AnswerValue::MultipleChoice(vec!["Z".to_string(), "X".to_string()]))
            .unwrap();

        let summary = score(&questions, &ledger);
        assert_eq!(summary.total_points, 15);
        assert_eq!(summary.max_points, 15);
        assert_eq!(summary.percentage, 100);
        assert!(summary.per_question.iter().all(|result| result.correct));
    }

    #[test]
    fn scoring_is_deterministic() {
        let questions = sample_questions();
        let mut ledger = AnswerLedger::new(&questions);
        ledger.set_answer("q1", AnswerValue::SingleChoice("4".to_string())).unwrap();
        assert_eq!(score(&questions, &ledger), score(&questions, &ledger));
    }

    #[test]
    fn multiple_choice_is_order_insensitive_but_exact() {
        let questions =
            vec![question("q", "multipleChoice", 10, &["A", "B", "C"], serde_json::json!(["A", "B"]))];
        let mut ledger = AnswerLedger::new(&questions);

        ledger
            .set_answer("q", AnswerValue::MultipleChoice(vec!["B".to_string(), "A".to_string()]))
            .unwrap();
        assert!(score(&questions, &ledger).per_question[0].correct);

        // An extra member breaks set equality.
        ledger
            .set_answer(
                "q",
                AnswerValue::MultipleChoice(vec!["A".to_string(), "B".to_string(), "C".to_string()]),
            )
            .unwrap();
        assert!(!score(&questions, &ledger).per_question[0].correct);

        // So does an omission.
        ledger.set_answer("q", AnswerValue::MultipleChoice(vec!["A".to_string()])).unwrap();
        assert!(!score(&questions, &ledger).per_question[0].correct);
    }

    #[test]
    fn ordering_is_order_sensitive() {
        let questions =
            vec![question("q", "ordering", 5, &["A", "B"], serde_json::json!(["B", "A"]))];
        let mut ledger = AnswerLedger::new(&questions);

        ledger
            .set_answer("q", AnswerValue::Ordering(vec!["A".to_string(), "B".to_string()]))
            .unwrap();
        assert!(!score(&questions, &ledger).per_question[0].correct);

        ledger
            .set_answer("q", AnswerValue::Ordering(vec!["B".to_string(), "A".to_string()]))
            .unwrap();
        assert!(score(&questions, &ledger).per_question[0].correct);
    }

    #[test]
    fn matching_requires_full_sequence() {
        let questions = vec![question(
            "q",
            "matching",
            8,
            &["L1", "L2", "R1", "R2"],
            serde_json::json!(["R1", "R2"]),
        )];
        let mut ledger = AnswerLedger::new(&questions);

        // Length mismatch is incorrect even when the prefix matches.
        ledger.set_answer("q", AnswerValue::Matching(vec!["R1".to_string()])).unwrap();
        assert!(!score(&questions, &ledger).per_question[0].correct);

        ledger
            .set_answer("q", AnswerValue::Matching(vec!["R1".to_string(), "R2".to_string()]))
            .unwrap();
        assert!(score(&questions, &ledger).per_question[0].correct);
    }

    #[test]
    fn essay_always_needs_manual_grading() {
        let questions = vec![
            question("q1", "essay", 10, &[], serde_json::Value::Null),
            question("q2", "singleChoice", 10, &["a", "b"], serde_json::json!("a")),
        ];
        let mut ledger = AnswerLedger::new(&questions);
        ledger
            .set_answer("q1", AnswerValue::Essay("a thorough treatise".to_string()))
            .unwrap();
        ledger.set_answer("q2", AnswerValue::SingleChoice("a".to_string())).unwrap();

        let summary = score(&questions, &ledger);
        let essay = &summary.per_question[0];
        assert!(essay.needs_manual_grading);
        assert!(!essay.correct);
        assert_eq!(essay.points_awarded, 0);
        // Essay points stay in the denominator: 10/20.
        assert_eq!(summary.max_points, 20);
        assert_eq!(summary.percentage, 50);
    }

    #[test]
    fn correct_answer_outside_options_never_matches() {
        let questions =
            vec![question("q", "singleChoice", 5, &["1", "2"], serde_json::json!("42"))];
        let mut ledger = AnswerLedger::new(&questions);
        ledger.set_answer("q", AnswerValue::SingleChoice("1".to_string())).unwrap();
        assert!(!score(&questions, &ledger).per_question[0].correct);
        // Even literally answering the stray value only matches by equality,
        // which is the documented "never matchable within options" behavior.
        ledger.set_answer("q", AnswerValue::SingleChoice("42".to_string())).unwrap();
        assert!(score(&questions, &ledger).per_question[0].correct);
    }

    #[test]
    fn percentage_rounds_to_nearest_integer() {
        let questions = vec![
            question("q1", "singleChoice", 1, &["a", "b"], serde_json::json!("a")),
            question("q2", "singleChoice", 1, &["a", "b"], serde_json::json!("a")),
            question("q3", "singleChoice", 1, &["a", "b"], serde_json::json!("a")),
        ];
        let mut ledger = AnswerLedger::new(&questions);
        ledger.set_answer("q1", AnswerValue::SingleChoice("a".to_string())).unwrap();
        // 1/3 => 33.33 => 33
        assert_eq!(score(&questions, &ledger).percentage, 33);
        ledger.set_answer("q2", AnswerValue::SingleChoice("a".to_string())).unwrap();
        // 2/3 => 66.67 => 67
        assert_eq!(score(&questions, &ledger).percentage, 67);
    }
}
