//! Persisted outcome of a finished attempt and the derived review view.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Question;

/// The scored outcome of one finished attempt.
///
/// Carries a snapshot of the questions as they were at submission time, so
/// the review screen stays correct even if the question bank is edited
/// afterwards. Invariant: `score + incorrect_count + unanswered_count`
/// equals `questions.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedAttemptRecord {
    /// Unique identifier of this attempt.
    pub attempt_id: Uuid,
    /// The exam this attempt belongs to.
    pub exam_id: String,
    /// Snapshot of the questions at submission time.
    pub questions: Vec<Question>,
    /// Copy of the taker's answers (question id -> selected option).
    pub answers: HashMap<String, String>,
    /// Number of correct answers.
    pub score: usize,
    /// Number of answered-but-wrong questions.
    pub incorrect_count: usize,
    /// Number of questions left blank.
    pub unanswered_count: usize,
    /// When the attempt was submitted.
    pub completed_at: DateTime<Utc>,
}

impl CompletedAttemptRecord {
    /// Total number of questions in the attempt.
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Score as a percentage, rounded to one decimal place.
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.questions.len())
    }

    /// The compact summary entry appended to the attempt history.
    pub fn history_entry(&self, title: &str) -> HistoryEntry {
        HistoryEntry {
            exam_id: self.exam_id.clone(),
            title: title.to_string(),
            completed_at: self.completed_at,
            score: self.score,
            total_questions: self.questions.len(),
            percentage: self.percentage(),
        }
    }

    /// Derive the per-question review view.
    ///
    /// A pure function of the record: each question is classified as
    /// correct, incorrect or unanswered, in authoring order.
    pub fn review(&self) -> Vec<AnswerReview> {
        self.questions
            .iter()
            .map(|question| {
                let selected = self.answers.get(&question.id).cloned();
                let status = match &selected {
                    None => ReviewStatus::Unanswered,
                    Some(answer) if *answer == question.correct_answer => ReviewStatus::Correct,
                    Some(_) => ReviewStatus::Incorrect,
                };
                AnswerReview {
                    question_id: question.id.clone(),
                    question_text: question.text.clone(),
                    options: question.options.clone(),
                    selected,
                    correct_answer: question.correct_answer.clone(),
                    explanation: question.explanation.clone(),
                    status,
                }
            })
            .collect()
    }
}

/// Percentage of `score` out of `total`, rounded to one decimal place.
/// Returns 0.0 for an empty total (unreachable past the start guard).
pub fn percentage(score: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (score as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Classification of one question in a reviewed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    Correct,
    Incorrect,
    Unanswered,
}

/// Review data for a single question of a finished attempt.
#[derive(Debug, Clone)]
pub struct AnswerReview {
    pub question_id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub status: ReviewStatus,
}

/// A compact summary of one finished attempt, kept in a bounded
/// most-recent-first list for trend display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub exam_id: String,
    pub title: String,
    pub completed_at: DateTime<Utc>,
    pub score: usize,
    pub total_questions: usize,
    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CompletedAttemptRecord {
        let questions = vec![
            Question {
                id: "q1".to_string(),
                text: "Pick A".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: "A".to_string(),
                explanation: Some("A was right".to_string()),
            },
            Question {
                id: "q2".to_string(),
                text: "Pick B".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: "B".to_string(),
                explanation: None,
            },
            Question {
                id: "q3".to_string(),
                text: "Pick C".to_string(),
                options: vec!["C".to_string(), "D".to_string()],
                correct_answer: "C".to_string(),
                explanation: None,
            },
        ];
        let mut answers = HashMap::new();
        answers.insert("q1".to_string(), "A".to_string());
        answers.insert("q2".to_string(), "A".to_string());

        CompletedAttemptRecord {
            attempt_id: Uuid::new_v4(),
            exam_id: "exam-1".to_string(),
            questions,
            answers,
            score: 1,
            incorrect_count: 1,
            unanswered_count: 1,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(3, 3), 100.0);
        assert_eq!(percentage(0, 2), 0.0);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn test_review_classifies_each_question() {
        let review = record().review();
        assert_eq!(review.len(), 3);
        assert_eq!(review[0].status, ReviewStatus::Correct);
        assert_eq!(review[1].status, ReviewStatus::Incorrect);
        assert_eq!(review[2].status, ReviewStatus::Unanswered);
        assert_eq!(review[2].selected, None);
    }

    #[test]
    fn test_review_preserves_option_order() {
        let review = record().review();
        assert_eq!(review[0].options, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(review[2].options, vec!["C".to_string(), "D".to_string()]);
    }

    #[test]
    fn test_history_entry_summarizes_the_record() {
        let record = record();
        let entry = record.history_entry("Sample Exam");
        assert_eq!(entry.exam_id, "exam-1");
        assert_eq!(entry.title, "Sample Exam");
        assert_eq!(entry.score, 1);
        assert_eq!(entry.total_questions, 3);
        assert_eq!(entry.percentage, 33.3);
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = record();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: CompletedAttemptRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.attempt_id, record.attempt_id);
        assert_eq!(parsed.score, 1);
        assert_eq!(parsed.questions.len(), 3);
        assert_eq!(parsed.questions[0].options, record.questions[0].options);
        assert_eq!(parsed.answers, record.answers);
    }
}
