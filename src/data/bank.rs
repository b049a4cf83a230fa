//! Question bank resolution.
//!
//! The session consumes questions once at start; this is the boundary it
//! gets them from. A bank must tolerate unknown exam ids and empty
//! question lists; the start guard deals with the degenerate cases.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::models::{ExamDefinition, Question};

use super::loader::{validate_exam, LoadError};

/// Supplies exam definitions and their ordered questions by exam id.
pub trait QuestionBank {
    /// Resolve a full exam definition, or `None` for an unknown id.
    fn resolve_exam(&self, exam_id: &str) -> Option<ExamDefinition>;

    /// Resolve just the ordered question list. Empty for unknown ids.
    fn resolve_questions(&self, exam_id: &str) -> Vec<Question> {
        self.resolve_exam(exam_id)
            .map(|exam| exam.questions)
            .unwrap_or_default()
    }
}

/// A bank backed by a directory of exam JSON files, keyed by exam id.
pub struct JsonQuestionBank {
    exams: HashMap<String, ExamDefinition>,
}

impl JsonQuestionBank {
    /// Load every `.json` file in a directory as an exam definition.
    ///
    /// Files that fail to parse or validate are skipped with a warning so
    /// one broken file does not take the whole bank down.
    pub fn open_dir<P: AsRef<Path>>(dir: P) -> Result<Self, LoadError> {
        let mut exams = HashMap::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let text = fs::read_to_string(&path)?;
            let exam: ExamDefinition = match serde_json::from_str(&text) {
                Ok(exam) => exam,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unparseable exam file");
                    continue;
                }
            };
            if let Err(e) = validate_exam(&exam) {
                tracing::warn!(path = %path.display(), error = %e, "skipping invalid exam file");
                continue;
            }
            if exams.contains_key(&exam.id) {
                tracing::warn!(exam_id = %exam.id, "duplicate exam id; keeping the first one seen");
                continue;
            }
            exams.insert(exam.id.clone(), exam);
        }
        Ok(Self { exams })
    }

    /// Ids of every exam in the bank, unordered.
    pub fn exam_ids(&self) -> Vec<&str> {
        self.exams.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.exams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exams.is_empty()
    }
}

impl QuestionBank for JsonQuestionBank {
    fn resolve_exam(&self, exam_id: &str) -> Option<ExamDefinition> {
        self.exams.get(exam_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn write_exam(dir: &Path, id: &str, questions: usize) {
        let questions: Vec<Question> = (0..questions)
            .map(|i| Question {
                id: format!("q{}", i),
                text: format!("Question {}", i),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: "A".to_string(),
                explanation: None,
            })
            .collect();
        let exam = ExamDefinition {
            id: id.to_string(),
            title: format!("Exam {}", id),
            description: String::new(),
            duration_minutes: 5,
            questions,
        };
        let path = dir.join(format!("{}.json", id));
        fs::write(path, serde_json::to_string(&exam).unwrap()).unwrap();
    }

    fn temp_bank_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("exam-bank-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_bank_resolves_exams_by_id() {
        let dir = temp_bank_dir();
        write_exam(&dir, "algebra", 3);
        write_exam(&dir, "history", 2);

        let bank = JsonQuestionBank::open_dir(&dir).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.resolve_questions("algebra").len(), 3);
        assert_eq!(bank.resolve_exam("history").unwrap().title, "Exam history");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bank_tolerates_unknown_ids() {
        let dir = temp_bank_dir();
        let bank = JsonQuestionBank::open_dir(&dir).unwrap();
        assert!(bank.resolve_exam("missing").is_none());
        assert!(bank.resolve_questions("missing").is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bank_skips_broken_files() {
        let dir = temp_bank_dir();
        write_exam(&dir, "good", 1);
        fs::write(dir.join("broken.json"), "{ nope").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let bank = JsonQuestionBank::open_dir(&dir).unwrap();
        assert_eq!(bank.len(), 1);
        assert!(bank.resolve_exam("good").is_some());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bank_resolves_empty_question_lists() {
        let dir = temp_bank_dir();
        write_exam(&dir, "empty", 0);
        let bank = JsonQuestionBank::open_dir(&dir).unwrap();
        assert!(bank.resolve_questions("empty").is_empty());
        assert!(bank.resolve_exam("empty").is_some());
        let _ = fs::remove_dir_all(&dir);
    }
}
