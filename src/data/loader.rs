use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::models::ExamDefinition;

/// Error loading an exam from disk.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Read(io::Error),
    /// The file is not valid JSON for an exam definition.
    Parse(serde_json::Error),
    /// The exam parsed but violates an authoring rule.
    Invalid(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Read(e) => write!(f, "failed to read exam file: {}", e),
            LoadError::Parse(e) => write!(f, "failed to parse exam file: {}", e),
            LoadError::Invalid(msg) => write!(f, "invalid exam: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Read(e) => Some(e),
            LoadError::Parse(e) => Some(e),
            LoadError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Read(err)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err)
    }
}

/// Load and validate one exam definition from a JSON file.
pub fn load_exam_from_json<P: AsRef<Path>>(path: P) -> Result<ExamDefinition, LoadError> {
    let text = fs::read_to_string(path)?;
    let exam: ExamDefinition = serde_json::from_str(&text)?;
    validate_exam(&exam)?;
    Ok(exam)
}

/// Check the authoring rules for an exam.
///
/// Structural problems (empty id/title, zero duration, malformed options)
/// are rejected. A question whose correct answer is not among its options
/// is tolerated: it is logged here and scored as always-incorrect by the
/// session. An empty question list also loads fine; the session's start
/// guard reports it to the taker.
pub fn validate_exam(exam: &ExamDefinition) -> Result<(), LoadError> {
    if exam.id.trim().is_empty() {
        return Err(LoadError::Invalid("exam id must not be empty".to_string()));
    }
    if exam.title.trim().is_empty() {
        return Err(LoadError::Invalid("exam title must not be empty".to_string()));
    }
    if exam.duration_minutes == 0 {
        return Err(LoadError::Invalid(
            "duration_minutes must be positive".to_string(),
        ));
    }
    for question in &exam.questions {
        question.validate().map_err(LoadError::Invalid)?;
        if !question.is_scoreable() {
            tracing::warn!(
                exam_id = %exam.id,
                question_id = %question.id,
                "correct answer is not among the options"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn exam() -> ExamDefinition {
        ExamDefinition {
            id: "exam-1".to_string(),
            title: "Sample".to_string(),
            description: String::new(),
            duration_minutes: 10,
            questions: vec![Question {
                id: "q1".to_string(),
                text: "Pick A".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: "A".to_string(),
                explanation: None,
            }],
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_exam() {
        assert!(validate_exam(&exam()).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let mut exam = exam();
        exam.duration_minutes = 0;
        assert!(matches!(validate_exam(&exam), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut exam = exam();
        exam.title = "  ".to_string();
        assert!(validate_exam(&exam).is_err());
    }

    #[test]
    fn test_validate_tolerates_unscoreable_question() {
        let mut exam = exam();
        exam.questions[0].correct_answer = "Z".to_string();
        assert!(validate_exam(&exam).is_ok());
    }

    #[test]
    fn test_validate_accepts_empty_question_list() {
        let mut exam = exam();
        exam.questions.clear();
        assert!(validate_exam(&exam).is_ok());
    }

    #[test]
    fn test_load_round_trips_a_json_file() {
        let path = std::env::temp_dir().join(format!("exam-load-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, serde_json::to_string(&exam()).unwrap()).unwrap();

        let loaded = load_exam_from_json(&path).unwrap();
        assert_eq!(loaded.id, "exam-1");
        assert_eq!(loaded.questions.len(), 1);
        assert_eq!(loaded.questions[0].options, vec!["A", "B"]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = load_exam_from_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Read(_)));
    }

    #[test]
    fn test_load_reports_bad_json() {
        let path = std::env::temp_dir().join(format!("exam-bad-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_exam_from_json(&path), Err(LoadError::Parse(_))));
        let _ = fs::remove_file(&path);
    }
}
