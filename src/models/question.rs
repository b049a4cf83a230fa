use serde::{Deserialize, Serialize};

/// Minimum number of answer choices a question may carry.
pub const MIN_OPTIONS: usize = 2;
/// Maximum number of answer choices a question may carry.
pub const MAX_OPTIONS: usize = 5;

/// A single multiple-choice question.
///
/// Questions are authored externally and never mutated by a session. The
/// order of `options` is significant and is preserved verbatim from
/// authoring through post-exam review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the exam.
    pub id: String,
    /// The prompt shown to the taker.
    pub text: String,
    /// Ordered answer choices (2-5 distinct, non-empty strings).
    pub options: Vec<String>,
    /// The correct choice; must exactly match one member of `options`.
    pub correct_answer: String,
    /// Optional explanation shown during review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Whether the question can ever score: its correct answer is actually
    /// one of its options. An unscoreable question is tolerated by the
    /// engine and simply never matches a submitted answer.
    pub fn is_scoreable(&self) -> bool {
        self.options.iter().any(|o| o == &self.correct_answer)
    }

    /// Whether `option` is one of this question's choices.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Check the structural authoring rules.
    ///
    /// A broken correct-answer reference is deliberately not an error here
    /// (see [`Question::is_scoreable`]); only shapes the engine cannot work
    /// with at all are rejected.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("question id must not be empty".to_string());
        }
        if self.text.trim().is_empty() {
            return Err(format!("question {}: text must not be empty", self.id));
        }
        if self.options.len() < MIN_OPTIONS || self.options.len() > MAX_OPTIONS {
            return Err(format!(
                "question {}: expected {}-{} options, got {}",
                self.id,
                MIN_OPTIONS,
                MAX_OPTIONS,
                self.options.len()
            ));
        }
        if self.options.iter().any(|o| o.is_empty()) {
            return Err(format!("question {}: options must not be empty", self.id));
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return Err(format!("question {}: duplicate option {:?}", self.id, option));
            }
        }
        Ok(())
    }
}
