//! Loading and resolving authored exams.

mod bank;
mod loader;

pub use bank::{JsonQuestionBank, QuestionBank};
pub use loader::{load_exam_from_json, validate_exam, LoadError};
