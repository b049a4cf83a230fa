//! Domain types shared across the engine: questions, exam definitions,
//! completed-attempt records and history entries.

mod exam;
mod question;
mod record;

pub use exam::ExamDefinition;
pub use question::{Question, MAX_OPTIONS, MIN_OPTIONS};
pub use record::{percentage, AnswerReview, CompletedAttemptRecord, HistoryEntry, ReviewStatus};
