use serde::{Deserialize, Serialize};

use super::Question;

/// An authored exam: display metadata, the allotted time and the ordered
/// question list. Read-only input to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamDefinition {
    /// Unique exam identifier.
    pub id: String,
    /// Title shown to the taker and recorded in history entries.
    pub title: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Total allotted time; must be positive.
    pub duration_minutes: u32,
    /// Ordered questions. May be empty, in which case a session refuses
    /// to start.
    #[serde(default)]
    pub questions: Vec<Question>,
}
