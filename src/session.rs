//! The timed exam session state machine.
//!
//! A session owns one attempt from start to finish: question sequencing,
//! answer recording, review flags, the countdown and the final scoring.
//! It is pure state plus transitions; the once-per-second tick is fed in
//! by the caller (see [`crate::timer::SessionTimer`]), so the whole
//! machine is testable with no front-end or runtime present.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{CompletedAttemptRecord, ExamDefinition, Question};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Created but not yet started; the countdown is not running.
    NotStarted,
    /// The attempt is live: answers mutable, countdown running.
    InProgress,
    /// Submitted (explicitly or by timer exhaustion). All state is frozen.
    Finished,
}

/// Why a session refused to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// The exam resolved to zero questions.
    NoQuestions,
    /// The exam definition carries a zero duration.
    ZeroDuration,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::NoQuestions => write!(f, "cannot start: exam has no questions"),
            StartError::ZeroDuration => write!(f, "cannot start: exam duration is zero"),
        }
    }
}

impl std::error::Error for StartError {}

/// A point-in-time view of the session for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub current_index: usize,
    pub remaining_seconds: u32,
    pub answers: HashMap<String, String>,
    pub flagged: HashSet<String>,
}

/// One attempt at one exam.
///
/// Sessions are single-use: a retake is a brand-new `ExamSession`. After
/// the finishing transition every mutating call is a silent no-op, which
/// makes a tick racing an explicit submit harmless; scoring runs exactly
/// once per session.
pub struct ExamSession {
    exam_id: String,
    title: String,
    duration_minutes: u32,
    questions: Vec<Question>,
    status: SessionStatus,
    current_index: usize,
    answers: HashMap<String, String>,
    flagged: HashSet<String>,
    remaining_seconds: u32,
}

impl ExamSession {
    /// Create a session in the `NotStarted` state.
    pub fn new(exam: ExamDefinition) -> Self {
        Self {
            exam_id: exam.id,
            title: exam.title,
            duration_minutes: exam.duration_minutes,
            questions: exam.questions,
            status: SessionStatus::NotStarted,
            current_index: 0,
            answers: HashMap::new(),
            flagged: HashSet::new(),
            remaining_seconds: 0,
        }
    }

    pub fn exam_id(&self) -> &str {
        &self.exam_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question currently shown, if the session has any questions.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// The taker's answer for a question, if any.
    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn is_flagged(&self, question_id: &str) -> bool {
        self.flagged.contains(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Begin the attempt: arm the countdown and reset all per-attempt state.
    ///
    /// Rejects empty exams and zero durations with a reported error rather
    /// than entering a countdown-less limbo. Duplicate question ids are
    /// tolerated by keeping the first occurrence. Starting an already
    /// started session is a no-op.
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.status != SessionStatus::NotStarted {
            return Ok(());
        }
        if self.questions.is_empty() {
            return Err(StartError::NoQuestions);
        }
        if self.duration_minutes == 0 {
            return Err(StartError::ZeroDuration);
        }

        self.dedup_questions();
        for question in &self.questions {
            if !question.is_scoreable() {
                tracing::warn!(
                    exam_id = %self.exam_id,
                    question_id = %question.id,
                    "correct answer is not among the options; question can never score"
                );
            }
        }

        self.remaining_seconds = self.duration_minutes * 60;
        self.current_index = 0;
        self.answers.clear();
        self.flagged.clear();
        self.status = SessionStatus::InProgress;
        tracing::info!(
            exam_id = %self.exam_id,
            questions = self.questions.len(),
            duration_minutes = self.duration_minutes,
            "session started"
        );
        Ok(())
    }

    /// Record an answer for a question; overwrites any prior answer.
    ///
    /// Ignored when the session is not in progress, when the question id is
    /// unknown, or when the option is not one of that question's choices.
    pub fn select_answer(&mut self, question_id: &str, option: &str) {
        if self.status != SessionStatus::InProgress {
            return;
        }
        let Some(question) = self.questions.iter().find(|q| q.id == question_id) else {
            tracing::warn!(question_id, "answer for unknown question ignored");
            return;
        };
        if !question.has_option(option) {
            tracing::warn!(question_id, option, "answer is not one of the options; ignored");
            return;
        }
        self.answers.insert(question_id.to_string(), option.to_string());
    }

    /// Invert the review flag on a question. Flags are advisory only and
    /// never affect scoring.
    pub fn toggle_flag(&mut self, question_id: &str) {
        if self.status != SessionStatus::InProgress {
            return;
        }
        if !self.questions.iter().any(|q| q.id == question_id) {
            tracing::warn!(question_id, "flag for unknown question ignored");
            return;
        }
        if !self.flagged.remove(question_id) {
            self.flagged.insert(question_id.to_string());
        }
    }

    /// Jump to a question by index; out-of-range requests are clamped.
    pub fn go_to(&mut self, index: usize) {
        if self.status != SessionStatus::InProgress {
            return;
        }
        self.current_index = index.min(self.questions.len() - 1);
    }

    /// Step forward one question, saturating at the last one.
    pub fn next(&mut self) {
        if self.status != SessionStatus::InProgress {
            return;
        }
        self.current_index = (self.current_index + 1).min(self.questions.len() - 1);
    }

    /// Step back one question, saturating at the first one.
    pub fn previous(&mut self) {
        if self.status != SessionStatus::InProgress {
            return;
        }
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Advance the countdown by one elapsed second.
    ///
    /// When the countdown is already exhausted the attempt is submitted
    /// automatically and the record is returned. Ticks after the finishing
    /// transition are no-ops.
    pub fn tick(&mut self) -> Option<CompletedAttemptRecord> {
        if self.status != SessionStatus::InProgress {
            return None;
        }
        if self.remaining_seconds == 0 {
            tracing::info!(exam_id = %self.exam_id, "time expired, forcing submission");
            return self.submit();
        }
        self.remaining_seconds -= 1;
        None
    }

    /// Finish the attempt and score it.
    ///
    /// Returns the record exactly once; a second call (or a tick racing an
    /// explicit submit) returns `None`. After this the session is frozen.
    pub fn submit(&mut self) -> Option<CompletedAttemptRecord> {
        if self.status != SessionStatus::InProgress {
            return None;
        }
        let (score, incorrect_count, unanswered_count) = self.score_answers();
        self.status = SessionStatus::Finished;
        tracing::info!(
            exam_id = %self.exam_id,
            score,
            incorrect_count,
            unanswered_count,
            "session submitted"
        );
        Some(CompletedAttemptRecord {
            attempt_id: Uuid::new_v4(),
            exam_id: self.exam_id.clone(),
            questions: self.questions.clone(),
            answers: self.answers.clone(),
            score,
            incorrect_count,
            unanswered_count,
            completed_at: Utc::now(),
        })
    }

    /// Discard the attempt without producing a record.
    ///
    /// Consumes the session; nothing is persisted for an abandoned attempt.
    pub fn abandon(self) {
        tracing::info!(exam_id = %self.exam_id, "session abandoned");
    }

    /// A cloned view of the mutable state, for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            current_index: self.current_index,
            remaining_seconds: self.remaining_seconds,
            answers: self.answers.clone(),
            flagged: self.flagged.clone(),
        }
    }

    /// Classify every question exactly once: correct, incorrect or
    /// unanswered. Comparison is exact string equality, case-sensitive and
    /// untrimmed, so an unscoreable question is naturally always-incorrect.
    fn score_answers(&self) -> (usize, usize, usize) {
        let mut score = 0;
        let mut incorrect = 0;
        let mut unanswered = 0;
        for question in &self.questions {
            match self.answers.get(&question.id) {
                None => unanswered += 1,
                Some(answer) if *answer == question.correct_answer => score += 1,
                Some(_) => incorrect += 1,
            }
        }
        (score, incorrect, unanswered)
    }

    /// Keep the first occurrence of each question id, dropping later ones.
    fn dedup_questions(&mut self) {
        let mut seen = HashSet::new();
        let before = self.questions.len();
        self.questions.retain(|q| seen.insert(q.id.clone()));
        if self.questions.len() < before {
            tracing::warn!(
                exam_id = %self.exam_id,
                dropped = before - self.questions.len(),
                "duplicate question ids dropped (first occurrence kept)"
            );
        }
    }
}
