//! # exam-session
//!
//! A timed exam session engine with a small command-line front-end.
//!
//! The library owns one attempt from start to finish: question
//! sequencing, answer recording, review flags, the countdown and the
//! final scoring. Persistence goes through an injected key-value store,
//! and the countdown through a cancellable ticker, so the engine itself
//! is pure state and fully testable without a front-end.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use exam_session::{Exam, ExamError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ExamError> {
//!     // Load an exam definition from a JSON file
//!     let exam = Exam::from_json("exam.json")?;
//!
//!     // Run one attempt in the terminal, persisting results
//!     exam.run("results.json").await?;
//!
//!     Ok(())
//! }
//! ```

mod data;
mod models;
mod session;
mod store;
mod timer;

use std::io;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};

pub use data::{load_exam_from_json, validate_exam, JsonQuestionBank, LoadError, QuestionBank};
pub use models::{
    percentage, AnswerReview, CompletedAttemptRecord, ExamDefinition, HistoryEntry, Question,
    ReviewStatus, MAX_OPTIONS, MIN_OPTIONS,
};
pub use session::{ExamSession, SessionSnapshot, SessionStatus, StartError};
pub use store::{
    JsonFileStore, KeyValueStore, MemoryStore, ResultStore, StoreError, HISTORY_LIMIT,
};
pub use timer::{SessionTimer, Tick};

/// Error type for exam operations.
#[derive(Debug)]
pub enum ExamError {
    /// Error loading the exam definition.
    Load(LoadError),
    /// Error talking to the result store.
    Store(StoreError),
    /// The session refused to start.
    Start(StartError),
    /// IO error while driving the attempt.
    Io(io::Error),
}

impl std::fmt::Display for ExamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExamError::Load(e) => write!(f, "Failed to load exam: {}", e),
            ExamError::Store(e) => write!(f, "Result store error: {}", e),
            ExamError::Start(e) => write!(f, "{}", e),
            ExamError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ExamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExamError::Load(e) => Some(e),
            ExamError::Store(e) => Some(e),
            ExamError::Start(e) => Some(e),
            ExamError::Io(e) => Some(e),
        }
    }
}

impl From<LoadError> for ExamError {
    fn from(err: LoadError) -> Self {
        ExamError::Load(err)
    }
}

impl From<StoreError> for ExamError {
    fn from(err: StoreError) -> Self {
        ExamError::Store(err)
    }
}

impl From<StartError> for ExamError {
    fn from(err: StartError) -> Self {
        ExamError::Start(err)
    }
}

impl From<io::Error> for ExamError {
    fn from(err: io::Error) -> Self {
        ExamError::Io(err)
    }
}

/// A loaded exam that can be attempted in the terminal.
pub struct Exam {
    definition: ExamDefinition,
}

impl Exam {
    /// Create an exam from an already-resolved definition.
    pub fn new(definition: ExamDefinition) -> Self {
        Self { definition }
    }

    /// Load an exam from a JSON file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use exam_session::Exam;
    ///
    /// let exam = Exam::from_json("exam.json").expect("Failed to load exam");
    /// ```
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, ExamError> {
        let definition = load_exam_from_json(path)?;
        Ok(Self::new(definition))
    }

    /// Get a reference to the underlying definition.
    pub fn definition(&self) -> &ExamDefinition {
        &self.definition
    }

    /// Run one attempt interactively, persisting the outcome to a JSON
    /// file store at `store_path`.
    pub async fn run<P: AsRef<Path>>(self, store_path: P) -> Result<(), ExamError> {
        let store = JsonFileStore::open(store_path)?;
        let mut results = ResultStore::new(store);
        run_session(self.definition, &mut results).await
    }
}

/// What a command did to the running session.
enum CommandOutcome {
    /// Keep going, nothing to redraw.
    Continue,
    /// Keep going and show the current question again.
    Redraw,
    /// The taker submitted; here is the scored record.
    Submitted(CompletedAttemptRecord),
    /// The taker abandoned the attempt.
    Quit,
}

/// Drive one attempt: commands from stdin multiplexed with timer ticks.
///
/// The timer handle is dropped on every path out of this function, so the
/// ticker never outlives the attempt.
async fn run_session<S: KeyValueStore>(
    definition: ExamDefinition,
    results: &mut ResultStore<S>,
) -> Result<(), ExamError> {
    let title = definition.title.clone();
    let mut session = ExamSession::new(definition);
    session.start()?;

    println!(
        "\n=== {} === {} questions, {} ===",
        title,
        session.total_questions(),
        format_clock(session.remaining_seconds())
    );
    println!("Type 'h' for help.\n");
    print_question(&session);

    let (timer, mut ticks) = SessionTimer::start();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    let record = loop {
        tokio::select! {
            tick = ticks.recv() => {
                if tick.is_none() {
                    // Ticker gone; treat like abandonment.
                    break None;
                }
                if let Some(record) = session.tick() {
                    println!("\nTime is up, submitting automatically.");
                    break Some(record);
                }
                if session.remaining_seconds() == 60 {
                    println!("\nOne minute remaining.");
                }
            }
            line = lines.next_line() => {
                match line? {
                    // stdin closed: abandon, persist nothing.
                    None => break None,
                    Some(line) => match handle_command(&mut session, line.trim()) {
                        CommandOutcome::Continue => {}
                        CommandOutcome::Redraw => print_question(&session),
                        CommandOutcome::Submitted(record) => break Some(record),
                        CommandOutcome::Quit => break None,
                    },
                }
            }
        }
    };
    timer.cancel();

    match record {
        Some(record) => {
            finish_attempt(&record, &title, results);
            Ok(())
        }
        None => {
            session.abandon();
            println!("Attempt abandoned; nothing was saved.");
            Ok(())
        }
    }
}

/// Apply one line command to the session.
fn handle_command(session: &mut ExamSession, line: &str) -> CommandOutcome {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => CommandOutcome::Redraw,
        Some("a") | Some("answer") => handle_answer(session, parts.next()),
        Some("f") | Some("flag") => {
            if let Some(id) = session.current_question().map(|q| q.id.clone()) {
                session.toggle_flag(&id);
                let state = if session.is_flagged(&id) { "flagged" } else { "unflagged" };
                println!("Question {} {}.", session.current_index() + 1, state);
            }
            CommandOutcome::Continue
        }
        Some("n") | Some("next") => {
            session.next();
            CommandOutcome::Redraw
        }
        Some("p") | Some("prev") => {
            session.previous();
            CommandOutcome::Redraw
        }
        Some("g") | Some("goto") => {
            match parts.next().and_then(|n| n.parse::<usize>().ok()) {
                Some(number) if number >= 1 => session.go_to(number - 1),
                _ => println!("Usage: g <question number>"),
            }
            CommandOutcome::Redraw
        }
        Some("r") | Some("review") => {
            print_overview(session);
            CommandOutcome::Continue
        }
        Some("s") | Some("submit") => match session.submit() {
            Some(record) => CommandOutcome::Submitted(record),
            None => CommandOutcome::Continue,
        },
        Some("q") | Some("quit") => CommandOutcome::Quit,
        Some("h") | Some("help") | Some("?") => {
            print_help();
            CommandOutcome::Continue
        }
        Some(other) => {
            println!("Unknown command '{}'. Type 'h' for help.", other);
            CommandOutcome::Continue
        }
    }
}

/// Record an answer for the current question and move on to the next one.
fn handle_answer(session: &mut ExamSession, arg: Option<&str>) -> CommandOutcome {
    let Some(question) = session.current_question().cloned() else {
        return CommandOutcome::Continue;
    };
    let Some(number) = arg.and_then(|n| n.parse::<usize>().ok()) else {
        println!("Usage: a <option number>");
        return CommandOutcome::Continue;
    };
    if number == 0 || number > question.options.len() {
        println!("Pick an option between 1 and {}.", question.options.len());
        return CommandOutcome::Continue;
    }
    session.select_answer(&question.id, &question.options[number - 1]);
    session.next();
    CommandOutcome::Redraw
}

/// Persist the outcome and show the summary.
///
/// A persistence failure degrades history continuity but never hides the
/// score the taker just earned.
fn finish_attempt<S: KeyValueStore>(
    record: &CompletedAttemptRecord,
    title: &str,
    results: &mut ResultStore<S>,
) {
    print_summary(record, title);

    if let Err(e) = results.save_attempt(record) {
        tracing::warn!(exam_id = %record.exam_id, error = %e, "failed to persist attempt record");
        println!("(warning: the attempt could not be saved)");
    }
    if let Err(e) = results.append_history(record.history_entry(title)) {
        tracing::warn!(exam_id = %record.exam_id, error = %e, "failed to append history entry");
    }

    print_history(&results.history());
}

fn print_question(session: &ExamSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    let flag = if session.is_flagged(&question.id) { " [flagged]" } else { "" };
    println!(
        "\nQuestion {}/{}{} ({} left)",
        session.current_index() + 1,
        session.total_questions(),
        flag,
        format_clock(session.remaining_seconds())
    );
    println!("{}", question.text);
    let selected = session.answer_for(&question.id);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(option.as_str()) { "*" } else { " " };
        println!("  {}{}. {}", marker, i + 1, option);
    }
}

fn print_overview(session: &ExamSession) {
    println!("\nProgress:");
    for (i, question) in session.questions().iter().enumerate() {
        let answered = if session.answer_for(&question.id).is_some() {
            "answered"
        } else {
            "-"
        };
        let flagged = if session.is_flagged(&question.id) { " [flagged]" } else { "" };
        println!("  {}. {}{}", i + 1, answered, flagged);
    }
    println!(
        "{} of {} answered, {} left",
        session.answered_count(),
        session.total_questions(),
        format_clock(session.remaining_seconds())
    );
}

fn print_summary(record: &CompletedAttemptRecord, title: &str) {
    println!("\n=== Results: {} ===", title);
    println!(
        "Score: {}/{} ({:.1}%), {} incorrect, {} unanswered",
        record.score,
        record.total_questions(),
        record.percentage(),
        record.incorrect_count,
        record.unanswered_count
    );

    for (i, review) in record.review().iter().enumerate() {
        let mark = match review.status {
            ReviewStatus::Correct => "+",
            ReviewStatus::Incorrect => "x",
            ReviewStatus::Unanswered => "-",
        };
        println!("\n {} {}. {}", mark, i + 1, review.question_text);
        match &review.selected {
            Some(answer) => println!("    your answer: {}", answer),
            None => println!("    not answered"),
        }
        if review.status != ReviewStatus::Correct {
            println!("    correct answer: {}", review.correct_answer);
        }
        if let Some(explanation) = &review.explanation {
            println!("    {}", explanation);
        }
    }
}

fn print_history(history: &[HistoryEntry]) {
    if history.is_empty() {
        return;
    }
    println!("\nRecent attempts:");
    for entry in history {
        println!(
            "  {}  {}  {}/{} ({:.1}%)",
            entry.completed_at.format("%Y-%m-%d %H:%M"),
            entry.title,
            entry.score,
            entry.total_questions,
            entry.percentage
        );
    }
}

fn print_help() {
    println!("Commands:");
    println!("  a <n>   answer the current question with option n");
    println!("  f       toggle the review flag on the current question");
    println!("  n / p   next / previous question");
    println!("  g <n>   go to question n");
    println!("  r       show progress overview");
    println!("  s       submit the attempt");
    println!("  q       quit without saving");
}

/// Format remaining seconds as mm:ss.
fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
