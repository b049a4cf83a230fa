//! End-to-end attempt flow over the public API: resolve an exam, run a
//! session, persist the record and the history entry, read them back.

use exam_session::{
    ExamDefinition, ExamSession, MemoryStore, Question, ResultStore, ReviewStatus, SessionStatus,
    StartError, HISTORY_LIMIT,
};

fn question(id: &str, correct: &str) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {}", id),
        options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        correct_answer: correct.to_string(),
        explanation: Some(format!("{} was the answer", correct)),
    }
}

fn definition(questions: Vec<Question>) -> ExamDefinition {
    ExamDefinition {
        id: "algebra-1".to_string(),
        title: "Algebra Basics".to_string(),
        description: "Practice exam".to_string(),
        duration_minutes: 30,
        questions,
    }
}

#[test]
fn full_attempt_round_trips_through_the_store() {
    let exam = definition(vec![
        question("q1", "A"),
        question("q2", "B"),
        question("q3", "C"),
    ]);
    let title = exam.title.clone();

    let mut session = ExamSession::new(exam);
    session.start().unwrap();
    session.select_answer("q1", "A");
    session.next();
    session.select_answer("q2", "A");
    session.toggle_flag("q3");

    let record = session.submit().expect("one record per attempt");
    assert!(session.submit().is_none());
    assert_eq!(record.score, 1);
    assert_eq!(record.incorrect_count, 1);
    assert_eq!(record.unanswered_count, 1);
    assert_eq!(record.percentage(), 33.3);
    assert_eq!(session.status(), SessionStatus::Finished);

    let mut results = ResultStore::new(MemoryStore::new());
    results.save_attempt(&record).unwrap();
    results.append_history(record.history_entry(&title)).unwrap();

    // The review screen works purely off the persisted record, even if the
    // question bank changes afterwards.
    let loaded = results.load_attempt("algebra-1").expect("persisted record");
    assert_eq!(loaded.attempt_id, record.attempt_id);
    let review = loaded.review();
    assert_eq!(review[0].status, ReviewStatus::Correct);
    assert_eq!(review[1].status, ReviewStatus::Incorrect);
    assert_eq!(review[2].status, ReviewStatus::Unanswered);
    assert_eq!(review[0].options, vec!["A", "B", "C"]);
    assert_eq!(review[0].explanation.as_deref(), Some("A was the answer"));

    let history = results.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "Algebra Basics");
    assert_eq!(history[0].percentage, 33.3);
}

#[test]
fn repeated_attempts_keep_history_bounded() {
    let mut results = ResultStore::new(MemoryStore::new());

    for attempt in 0..HISTORY_LIMIT + 3 {
        let mut exam = definition(vec![question("q1", "A")]);
        exam.title = format!("Attempt {}", attempt);
        let title = exam.title.clone();

        let mut session = ExamSession::new(exam);
        session.start().unwrap();
        session.select_answer("q1", "A");
        let record = session.submit().unwrap();

        results.save_attempt(&record).unwrap();
        results.append_history(record.history_entry(&title)).unwrap();
    }

    let history = results.history();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0].title, format!("Attempt {}", HISTORY_LIMIT + 2));
    assert_eq!(history[HISTORY_LIMIT - 1].title, "Attempt 3");
}

#[test]
fn abandoned_attempt_persists_nothing() {
    let exam = definition(vec![question("q1", "A")]);
    let mut session = ExamSession::new(exam);
    session.start().unwrap();
    session.select_answer("q1", "A");
    session.abandon();

    let results = ResultStore::new(MemoryStore::new());
    assert!(results.load_attempt("algebra-1").is_none());
    assert!(results.history().is_empty());
}

#[test]
fn empty_exam_reports_instead_of_starting() {
    let exam = definition(vec![]);
    let mut session = ExamSession::new(exam);
    assert_eq!(session.start(), Err(StartError::NoQuestions));
    assert_eq!(session.status(), SessionStatus::NotStarted);
    assert!(session.submit().is_none());
}

#[test]
fn timer_exhaustion_forces_a_single_submission() {
    let mut exam = definition(vec![question("q1", "A"), question("q2", "B")]);
    exam.duration_minutes = 1;
    let mut session = ExamSession::new(exam);
    session.start().unwrap();

    let mut records = Vec::new();
    for _ in 0..120 {
        if let Some(record) = session.tick() {
            records.push(record);
        }
    }

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].score, 0);
    assert_eq!(records[0].unanswered_count, 2);
}
