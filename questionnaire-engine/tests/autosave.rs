//! Integration tests for debounced autosave
//!
//! All tests run on a paused clock, so the debounce window elapses only when
//! every task is idle and time is auto-advanced.

use std::sync::Arc;
use std::time::Duration;

use questionnaire_engine::{
    AutosaveScheduler, AutosaveStatus, EngineConfig, InMemoryBackend, ResponseSession,
};
use questionnaire_types::{
    AnswerRecord, AnswerValue, AnswersPayload, Question, QuestionId, QuestionType,
    QuestionnaireDefinition, QuestionnaireId, ResponseStatus,
};
use tokio::time::sleep;

const WINDOW: Duration = Duration::from_millis(1_000);

fn definition() -> QuestionnaireDefinition {
    QuestionnaireDefinition::new(
        "feedback",
        "Feedback",
        vec![
            Question::new("stars", 1, QuestionType::Rating, "How many stars?"),
            Question::new("comment", 2, QuestionType::FreeText, "Comment").optional(),
        ],
    )
}

fn id() -> QuestionnaireId {
    QuestionnaireId::from("feedback")
}

fn stars() -> QuestionId {
    QuestionId::from("stars")
}

async fn open(backend: &Arc<InMemoryBackend>) -> ResponseSession {
    ResponseSession::open(backend.clone(), &id(), &EngineConfig::default())
        .await
        .unwrap()
}

fn rating_of(payload: &AnswersPayload) -> Option<u8> {
    payload
        .answers
        .iter()
        .find(|record| record.question_id == stars())
        .and_then(|record| record.rating_answer)
}

#[tokio::test(start_paused = true)]
async fn test_rapid_changes_coalesce_into_one_write() {
    let backend = Arc::new(InMemoryBackend::new().with_questionnaire(definition()));
    let mut session = open(&backend).await;

    for value in 1..=5 {
        session
            .set_answer(&stars(), AnswerValue::rating(value).unwrap())
            .unwrap();
        sleep(Duration::from_millis(100)).await;
    }
    assert!(backend.saves(&id()).is_empty());

    sleep(WINDOW * 2).await;

    let saves = backend.saves(&id());
    assert_eq!(saves.len(), 1);
    assert_eq!(rating_of(&saves[0]), Some(5));
    assert_eq!(session.autosave_status(), Some(AutosaveStatus::Saved));
}

#[tokio::test(start_paused = true)]
async fn test_changes_further_apart_than_the_window_each_write() {
    let backend = Arc::new(InMemoryBackend::new().with_questionnaire(definition()));
    let mut session = open(&backend).await;

    session
        .set_answer(&stars(), AnswerValue::rating(2).unwrap())
        .unwrap();
    sleep(WINDOW * 2).await;
    session
        .set_answer(&stars(), AnswerValue::rating(3).unwrap())
        .unwrap();
    sleep(WINDOW * 2).await;

    let ratings: Vec<_> = backend.saves(&id()).iter().map(rating_of).collect();
    assert_eq!(ratings, vec![Some(2), Some(3)]);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_is_swallowed_and_next_change_saves() {
    let backend = Arc::new(
        InMemoryBackend::new()
            .with_questionnaire(definition())
            .fail_next_saves(1),
    );
    let mut session = open(&backend).await;

    session
        .set_answer(&stars(), AnswerValue::rating(4).unwrap())
        .unwrap();
    sleep(WINDOW * 2).await;
    assert!(backend.saves(&id()).is_empty());
    assert_eq!(session.autosave_status(), Some(AutosaveStatus::Failed));
    assert_eq!(session.status(), ResponseStatus::InProgress);

    session
        .set_answer(&stars(), AnswerValue::rating(5).unwrap())
        .unwrap();
    sleep(WINDOW * 2).await;
    let saves = backend.saves(&id());
    assert_eq!(saves.len(), 1);
    assert_eq!(rating_of(&saves[0]), Some(5));
}

#[tokio::test(start_paused = true)]
async fn test_completed_elsewhere_flips_session_to_completed() {
    let backend = Arc::new(InMemoryBackend::new().with_questionnaire(definition()));
    let mut session = open(&backend).await;

    // A second tab finishes the same response.
    backend.mark_completed(&id());

    session
        .set_answer(&stars(), AnswerValue::rating(3).unwrap())
        .unwrap();
    sleep(WINDOW * 2).await;

    assert_eq!(session.status(), ResponseStatus::Completed);
    assert_eq!(session.autosave_status(), Some(AutosaveStatus::Disabled));
    assert_eq!(session.visible_path().len(), session.graph().len());
    assert_eq!(session.sync(), ResponseStatus::Completed);
    assert!(session.set_answer(&stars(), AnswerValue::rating(1).unwrap()).is_err());
    assert!(backend.saves(&id()).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_no_writes_after_completion() {
    let backend = Arc::new(InMemoryBackend::new().with_questionnaire(definition()));
    let mut session = open(&backend).await;

    session
        .set_answer(&stars(), AnswerValue::rating(5).unwrap())
        .unwrap();
    // Submit inside the debounce window: the pending save must not fire.
    session.submit().await.unwrap();
    sleep(WINDOW * 3).await;

    assert!(backend.saves(&id()).is_empty());
    assert_eq!(backend.finalizations(&id()).len(), 1);
    assert_eq!(session.autosave_status(), Some(AutosaveStatus::Disabled));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_session_cancels_pending_save() {
    let backend = Arc::new(InMemoryBackend::new().with_questionnaire(definition()));
    let mut session = open(&backend).await;

    session
        .set_answer(&stars(), AnswerValue::rating(2).unwrap())
        .unwrap();
    drop(session);
    sleep(WINDOW * 3).await;

    assert!(backend.saves(&id()).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_cancel_is_terminal() {
    let backend = Arc::new(InMemoryBackend::new());
    let scheduler = AutosaveScheduler::spawn(backend.clone(), id(), WINDOW);
    let mut status = scheduler.subscribe();

    let mut record = AnswerRecord::empty(stars());
    record.rating_answer = Some(4);
    scheduler.schedule(AnswersPayload::new(vec![record.clone()]));
    scheduler.cancel();
    scheduler.schedule(AnswersPayload::new(vec![record]));
    sleep(WINDOW * 3).await;

    assert!(scheduler.is_disabled());
    assert_eq!(*status.borrow_and_update(), AutosaveStatus::Disabled);
    assert!(backend.saves(&id()).is_empty());
}

fn branching_definition() -> QuestionnaireDefinition {
    QuestionnaireDefinition::new(
        "feedback",
        "Feedback",
        vec![
            Question::new("joined", 1, QuestionType::SingleChoice, "Did you join the trip?")
                .with_option("yes", "Yes")
                .with_option("no", "No"),
            Question::new("trip", 2, QuestionType::FreeText, "How was the trip?")
                .depends_on("joined", "yes"),
        ],
    )
}

#[tokio::test(start_paused = true)]
async fn test_remote_completion_shows_every_question_before_sync() {
    let backend = Arc::new(InMemoryBackend::new().with_questionnaire(branching_definition()));
    let mut session = open(&backend).await;

    backend.mark_completed(&id());
    session
        .set_answer(&QuestionId::from("joined"), AnswerValue::choice(["no"]))
        .unwrap();
    sleep(WINDOW * 3).await;

    // Read-only accessors only; nothing has called `sync` yet.
    assert_eq!(session.status(), ResponseStatus::Completed);
    let visible: Vec<_> = session
        .visible_path()
        .iter()
        .map(|question| question.id().to_string())
        .collect();
    assert_eq!(visible, vec!["joined", "trip"]);
    assert_eq!(session.step(), (1, 2));
    assert_eq!(session.current_question().unwrap().id().as_str(), "joined");
}

#[tokio::test(start_paused = true)]
async fn test_submit_waits_for_in_flight_save() {
    let backend = Arc::new(
        InMemoryBackend::new()
            .with_questionnaire(definition())
            .with_save_latency(Duration::from_millis(500)),
    );
    let mut session = open(&backend).await;

    session
        .set_answer(&stars(), AnswerValue::rating(4).unwrap())
        .unwrap();
    // The save has started and is still waiting on the backend.
    sleep(WINDOW + Duration::from_millis(100)).await;
    assert_eq!(session.autosave_status(), Some(AutosaveStatus::Saving));

    session.submit().await.unwrap();

    // The save landed before finalize instead of being refused after it.
    assert_eq!(backend.saves(&id()).len(), 1);
    assert_eq!(backend.finalizations(&id()).len(), 1);
    assert!(backend.response(&id()).unwrap().completed);
    assert_eq!(session.status(), ResponseStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_failed_submit_drops_pending_save_and_reschedules() {
    let backend = Arc::new(
        InMemoryBackend::new()
            .with_questionnaire(definition())
            .fail_next_finalizations(1),
    );
    let mut session = open(&backend).await;

    session
        .set_answer(&stars(), AnswerValue::rating(3).unwrap())
        .unwrap();
    assert!(session.submit().await.is_err());
    assert_eq!(session.status(), ResponseStatus::InProgress);

    sleep(WINDOW * 2).await;
    let saves = backend.saves(&id());
    assert_eq!(saves.len(), 1);
    assert_eq!(rating_of(&saves[0]), Some(3));
    assert_eq!(session.autosave_status(), Some(AutosaveStatus::Saved));
}
