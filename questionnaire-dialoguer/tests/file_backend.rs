//! Integration tests for the JSON file backend

use std::sync::Arc;

use questionnaire_dialoguer::{FileBackend, review_lines};
use questionnaire_engine::{EngineConfig, ResponseSession, SubmitOutcome};
use questionnaire_types::{
    AnswerValue, AnswersPayload, BackendError, Question, QuestionId, QuestionType,
    QuestionnaireBackend, QuestionnaireDefinition, QuestionnaireId, ResponseStatus, SavedResponse,
};
use tempfile::TempDir;

fn definition() -> QuestionnaireDefinition {
    QuestionnaireDefinition::new(
        "club-night",
        "Club night",
        vec![
            Question::new("came", 1, QuestionType::SingleChoice, "Did you come to club night?")
                .with_option("yes", "Yes")
                .with_option("no", "No"),
            Question::new("fun", 2, QuestionType::Rating, "How much fun was it?")
                .depends_on("came", "yes"),
        ],
    )
}

fn id() -> QuestionnaireId {
    QuestionnaireId::from("club-night")
}

fn setup() -> (TempDir, FileBackend) {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("club-night.json"),
        serde_json::to_vec(&definition()).unwrap(),
    )
    .unwrap();
    let backend = FileBackend::new(dir.path()).with_reward_message("+5 club points");
    (dir, backend)
}

fn read_response(dir: &TempDir) -> SavedResponse {
    let bytes = std::fs::read(dir.path().join("club-night.response.json")).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_fetch_without_response() {
    let (_dir, backend) = setup();

    let fetched = backend.fetch(&id()).await.unwrap();
    assert_eq!(fetched.definition, definition());
    assert!(fetched.response.is_none());
}

#[tokio::test]
async fn test_fetch_unknown_questionnaire() {
    let (_dir, backend) = setup();

    let err = backend.fetch(&"missing".into()).await.unwrap_err();
    assert!(matches!(err, BackendError::NotFound(_)));
}

#[tokio::test]
async fn test_save_then_finalize_then_reject() {
    let (dir, backend) = setup();
    let payload = AnswersPayload::default();

    backend.save_progress(&id(), &payload).await.unwrap();
    assert!(!read_response(&dir).completed);

    let receipt = backend.finalize(&id(), &payload).await.unwrap();
    assert_eq!(receipt.reward_message.as_deref(), Some("+5 club points"));
    assert!(read_response(&dir).completed);

    let err = backend.save_progress(&id(), &payload).await.unwrap_err();
    assert!(err.is_already_completed());
    let err = backend.finalize(&id(), &payload).await.unwrap_err();
    assert!(err.is_already_completed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_save_never_reopens_finalized_response() {
    let (dir, backend) = setup();
    let response_path = dir.path().join("club-night.response.json");

    for round in 0..100 {
        let _ = std::fs::remove_file(&response_path);

        let saver = backend.clone();
        let save = tokio::spawn(async move {
            saver.save_progress(&id(), &AnswersPayload::default()).await
        });
        let finalizer = backend.clone();
        let finalize = tokio::spawn(async move {
            finalizer.finalize(&id(), &AnswersPayload::default()).await
        });
        let (save, finalize) = (save.await.unwrap(), finalize.await.unwrap());

        assert!(finalize.is_ok(), "round {round}: finalize failed");
        assert!(read_response(&dir).completed, "round {round}: response reopened");
        // The save either went first or was refused.
        if let Err(err) = save {
            assert!(err.is_already_completed(), "round {round}: {err}");
        }
    }
}

#[tokio::test]
async fn test_writes_leave_no_staging_file() {
    let (dir, backend) = setup();

    backend
        .save_progress(&id(), &AnswersPayload::default())
        .await
        .unwrap();

    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["club-night.json", "club-night.response.json"]);
}

#[tokio::test]
async fn test_session_round_trip_through_files() {
    let (dir, backend) = setup();
    let backend = Arc::new(backend);
    let config = EngineConfig::default().without_autosave();

    let mut session = ResponseSession::open(backend.clone(), &id(), &config)
        .await
        .unwrap();
    session
        .set_answer(&QuestionId::from("came"), AnswerValue::choice(["yes"]))
        .unwrap();
    session
        .set_answer(&QuestionId::from("fun"), AnswerValue::rating(5).unwrap())
        .unwrap();

    let outcome = session.submit().await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Completed {
            reward_message: Some("+5 club points".into())
        }
    );
    assert_eq!(read_response(&dir).answers.len(), 2);

    // Reopening shows the finished response for review.
    let reopened = ResponseSession::open(backend, &id(), &config).await.unwrap();
    assert_eq!(reopened.status(), ResponseStatus::Completed);
    assert_eq!(
        review_lines(&reopened),
        vec![
            "Did you come to club night?: Yes".to_string(),
            "How much fun was it?: 5/5".to_string(),
        ]
    );
}
