use questionnaire_types::{AnswerError, BackendError, QuestionId};

/// Error type for loading a questionnaire into a question graph.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    /// A dependent question does not come strictly after its parent.
    #[error("Question '{question}' must come after its parent '{parent}'")]
    OrderingViolation {
        question: QuestionId,
        parent: QuestionId,
    },

    #[error("Failed to fetch questionnaire: {0}")]
    Backend(#[from] BackendError),
}

/// Error type for answering within a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The response is completed and can only be reviewed.
    #[error("Response is completed and read-only")]
    ReadOnly,

    #[error(transparent)]
    Answer(#[from] AnswerError),
}

/// Error type for submitting a response.
///
/// After any of these the session keeps its status and may be resubmitted,
/// except for `AlreadyCompleted` which means there is nothing left to submit.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Response is already completed")]
    AlreadyCompleted,

    /// Visible required questions without an answer.
    #[error("Missing answers for: {}", join_ids(.0))]
    MissingAnswers(Vec<QuestionId>),

    #[error("Submission failed: {0}")]
    Backend(#[from] BackendError),
}

fn join_ids(ids: &[QuestionId]) -> String {
    ids.iter()
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl SubmitError {
    /// Check if the caller may retry the submission.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
