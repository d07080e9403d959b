use crate::{OptionId, QuestionId, QuestionType};

/// Error type for answer construction.
///
/// An answer is rejected when its shape does not fit the question it answers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    #[error("Unknown question: {0}")]
    UnknownQuestion(QuestionId),

    #[error("Answer for '{question}' does not fit {expected}: got {actual}")]
    ShapeMismatch {
        question: QuestionId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Rating {0} is outside 1..=5")]
    RatingOutOfRange(u8),

    #[error("Single choice question '{question}' needs exactly one option, got {count}")]
    SingleChoiceArity { question: QuestionId, count: usize },

    #[error("Question '{question}' has no option '{option}'")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },
}

impl AnswerError {
    pub(crate) fn shape_mismatch(
        question: &QuestionId,
        expected: QuestionType,
        actual: &'static str,
    ) -> Self {
        Self::ShapeMismatch {
            question: question.clone(),
            expected: expected.name(),
            actual,
        }
    }
}

/// Error type reported by a `QuestionnaireBackend`.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The response was already finalized. The backend is authoritative here.
    #[error("Response already completed")]
    AlreadyCompleted,

    /// The backend refused the request (validation, authorization, ...).
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or storage failure.
    #[error("Transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

impl BackendError {
    /// Create a transport error from any error type.
    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        Self::Transport(err.into())
    }

    /// Check if this error reports an already finalized response.
    pub fn is_already_completed(&self) -> bool {
        matches!(self, Self::AlreadyCompleted)
    }
}
