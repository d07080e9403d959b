use async_trait::async_trait;

use crate::{AnswersPayload, BackendError, FetchedQuestionnaire, FinalizeReceipt, QuestionnaireId};

/// Trait for the service that owns questionnaires and responses.
///
/// The backend is authoritative for persistence and completion status. The
/// engine only ever sends the full answer set of the current respondent;
/// identifying the respondent is up to the implementation.
#[async_trait]
pub trait QuestionnaireBackend: Send + Sync {
    /// Fetch the definition and, if present, the respondent's saved response.
    async fn fetch(&self, questionnaire: &QuestionnaireId)
    -> Result<FetchedQuestionnaire, BackendError>;

    /// Upsert the in-progress answers.
    ///
    /// Must fail with `BackendError::AlreadyCompleted` once the response is finalized.
    async fn save_progress(
        &self,
        questionnaire: &QuestionnaireId,
        payload: &AnswersPayload,
    ) -> Result<(), BackendError>;

    /// Finalize the response.
    ///
    /// Must fail with `BackendError::AlreadyCompleted` if it was finalized before.
    async fn finalize(
        &self,
        questionnaire: &QuestionnaireId,
        payload: &AnswersPayload,
    ) -> Result<FinalizeReceipt, BackendError>;
}
