//! JSON file backend.
//!
//! Layout of the backing directory, per questionnaire id:
//!
//! - `<id>.json` - the `QuestionnaireDefinition`
//! - `<id>.response.json` - the `SavedResponse`, written on save and finalize
//!
//! Writes go through a lock shared by all clones, so the completed check and
//! the write happen as one step. Each write replaces the file by renaming a
//! temporary sibling over it; readers never see a half-written response.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use questionnaire_types::{
    AnswersPayload, BackendError, FetchedQuestionnaire, FinalizeReceipt, QuestionnaireBackend,
    QuestionnaireDefinition, QuestionnaireId, SavedResponse,
};
use tokio::sync::Mutex;
use tracing::debug;

/// A backend storing questionnaires and responses as JSON files.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    reward_message: Option<String>,
    write_lock: Arc<Mutex<()>>,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            reward_message: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Reward message returned by every successful finalize.
    pub fn with_reward_message(mut self, message: impl Into<String>) -> Self {
        self.reward_message = Some(message.into());
        self
    }

    fn definition_path(&self, questionnaire: &QuestionnaireId) -> PathBuf {
        self.dir.join(format!("{questionnaire}.json"))
    }

    fn response_path(&self, questionnaire: &QuestionnaireId) -> PathBuf {
        self.dir.join(format!("{questionnaire}.response.json"))
    }

    async fn read_response(
        &self,
        questionnaire: &QuestionnaireId,
    ) -> Result<Option<SavedResponse>, BackendError> {
        match tokio::fs::read(self.response_path(questionnaire)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(BackendError::transport),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(BackendError::transport(err)),
        }
    }

    async fn write_response(
        &self,
        questionnaire: &QuestionnaireId,
        response: &SavedResponse,
    ) -> Result<(), BackendError> {
        let bytes = serde_json::to_vec_pretty(response).map_err(BackendError::transport)?;
        let path = self.response_path(questionnaire);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(BackendError::transport)?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(BackendError::transport)
    }

    /// Write the current answers, refusing once the stored response is completed.
    async fn store(
        &self,
        questionnaire: &QuestionnaireId,
        payload: &AnswersPayload,
        completed: bool,
    ) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().await;
        let existing = self.read_response(questionnaire).await?;
        if existing.is_some_and(|response| response.completed) {
            return Err(BackendError::AlreadyCompleted);
        }
        let response = SavedResponse {
            answers: payload.answers.clone(),
            completed,
        };
        self.write_response(questionnaire, &response).await?;
        debug!(
            questionnaire = %questionnaire,
            answers = payload.len(),
            completed,
            "stored response"
        );
        Ok(())
    }
}

#[async_trait]
impl QuestionnaireBackend for FileBackend {
    async fn fetch(
        &self,
        questionnaire: &QuestionnaireId,
    ) -> Result<FetchedQuestionnaire, BackendError> {
        let path = self.definition_path(questionnaire);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(BackendError::NotFound(path.display().to_string()));
            }
            Err(err) => return Err(BackendError::transport(err)),
        };
        let definition: QuestionnaireDefinition =
            serde_json::from_slice(&bytes).map_err(BackendError::transport)?;

        Ok(FetchedQuestionnaire {
            definition,
            response: self.read_response(questionnaire).await?,
        })
    }

    async fn save_progress(
        &self,
        questionnaire: &QuestionnaireId,
        payload: &AnswersPayload,
    ) -> Result<(), BackendError> {
        self.store(questionnaire, payload, false).await
    }

    async fn finalize(
        &self,
        questionnaire: &QuestionnaireId,
        payload: &AnswersPayload,
    ) -> Result<FinalizeReceipt, BackendError> {
        self.store(questionnaire, payload, true).await?;
        Ok(FinalizeReceipt {
            reward_message: self.reward_message.clone(),
        })
    }
}
