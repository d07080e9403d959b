//! In-memory backend for tests and embedding without a server.
//!
//! `InMemoryBackend` stores questionnaires and responses in memory, records
//! every save and finalize call, and can be scripted to fail. Clones share
//! state, so a test can hand one clone to the engine and inspect another.
//!
//! # Example
//!
//! ```rust,ignore
//! use questionnaire_engine::InMemoryBackend;
//!
//! let backend = InMemoryBackend::new()
//!     .with_questionnaire(definition)
//!     .with_reward_message("You earned 10 points")
//!     .fail_next_saves(1);
//!
//! // ... run a session ...
//!
//! assert_eq!(backend.saves(&id).len(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use questionnaire_types::{
    AnswersPayload, BackendError, FetchedQuestionnaire, FinalizeReceipt, QuestionnaireBackend,
    QuestionnaireDefinition, QuestionnaireId, SavedResponse,
};

#[derive(Debug, Default)]
struct State {
    definitions: HashMap<QuestionnaireId, QuestionnaireDefinition>,
    responses: HashMap<QuestionnaireId, SavedResponse>,
    saves: HashMap<QuestionnaireId, Vec<AnswersPayload>>,
    finalizations: HashMap<QuestionnaireId, Vec<AnswersPayload>>,
    reward_message: Option<String>,
    failing_saves: usize,
    failing_finalizations: usize,
    save_latency: Option<Duration>,
}

/// A backend that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a questionnaire definition.
    pub fn with_questionnaire(self, definition: QuestionnaireDefinition) -> Self {
        self.state()
            .definitions
            .insert(definition.id.clone(), definition);
        self
    }

    /// Add a previously saved response for a questionnaire.
    pub fn with_saved_response(
        self,
        questionnaire: impl Into<QuestionnaireId>,
        response: SavedResponse,
    ) -> Self {
        self.state().responses.insert(questionnaire.into(), response);
        self
    }

    /// Reward message returned by every successful finalize.
    pub fn with_reward_message(self, message: impl Into<String>) -> Self {
        self.state().reward_message = Some(message.into());
        self
    }

    /// Make the next `count` saves fail with a transport error.
    pub fn fail_next_saves(self, count: usize) -> Self {
        self.state().failing_saves = count;
        self
    }

    /// Make the next `count` finalize calls fail with a transport error.
    pub fn fail_next_finalizations(self, count: usize) -> Self {
        self.state().failing_finalizations = count;
        self
    }

    /// Make every save take `latency` before it is applied.
    pub fn with_save_latency(self, latency: Duration) -> Self {
        self.state().save_latency = Some(latency);
        self
    }

    /// Mark a response as completed, as if finalized from another device.
    pub fn mark_completed(&self, questionnaire: &QuestionnaireId) {
        self.state()
            .responses
            .entry(questionnaire.clone())
            .or_default()
            .completed = true;
    }

    /// Every payload written by `save_progress`, oldest first.
    pub fn saves(&self, questionnaire: &QuestionnaireId) -> Vec<AnswersPayload> {
        self.state()
            .saves
            .get(questionnaire)
            .cloned()
            .unwrap_or_default()
    }

    /// Every payload accepted by `finalize`, oldest first.
    pub fn finalizations(&self, questionnaire: &QuestionnaireId) -> Vec<AnswersPayload> {
        self.state()
            .finalizations
            .get(questionnaire)
            .cloned()
            .unwrap_or_default()
    }

    /// The stored response, if any.
    pub fn response(&self, questionnaire: &QuestionnaireId) -> Option<SavedResponse> {
        self.state().responses.get(questionnaire).cloned()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl QuestionnaireBackend for InMemoryBackend {
    async fn fetch(
        &self,
        questionnaire: &QuestionnaireId,
    ) -> Result<FetchedQuestionnaire, BackendError> {
        let state = self.state();
        let definition = state
            .definitions
            .get(questionnaire)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(questionnaire.to_string()))?;
        Ok(FetchedQuestionnaire {
            definition,
            response: state.responses.get(questionnaire).cloned(),
        })
    }

    async fn save_progress(
        &self,
        questionnaire: &QuestionnaireId,
        payload: &AnswersPayload,
    ) -> Result<(), BackendError> {
        let latency = self.state().save_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state();
        if state.failing_saves > 0 {
            state.failing_saves -= 1;
            return Err(anyhow!("simulated network failure").into());
        }

        let response = state.responses.entry(questionnaire.clone()).or_default();
        if response.completed {
            return Err(BackendError::AlreadyCompleted);
        }
        response.answers = payload.answers.clone();

        state
            .saves
            .entry(questionnaire.clone())
            .or_default()
            .push(payload.clone());
        Ok(())
    }

    async fn finalize(
        &self,
        questionnaire: &QuestionnaireId,
        payload: &AnswersPayload,
    ) -> Result<FinalizeReceipt, BackendError> {
        let mut state = self.state();
        if state.failing_finalizations > 0 {
            state.failing_finalizations -= 1;
            return Err(anyhow!("simulated network failure").into());
        }

        let response = state.responses.entry(questionnaire.clone()).or_default();
        if response.completed {
            return Err(BackendError::AlreadyCompleted);
        }
        response.answers = payload.answers.clone();
        response.completed = true;

        state
            .finalizations
            .entry(questionnaire.clone())
            .or_default()
            .push(payload.clone());
        Ok(FinalizeReceipt {
            reward_message: state.reward_message.clone(),
        })
    }
}
