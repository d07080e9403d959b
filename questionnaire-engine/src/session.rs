//! The response session: one respondent's attempt at one questionnaire.
//!
//! Every answer goes through the session, which then recomputes the visible
//! path, re-clamps the cursor and hands the answer set to the autosave
//! scheduler. A completed session is read-only and shows every question.

use std::borrow::Cow;
use std::sync::Arc;

use questionnaire_types::{
    AnswerValue, Answers, AnswersPayload, FetchedQuestionnaire, Question, QuestionId,
    QuestionnaireBackend, QuestionnaireId, ResponseStatus,
};
use tracing::{debug, info};

use crate::resolver::{all_positions, visible_positions};
use crate::submission::{missing_required, payload_for};
use crate::{
    Advance, AnswerStore, AutosaveScheduler, AutosaveStatus, Cursor, EngineConfig, LoadError,
    QuestionGraph, SessionError, SubmissionCoordinator, SubmitError, SubmitOutcome,
};

pub struct ResponseSession {
    graph: QuestionGraph,
    store: AnswerStore,
    status: ResponseStatus,
    /// Positions into `graph.questions()`, derived from the answers.
    visible: Vec<usize>,
    cursor: Cursor,
    autosave: Option<AutosaveScheduler>,
    submitter: SubmissionCoordinator,
}

impl ResponseSession {
    /// Fetch a questionnaire from the backend and open a session for it.
    ///
    /// Must be called inside a tokio runtime when autosave is enabled.
    pub async fn open(
        backend: Arc<dyn QuestionnaireBackend>,
        questionnaire: &QuestionnaireId,
        config: &EngineConfig,
    ) -> Result<Self, LoadError> {
        let fetched = backend.fetch(questionnaire).await?;
        Self::from_fetched(backend, fetched, config)
    }

    /// Open a session from an already fetched questionnaire.
    ///
    /// A saved response that is completed opens read-only, without autosave.
    /// A saved response with answers opens in progress.
    pub fn from_fetched(
        backend: Arc<dyn QuestionnaireBackend>,
        fetched: FetchedQuestionnaire,
        config: &EngineConfig,
    ) -> Result<Self, LoadError> {
        let graph = QuestionGraph::load(fetched.definition)?;
        let saved = fetched.response.unwrap_or_default();
        let answers = graph.hydrate(&saved.answers);

        let status = if saved.completed {
            ResponseStatus::Completed
        } else if answers.is_empty() {
            ResponseStatus::NotStarted
        } else {
            ResponseStatus::InProgress
        };

        let autosave = (config.autosave.enabled && !status.is_completed()).then(|| {
            AutosaveScheduler::spawn(
                backend.clone(),
                graph.id().clone(),
                config.autosave.debounce(),
            )
        });
        let submitter =
            SubmissionCoordinator::new(backend, graph.id().clone(), config.stale_answers);

        let mut session = Self {
            graph,
            store: AnswerStore::new(answers),
            status,
            visible: Vec::new(),
            cursor: Cursor::new(),
            autosave,
            submitter,
        };
        session.recompute();

        info!(
            questionnaire = %session.graph.id(),
            status = ?session.status,
            answers = session.answers().len(),
            "opened response session"
        );
        Ok(session)
    }

    pub fn graph(&self) -> &QuestionGraph {
        &self.graph
    }

    pub fn answers(&self) -> &Answers {
        self.store.answers()
    }

    /// The session status, including a completion discovered by autosave
    /// that `sync` has not applied yet.
    pub fn status(&self) -> ResponseStatus {
        if self.remote_completed() {
            ResponseStatus::Completed
        } else {
            self.status
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.status().is_completed()
    }

    /// Apply a completion reported by the backend during autosave.
    ///
    /// Mutating methods do this on their own; call it from a UI loop to pick
    /// up the change without user input.
    pub fn sync(&mut self) -> ResponseStatus {
        if self.remote_completed() {
            info!(
                questionnaire = %self.graph.id(),
                "response completed elsewhere, switching to review"
            );
            self.complete();
        }
        self.status
    }

    /// Currently visible questions, in order.
    ///
    /// Every question once the response is completed, including a completion
    /// `sync` has not applied yet.
    pub fn visible_path(&self) -> Vec<&Question> {
        let questions = self.graph.questions();
        let (visible, _) = self.view();
        visible
            .iter()
            .map(|&position| &questions[position])
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.view().1.index()
    }

    pub fn current_question(&self) -> Option<&Question> {
        let (visible, cursor) = self.view();
        visible
            .get(cursor.index())
            .map(|&position| &self.graph.questions()[position])
    }

    pub fn percent_complete(&self) -> f64 {
        let (visible, cursor) = self.view();
        cursor.percent_complete(visible.len())
    }

    /// One-based step and total, e.g. `(3, 7)`.
    pub fn step(&self) -> (usize, usize) {
        let (visible, cursor) = self.view();
        cursor.step(visible.len())
    }

    pub fn autosave_status(&self) -> Option<AutosaveStatus> {
        self.autosave.as_ref().map(AutosaveScheduler::status)
    }

    pub fn autosave(&self) -> Option<&AutosaveScheduler> {
        self.autosave.as_ref()
    }

    /// Record an answer, replacing any previous answer to that question.
    ///
    /// Recomputes the visible path, clamps the cursor and schedules an
    /// autosave. Rejected with `SessionError::ReadOnly` once completed.
    pub fn set_answer(
        &mut self,
        question: &QuestionId,
        value: AnswerValue,
    ) -> Result<&Answers, SessionError> {
        if self.sync().is_completed() {
            return Err(SessionError::ReadOnly);
        }

        self.store.set_answer(&self.graph, question, value)?;
        if self.status == ResponseStatus::NotStarted {
            self.status = ResponseStatus::InProgress;
            debug!(questionnaire = %self.graph.id(), "response in progress");
        }
        self.recompute();

        if let Some(autosave) = &self.autosave {
            autosave.schedule(self.autosave_payload());
        }
        Ok(self.store.answers())
    }

    /// Move to the next visible question.
    ///
    /// Does not move past a required question without an answer. At the last
    /// question this reports `ReadyToSubmit`, or `ReviewEnd` when completed.
    pub fn advance(&mut self) -> Advance {
        let completed = self.sync().is_completed();

        if !completed
            && let Some(question) = self.current_question()
            && question.is_required()
            && !self.answers().contains(question.id())
        {
            return Advance::NeedsAnswer(question.id().clone());
        }

        match self.cursor.advance(self.visible.len()) {
            Advance::ReadyToSubmit if completed => Advance::ReviewEnd,
            other => other,
        }
    }

    /// Move to the previous visible question, floored at the first one.
    pub fn retreat(&mut self) -> usize {
        self.sync();
        self.cursor.retreat()
    }

    /// Finalize the response.
    ///
    /// Autosave is paused for the duration, so no partial save can land
    /// around the finalize call. On success, or when the backend reports the
    /// response as already completed, the session becomes completed and
    /// autosave stops. On any other failure the status is unchanged, the
    /// answers are scheduled for autosave again and the caller may retry.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if self.sync().is_completed() {
            return Err(SubmitError::AlreadyCompleted);
        }

        let missing = missing_required(&self.graph, self.store.answers(), &self.visible);
        if !missing.is_empty() {
            return Err(SubmitError::MissingAnswers(missing));
        }

        let payload = self
            .submitter
            .build_payload(&self.graph, self.store.answers(), &self.visible);
        if let Some(autosave) = &self.autosave {
            autosave.pause().await;
        }

        match self.submitter.submit(&payload).await {
            Ok(outcome) => {
                self.complete();
                Ok(outcome)
            }
            Err(err) => {
                if let Some(autosave) = &self.autosave {
                    autosave.resume();
                    autosave.schedule(self.autosave_payload());
                }
                Err(err)
            }
        }
    }

    /// Autosave always sends the full answer map.
    fn autosave_payload(&self) -> AnswersPayload {
        payload_for(&self.graph, self.store.answers(), 0..self.graph.len())
    }

    /// Visible positions and cursor as readers should see them.
    ///
    /// A completion found by autosave shows every question even before
    /// `sync` rebuilds the stored path.
    fn view(&self) -> (Cow<'_, [usize]>, Cursor) {
        if self.remote_completed() && !self.status.is_completed() {
            let visible = all_positions(&self.graph);
            let mut cursor = self.cursor;
            cursor.clamp(visible.len());
            (Cow::Owned(visible), cursor)
        } else {
            (Cow::Borrowed(self.visible.as_slice()), self.cursor)
        }
    }

    fn remote_completed(&self) -> bool {
        self.autosave
            .as_ref()
            .is_some_and(AutosaveScheduler::remote_completed)
    }

    fn complete(&mut self) {
        if let Some(autosave) = &self.autosave {
            autosave.cancel();
        }
        if !self.status.is_completed() {
            self.status = ResponseStatus::Completed;
            info!(questionnaire = %self.graph.id(), "response completed");
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        self.visible = if self.status.is_completed() {
            all_positions(&self.graph)
        } else {
            visible_positions(&self.graph, self.store.answers())
        };
        self.cursor.clamp(self.visible.len());
        debug!(
            questionnaire = %self.graph.id(),
            visible = self.visible.len(),
            cursor = self.cursor.index(),
            "recomputed visible path"
        );
    }
}

impl std::fmt::Debug for ResponseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSession")
            .field("questionnaire", self.graph.id())
            .field("status", &self.status)
            .field("visible", &self.visible.len())
            .field("cursor", &self.cursor.index())
            .field("autosave", &self.autosave)
            .finish()
    }
}
