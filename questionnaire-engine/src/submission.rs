//! Final submission.

use std::sync::Arc;

use questionnaire_types::{
    AnswersPayload, Answers, QuestionId, QuestionnaireBackend, QuestionnaireId,
};
use tracing::{info, warn};

use crate::{QuestionGraph, StaleAnswerPolicy, SubmitError};

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend accepted the answers.
    Completed {
        /// Opaque reward message from the backend, unchanged.
        reward_message: Option<String>,
    },

    /// The backend had already finalized this response, e.g. from another tab.
    AlreadyCompleted,
}

/// Builds the final payload and calls finalize.
///
/// Does not retry; a failed submission leaves the decision to the caller.
pub struct SubmissionCoordinator {
    backend: Arc<dyn QuestionnaireBackend>,
    questionnaire: QuestionnaireId,
    policy: StaleAnswerPolicy,
}

impl SubmissionCoordinator {
    pub fn new(
        backend: Arc<dyn QuestionnaireBackend>,
        questionnaire: QuestionnaireId,
        policy: StaleAnswerPolicy,
    ) -> Self {
        Self {
            backend,
            questionnaire,
            policy,
        }
    }

    /// Build the payload in question order.
    ///
    /// `visible` are positions into `graph.questions()`. Answers to hidden
    /// questions are included only under `StaleAnswerPolicy::Retain`.
    pub fn build_payload(
        &self,
        graph: &QuestionGraph,
        answers: &Answers,
        visible: &[usize],
    ) -> AnswersPayload {
        match self.policy {
            StaleAnswerPolicy::Retain => payload_for(graph, answers, 0..graph.len()),
            StaleAnswerPolicy::Exclude => payload_for(graph, answers, visible.iter().copied()),
        }
    }

    /// Send the payload to the backend.
    ///
    /// An "already completed" rejection is not an error: the backend is
    /// authoritative and the response is complete either way.
    pub async fn submit(&self, payload: &AnswersPayload) -> Result<SubmitOutcome, SubmitError> {
        match self.backend.finalize(&self.questionnaire, payload).await {
            Ok(receipt) => {
                info!(
                    questionnaire = %self.questionnaire,
                    answers = payload.len(),
                    "response finalized"
                );
                Ok(SubmitOutcome::Completed {
                    reward_message: receipt.reward_message,
                })
            }
            Err(err) if err.is_already_completed() => {
                info!(
                    questionnaire = %self.questionnaire,
                    "response was already finalized elsewhere"
                );
                Ok(SubmitOutcome::AlreadyCompleted)
            }
            Err(err) => {
                warn!(questionnaire = %self.questionnaire, "submission failed: {err}");
                Err(SubmitError::Backend(err))
            }
        }
    }
}

impl std::fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("questionnaire", &self.questionnaire)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Records for every answered question among `positions`, in that order.
pub(crate) fn payload_for(
    graph: &QuestionGraph,
    answers: &Answers,
    positions: impl IntoIterator<Item = usize>,
) -> AnswersPayload {
    let questions = graph.questions();
    AnswersPayload::new(
        positions
            .into_iter()
            .filter_map(|position| answers.get(questions[position].id()))
            .map(|answer| answer.to_record())
            .collect(),
    )
}

/// Visible required questions that have no answer, in path order.
pub(crate) fn missing_required(
    graph: &QuestionGraph,
    answers: &Answers,
    visible: &[usize],
) -> Vec<QuestionId> {
    let questions = graph.questions();
    visible
        .iter()
        .map(|&position| &questions[position])
        .filter(|question| question.is_required() && !answers.contains(question.id()))
        .map(|question| question.id().clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBackend;
    use questionnaire_types::{Answer, AnswerValue, Question, QuestionType, QuestionnaireDefinition};

    fn graph() -> QuestionGraph {
        QuestionGraph::load(QuestionnaireDefinition::new(
            "trip",
            "Trip",
            vec![
                Question::new("went", 1, QuestionType::SingleChoice, "Did you go?")
                    .with_option("yes", "Yes")
                    .with_option("no", "No"),
                Question::new("rating", 2, QuestionType::Rating, "Rate it").depends_on("went", "yes"),
                Question::new("remarks", 3, QuestionType::FreeText, "Remarks").optional(),
            ],
        ))
        .unwrap()
    }

    fn answer(graph: &QuestionGraph, id: &str, value: AnswerValue) -> Answer {
        Answer::new(graph.get(&QuestionId::from(id)).unwrap(), value).unwrap()
    }

    fn coordinator(policy: StaleAnswerPolicy) -> SubmissionCoordinator {
        SubmissionCoordinator::new(Arc::new(InMemoryBackend::new()), "trip".into(), policy)
    }

    /// Went = yes, rated, then switched to no: the rating is stale.
    fn stale_answers(graph: &QuestionGraph) -> Answers {
        [
            answer(graph, "rating", AnswerValue::rating(4).unwrap()),
            answer(graph, "went", AnswerValue::choice(["no"])),
        ]
        .into_iter()
        .collect()
    }

    fn question_ids(payload: &AnswersPayload) -> Vec<&str> {
        payload
            .answers
            .iter()
            .map(|record| record.question_id.as_str())
            .collect()
    }

    #[test]
    fn retain_policy_submits_stale_answers() {
        let graph = graph();
        let answers = stale_answers(&graph);
        let visible = crate::resolver::visible_positions(&graph, &answers);

        let payload = coordinator(StaleAnswerPolicy::Retain).build_payload(&graph, &answers, &visible);
        assert_eq!(question_ids(&payload), vec!["went", "rating"]);
    }

    #[test]
    fn exclude_policy_drops_stale_answers() {
        let graph = graph();
        let answers = stale_answers(&graph);
        let visible = crate::resolver::visible_positions(&graph, &answers);

        let payload =
            coordinator(StaleAnswerPolicy::Exclude).build_payload(&graph, &answers, &visible);
        assert_eq!(question_ids(&payload), vec!["went"]);
    }

    #[test]
    fn missing_required_skips_optional_and_hidden() {
        let graph = graph();
        let answers = Answers::new();
        let visible = crate::resolver::visible_positions(&graph, &answers);

        let missing = missing_required(&graph, &answers, &visible);
        assert_eq!(missing, vec![QuestionId::from("went")]);
    }
}
