use questionnaire_types::{Answer, AnswerError, AnswerValue, Answers, QuestionId};

use crate::QuestionGraph;

/// Holds the in-progress answers of one session.
///
/// Answers are replaced, never merged, and never deleted: an answer stays in
/// the map even after its question is hidden by an upstream change.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    answers: Answers,
}

impl AnswerStore {
    pub fn new(answers: Answers) -> Self {
        Self { answers }
    }

    /// Record the answer to `question`, replacing any previous one.
    ///
    /// The value must fit the question's declared type.
    pub fn set_answer(
        &mut self,
        graph: &QuestionGraph,
        question: &QuestionId,
        value: AnswerValue,
    ) -> Result<&Answers, AnswerError> {
        let question = graph
            .get(question)
            .ok_or_else(|| AnswerError::UnknownQuestion(question.clone()))?;
        self.answers.insert(Answer::new(question, value)?);
        Ok(&self.answers)
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }
}
