use serde::{Deserialize, Serialize};

use crate::{Question, QuestionnaireId};

/// A questionnaire as authored by an administrator.
///
/// The question list is unordered; the engine sorts it by `order` on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireDefinition {
    pub id: QuestionnaireId,

    pub title: String,

    /// Optional message shown before the first question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionnaireDefinition {
    /// Create a new definition with the given questions.
    pub fn new(
        id: impl Into<QuestionnaireId>,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            questions,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }
}
