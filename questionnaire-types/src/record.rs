//! Wire shapes exchanged with the backend.
//!
//! The backend speaks a permissive answer object with one optional field per
//! answer kind. These types mirror it one to one; conversion into the typed
//! `Answer` happens in `Answer::from_record`.

use serde::{Deserialize, Serialize};

use crate::{OptionId, QuestionId, QuestionnaireDefinition};

/// One answer as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: QuestionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_answer: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option_ids: Option<Vec<OptionId>>,
}

impl AnswerRecord {
    /// Create a record with no payload.
    pub fn empty(question_id: QuestionId) -> Self {
        Self {
            question_id,
            text_answer: None,
            rating_answer: None,
            selected_option_ids: None,
        }
    }

    /// Name of the first populated payload field, for error messages.
    pub fn shape_name(&self) -> &'static str {
        if self.text_answer.is_some() {
            "textAnswer"
        } else if self.rating_answer.is_some() {
            "ratingAnswer"
        } else if self.selected_option_ids.is_some() {
            "selectedOptionIds"
        } else {
            "empty"
        }
    }
}

/// The full answer set sent on partial save and on finalize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswersPayload {
    pub answers: Vec<AnswerRecord>,
}

impl AnswersPayload {
    pub fn new(answers: Vec<AnswerRecord>) -> Self {
        Self { answers }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// A previously saved response of the current respondent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedResponse {
    #[serde(default)]
    pub answers: Vec<AnswerRecord>,

    #[serde(default)]
    pub completed: bool,
}

/// Everything the backend returns when a respondent opens a questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedQuestionnaire {
    pub definition: QuestionnaireDefinition,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<SavedResponse>,
}

/// Result of a successful finalize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeReceipt {
    /// Opaque reward message, passed through to the caller unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_message: Option<String>,
}
