use serde::{Deserialize, Serialize};

use crate::{OptionId, QuestionId};

/// The type of a question, determining which answer shape it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    /// Free text input.
    FreeText,

    /// A rating on a 1..=5 scale.
    Rating,

    /// Choose exactly one option.
    SingleChoice,

    /// Choose any number of options.
    MultiChoice,
}

impl QuestionType {
    /// Check if this type selects options (and may therefore trigger dependent questions).
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }

    /// Get the type name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FreeText => "FREE_TEXT",
            Self::Rating => "RATING",
            Self::SingleChoice => "SINGLE_CHOICE",
            Self::MultiChoice => "MULTI_CHOICE",
        }
    }
}

/// A selectable option of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub text: String,
}

impl QuestionOption {
    /// Create a new option.
    pub fn new(id: impl Into<OptionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

fn required_by_default() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// A single question in a questionnaire.
///
/// Questions are immutable once loaded. A question without a parent is a root
/// question and always eligible for display; a question with a parent is only
/// shown once the parent's answer selects the trigger option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier, unique within the questionnaire.
    id: QuestionId,

    /// Position in the canonical sequence.
    order: i64,

    /// The kind of answer this question accepts.
    #[serde(rename = "type")]
    question_type: QuestionType,

    /// The prompt text shown to the respondent.
    #[serde(default)]
    text: String,

    /// Options for choice questions; empty otherwise.
    #[serde(default)]
    options: Vec<QuestionOption>,

    /// Whether an answer is needed to move past this question.
    #[serde(default = "required_by_default", skip_serializing_if = "is_true")]
    required: bool,

    /// The question whose answer controls this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_question_id: Option<QuestionId>,

    /// The parent option that reveals this question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trigger_option_id: Option<OptionId>,
}

impl Question {
    /// Create a new root question without options.
    pub fn new(
        id: impl Into<QuestionId>,
        order: i64,
        question_type: QuestionType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            order,
            question_type,
            text: text.into(),
            options: Vec::new(),
            required: true,
            parent_question_id: None,
            trigger_option_id: None,
        }
    }

    /// Add an option.
    pub fn with_option(mut self, id: impl Into<OptionId>, text: impl Into<String>) -> Self {
        self.options.push(QuestionOption::new(id, text));
        self
    }

    /// Make this question depend on `parent` selecting `trigger`.
    pub fn depends_on(mut self, parent: impl Into<QuestionId>, trigger: impl Into<OptionId>) -> Self {
        self.parent_question_id = Some(parent.into());
        self.trigger_option_id = Some(trigger.into());
        self
    }

    /// Allow moving past this question without answering it.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    /// Look up an option by id.
    pub fn option(&self, id: &OptionId) -> Option<&QuestionOption> {
        self.options.iter().find(|option| &option.id == id)
    }

    pub fn has_option(&self, id: &OptionId) -> bool {
        self.option(id).is_some()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn parent_question_id(&self) -> Option<&QuestionId> {
        self.parent_question_id.as_ref()
    }

    pub fn trigger_option_id(&self) -> Option<&OptionId> {
        self.trigger_option_id.as_ref()
    }

    /// A root question has no parent and is always visible.
    pub fn is_root(&self) -> bool {
        self.parent_question_id.is_none()
    }
}
