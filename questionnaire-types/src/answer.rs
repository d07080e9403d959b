use std::collections::BTreeSet;

use crate::{AnswerError, AnswerRecord, OptionId, Question, QuestionId, QuestionType};

/// A rating on the 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside the scale.
    pub fn new(value: u8) -> Result<Self, AnswerError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AnswerError::RatingOutOfRange(value))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// The payload of an answer, one variant per answer shape.
///
/// Single and multi choice questions share the `Choice` shape; the single
/// choice arity is enforced when the `Answer` is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Rating(Rating),
    Choice(BTreeSet<OptionId>),
}

impl AnswerValue {
    /// Create a text value.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a rating value.
    pub fn rating(value: u8) -> Result<Self, AnswerError> {
        Rating::new(value).map(Self::Rating)
    }

    /// Create a choice value from any collection of option ids.
    pub fn choice<I, T>(options: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OptionId>,
    {
        Self::Choice(options.into_iter().map(Into::into).collect())
    }

    /// Get the shape name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Rating(_) => "Rating",
            Self::Choice(_) => "Choice",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_rating(&self) -> Option<Rating> {
        match self {
            Self::Rating(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&BTreeSet<OptionId>> {
        match self {
            Self::Choice(options) => Some(options),
            _ => None,
        }
    }
}

/// A validated answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    question_id: QuestionId,
    value: AnswerValue,
}

impl Answer {
    /// Build an answer for `question`, rejecting values whose shape does not
    /// match the question type.
    pub fn new(question: &Question, value: AnswerValue) -> Result<Self, AnswerError> {
        let expected = question.question_type();
        match (expected, &value) {
            (QuestionType::FreeText, AnswerValue::Text(_))
            | (QuestionType::Rating, AnswerValue::Rating(_)) => {}
            (QuestionType::SingleChoice | QuestionType::MultiChoice, AnswerValue::Choice(options)) => {
                if expected == QuestionType::SingleChoice && options.len() != 1 {
                    return Err(AnswerError::SingleChoiceArity {
                        question: question.id().clone(),
                        count: options.len(),
                    });
                }
                if let Some(unknown) = options.iter().find(|option| !question.has_option(option)) {
                    return Err(AnswerError::UnknownOption {
                        question: question.id().clone(),
                        option: unknown.clone(),
                    });
                }
            }
            (_, other) => {
                return Err(AnswerError::shape_mismatch(
                    question.id(),
                    expected,
                    other.type_name(),
                ));
            }
        }

        Ok(Self {
            question_id: question.id().clone(),
            value,
        })
    }

    /// Build an answer from its wire record.
    pub fn from_record(question: &Question, record: &AnswerRecord) -> Result<Self, AnswerError> {
        let expected = question.question_type();
        let value = match expected {
            QuestionType::FreeText => record.text_answer.clone().map(AnswerValue::Text),
            QuestionType::Rating => record.rating_answer.map(AnswerValue::rating).transpose()?,
            QuestionType::SingleChoice | QuestionType::MultiChoice => record
                .selected_option_ids
                .as_ref()
                .map(|ids| AnswerValue::choice(ids.iter().cloned())),
        };
        let value = value
            .ok_or_else(|| AnswerError::shape_mismatch(question.id(), expected, record.shape_name()))?;
        Self::new(question, value)
    }

    /// Convert to the wire record.
    pub fn to_record(&self) -> AnswerRecord {
        let mut record = AnswerRecord::empty(self.question_id.clone());
        match &self.value {
            AnswerValue::Text(text) => record.text_answer = Some(text.clone()),
            AnswerValue::Rating(rating) => record.rating_answer = Some(rating.get()),
            AnswerValue::Choice(options) => {
                record.selected_option_ids = Some(options.iter().cloned().collect())
            }
        }
        record
    }

    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    pub fn value(&self) -> &AnswerValue {
        &self.value
    }

    /// Check whether this answer selects `option`.
    ///
    /// Text and rating answers select nothing.
    pub fn selects(&self, option: &OptionId) -> bool {
        self.value
            .as_choice()
            .is_some_and(|options| options.contains(option))
    }
}
