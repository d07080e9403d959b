//! Core types for the questionnaire engine.
//!
//! This crate provides the foundational types for conditional questionnaires:
//! - `QuestionnaireDefinition` - The questionnaire as delivered by the backend
//! - `Question` and `QuestionType` - Individual questions, with optional branching
//! - `Answer`, `AnswerValue` and `Answers` - Typed, validated answers
//! - `AnswerRecord` and friends - The loosely shaped wire format of the backend
//! - `QuestionnaireBackend` - The contract for fetching, saving and finalizing

mod ids;
pub use ids::{OptionId, QuestionId, QuestionnaireId};

mod question;
pub use question::{Question, QuestionOption, QuestionType};

mod answer;
pub use answer::{Answer, AnswerValue, Rating};

mod answers;
pub use answers::Answers;

mod record;
pub use record::{AnswerRecord, AnswersPayload, FetchedQuestionnaire, FinalizeReceipt, SavedResponse};

mod definition;
pub use definition::QuestionnaireDefinition;

mod status;
pub use status::ResponseStatus;

mod error;
pub use error::{AnswerError, BackendError};

mod traits;
pub use traits::QuestionnaireBackend;
