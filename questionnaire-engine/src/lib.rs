//! # questionnaire-engine
//!
//! The conditional questionnaire engine. Given a static graph of questions,
//! some of which only appear once an earlier answer selects a trigger option,
//! and a live set of in-progress answers, the engine continuously derives:
//!
//! - the ordered list of questions the respondent currently sees,
//! - the step cursor and completion progress,
//! - when and what to persist (debounced, best-effort autosave),
//! - the final submission, including reconciliation with a backend that
//!   already considers the response completed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use questionnaire_engine::{Advance, EngineConfig, InMemoryBackend, ResponseSession};
//! use questionnaire_types::{AnswerValue, QuestionnaireId};
//!
//! let backend = Arc::new(InMemoryBackend::new().with_questionnaire(definition));
//! let mut session = ResponseSession::open(
//!     backend,
//!     &QuestionnaireId::from("club-feedback"),
//!     &EngineConfig::default(),
//! )
//! .await?;
//!
//! session.set_answer(&"enjoyed".into(), AnswerValue::choice(["no"]))?;
//! if let Advance::ReadyToSubmit = session.advance() {
//!     session.submit().await?;
//! }
//! ```
//!
//! All session methods run synchronously on the caller's task. The only
//! asynchronous work is the autosave write, which runs on its own tokio task
//! and never blocks answering or navigation.

pub use questionnaire_types as types;

mod config;
pub use config::{AutosaveConfig, ConfigError, EngineConfig, StaleAnswerPolicy};

mod error;
pub use error::{LoadError, SessionError, SubmitError};

mod loader;
pub use loader::{QuestionGraph, Unreachable};

mod resolver;
pub use resolver::resolve;

mod store;
pub use store::AnswerStore;

mod autosave;
pub use autosave::{AutosaveScheduler, AutosaveStatus};

mod progress;
pub use progress::{Advance, Cursor};

mod submission;
pub use submission::{SubmissionCoordinator, SubmitOutcome};

mod session;
pub use session::ResponseSession;

// Backend for tests and embedding without a server
mod memory_backend;
pub use memory_backend::InMemoryBackend;
