//! # questionnaire-dialoguer
//!
//! Terminal runner for the questionnaire engine.
//!
//! Questions are presented one at a time with `dialoguer` prompts, following
//! the branching of the questionnaire as answers come in. Progress is
//! autosaved in the background; the response is finalized after a last
//! confirmation. `FileBackend` keeps questionnaires and responses as JSON files
//! in a directory, so the runner works without a server.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use questionnaire_dialoguer::{DialoguerRunner, FileBackend};
//! use questionnaire_engine::{EngineConfig, ResponseSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = Arc::new(FileBackend::new("questionnaires"));
//!     let mut session =
//!         ResponseSession::open(backend, &"club-feedback".into(), &EngineConfig::default()).await?;
//!     DialoguerRunner::new().run(&mut session).await?;
//!     Ok(())
//! }
//! ```

mod file_backend;
pub use file_backend::FileBackend;

mod runner;
pub use runner::{DialoguerRunner, RunnerError, describe_answer, review_lines};
