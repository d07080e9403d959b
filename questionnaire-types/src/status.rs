use serde::{Deserialize, Serialize};

/// Lifecycle of one respondent's attempt at one questionnaire.
///
/// Monotonic: `Completed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ResponseStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}
