use questionnaire_types::QuestionId;

/// Result of trying to move forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the given index of the visible path.
    Moved(usize),

    /// Already at the last visible question; the response can be submitted.
    ReadyToSubmit,

    /// The current required question has no answer yet.
    NeedsAnswer(QuestionId),

    /// At the last question of a completed response under review.
    ReviewEnd,
}

/// Step cursor into the visible path.
///
/// Tracks a position, not a question: when the path changes length the cursor
/// is clamped into range and may end up on a different question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Clamp into `[0, len - 1]`; an empty path clamps to 0.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    /// Move forward, or report that the end is reached.
    pub fn advance(&mut self, len: usize) -> Advance {
        if self.index + 1 >= len {
            Advance::ReadyToSubmit
        } else {
            self.index += 1;
            Advance::Moved(self.index)
        }
    }

    /// Move back, floored at 0.
    pub fn retreat(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    /// Position-based progress: `index / len * 100`.
    pub fn percent_complete(&self, len: usize) -> f64 {
        if len == 0 {
            0.0
        } else {
            self.index as f64 / len as f64 * 100.0
        }
    }

    /// One-based step and total, e.g. `(3, 7)` for "question 3 of 7".
    pub fn step(&self, len: usize) -> (usize, usize) {
        if len == 0 { (0, 0) } else { (self.index + 1, len) }
    }
}
