//! Dialoguer runner driving a `ResponseSession`.

use dialoguer::{Confirm, Input, MultiSelect, Select, theme::ColorfulTheme};
use questionnaire_engine::{Advance, ResponseSession, SessionError, SubmitError, SubmitOutcome};
use questionnaire_types::{Answer, AnswerError, AnswerValue, Question, QuestionType, Rating};
use thiserror::Error;
use tracing::{debug, warn};

/// Typing this into a free-text prompt goes back one question.
pub const BACK_COMMAND: &str = ":back";

const BACK_ITEM: &str = "<- Back";

/// Error type for the dialoguer runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// User cancelled the questionnaire (e.g., pressed Ctrl+C).
    #[error("Questionnaire cancelled by user")]
    Cancelled,

    /// An I/O error occurred during prompting.
    #[error("Dialoguer error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Helper to check if a dialoguer error is a cancellation (Ctrl+C)
fn is_cancelled(err: &dialoguer::Error) -> bool {
    matches!(err, dialoguer::Error::IO(io_err) if io_err.kind() == std::io::ErrorKind::Interrupted)
}

fn prompt_result<T>(result: Result<T, dialoguer::Error>) -> Result<T, RunnerError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if is_cancelled(&e) => Err(RunnerError::Cancelled),
        Err(e) => Err(RunnerError::Dialoguer(e)),
    }
}

/// What the respondent did at one prompt.
#[derive(Debug)]
enum Step {
    Answer(AnswerValue),
    /// Nothing entered.
    Skip,
    Back,
}

/// Runs a questionnaire in the terminal, one question per prompt.
///
/// Escape (or the back item) returns to the previous question.
#[derive(Debug, Default, Clone)]
pub struct DialoguerRunner {
    /// Use colorful theme for prompts.
    colorful: bool,
}

impl DialoguerRunner {
    /// Create a new runner with the colorful theme.
    pub fn new() -> Self {
        Self { colorful: true }
    }

    /// Create a runner with plain (no color) theme.
    pub fn plain() -> Self {
        Self { colorful: false }
    }

    /// Walk the session until it is submitted or the review ends.
    ///
    /// Returns the submission outcome, or `None` for a read-only review.
    /// Prompts block, so this needs the multi-threaded tokio runtime for
    /// autosave to keep running while waiting for input.
    pub async fn run(
        &self,
        session: &mut ResponseSession,
    ) -> Result<Option<SubmitOutcome>, RunnerError> {
        loop {
            if session.sync().is_completed() {
                println!("This questionnaire is already completed. Your answers:");
                for line in review_lines(session) {
                    println!("  {line}");
                }
                return Ok(None);
            }

            let Some(question) = session.current_question().cloned() else {
                // Nothing visible at all.
                return Ok(None);
            };

            let (step, total) = session.step();
            println!(
                "[{step}/{total}] {:.0}% complete",
                session.percent_complete()
            );

            let current = session.answers().get(question.id()).cloned();
            let can_go_back = session.cursor() > 0;
            let step = tokio::task::block_in_place(|| {
                self.ask(&question, current.as_ref(), can_go_back)
            })?;

            match step {
                Step::Back => {
                    session.retreat();
                    continue;
                }
                Step::Skip => {}
                Step::Answer(value) => match session.set_answer(question.id(), value) {
                    Ok(_) => {}
                    // Picked up on the next pass through the loop.
                    Err(SessionError::ReadOnly) => continue,
                    Err(SessionError::Answer(e)) => {
                        println!("Error: {e}");
                        continue;
                    }
                },
            }

            match session.advance() {
                Advance::Moved(index) => debug!(index, "moved to next question"),
                Advance::NeedsAnswer(_) => println!("Error: This question needs an answer"),
                Advance::ReviewEnd => return Ok(None),
                Advance::ReadyToSubmit => {
                    if !tokio::task::block_in_place(|| self.confirm_submit())? {
                        continue;
                    }
                    match session.submit().await {
                        Ok(outcome) => return Ok(Some(outcome)),
                        Err(e @ SubmitError::MissingAnswers(_)) => println!("Error: {e}"),
                        Err(e) if e.is_retryable() => {
                            warn!(error = %e, "submission failed");
                            println!("Error: Could not submit, please try again ({e})");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }
    }

    fn ask(
        &self,
        question: &Question,
        current: Option<&Answer>,
        can_go_back: bool,
    ) -> Result<Step, RunnerError> {
        match question.question_type() {
            QuestionType::FreeText => self.ask_text(question, current),
            QuestionType::Rating => self.ask_rating(question, current, can_go_back),
            QuestionType::SingleChoice => self.ask_single(question, current, can_go_back),
            QuestionType::MultiChoice => self.ask_multi(question, current),
        }
    }

    fn ask_text(&self, question: &Question, current: Option<&Answer>) -> Result<Step, RunnerError> {
        let _theme;
        let mut builder: Input<String>;
        if self.colorful {
            _theme = ColorfulTheme::default();
            builder = Input::with_theme(&_theme);
        } else {
            builder = Input::new();
        }

        builder = builder
            .with_prompt(prompt_for(question))
            .allow_empty(!question.is_required());

        if let Some(text) = current.and_then(|answer| answer.value().as_text()) {
            builder = builder.with_initial_text(text);
        }

        let text = prompt_result(builder.interact_text())?;
        Ok(text_step(question, text))
    }

    fn ask_rating(
        &self,
        question: &Question,
        current: Option<&Answer>,
        can_go_back: bool,
    ) -> Result<Step, RunnerError> {
        let items = rating_items(can_go_back);
        let default = current
            .and_then(|answer| answer.value().as_rating())
            .map_or(0, |rating| usize::from(rating.get() - Rating::MIN));

        let Some(selection) = self.select(&prompt_for(question), &items, default)? else {
            return Ok(Step::Back);
        };
        match u8::try_from(selection) {
            Ok(offset) if selection < usize::from(Rating::MAX) => {
                Ok(Step::Answer(AnswerValue::rating(Rating::MIN + offset)?))
            }
            _ => Ok(Step::Back),
        }
    }

    fn ask_single(
        &self,
        question: &Question,
        current: Option<&Answer>,
        can_go_back: bool,
    ) -> Result<Step, RunnerError> {
        let items = choice_items(question, can_go_back);
        let default = current
            .and_then(|answer| {
                question
                    .options()
                    .iter()
                    .position(|option| answer.selects(&option.id))
            })
            .unwrap_or(0);

        let Some(selection) = self.select(&prompt_for(question), &items, default)? else {
            return Ok(Step::Back);
        };
        match question.options().get(selection) {
            Some(option) => Ok(Step::Answer(AnswerValue::choice([option.id.clone()]))),
            None => Ok(Step::Back),
        }
    }

    fn ask_multi(&self, question: &Question, current: Option<&Answer>) -> Result<Step, RunnerError> {
        let items: Vec<&str> = question
            .options()
            .iter()
            .map(|option| option.text.as_str())
            .collect();
        let defaults: Vec<bool> = question
            .options()
            .iter()
            .map(|option| current.is_some_and(|answer| answer.selects(&option.id)))
            .collect();

        let mut builder: MultiSelect;
        let _theme;
        if self.colorful {
            _theme = ColorfulTheme::default();
            builder = MultiSelect::with_theme(&_theme);
        } else {
            builder = MultiSelect::new();
        }

        builder = builder
            .with_prompt(format!("{} (space to toggle, Esc to go back)", prompt_for(question)))
            .items(&items)
            .defaults(&defaults);

        let Some(indices) = prompt_result(builder.interact_opt())? else {
            return Ok(Step::Back);
        };
        Ok(multi_step(question, &indices))
    }

    fn select(
        &self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, RunnerError> {
        let mut builder: Select;
        let _theme;
        if self.colorful {
            _theme = ColorfulTheme::default();
            builder = Select::with_theme(&_theme);
        } else {
            builder = Select::new();
        }

        builder = builder.with_prompt(prompt).items(items).default(default);
        prompt_result(builder.interact_opt())
    }

    fn confirm_submit(&self) -> Result<bool, RunnerError> {
        let mut builder: Confirm;
        let _theme;
        if self.colorful {
            _theme = ColorfulTheme::default();
            builder = Confirm::with_theme(&_theme);
        } else {
            builder = Confirm::new();
        }

        builder = builder
            .with_prompt("That was the last question. Submit your answers?")
            .default(true);
        prompt_result(builder.interact())
    }
}

fn prompt_for(question: &Question) -> String {
    if question.is_required() {
        question.text().to_string()
    } else {
        format!("{} (optional)", question.text())
    }
}

fn rating_items(can_go_back: bool) -> Vec<String> {
    let mut items: Vec<String> = (Rating::MIN..=Rating::MAX)
        .map(|value| format!("{value} {}", stars(value)))
        .collect();
    if can_go_back {
        items.push(BACK_ITEM.to_string());
    }
    items
}

fn choice_items(question: &Question, can_go_back: bool) -> Vec<String> {
    let mut items: Vec<String> = question
        .options()
        .iter()
        .map(|option| option.text.clone())
        .collect();
    if can_go_back {
        items.push(BACK_ITEM.to_string());
    }
    items
}

fn text_step(question: &Question, text: String) -> Step {
    let trimmed = text.trim();
    if trimmed == BACK_COMMAND {
        Step::Back
    } else if trimmed.is_empty() {
        // Required questions are then caught by `advance`.
        Step::Skip
    } else {
        Step::Answer(AnswerValue::text(trimmed))
    }
}

fn multi_step(question: &Question, indices: &[usize]) -> Step {
    let selected: Vec<_> = indices
        .iter()
        .filter_map(|&index| question.options().get(index))
        .map(|option| option.id.clone())
        .collect();
    // An empty set is a valid answer only where an answer is optional.
    if selected.is_empty() && question.is_required() {
        Step::Skip
    } else {
        Step::Answer(AnswerValue::choice(selected))
    }
}

fn stars(value: u8) -> String {
    let filled = usize::from(value);
    let empty = usize::from(Rating::MAX).saturating_sub(filled);
    format!("{}{}", "*".repeat(filled), ".".repeat(empty))
}

/// Human-readable form of an answer, using option texts for choices.
pub fn describe_answer(question: &Question, answer: &Answer) -> String {
    match answer.value() {
        AnswerValue::Text(text) => text.clone(),
        AnswerValue::Rating(rating) => format!("{}/{}", rating.get(), Rating::MAX),
        AnswerValue::Choice(selected) => selected
            .iter()
            .map(|id| question.option(id).map_or(id.as_str(), |option| option.text.as_str()))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// One `question: answer` line per question on the visible path.
pub fn review_lines(session: &ResponseSession) -> Vec<String> {
    session
        .visible_path()
        .into_iter()
        .map(|question| {
            let answer = session
                .answers()
                .get(question.id())
                .map_or_else(|| "-".to_string(), |answer| describe_answer(question, answer));
            format!("{}: {answer}", question.text())
        })
        .collect()
}
