//! Question graph loading.
//!
//! Turns an unordered questionnaire definition into an `order`-sorted question
//! graph and decides, once, how each dependent question is gated. Broken
//! branch references never raise: the affected question is marked unreachable
//! and stays hidden forever. Only structural problems that would make
//! visibility resolution wrong (duplicate ids, a child ordered before its
//! parent) reject the definition.

use std::collections::HashMap;

use questionnaire_types::{
    Answer, AnswerRecord, Answers, OptionId, Question, QuestionId, QuestionnaireDefinition,
    QuestionnaireId,
};
use tracing::{debug, warn};

use crate::LoadError;

/// Why a dependent question can never become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unreachable {
    /// The parent question does not exist in the questionnaire.
    MissingParent,

    /// A parent is set but no trigger option.
    MissingTrigger,

    /// The parent is not a choice question, so it cannot select anything.
    ParentNotChoice,

    /// The trigger option is not one of the parent's options.
    UnknownTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Gate {
    Root,
    Trigger { parent: usize, option: OptionId },
    Never(Unreachable),
}

/// The static question graph of one questionnaire instance.
#[derive(Debug, Clone)]
pub struct QuestionGraph {
    id: QuestionnaireId,
    title: String,
    description: Option<String>,
    questions: Vec<Question>,
    gates: Vec<Gate>,
    positions: HashMap<QuestionId, usize>,
}

impl QuestionGraph {
    /// Load a definition, sorting questions ascending by `order`.
    ///
    /// Questions sharing an `order` keep their definition order.
    pub fn load(definition: QuestionnaireDefinition) -> Result<Self, LoadError> {
        let QuestionnaireDefinition {
            id,
            title,
            description,
            mut questions,
        } = definition;

        questions.sort_by_key(Question::order);

        let mut positions = HashMap::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            if positions.insert(question.id().clone(), position).is_some() {
                return Err(LoadError::DuplicateQuestion(question.id().clone()));
            }
        }

        let gates = questions
            .iter()
            .map(|question| gate_for(question, &questions, &positions))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            questionnaire = %id,
            questions = questions.len(),
            "loaded question graph"
        );

        Ok(Self {
            id,
            title,
            description,
            questions,
            gates,
            positions,
        })
    }

    /// Build the initial answer map from previously saved records.
    ///
    /// Records that do not fit the graph (unknown question, wrong shape,
    /// unknown option) are dropped.
    pub fn hydrate(&self, records: &[AnswerRecord]) -> Answers {
        let mut answers = Answers::new();
        for record in records {
            let Some(question) = self.get(&record.question_id) else {
                warn!(
                    questionnaire = %self.id,
                    question = %record.question_id,
                    "dropping saved answer for unknown question"
                );
                continue;
            };
            match Answer::from_record(question, record) {
                Ok(answer) => {
                    answers.insert(answer);
                }
                Err(err) => {
                    warn!(questionnaire = %self.id, "dropping saved answer: {err}");
                }
            }
        }
        answers
    }

    pub fn id(&self) -> &QuestionnaireId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// All questions, sorted by `order`.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.position(id).map(|position| &self.questions[position])
    }

    /// Index of a question in the sorted sequence.
    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Why a question can never be shown, if it can't.
    pub fn unreachable(&self, id: &QuestionId) -> Option<Unreachable> {
        match self.gates.get(self.position(id)?)? {
            Gate::Never(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub(crate) fn gate(&self, position: usize) -> &Gate {
        &self.gates[position]
    }
}

fn gate_for(
    question: &Question,
    questions: &[Question],
    positions: &HashMap<QuestionId, usize>,
) -> Result<Gate, LoadError> {
    let Some(parent_id) = question.parent_question_id() else {
        return Ok(Gate::Root);
    };

    let Some(&parent) = positions.get(parent_id) else {
        return Ok(never(question, Unreachable::MissingParent));
    };
    let parent_question = &questions[parent];

    if parent_question.order() >= question.order() {
        return Err(LoadError::OrderingViolation {
            question: question.id().clone(),
            parent: parent_id.clone(),
        });
    }

    let Some(option) = question.trigger_option_id() else {
        return Ok(never(question, Unreachable::MissingTrigger));
    };
    if !parent_question.question_type().is_choice() {
        return Ok(never(question, Unreachable::ParentNotChoice));
    }
    if !parent_question.has_option(option) {
        return Ok(never(question, Unreachable::UnknownTrigger));
    }

    Ok(Gate::Trigger {
        parent,
        option: option.clone(),
    })
}

fn never(question: &Question, reason: Unreachable) -> Gate {
    warn!(
        question = %question.id(),
        ?reason,
        "branch reference is broken, question stays hidden"
    );
    Gate::Never(reason)
}
