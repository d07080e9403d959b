use std::collections::HashMap;

use crate::{Answer, QuestionId};

/// The in-progress answer map of one response, keyed by question id.
///
/// Holds at most one answer per question. Inserting replaces the previous
/// answer; nothing is ever merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    values: HashMap<QuestionId, Answer>,
}

impl Answers {
    /// Create a new empty answer map.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Insert an answer, returning the one it replaced.
    pub fn insert(&mut self, answer: Answer) -> Option<Answer> {
        self.values.insert(answer.question_id().clone(), answer)
    }

    pub fn get(&self, question: &QuestionId) -> Option<&Answer> {
        self.values.get(question)
    }

    pub fn contains(&self, question: &QuestionId) -> bool {
        self.values.contains_key(question)
    }

    /// Get an iterator over all answers, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<Answer> for Answers {
    fn from_iter<T: IntoIterator<Item = Answer>>(iter: T) -> Self {
        let mut answers = Answers::new();
        for answer in iter {
            answers.insert(answer);
        }
        answers
    }
}

impl<'a> IntoIterator for &'a Answers {
    type Item = &'a Answer;
    type IntoIter = std::collections::hash_map::Values<'a, QuestionId, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerValue, Question, QuestionType};

    #[test]
    fn insert_replaces_instead_of_merging() {
        let question = Question::new("q1", 1, QuestionType::MultiChoice, "Pick")
            .with_option("a", "A")
            .with_option("b", "B");

        let mut answers = Answers::new();
        answers.insert(Answer::new(&question, AnswerValue::choice(["a", "b"])).unwrap());
        let previous = answers.insert(Answer::new(&question, AnswerValue::choice(["b"])).unwrap());

        assert!(previous.is_some());
        assert_eq!(answers.len(), 1);
        let stored = answers.get(&QuestionId::from("q1")).unwrap();
        assert_eq!(stored.value(), &AnswerValue::choice(["b"]));
    }
}
