//! Visibility resolution.
//!
//! A single forward pass over the `order`-sorted questions. Root questions are
//! always visible. A dependent question is visible iff its parent has a
//! recorded answer selecting the trigger option. Parents precede children
//! (checked on load), so one pass is enough.

use questionnaire_types::{Answers, Question};

use crate::QuestionGraph;
use crate::loader::Gate;

/// Compute the ordered list of currently visible questions.
///
/// Pure: the same inputs always produce the same, order-stable output.
pub fn resolve<'g>(graph: &'g QuestionGraph, answers: &Answers) -> Vec<&'g Question> {
    visible_positions(graph, answers)
        .into_iter()
        .map(|position| &graph.questions()[position])
        .collect()
}

/// Same as `resolve`, as positions into `graph.questions()`.
pub(crate) fn visible_positions(graph: &QuestionGraph, answers: &Answers) -> Vec<usize> {
    let questions = graph.questions();
    (0..questions.len())
        .filter(|&position| match graph.gate(position) {
            Gate::Root => true,
            Gate::Trigger { parent, option } => answers
                .get(questions[*parent].id())
                .is_some_and(|answer| answer.selects(option)),
            Gate::Never(_) => false,
        })
        .collect()
}

/// Every question, for read-only review of a completed response.
pub(crate) fn all_positions(graph: &QuestionGraph) -> Vec<usize> {
    (0..graph.len()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use questionnaire_types::{
        Answer, AnswerValue, QuestionId, QuestionType, QuestionnaireDefinition,
    };

    fn graph() -> QuestionGraph {
        QuestionGraph::load(QuestionnaireDefinition::new(
            "camp",
            "Camp",
            vec![
                Question::new("activities", 1, QuestionType::MultiChoice, "What did you do?")
                    .with_option("hike", "Hiking")
                    .with_option("swim", "Swimming")
                    .with_option("craft", "Crafts"),
                Question::new("hike-length", 2, QuestionType::SingleChoice, "How long?")
                    .depends_on("activities", "hike")
                    .with_option("short", "Short")
                    .with_option("long", "Long"),
                Question::new("too-long", 3, QuestionType::FreeText, "What was too much?")
                    .depends_on("hike-length", "long"),
                Question::new("swim-rating", 4, QuestionType::Rating, "Rate the lake")
                    .depends_on("activities", "swim"),
                Question::new("overall", 5, QuestionType::Rating, "Overall?"),
            ],
        ))
        .unwrap()
    }

    fn answer(graph: &QuestionGraph, id: &str, value: AnswerValue) -> Answer {
        Answer::new(graph.get(&QuestionId::from(id)).unwrap(), value).unwrap()
    }

    fn ids(visible: &[&Question]) -> Vec<String> {
        visible.iter().map(|q| q.id().to_string()).collect()
    }

    #[test]
    fn only_roots_on_empty_answers() {
        let graph = graph();
        let visible = resolve(&graph, &Answers::new());
        assert_eq!(ids(&visible), vec!["activities", "overall"]);
    }

    #[test]
    fn multi_choice_opens_several_branches() {
        let graph = graph();
        let answers: Answers =
            [answer(&graph, "activities", AnswerValue::choice(["hike", "swim"]))]
                .into_iter()
                .collect();

        let visible = resolve(&graph, &answers);
        assert_eq!(
            ids(&visible),
            vec!["activities", "hike-length", "swim-rating", "overall"]
        );
    }

    #[test]
    fn chains_resolve_in_one_pass() {
        let graph = graph();
        let answers: Answers = [
            answer(&graph, "activities", AnswerValue::choice(["hike"])),
            answer(&graph, "hike-length", AnswerValue::choice(["long"])),
        ]
        .into_iter()
        .collect();

        let visible = resolve(&graph, &answers);
        assert_eq!(
            ids(&visible),
            vec!["activities", "hike-length", "too-long", "overall"]
        );
    }

    #[test]
    fn non_choice_answers_trigger_nothing() {
        let graph = graph();
        let answers: Answers = [answer(&graph, "overall", AnswerValue::rating(5).unwrap())]
            .into_iter()
            .collect();

        assert_eq!(ids(&resolve(&graph, &answers)), vec!["activities", "overall"]);
    }

    #[test]
    fn resolve_is_repeatable() {
        let graph = graph();
        let answers: Answers = [answer(&graph, "activities", AnswerValue::choice(["swim"]))]
            .into_iter()
            .collect();

        let first = ids(&resolve(&graph, &answers));
        let second = ids(&resolve(&graph, &answers));
        assert_eq!(first, second);
    }

    #[test]
    fn all_positions_covers_hidden_questions() {
        let graph = graph();
        assert_eq!(all_positions(&graph), vec![0, 1, 2, 3, 4]);
    }
}
