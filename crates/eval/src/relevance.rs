//! Risk relevance: which risks the answered questions make relevant.

use std::collections::BTreeSet;

use riskmap_interchange::{answer_in, Answers, Question};

/// Sorted, duplicate-free risk ids.
///
/// A question contributes its risks only when it applies to at least one
/// selected persona, is answered, and the answer is in its `relevance` set.
pub fn relevant_risks(
    questions: &[Question],
    answers: &Answers,
    selected_personas: &[String],
) -> Vec<String> {
    let mut risks = BTreeSet::new();
    for q in questions {
        if !q.applies_to(selected_personas) {
            continue;
        }
        let Some(label) = answers.get(&q.id).filter(|a| !a.is_empty()) else {
            continue;
        };
        if answer_in(label, &q.relevance) {
            risks.extend(q.risks.iter().cloned());
        }
    }
    risks.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskmap_interchange::SelfAssessment;
    use serde_json::json;

    fn questions() -> Vec<Question> {
        SelfAssessment::from_json(&json!({
            "questions": [
                { "id": "Q", "personas": ["creator"], "relevance": ["Yes"], "risks": ["R2", "R1"] },
                { "id": "Open", "relevance": [true], "risks": ["R3", "R1"] }
            ]
        }))
        .unwrap()
        .questions
    }

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        let mut a = Answers::new();
        for (q, l) in pairs {
            a.insert(*q, *l);
        }
        a
    }

    #[test]
    fn answer_in_relevance_adds_risks() {
        let creator = vec!["creator".to_string()];
        assert_eq!(
            relevant_risks(&questions(), &answers(&[("Q", "Yes")]), &creator),
            vec!["R1", "R2"]
        );
        assert!(relevant_risks(&questions(), &answers(&[("Q", "No")]), &creator).is_empty());
    }

    #[test]
    fn out_of_persona_questions_are_ignored() {
        let consumer = vec!["consumer".to_string()];
        assert!(relevant_risks(&questions(), &answers(&[("Q", "Yes")]), &consumer).is_empty());
    }

    #[test]
    fn empty_persona_list_applies_to_all_and_matches_booleans() {
        let risks = relevant_risks(&questions(), &answers(&[("Open", "Yes")]), &[]);
        assert_eq!(risks, vec!["R1", "R3"]);
    }

    #[test]
    fn unanswered_questions_are_ignored() {
        let creator = vec!["creator".to_string()];
        assert!(relevant_risks(&questions(), &answers(&[("Q", "")]), &creator).is_empty());
    }
}
