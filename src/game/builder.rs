use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::RawQuestion;

/// One selectable answer. `is_correct` is fixed at build time; `is_chosen`
/// is the only field that changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub is_correct: bool,
    pub is_chosen: bool,
}

/// A prompt with its four shuffled choices. Exactly one choice is correct;
/// at most one is chosen at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    pub choices: Vec<Choice>,
}

impl Question {
    pub fn chosen_correctly(&self) -> bool {
        self.choices
            .iter()
            .any(|choice| choice.is_chosen && choice.is_correct)
    }
}

/// Turns raw records into quiz-ready questions, one per record, preserving
/// record order. Choice order is a uniform random permutation of the three
/// incorrect answers and the correct one; the caller's records are left
/// untouched. The random source is injected so rounds can be built
/// deterministically under test.
pub fn build_round<R: Rng>(records: &[RawQuestion], rng: &mut R) -> Vec<Question> {
    records
        .iter()
        .map(|record| build_question(record, rng))
        .collect()
}

fn build_question<R: Rng>(record: &RawQuestion, rng: &mut R) -> Question {
    let mut texts: Vec<&str> = record
        .incorrect_answers
        .iter()
        .map(String::as_str)
        .collect();
    texts.push(record.correct_answer.as_str());
    texts.shuffle(rng);

    let choices = texts
        .into_iter()
        .map(|text| Choice {
            text: text.to_string(),
            is_correct: text == record.correct_answer,
            is_chosen: false,
        })
        .collect();

    Question {
        id: Uuid::new_v4(),
        prompt: record.prompt.clone(),
        choices,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn arithmetic_record() -> RawQuestion {
        RawQuestion {
            prompt: "2+2?".to_string(),
            correct_answer: "4".to_string(),
            incorrect_answers: vec!["3".to_string(), "5".to_string(), "22".to_string()],
        }
    }

    fn capital_record() -> RawQuestion {
        RawQuestion {
            prompt: "Capital of Sweden?".to_string(),
            correct_answer: "Stockholm".to_string(),
            incorrect_answers: vec![
                "Oslo".to_string(),
                "Copenhagen".to_string(),
                "Helsinki".to_string(),
            ],
        }
    }

    #[test]
    fn builds_one_question_per_record_in_order() {
        let records = vec![capital_record(), arithmetic_record()];
        let mut rng = StdRng::seed_from_u64(1);

        let questions = build_round(&records, &mut rng);

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].prompt, "Capital of Sweden?");
        assert_eq!(questions[1].prompt, "2+2?");
    }

    #[test]
    fn exactly_one_correct_choice_with_the_full_text_set() {
        let mut rng = StdRng::seed_from_u64(2);
        let questions = build_round(&[arithmetic_record()], &mut rng);
        let question = &questions[0];

        assert_eq!(question.choices.len(), 4);
        assert_eq!(
            question
                .choices
                .iter()
                .filter(|choice| choice.is_correct)
                .count(),
            1
        );
        assert!(question.choices.iter().all(|choice| !choice.is_chosen));

        let correct = question
            .choices
            .iter()
            .find(|choice| choice.is_correct)
            .unwrap();
        assert_eq!(correct.text, "4");

        let mut texts: Vec<&str> = question
            .choices
            .iter()
            .map(|choice| choice.text.as_str())
            .collect();
        texts.sort_unstable();
        assert_eq!(texts, ["22", "3", "4", "5"]);
    }

    #[test]
    fn correct_answer_lands_in_every_position() {
        let record = arithmetic_record();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 4];

        for _ in 0..200 {
            let questions = build_round(std::slice::from_ref(&record), &mut rng);
            let position = questions[0]
                .choices
                .iter()
                .position(|choice| choice.is_correct)
                .unwrap();
            seen[position] = true;

            let mut texts: Vec<&str> = questions[0]
                .choices
                .iter()
                .map(|choice| choice.text.as_str())
                .collect();
            texts.sort_unstable();
            assert_eq!(texts, ["22", "3", "4", "5"]);
        }

        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn caller_records_are_not_mutated() {
        let records = vec![arithmetic_record(), capital_record()];
        let before = records.clone();
        let mut rng = StdRng::seed_from_u64(4);

        let _ = build_round(&records, &mut rng);

        assert_eq!(records, before);
    }

    #[test]
    fn same_seed_gives_the_same_choice_order() {
        let records = vec![arithmetic_record()];

        let first = build_round(&records, &mut StdRng::seed_from_u64(9));
        let second = build_round(&records, &mut StdRng::seed_from_u64(9));

        let texts = |questions: &[Question]| {
            questions[0]
                .choices
                .iter()
                .map(|choice| choice.text.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(texts(&first), texts(&second));
    }
}
