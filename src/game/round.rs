use serde::{Deserialize, Serialize};

use super::builder::Question;

/// The two interaction modes of a round: picking answers, or reviewing them
/// with correctness revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Answering,
    Reviewed,
}

/// One trivia round: the questions on screen plus the current phase. The
/// round owns its questions outright; readers only ever get cloned
/// snapshots, so every mutation goes through the methods below.
#[derive(Debug)]
pub struct QuizRound {
    questions: Vec<Question>,
    phase: RoundPhase,
}

/// Read-only copy of the round state handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct RoundSnapshot {
    pub questions: Vec<Question>,
    pub phase: RoundPhase,
}

impl RoundSnapshot {
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| question.chosen_correctly())
            .count()
    }
}

impl QuizRound {
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            phase: RoundPhase::Answering,
        }
    }

    /// Replaces the whole question set and returns the round to `Answering`.
    /// Prior selections are discarded along with the old questions; this is
    /// the only way the question set changes identity.
    pub fn load(&mut self, questions: Vec<Question>) {
        tracing::debug!(questions.count = questions.len(), "Loading question set");
        self.questions = questions;
        self.phase = RoundPhase::Answering;
    }

    /// Toggles one choice. Picking an unchosen choice deselects the rest of
    /// its question; picking the chosen one clears the selection. Other
    /// questions are untouched. Out-of-range indices are a caller bug and
    /// are logged and ignored. Allowed in both phases; whether picks should
    /// be locked after reveal is presentation policy.
    pub fn toggle_choice(&mut self, question_index: usize, choice_index: usize) {
        let Some(question) = self.questions.get_mut(question_index) else {
            tracing::warn!(
                question.index = question_index,
                "Toggle for unknown question"
            );
            return;
        };
        if choice_index >= question.choices.len() {
            tracing::warn!(
                question.index = question_index,
                choice.index = choice_index,
                "Toggle for unknown choice"
            );
            return;
        }

        let was_chosen = question.choices[choice_index].is_chosen;
        for (index, choice) in question.choices.iter_mut().enumerate() {
            choice.is_chosen = index == choice_index && !was_chosen;
        }
    }

    /// Reveals correctness. Calling it again while revealed changes nothing;
    /// starting over is a separate action that loads a fresh round.
    pub fn check(&mut self) {
        if self.phase == RoundPhase::Answering {
            self.phase = RoundPhase::Reviewed;
        }
    }

    /// Number of questions whose chosen choice is the correct one. Pure;
    /// unanswered questions simply do not count.
    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| question.chosen_correctly())
            .count()
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            questions: self.questions.clone(),
            phase: self.phase,
        }
    }
}

impl Default for QuizRound {
    fn default() -> Self {
        Self::new()
    }
}
