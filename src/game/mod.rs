pub mod builder;
pub mod round;

pub use builder::{Choice, Question, build_round};
pub use round::{QuizRound, RoundPhase, RoundSnapshot};
