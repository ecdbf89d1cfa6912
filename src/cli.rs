use std::io::Write;

use rand::thread_rng;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::Result as AppResult;
use crate::game::{QuizRound, RoundPhase, RoundSnapshot, build_round};
use crate::retry::{RetryPolicy, fetch_round_with_retry};
use crate::source::QuestionSource;

const HELP: &str = "Commands:
  pick <question> <choice>   select an answer (picking it again clears it)
  check                      reveal the correct answers
  again                      fetch a fresh round
  help                       show this text
  quit                       leave the game";

/// One player action, parsed from a line of input. Indices are 1-based on
/// the wire and 0-based internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Pick { question: usize, choice: usize },
    Check,
    PlayAgain,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<PlayerCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(keyword) = parts.next() else {
        return Err("Empty command, try `help`".to_string());
    };

    let command = match keyword.to_lowercase().as_str() {
        "pick" | "p" => {
            let question = parse_index(parts.next(), "question")?;
            let choice = parse_index(parts.next(), "choice")?;
            PlayerCommand::Pick { question, choice }
        }
        "check" | "c" => PlayerCommand::Check,
        "again" | "a" => PlayerCommand::PlayAgain,
        "help" | "h" | "?" => PlayerCommand::Help,
        "quit" | "q" | "exit" => PlayerCommand::Quit,
        other => return Err(format!("Unknown command `{other}`, try `help`")),
    };

    if parts.next().is_some() {
        return Err("Trailing input after command, try `help`".to_string());
    }
    Ok(command)
}

fn parse_index(part: Option<&str>, what: &str) -> Result<usize, String> {
    let raw = part.ok_or_else(|| format!("Missing {what} number"))?;
    let number: usize = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a valid {what} number"))?;
    if number == 0 {
        return Err(format!("{what} numbers start at 1"));
    }
    Ok(number - 1)
}

/// Renders a round snapshot as text. Pure; all interaction state comes in
/// through the snapshot.
pub fn render(snapshot: &RoundSnapshot) -> String {
    let mut out = String::new();

    for (question_index, question) in snapshot.questions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", question_index + 1, question.prompt));
        for (choice_index, choice) in question.choices.iter().enumerate() {
            let marker = match snapshot.phase {
                RoundPhase::Answering => {
                    if choice.is_chosen {
                        "[x]"
                    } else {
                        "[ ]"
                    }
                }
                RoundPhase::Reviewed => {
                    if choice.is_correct {
                        "[✓]"
                    } else if choice.is_chosen {
                        "[✗]"
                    } else {
                        "[ ]"
                    }
                }
            };
            out.push_str(&format!(
                "   {} {}) {}\n",
                marker,
                choice_index + 1,
                choice.text
            ));
        }
    }

    if snapshot.phase == RoundPhase::Reviewed {
        out.push_str(&format!(
            "You scored {}/{} correct answers\n",
            snapshot.score(),
            snapshot.questions.len()
        ));
    }

    out
}

async fn start_round(
    source: &dyn QuestionSource,
    policy: &RetryPolicy,
    round: &mut QuizRound,
) -> AppResult<()> {
    let records = fetch_round_with_retry(source, policy).await?;
    let questions = build_round(&records, &mut thread_rng());
    round.load(questions);
    Ok(())
}

/// Drives the game loop: fetch a round on startup, then apply one parsed
/// command at a time until the player quits.
pub async fn run(source: &dyn QuestionSource, policy: &RetryPolicy) -> AppResult<()> {
    let mut round = QuizRound::new();
    start_round(source, policy, &mut round).await?;
    tracing::info!(questions.count = round.questions().len(), "Round ready");

    println!("{}", render(&round.snapshot()));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Err(message) => println!("{message}"),
            Ok(PlayerCommand::Pick { question, choice }) => {
                round.toggle_choice(question, choice);
                println!("{}", render(&round.snapshot()));
            }
            Ok(PlayerCommand::Check) => {
                if round.phase() == RoundPhase::Reviewed {
                    println!("Answers are already revealed, `again` starts a fresh round");
                } else {
                    round.check();
                    tracing::debug!(score = round.score(), "Correctness revealed");
                    println!("{}", render(&round.snapshot()));
                }
            }
            Ok(PlayerCommand::PlayAgain) => {
                start_round(source, policy, &mut round).await?;
                println!("{}", render(&round.snapshot()));
            }
            Ok(PlayerCommand::Help) => println!("{HELP}"),
            Ok(PlayerCommand::Quit) => break,
        }
    }

    Ok(())
}
