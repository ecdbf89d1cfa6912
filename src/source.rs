use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{SourceConfig, SourceKind};
use crate::error::SourceError;

/// Incorrect answers per multiple-choice question; together with the correct
/// answer this yields the four choices shown for each question.
pub const INCORRECT_PER_QUESTION: usize = 3;

/// One raw question record as served by the question bank. Extra wire fields
/// (`category`, `difficulty`, `type`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(rename = "question")]
    pub prompt: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

/// Wire envelope of the question bank API.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionBatch {
    pub response_code: u8,
    pub results: Vec<RawQuestion>,
}

/// Parses a question bank payload and checks the input contract the game
/// relies on: a zero response code, the expected number of records, and
/// exactly three non-empty incorrect answers next to a non-empty correct one.
pub fn parse_round(content: &str, expected: usize) -> Result<Vec<RawQuestion>, SourceError> {
    let batch: QuestionBatch =
        serde_json::from_str(content).map_err(|e| SourceError::Parse(e.to_string()))?;

    if batch.response_code != 0 {
        return Err(SourceError::Api {
            code: batch.response_code,
        });
    }

    validate_round(&batch.results, expected)?;
    Ok(batch.results)
}

fn validate_round(records: &[RawQuestion], expected: usize) -> Result<(), SourceError> {
    if records.len() != expected {
        return Err(SourceError::Malformed(format!(
            "expected {} questions, got {}",
            expected,
            records.len()
        )));
    }

    for (index, record) in records.iter().enumerate() {
        if record.prompt.trim().is_empty() {
            return Err(SourceError::Malformed(format!(
                "question {index} has an empty prompt"
            )));
        }
        if record.correct_answer.trim().is_empty() {
            return Err(SourceError::Malformed(format!(
                "question {index} has an empty correct answer"
            )));
        }
        if record.incorrect_answers.len() != INCORRECT_PER_QUESTION {
            return Err(SourceError::Malformed(format!(
                "question {index} has {} incorrect answers, expected {}",
                record.incorrect_answers.len(),
                INCORRECT_PER_QUESTION
            )));
        }
        if record
            .incorrect_answers
            .iter()
            .any(|answer| answer.trim().is_empty())
        {
            return Err(SourceError::Malformed(format!(
                "question {index} has an empty incorrect answer"
            )));
        }
    }

    Ok(())
}

/// Where rounds of questions come from. The game core never performs I/O;
/// everything behind this trait is fetch-and-validate.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_round(&self) -> Result<Vec<RawQuestion>, SourceError>;
}

pub struct HttpQuestionSource {
    client: reqwest::Client,
    url: String,
    questions_per_round: usize,
}

impl HttpQuestionSource {
    pub fn new(config: &SourceConfig) -> Self {
        let url = format!(
            "{}?amount={}&category={}&difficulty={}&type=multiple",
            config.http_url, config.questions_per_round, config.category, config.difficulty
        );
        Self {
            client: reqwest::Client::new(),
            url,
            questions_per_round: config.questions_per_round,
        }
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    #[tracing::instrument(skip(self), fields(http.url = %self.url))]
    async fn fetch_round(&self) -> Result<Vec<RawQuestion>, SourceError> {
        tracing::debug!("Fetching questions from question bank");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::HttpFetch {
                url: self.url.clone(),
                source: e,
            })?;

        let body = response.text().await.map_err(|e| SourceError::HttpFetch {
            url: self.url.clone(),
            source: e,
        })?;

        parse_round(&body, self.questions_per_round)
    }
}

pub struct FileQuestionSource {
    path: String,
    questions_per_round: usize,
}

impl FileQuestionSource {
    pub fn new(path: String, questions_per_round: usize) -> Self {
        Self {
            path,
            questions_per_round,
        }
    }
}

#[async_trait]
impl QuestionSource for FileQuestionSource {
    #[tracing::instrument(skip(self), fields(file.path = %self.path))]
    async fn fetch_round(&self) -> Result<Vec<RawQuestion>, SourceError> {
        tracing::debug!("Reading questions from file");
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| SourceError::FileRead {
                    path: self.path.clone(),
                    source: e,
                })?;

        parse_round(&content, self.questions_per_round)
    }
}

pub fn build_source(config: &SourceConfig) -> Result<Box<dyn QuestionSource>, SourceError> {
    match config.kind {
        SourceKind::Http => Ok(Box::new(HttpQuestionSource::new(config))),
        SourceKind::File => {
            let path = config.file_path.as_ref().ok_or_else(|| {
                SourceError::Config("File path required for file source".to_string())
            })?;
            Ok(Box::new(FileQuestionSource::new(
                path.clone(),
                config.questions_per_round,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_json(count: usize) -> String {
        let results: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "category": "Geography",
                    "type": "multiple",
                    "difficulty": "easy",
                    "question": format!("Question {i}?"),
                    "correct_answer": format!("Right {i}"),
                    "incorrect_answers": [
                        format!("Wrong {i}a"),
                        format!("Wrong {i}b"),
                        format!("Wrong {i}c"),
                    ],
                })
            })
            .collect();
        serde_json::json!({ "response_code": 0, "results": results }).to_string()
    }

    #[test]
    fn parses_a_full_round() {
        let records = parse_round(&batch_json(5), 5).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].prompt, "Question 0?");
        assert_eq!(records[0].correct_answer, "Right 0");
        assert_eq!(records[0].incorrect_answers.len(), 3);
    }

    #[test]
    fn rejects_non_zero_response_code() {
        let content = r#"{ "response_code": 1, "results": [] }"#;
        assert!(matches!(
            parse_round(content, 5),
            Err(SourceError::Api { code: 1 })
        ));
    }

    #[test]
    fn rejects_wrong_question_count() {
        assert!(matches!(
            parse_round(&batch_json(4), 5),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_wrong_incorrect_answer_count() {
        let content = serde_json::json!({
            "response_code": 0,
            "results": [{
                "question": "2+2?",
                "correct_answer": "4",
                "incorrect_answers": ["3", "5"],
            }],
        })
        .to_string();
        assert!(matches!(
            parse_round(&content, 1),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_empty_fields() {
        let content = serde_json::json!({
            "response_code": 0,
            "results": [{
                "question": " ",
                "correct_answer": "4",
                "incorrect_answers": ["3", "5", "22"],
            }],
        })
        .to_string();
        assert!(matches!(
            parse_round(&content, 1),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_garbage_payload() {
        assert!(matches!(
            parse_round("not json at all", 5),
            Err(SourceError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn file_source_reads_a_round() {
        let path = std::env::temp_dir().join("kviss_file_source_test.json");
        tokio::fs::write(&path, batch_json(5)).await.unwrap();

        let source = FileQuestionSource::new(path.to_string_lossy().into_owned(), 5);
        let records = source.fetch_round().await.unwrap();
        assert_eq!(records.len(), 5);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn file_source_reports_missing_file() {
        let source = FileQuestionSource::new("/nonexistent/kviss.json".to_string(), 5);
        assert!(matches!(
            source.fetch_round().await,
            Err(SourceError::FileRead { .. })
        ));
    }

    #[test]
    fn http_source_builds_the_bank_url() {
        let config = SourceConfig {
            kind: SourceKind::Http,
            http_url: "https://opentdb.com/api.php".to_string(),
            file_path: None,
            category: 22,
            difficulty: "easy".to_string(),
            questions_per_round: 5,
        };
        let source = HttpQuestionSource::new(&config);
        assert_eq!(
            source.url,
            "https://opentdb.com/api.php?amount=5&category=22&difficulty=easy&type=multiple"
        );
    }
}
