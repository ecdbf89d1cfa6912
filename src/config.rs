use crate::error::{ConfigError, Result as AppResult};
use config::{Config, Environment, File};
use serde::Deserialize;

const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Http,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub http_url: String,
    pub file_path: Option<String>,
    pub category: u32,
    pub difficulty: String,
    pub questions_per_round: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// 0 means retry until the source recovers.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct AppSettings {
    pub source: SourceConfig,
    pub retry: RetryConfig,
}

pub fn load_settings() -> AppResult<AppSettings> {
    let builder = Config::builder()
        .set_default("source.kind", "http")
        .and_then(|b| b.set_default("source.http_url", "https://opentdb.com/api.php"))
        .and_then(|b| b.set_default("source.category", 22_i64))
        .and_then(|b| b.set_default("source.difficulty", "easy"))
        .and_then(|b| b.set_default("source.questions_per_round", 5_i64))
        .and_then(|b| b.set_default("retry.max_attempts", 5_i64))
        .and_then(|b| b.set_default("retry.initial_delay_ms", 500_i64))
        .and_then(|b| b.set_default("retry.max_delay_ms", 8000_i64))
        .map_err(|e| ConfigError::Load(e.to_string()))?
        .add_source(
            Environment::with_prefix("KVISS")
                .separator("__")
                .try_parsing(true),
        )
        .add_source(File::with_name("config").required(false));

    let settings = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let settings: AppSettings = settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &AppSettings) -> Result<(), ConfigError> {
    if !DIFFICULTIES.contains(&settings.source.difficulty.as_str()) {
        return Err(ConfigError::InvalidValue(format!(
            "difficulty must be one of {:?}, got `{}`",
            DIFFICULTIES, settings.source.difficulty
        )));
    }
    if settings.source.questions_per_round == 0 {
        return Err(ConfigError::InvalidValue(
            "questions_per_round must be at least 1".to_string(),
        ));
    }
    if settings.source.kind == SourceKind::File && settings.source.file_path.is_none() {
        return Err(ConfigError::InvalidValue(
            "file source requires source.file_path".to_string(),
        ));
    }
    Ok(())
}
