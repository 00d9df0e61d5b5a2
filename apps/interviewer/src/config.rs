use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// When unset, interview records live in process memory only.
    pub database_url: Option<String>,
    pub llm_timeout_secs: u64,
    pub max_primary_questions: u32,
    pub session_idle_minutes: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", 30)?,
            max_primary_questions: env_or("MAX_PRIMARY_QUESTIONS", 50)?,
            session_idle_minutes: env_or("SESSION_IDLE_MINUTES", 180)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes * 60)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_uses_default_when_unset() {
        let value: u32 = env_or("INTERVIEWER_TEST_UNSET_VARIABLE", 50).unwrap();
        assert_eq!(value, 50);
    }

    #[test]
    fn test_env_or_rejects_garbage() {
        std::env::set_var("INTERVIEWER_TEST_BAD_NUMBER", "fifty");
        let result: Result<u32> = env_or("INTERVIEWER_TEST_BAD_NUMBER", 50);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_or_parses_trimmed_value() {
        std::env::set_var("INTERVIEWER_TEST_GOOD_NUMBER", " 12 ");
        let value: u64 = env_or("INTERVIEWER_TEST_GOOD_NUMBER", 30).unwrap();
        assert_eq!(value, 12);
    }
}
