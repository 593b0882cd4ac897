use std::time::Duration;

use anyhow::{Context, Result};
use rig::providers::openai;

use orchestration::debate::{GuardrailConfig, DEFAULT_LOOKUP_TIMEOUT};
use orchestration::{EngineConfig, RetryPolicy};

/// Groq's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const FACT_CHECK_URL: &str = "https://factchecktools.googleapis.com/v1alpha1/claims:search";

/// Inference endpoint configuration.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Top-level agent configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AgentsConfig {
    pub endpoint: Endpoint,
    /// Google Fact Check Tools key; evidence lookups are skipped when absent.
    pub fact_check_api_key: Option<String>,
    pub fact_check_url: String,
    pub writer_temperature: f64,
    pub fact_checker_temperature: f64,
    pub max_iterations: u32,
    pub max_revisions: u32,
    pub call_timeout: Duration,
    pub call_attempts: u32,
    /// Budget for one claim search; kept below `call_timeout`.
    pub lookup_timeout: Duration,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for AgentsConfig {
    fn default() -> Self {
        let guardrails = GuardrailConfig::default();
        let retry = RetryPolicy::default();
        let call_timeout = env_parse("DEBATE_CALL_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or_else(|| retry.timeout());
        Self {
            endpoint: Endpoint {
                url: std::env::var("DEBATE_LLM_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
                model: std::env::var("DEBATE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
                api_key: env_nonempty("GROQ_API_KEY"),
            },
            fact_check_api_key: env_nonempty("GOOGLE_FACT_CHECK_API_KEY"),
            fact_check_url: std::env::var("DEBATE_FACT_CHECK_URL")
                .unwrap_or_else(|_| FACT_CHECK_URL.into()),
            writer_temperature: 0.7,
            fact_checker_temperature: 0.1,
            max_iterations: env_parse("DEBATE_MAX_ITERATIONS")
                .unwrap_or(guardrails.max_iterations),
            max_revisions: env_parse("DEBATE_MAX_REVISIONS").unwrap_or(guardrails.max_revisions),
            call_timeout,
            call_attempts: env_parse("DEBATE_CALL_ATTEMPTS").unwrap_or(retry.max_attempts),
            lookup_timeout: env_parse("DEBATE_LOOKUP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or_else(|| DEFAULT_LOOKUP_TIMEOUT.min(call_timeout / 2)),
        }
    }
}

impl AgentsConfig {
    /// Load `.env` (if present) and read the configuration.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::default()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            guardrails: GuardrailConfig {
                max_iterations: self.max_iterations,
                max_revisions: self.max_revisions,
            },
            retry: RetryPolicy {
                max_attempts: self.call_attempts,
                timeout_ms: u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX),
                ..RetryPolicy::default()
            },
            analyze_only: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.api_key.is_none() && self.endpoint.url == DEFAULT_BASE_URL {
            return Err("GROQ_API_KEY must be set to use the default endpoint".to_string());
        }
        if self.endpoint.model.trim().is_empty() {
            return Err("DEBATE_MODEL must not be empty".to_string());
        }
        if self.lookup_timeout.is_zero() || self.lookup_timeout >= self.call_timeout {
            return Err(format!(
                "DEBATE_LOOKUP_TIMEOUT_SECS ({:?}) must be non-zero and below the call timeout ({:?})",
                self.lookup_timeout, self.call_timeout
            ));
        }
        self.engine_config().validate()
    }

    /// Build the completion client for the configured endpoint.
    pub fn build_client(&self) -> Result<openai::CompletionsClient> {
        openai::CompletionsClient::builder()
            .api_key(self.endpoint.api_key.as_deref().unwrap_or("not-needed"))
            .base_url(&self.endpoint.url)
            .build()
            .with_context(|| format!("Failed to build completion client ({})", self.endpoint.url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AgentsConfig {
        AgentsConfig {
            endpoint: Endpoint {
                url: "http://localhost:8080/v1".into(),
                model: DEFAULT_MODEL.into(),
                api_key: None,
            },
            fact_check_api_key: None,
            fact_check_url: FACT_CHECK_URL.into(),
            writer_temperature: 0.7,
            fact_checker_temperature: 0.1,
            max_iterations: 3,
            max_revisions: 2,
            call_timeout: Duration::from_secs(30),
            call_attempts: 2,
            lookup_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_engine_config_mapping() {
        let engine = config().engine_config();
        assert_eq!(engine.guardrails.max_iterations, 3);
        assert_eq!(engine.guardrails.max_revisions, 2);
        assert_eq!(engine.retry.max_attempts, 2);
        assert_eq!(engine.retry.timeout_ms, 30_000);
        assert!(!engine.analyze_only);
    }

    #[test]
    fn test_local_endpoint_needs_no_key() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_default_endpoint_needs_key() {
        let mut cfg = config();
        cfg.endpoint.url = DEFAULT_BASE_URL.into();
        assert!(cfg.validate().unwrap_err().contains("GROQ_API_KEY"));
        cfg.endpoint.api_key = Some("gsk_test".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut cfg = config();
        cfg.max_iterations = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_lookup_timeout_must_fit_inside_call_timeout() {
        let mut cfg = config();
        cfg.lookup_timeout = cfg.call_timeout;
        assert!(cfg.validate().unwrap_err().contains("DEBATE_LOOKUP_TIMEOUT_SECS"));
        cfg.lookup_timeout = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_oversized_call_timeout_saturates() {
        let mut cfg = config();
        cfg.call_timeout = Duration::MAX;
        assert_eq!(cfg.engine_config().retry.timeout_ms, u64::MAX);
    }

    #[test]
    fn test_build_client() {
        assert!(config().build_client().is_ok());
    }
}
