use std::time::Duration;

/// Default wall-clock budget for structured (JSON) generation calls.
const DEFAULT_JSON_TIMEOUT_SECS: u64 = 12;

/// The configured LLM provider and its credentials.
///
/// Provider dispatch is a closed enum rather than a string compare so
/// adding or removing a backend is a compile-time-checked change. Each
/// variant carries its own typed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    OpenAi { api_key: String, model: String },
    OpenRouter { api_key: String, model: String },
    Anthropic { api_key: String, model: String },
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi { .. } => "openai",
            Provider::OpenRouter { .. } => "openrouter",
            Provider::Anthropic { .. } => "anthropic",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAi { model, .. }
            | Provider::OpenRouter { model, .. }
            | Provider::Anthropic { model, .. } => model,
        }
    }
}

/// LLM gateway configuration loaded from environment variables.
///
/// Unlike the rest of the config surface, everything here is optional
/// by contract: an unset or unrecognized `LLM_PROVIDER`, or a missing
/// API key, is the valid "no LLM available" state: callers get an
/// absent result, never an error.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Option<Provider>,
    /// Soft wall-clock budget for the structured-JSON path.
    pub json_timeout: Duration,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let provider = match env_var("LLM_PROVIDER").to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAi {
                api_key: env_var("OPENAI_API_KEY"),
                model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            }),
            "openrouter" => Some(Provider::OpenRouter {
                api_key: env_var("OPENROUTER_API_KEY"),
                model: env_or("OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            }),
            "anthropic" => Some(Provider::Anthropic {
                api_key: env_var("ANTHROPIC_API_KEY"),
                model: env_or("ANTHROPIC_MODEL", "claude-3-haiku-20240307"),
            }),
            _ => None,
        };

        let json_timeout = env_var("LLM_JSON_TIMEOUT")
            .parse::<u64>()
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_JSON_TIMEOUT_SECS));

        Self {
            provider,
            json_timeout,
        }
    }

    /// Config with no provider at all, for deterministic-only operation.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            json_timeout: Duration::from_secs(DEFAULT_JSON_TIMEOUT_SECS),
        }
    }

    pub fn with_provider(provider: Provider) -> Self {
        Self {
            provider: Some(provider),
            json_timeout: Duration::from_secs(DEFAULT_JSON_TIMEOUT_SECS),
        }
    }
}

fn env_var(key: &str) -> String {
    std::env::var(key).unwrap_or_default().trim().to_string()
}

fn env_or(key: &str, default: &str) -> String {
    let v = env_var(key);
    if v.is_empty() {
        default.to_string()
    } else {
        v
    }
}
