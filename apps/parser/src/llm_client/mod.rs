//! LLM gateway, the single point of entry for all provider calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to a provider API
//! directly. The gateway normalizes provider heterogeneity (auth
//! schemes, request/response shapes) and model unpredictability
//! (schema-non-conformant output) so nothing downstream needs
//! defensive parsing.
//!
//! The gateway never returns an error to its caller: every failure
//! (unset provider, missing key, transport error, timeout, non-JSON
//! output) becomes an explicit [`LlmOutcome::Absent`] carrying the
//! reason, which feeds logging but not control flow.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{LlmConfig, Provider};

pub mod providers;
pub mod retry;

pub use retry::RetryPolicy;

use providers::{
    AnthropicRequest, AnthropicResponse, ChatMessage, ChatRequest, ChatResponse, ResponseFormat,
};

/// Per-request timeout on the transport, used by the plain-text path.
/// The structured path additionally enforces its own, tighter budget.
const TEXT_TIMEOUT_SECS: u64 = 30;

/// Why the gateway produced no usable result.
///
/// Distinct from an empty string: absence means the call could not be
/// made or its output could not be used. The reason is preserved for
/// observability even though every variant degrades the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbsentReason {
    #[error("no LLM provider configured")]
    NotConfigured,

    #[error("provider API key is missing")]
    MissingCredential,

    #[error("request exceeded its time budget")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned status {status}")]
    Api { status: u16 },

    #[error("provider output was not usable JSON")]
    MalformedOutput,

    #[error("provider returned no text content")]
    EmptyContent,
}

impl AbsentReason {
    /// Transient failures are worth one more attempt; the rest are not.
    pub fn is_transient(&self) -> bool {
        match self {
            AbsentReason::Timeout | AbsentReason::Transport(_) => true,
            AbsentReason::Api { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A usable result or a well-defined absence. Never a panic, never an
/// error the caller must handle.
#[derive(Debug, PartialEq)]
pub enum LlmOutcome<T> {
    Value(T),
    Absent(AbsentReason),
}

impl<T> LlmOutcome<T> {
    pub fn value(self) -> Option<T> {
        match self {
            LlmOutcome::Value(v) => Some(v),
            LlmOutcome::Absent(_) => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, LlmOutcome::Absent(_))
    }
}

/// Provider-agnostic LLM client.
///
/// Holds one HTTP client with a fixed transport timeout; provider
/// selection is resolved per call by exhaustive match on the
/// configured [`Provider`] variant.
pub struct LlmGateway {
    client: reqwest::Client,
    config: LlmConfig,
    retry: RetryPolicy,
}

impl LlmGateway {
    pub fn new(config: LlmConfig) -> Self {
        Self::with_retry(config, RetryPolicy::default())
    }

    pub fn with_retry(config: LlmConfig, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(TEXT_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            config,
            retry,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.provider.is_some()
    }

    pub fn provider(&self) -> Option<&Provider> {
        self.config.provider.as_ref()
    }

    /// Structured JSON generation at temperature 0.
    ///
    /// One request under the configured wall-clock budget, then JSON
    /// recovery: parse the output as-is, else parse the first-`{` to
    /// last-`}` substring (models love wrapping JSON in prose or
    /// markdown fences).
    pub async fn generate_structured(
        &self,
        schema: &Value,
        system_prompt: &str,
        user_prompt: &str,
    ) -> LlmOutcome<Value> {
        let provider = match self.usable_provider() {
            Ok(p) => p,
            Err(reason) => return LlmOutcome::Absent(reason),
        };

        // The chat endpoints take no schema object; json_object mode
        // plus the schema spelled out in the system prompt is as strict
        // as the wire allows.
        let system = format!(
            "{system_prompt}\n\nThe JSON must conform to this schema:\n{schema}"
        );

        let request = self.request_text(provider, &system, user_prompt, true);
        let text = match tokio::time::timeout(self.config.json_timeout, request).await {
            Ok(LlmOutcome::Value(text)) => text,
            Ok(LlmOutcome::Absent(reason)) => {
                warn!("structured generation failed ({}): {reason}", provider.name());
                return LlmOutcome::Absent(reason);
            }
            Err(_) => {
                warn!(
                    "structured generation exceeded {}s budget ({})",
                    self.config.json_timeout.as_secs(),
                    provider.name()
                );
                return LlmOutcome::Absent(AbsentReason::Timeout);
            }
        };

        match recover_json(&text) {
            Some(value) => LlmOutcome::Value(value),
            None => {
                warn!("structured generation returned unrecoverable non-JSON output");
                LlmOutcome::Absent(AbsentReason::MalformedOutput)
            }
        }
    }

    /// Free-form text generation with bounded retry on transient
    /// failures. Gives up silently after the policy's attempt budget.
    pub async fn generate_text(&self, system: &str, user: &str) -> LlmOutcome<String> {
        let provider = match self.usable_provider() {
            Ok(p) => p,
            Err(reason) => return LlmOutcome::Absent(reason),
        };

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.request_text(provider, system, user, false).await {
                LlmOutcome::Value(text) => return LlmOutcome::Value(text),
                LlmOutcome::Absent(reason) => {
                    if attempts >= self.retry.max_attempts || !reason.is_transient() {
                        warn!(
                            "text generation gave up after {attempts} attempt(s) ({}): {reason}",
                            provider.name()
                        );
                        return LlmOutcome::Absent(reason);
                    }
                    let delay = self.retry.delay(attempts);
                    warn!(
                        "text generation attempt {attempts} failed ({reason}), retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn usable_provider(&self) -> Result<&Provider, AbsentReason> {
        let provider = match &self.config.provider {
            Some(p) => p,
            None => {
                debug!("no LLM provider configured, skipping call");
                return Err(AbsentReason::NotConfigured);
            }
        };
        let key_missing = match provider {
            Provider::OpenAi { api_key, .. }
            | Provider::OpenRouter { api_key, .. }
            | Provider::Anthropic { api_key, .. } => api_key.is_empty(),
        };
        if key_missing {
            debug!("{} selected but API key is not set", provider.name());
            return Err(AbsentReason::MissingCredential);
        }
        Ok(provider)
    }

    async fn request_text(
        &self,
        provider: &Provider,
        system: &str,
        user: &str,
        strict_json: bool,
    ) -> LlmOutcome<String> {
        match provider {
            Provider::OpenAi { api_key, model } => {
                self.chat_completion(providers::OPENAI_API_URL, api_key, model, system, user, strict_json)
                    .await
            }
            Provider::OpenRouter { api_key, model } => {
                self.chat_completion(
                    providers::OPENROUTER_API_URL,
                    api_key,
                    model,
                    system,
                    user,
                    strict_json,
                )
                .await
            }
            Provider::Anthropic { api_key, model } => {
                self.anthropic_message(api_key, model, system, user, strict_json)
                    .await
            }
        }
    }

    async fn chat_completion(
        &self,
        url: &str,
        api_key: &str,
        model: &str,
        system: &str,
        user: &str,
        strict_json: bool,
    ) -> LlmOutcome<String> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: strict_json.then_some(0.0),
            response_format: strict_json.then(ResponseFormat::json_object),
        };

        let response = match self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return LlmOutcome::Absent(AbsentReason::Transport(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return LlmOutcome::Absent(AbsentReason::Api {
                status: status.as_u16(),
            });
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(p) => p,
            Err(_) => return LlmOutcome::Absent(AbsentReason::MalformedOutput),
        };

        match parsed.text() {
            Some(text) if !text.trim().is_empty() => LlmOutcome::Value(text.trim().to_string()),
            _ => LlmOutcome::Absent(AbsentReason::EmptyContent),
        }
    }

    async fn anthropic_message(
        &self,
        api_key: &str,
        model: &str,
        system: &str,
        user: &str,
        strict_json: bool,
    ) -> LlmOutcome<String> {
        let body = AnthropicRequest {
            model,
            max_tokens: providers::ANTHROPIC_MAX_TOKENS,
            system,
            temperature: strict_json.then_some(0.0),
            messages: vec![ChatMessage {
                role: "user",
                content: user,
            }],
        };

        let response = match self
            .client
            .post(providers::ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", providers::ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return LlmOutcome::Absent(AbsentReason::Transport(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return LlmOutcome::Absent(AbsentReason::Api {
                status: status.as_u16(),
            });
        }

        let parsed: AnthropicResponse = match response.json().await {
            Ok(p) => p,
            Err(_) => return LlmOutcome::Absent(AbsentReason::MalformedOutput),
        };

        let text = parsed.text();
        if text.trim().is_empty() {
            LlmOutcome::Absent(AbsentReason::EmptyContent)
        } else {
            LlmOutcome::Value(text.trim().to_string())
        }
    }
}

/// Robust JSON extraction from text that *should* be pure JSON.
///
/// Parses as-is first, then falls back to the first-`{`-to-last-`}`
/// substring. Returns `None` when neither parses.
pub fn recover_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recover_json_pure() {
        let value = recover_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_recover_json_wrapped_in_prose() {
        let value = recover_json("Here is the result: {\"a\":1} — done").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_recover_json_markdown_fenced() {
        let value = recover_json("```json\n{\"name\": \"Jane\"}\n```").unwrap();
        assert_eq!(value, json!({"name": "Jane"}));
    }

    #[test]
    fn test_recover_json_plain_prose_is_none() {
        assert!(recover_json("I could not find any fields, sorry.").is_none());
        assert!(recover_json("").is_none());
    }

    #[test]
    fn test_recover_json_mismatched_braces_is_none() {
        assert!(recover_json("} backwards {").is_none());
    }

    #[test]
    fn test_transient_reasons() {
        assert!(AbsentReason::Timeout.is_transient());
        assert!(AbsentReason::Transport("reset".to_string()).is_transient());
        assert!(AbsentReason::Api { status: 429 }.is_transient());
        assert!(AbsentReason::Api { status: 503 }.is_transient());
        assert!(!AbsentReason::Api { status: 401 }.is_transient());
        assert!(!AbsentReason::NotConfigured.is_transient());
        assert!(!AbsentReason::MalformedOutput.is_transient());
    }

    #[tokio::test]
    async fn test_structured_absent_when_not_configured() {
        let gateway = LlmGateway::new(crate::config::LlmConfig::disabled());
        let outcome = gateway
            .generate_structured(&json!({"type": "object"}), "system", "user")
            .await;
        assert_eq!(outcome, LlmOutcome::Absent(AbsentReason::NotConfigured));
    }

    #[tokio::test]
    async fn test_structured_absent_when_key_missing() {
        let config = crate::config::LlmConfig::with_provider(crate::config::Provider::OpenAi {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        });
        let gateway = LlmGateway::new(config);
        let outcome = gateway
            .generate_structured(&json!({"type": "object"}), "system", "user")
            .await;
        assert_eq!(outcome, LlmOutcome::Absent(AbsentReason::MissingCredential));
    }

    #[tokio::test]
    async fn test_text_absent_when_key_missing_without_retry_delay() {
        let config = crate::config::LlmConfig::with_provider(crate::config::Provider::Anthropic {
            api_key: String::new(),
            model: "claude-3-haiku-20240307".to_string(),
        });
        let gateway = LlmGateway::with_retry(config, RetryPolicy::zero_delay());
        let outcome = gateway.generate_text("system", "user").await;
        assert_eq!(outcome, LlmOutcome::Absent(AbsentReason::MissingCredential));
    }

    #[test]
    fn test_outcome_value_accessor() {
        assert_eq!(LlmOutcome::Value(3).value(), Some(3));
        assert_eq!(LlmOutcome::<i32>::Absent(AbsentReason::Timeout).value(), None);
        assert!(LlmOutcome::<i32>::Absent(AbsentReason::Timeout).is_absent());
    }
}
