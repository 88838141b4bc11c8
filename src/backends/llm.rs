//! Chat-completion text backend over any `edgequake-llm` provider.
//!
//! Lets the copy come from OpenAI, Anthropic, Gemini, Ollama or any other
//! provider `edgequake_llm::ProviderFactory` knows how to build, instead of
//! the Hugging Face text-generation task.

use super::{TextGenerator, TextRequest, TextResponse};
use crate::error::BackendError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, LlmError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::debug;

/// A [`TextGenerator`] backed by an `edgequake-llm` chat provider.
#[derive(Clone)]
pub struct LlmText {
    provider: Arc<dyn LLMProvider>,
    label: String,
    timeout_secs: u64,
}

impl LlmText {
    /// `label` is used in logs and warnings, e.g. `"openai:gpt-4.1-nano"`.
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            provider,
            label: label.into(),
            timeout_secs,
        }
    }
}

fn build_messages(request: &TextRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system.as_deref().filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(&request.prompt));
    messages
}

fn build_options(request: &TextRequest) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: Some(request.max_tokens),
        ..Default::default()
    }
}

/// HTTP status embedded in an `ApiError` message, e.g. `"503 Service Unavailable"`.
static RE_STATUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([45]\d\d)\b").unwrap());

/// Map a provider error onto the retry-aware [`BackendError`].
fn classify_provider_error(provider: &str, error: LlmError, timeout_secs: u64) -> BackendError {
    let rejected = |detail: String| BackendError::Rejected {
        provider: provider.to_string(),
        detail,
    };
    match error {
        LlmError::RateLimited(_) => BackendError::RateLimited {
            provider: provider.to_string(),
            retry_after_secs: None,
        },
        LlmError::AuthError(detail) => BackendError::Auth {
            provider: provider.to_string(),
            detail,
        },
        LlmError::Timeout => BackendError::Timeout { secs: timeout_secs },
        LlmError::NetworkError(detail) => BackendError::Transport(detail),
        e @ (LlmError::ModelNotFound(_)
        | LlmError::InvalidRequest(_)
        | LlmError::TokenLimitExceeded { .. }
        | LlmError::ConfigError(_)
        | LlmError::NotSupported(_)) => rejected(e.to_string()),
        LlmError::SerializationError(e) => BackendError::InvalidResponse(e.to_string()),
        LlmError::ApiError(body) => {
            let status = RE_STATUS
                .captures(&body)
                .and_then(|c| c[1].parse::<u16>().ok());
            match status {
                Some(429) => BackendError::RateLimited {
                    provider: provider.to_string(),
                    retry_after_secs: None,
                },
                Some(401 | 403) => BackendError::Auth {
                    provider: provider.to_string(),
                    detail: body,
                },
                Some(status) => BackendError::Http { status, body },
                None => rejected(body),
            }
        }
        other => BackendError::Transport(other.to_string()),
    }
}

#[async_trait]
impl TextGenerator for LlmText {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn generate(&self, request: &TextRequest) -> Result<TextResponse, BackendError> {
        let messages = build_messages(request);
        let options = build_options(request);

        let call = self.provider.chat(&messages, Some(&options));
        let response = timeout(Duration::from_secs(self.timeout_secs), call)
            .await
            .map_err(|_| BackendError::Timeout {
                secs: self.timeout_secs,
            })?
            .map_err(|e| classify_provider_error(&self.label, e, self.timeout_secs))?;

        if response.content.trim().is_empty() {
            return Err(BackendError::EmptyOutput);
        }
        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, response.prompt_tokens, response.completion_tokens
        );
        Ok(TextResponse {
            content: response.content,
            input_tokens: response.prompt_tokens,
            output_tokens: response.completion_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgequake_llm::{LLMResponse, MockProvider};

    fn request(system: Option<&str>) -> TextRequest {
        TextRequest {
            system: system.map(str::to_string),
            prompt: "Write a tagline".into(),
            max_tokens: 400,
            temperature: 0.7,
        }
    }

    #[test]
    fn system_message_included_when_present() {
        assert_eq!(build_messages(&request(Some("You are a strategist"))).len(), 2);
        assert_eq!(build_messages(&request(None)).len(), 1);
        assert_eq!(build_messages(&request(Some("   "))).len(), 1);
    }

    #[test]
    fn options_follow_request() {
        let opts = build_options(&request(None));
        assert_eq!(opts.temperature, Some(0.7));
        assert_eq!(opts.max_tokens, Some(400));
    }

    fn classify(error: LlmError) -> BackendError {
        classify_provider_error("openai:gpt-4.1-nano", error, 30)
    }

    #[test]
    fn transient_provider_errors_are_retryable() {
        let e = classify(LlmError::RateLimited("slow down".into()));
        assert!(matches!(e, BackendError::RateLimited { .. }));
        assert!(e.is_retryable());

        assert_eq!(classify(LlmError::Timeout), BackendError::Timeout { secs: 30 });

        let e = classify(LlmError::NetworkError("connection reset".into()));
        assert!(matches!(e, BackendError::Transport(_)));
        assert!(e.is_retryable());

        let e = classify(LlmError::ApiError("503 Service Unavailable".into()));
        assert!(matches!(e, BackendError::Http { status: 503, .. }));
        assert!(e.is_retryable());
    }

    #[test]
    fn permanent_provider_errors_are_not_retried() {
        let permanent = [
            LlmError::ModelNotFound("gpt-9".into()),
            LlmError::InvalidRequest("temperature out of range".into()),
            LlmError::TokenLimitExceeded { max: 4096, got: 9000 },
            LlmError::ConfigError("missing base url".into()),
            LlmError::NotSupported("chat".into()),
        ];
        for error in permanent {
            let e = classify(error);
            assert!(matches!(e, BackendError::Rejected { .. }), "got {e:?}");
            assert!(!e.is_retryable());
        }

        let e = classify(LlmError::AuthError("invalid api key".into()));
        assert!(matches!(e, BackendError::Auth { .. }));
        assert!(!e.is_retryable());
    }

    #[test]
    fn api_error_status_is_a_whole_number() {
        // 4013 is a token count, not a 401.
        let e = classify(LlmError::ApiError("prompt has 4013 tokens".into()));
        assert!(matches!(e, BackendError::Rejected { .. }), "got {e:?}");
        assert!(!e.is_retryable());

        let e = classify(LlmError::ApiError("HTTP 401: bad key".into()));
        assert!(matches!(e, BackendError::Auth { .. }));
        let e = classify(LlmError::ApiError("429 Too Many Requests".into()));
        assert!(matches!(e, BackendError::RateLimited { .. }));
        let e = classify(LlmError::ApiError("400 Bad Request".into()));
        assert!(matches!(e, BackendError::Http { status: 400, .. }));
        assert!(!e.is_retryable());
    }

    /// Provider that answers every chat with a fixed outcome after a delay.
    struct Scripted {
        reply: fn() -> edgequake_llm::Result<LLMResponse>,
        delay: Duration,
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn max_context_length(&self) -> usize {
            4096
        }

        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            tokio::time::sleep(self.delay).await;
            (self.reply)()
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete(prompt).await
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete("").await
        }
    }

    fn scripted(reply: fn() -> edgequake_llm::Result<LLMResponse>, delay: Duration) -> LlmText {
        LlmText::new(Arc::new(Scripted { reply, delay }), "scripted", 1)
    }

    #[tokio::test]
    async fn generate_returns_content_from_mock_provider() {
        let provider = MockProvider::new();
        provider.add_response("Tagline: Brew boldly.").await;
        let text = LlmText::new(Arc::new(provider), "mock", 5);

        let response = text.generate(&request(Some("You are a strategist"))).await.unwrap();
        assert_eq!(response.content, "Tagline: Brew boldly.");
        assert_eq!(text.describe(), "mock");
    }

    #[tokio::test]
    async fn generate_maps_token_usage() {
        let text = scripted(
            || Ok(LLMResponse::new("Mission: coffee.", "scripted-model").with_usage(42, 17)),
            Duration::ZERO,
        );
        let response = text.generate(&request(None)).await.unwrap();
        assert_eq!(response.input_tokens, 42);
        assert_eq!(response.output_tokens, 17);
    }

    #[tokio::test]
    async fn blank_output_is_empty_output() {
        let provider = MockProvider::new();
        provider.add_response("  \n ").await;
        let text = LlmText::new(Arc::new(provider), "mock", 5);
        assert_eq!(
            text.generate(&request(None)).await.unwrap_err(),
            BackendError::EmptyOutput
        );
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let text = scripted(
            || Ok(LLMResponse::new("late", "scripted-model")),
            Duration::from_secs(10),
        );
        assert_eq!(
            text.generate(&request(None)).await.unwrap_err(),
            BackendError::Timeout { secs: 1 }
        );
    }

    #[tokio::test]
    async fn provider_error_is_classified() {
        let text = scripted(
            || Err(LlmError::ModelNotFound("gpt-9".into())),
            Duration::ZERO,
        );
        let err = text.generate(&request(None)).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));
    }
}
