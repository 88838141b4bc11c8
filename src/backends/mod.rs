//! Hosted-model backends behind two small traits.
//!
//! The brand kit needs exactly two things from the outside world: a block of
//! copy from a text model and a logo from an image model. Each is a trait so
//! the provider can be swapped (Hugging Face, any `edgequake-llm` chat
//! provider, OpenAI images) and so tests can plug in deterministic fakes.
//!
//! ```text
//! TextGenerator  ── HuggingFaceText (text-generation task)
//!                └─ LlmText         (edgequake-llm chat providers)
//! ImageGenerator ── HuggingFaceImage (text-to-image task)
//!                └─ OpenAiImage      (/v1/images/generations)
//! ```

pub mod huggingface;
pub mod llm;
pub mod openai;

pub use huggingface::{HuggingFaceImage, HuggingFaceText};
pub use llm::LlmText;
pub use openai::OpenAiImage;

use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;

/// Longest error body kept in [`BackendError::Http`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// One text-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    /// Optional system instruction (ignored by completion-only backends).
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

/// What a text backend returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextResponse {
    pub content: String,
    /// Zero when the backend does not report usage.
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// One text-to-image call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
}

/// Produces brand copy from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider/model label for logs and warnings.
    fn describe(&self) -> String;

    async fn generate(&self, request: &TextRequest) -> Result<TextResponse, BackendError>;
}

/// Produces an encoded image (PNG, JPEG, …) from a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn describe(&self) -> String;

    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, BackendError>;
}

/// Build a `reqwest` client with the per-call timeout applied.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(concat!("edgequake-brandkit/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Map a `reqwest` failure that happened before a status was available.
pub(crate) fn transport_error(err: reqwest::Error, timeout_secs: u64) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout { secs: timeout_secs }
    } else {
        BackendError::Transport(err.to_string())
    }
}

/// Seconds from a `Retry-After` header, when it holds an integer.
pub(crate) fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[derive(Deserialize)]
struct LoadingBody {
    #[serde(default)]
    estimated_time: Option<f64>,
}

/// Turn a non-success HTTP status into a [`BackendError`].
pub(crate) fn classify_status(
    provider: &str,
    model: &str,
    status: u16,
    retry_after: Option<u64>,
    body: &str,
) -> BackendError {
    match status {
        401 | 403 => BackendError::Auth {
            provider: provider.to_string(),
            detail: truncate(body),
        },
        429 => BackendError::RateLimited {
            provider: provider.to_string(),
            retry_after_secs: retry_after,
        },
        503 => match serde_json::from_str::<LoadingBody>(body) {
            Ok(LoadingBody {
                estimated_time: Some(estimated_secs),
            }) => BackendError::Loading {
                model: model.to_string(),
                estimated_secs,
            },
            _ => BackendError::Http {
                status,
                body: truncate(body),
            },
        },
        _ => BackendError::Http {
            status,
            body: truncate(body),
        },
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{cut}\u{2026}")
    } else {
        body.to_string()
    }
}
