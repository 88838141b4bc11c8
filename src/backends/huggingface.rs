//! Hugging Face Inference API: text-generation and text-to-image tasks.
//!
//! Both tasks share one endpoint shape, `POST {base_url}/{model}`, with a
//! bearer token. Text generation answers with JSON
//! (`[{"generated_text": "…"}]`); text-to-image answers with the raw image
//! bytes. Cold models answer `503` with an `estimated_time`, which the
//! pipeline treats as retryable.

use super::{
    classify_status, http_client, retry_after_secs, transport_error, ImageGenerator,
    ImageRequest, TextGenerator, TextRequest, TextResponse,
};
use crate::error::{BackendError, BrandKitError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Serverless inference router.
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_TEXT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
pub const DEFAULT_IMAGE_MODEL: &str = "stabilityai/stable-diffusion-2-1-base";

const PROVIDER: &str = "huggingface";

/// Connection details shared by both tasks.
#[derive(Clone)]
struct Endpoint {
    client: reqwest::Client,
    base_url: String,
    model: String,
    token: String,
    timeout_secs: u64,
}

impl Endpoint {
    fn new(
        token: &str,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, BrandKitError> {
        if token.trim().is_empty() {
            return Err(BrandKitError::ProviderNotConfigured {
                provider: PROVIDER.into(),
                hint: "Set HF_API_KEY (or HF_TOKEN) to a Hugging Face access token.".into(),
            });
        }
        let client = http_client(timeout_secs)
            .map_err(|e| BrandKitError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: token.trim().to_string(),
            timeout_secs,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }

    /// POST `body` and return the success response, or a classified error.
    async fn post(&self, body: &Value, accept: &str) -> Result<reqwest::Response, BackendError> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.token)
            .header(ACCEPT, accept)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let retry_after = retry_after_secs(response.headers());
        let text = response.text().await.unwrap_or_default();
        Err(classify_status(
            PROVIDER,
            &self.model,
            status.as_u16(),
            retry_after,
            &text,
        ))
    }
}

// ── Text generation ─────────────────────────────────────────────────────────

/// Text-generation task on a Hugging Face hosted model.
///
/// The task has no system role; [`TextRequest::system`] is ignored because
/// the copy prompt already carries the persona.
#[derive(Clone)]
pub struct HuggingFaceText {
    endpoint: Endpoint,
}

impl HuggingFaceText {
    pub fn new(
        token: &str,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, BrandKitError> {
        Ok(Self {
            endpoint: Endpoint::new(token, model, base_url, timeout_secs)?,
        })
    }
}

/// Request body for the text-generation task.
fn text_body(request: &TextRequest) -> Value {
    json!({
        "inputs": request.prompt,
        "parameters": {
            "max_new_tokens": request.max_tokens,
            "temperature": request.temperature,
            "return_full_text": false,
        }
    })
}

#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GeneratedBody {
    List(Vec<Generated>),
    Single(Generated),
    Error { error: String },
}

/// Extract the generated text from a text-generation response body.
fn parse_generated_text(body: &str) -> Result<String, BackendError> {
    let parsed: GeneratedBody = serde_json::from_str(body)
        .map_err(|e| BackendError::InvalidResponse(format!("text-generation body: {e}")))?;
    let text = match parsed {
        GeneratedBody::List(items) => items
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .unwrap_or_default(),
        GeneratedBody::Single(g) => g.generated_text,
        GeneratedBody::Error { error } => return Err(BackendError::InvalidResponse(error)),
    };
    if text.trim().is_empty() {
        return Err(BackendError::EmptyOutput);
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for HuggingFaceText {
    fn describe(&self) -> String {
        format!("{PROVIDER}:{}", self.endpoint.model)
    }

    async fn generate(&self, request: &TextRequest) -> Result<TextResponse, BackendError> {
        let response = self
            .endpoint
            .post(&text_body(request), "application/json")
            .await?;
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.endpoint.timeout_secs))?;
        let content = parse_generated_text(&body)?;
        debug!("{}: generated {} chars", self.describe(), content.len());
        Ok(TextResponse {
            content,
            input_tokens: 0,
            output_tokens: 0,
        })
    }
}

// ── Text to image ───────────────────────────────────────────────────────────

/// Text-to-image task on a Hugging Face hosted diffusion model.
#[derive(Clone)]
pub struct HuggingFaceImage {
    endpoint: Endpoint,
}

impl HuggingFaceImage {
    pub fn new(
        token: &str,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, BrandKitError> {
        Ok(Self {
            endpoint: Endpoint::new(token, model, base_url, timeout_secs)?,
        })
    }
}

/// Request body for the text-to-image task.
fn image_body(request: &ImageRequest) -> Value {
    json!({
        "inputs": request.prompt,
        "parameters": {
            "width": request.width,
            "height": request.height,
        }
    })
}

#[async_trait]
impl ImageGenerator for HuggingFaceImage {
    fn describe(&self) -> String {
        format!("{PROVIDER}:{}", self.endpoint.model)
    }

    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, BackendError> {
        let response = self.endpoint.post(&image_body(request), "image/png").await?;

        // A 200 with a JSON body is an error report, not an image.
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.endpoint.timeout_secs))?;

        if is_json {
            return Err(BackendError::InvalidResponse(
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        if bytes.is_empty() {
            return Err(BackendError::EmptyOutput);
        }
        debug!("{}: received {} image bytes", self.describe(), bytes.len());
        Ok(bytes.to_vec())
    }
}
