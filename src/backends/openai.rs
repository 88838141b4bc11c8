//! OpenAI-compatible image generation (`POST /images/generations`).
//!
//! Works against OpenAI itself and any gateway that mirrors the endpoint.
//! The response carries either base64 image data or a short-lived URL; both
//! are turned into raw image bytes.

use super::{
    classify_status, http_client, retry_after_secs, transport_error, ImageGenerator,
    ImageRequest,
};
use crate::error::{BackendError, BrandKitError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
/// Smallest size every OpenAI image model accepts.
pub const DEFAULT_SIZE: &str = "1024x1024";

const PROVIDER: &str = "openai";

/// Image generation through an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiImage {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    size: String,
    timeout_secs: u64,
}

impl OpenAiImage {
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, BrandKitError> {
        if api_key.trim().is_empty() {
            return Err(BrandKitError::ProviderNotConfigured {
                provider: PROVIDER.into(),
                hint: "Set OPENAI_API_KEY to use OpenAI image generation.".into(),
            });
        }
        let client = http_client(timeout_secs)
            .map_err(|e| BrandKitError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.trim().to_string(),
            size: DEFAULT_SIZE.to_string(),
            timeout_secs,
        })
    }

    /// Override the `size` parameter (e.g. `"1792x1024"`).
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(PROVIDER, &self.model, status.as_u16(), None, &text));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        Ok(bytes.to_vec())
    }
}

fn request_body(model: &str, size: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "prompt": prompt,
        "n": 1,
        "size": size,
        "response_format": "b64_json",
    })
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Where the first generated image can be found.
#[derive(Debug, PartialEq)]
enum ImageSource {
    Inline(Vec<u8>),
    Remote(String),
}

fn parse_images_response(body: &str) -> Result<ImageSource, BackendError> {
    let parsed: ImagesResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::InvalidResponse(format!("images body: {e}")))?;
    let first = parsed.data.into_iter().next().ok_or(BackendError::EmptyOutput)?;
    if let Some(b64) = first.b64_json {
        let bytes = STANDARD
            .decode(b64.trim())
            .map_err(|e| BackendError::InvalidResponse(format!("b64_json: {e}")))?;
        if bytes.is_empty() {
            return Err(BackendError::EmptyOutput);
        }
        return Ok(ImageSource::Inline(bytes));
    }
    match first.url {
        Some(url) if !url.is_empty() => Ok(ImageSource::Remote(url)),
        _ => Err(BackendError::EmptyOutput),
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImage {
    fn describe(&self) -> String {
        format!("{PROVIDER}:{}", self.model)
    }

    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, BackendError> {
        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body(&self.model, &self.size, &request.prompt))
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let status = response.status();
        let retry_after = retry_after_secs(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        if !status.is_success() {
            return Err(classify_status(
                PROVIDER,
                &self.model,
                status.as_u16(),
                retry_after,
                &body,
            ));
        }

        match parse_images_response(&body)? {
            ImageSource::Inline(bytes) => {
                debug!("{}: received {} inline image bytes", self.describe(), bytes.len());
                Ok(bytes)
            }
            ImageSource::Remote(url) => {
                debug!("{}: downloading generated image", self.describe());
                self.download(&url).await
            }
        }
    }
}
