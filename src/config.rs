//! Configuration types for brand-kit generation.
//!
//! All generation behaviour is controlled through [`KitConfig`], built via
//! its [`KitConfigBuilder`]. One struct holds every knob so a config can be
//! shared between the CLI and the form server and logged as a whole.

use crate::backends::{huggingface, openai, ImageGenerator, TextGenerator};
use crate::brief::HexColor;
use crate::error::BrandKitError;
use crate::palette::DEFAULT_ACCENTS;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Where the brand copy comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextBackend {
    /// Pick from the environment: Hugging Face when a token is set,
    /// otherwise `edgequake_llm::ProviderFactory::from_env()`. (default)
    #[default]
    Auto,
    /// Hugging Face Inference text-generation task.
    HuggingFace,
    /// An `edgequake-llm` chat provider (OpenAI, Anthropic, Gemini, Ollama, …).
    Llm,
}

/// Where the logo comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageBackend {
    /// Hugging Face when a token is set, otherwise OpenAI. (default)
    #[default]
    Auto,
    /// Hugging Face Inference text-to-image task.
    HuggingFace,
    /// OpenAI-compatible `/images/generations`.
    OpenAi,
}

impl FromStr for TextBackend {
    type Err = BrandKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(TextBackend::Auto),
            "huggingface" | "hf" => Ok(TextBackend::HuggingFace),
            "llm" | "chat" => Ok(TextBackend::Llm),
            other => Err(BrandKitError::InvalidConfig(format!(
                "unknown text backend '{other}' (expected auto, huggingface, llm)"
            ))),
        }
    }
}

impl FromStr for ImageBackend {
    type Err = BrandKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ImageBackend::Auto),
            "huggingface" | "hf" => Ok(ImageBackend::HuggingFace),
            "openai" => Ok(ImageBackend::OpenAi),
            other => Err(BrandKitError::InvalidConfig(format!(
                "unknown image backend '{other}' (expected auto, huggingface, openai)"
            ))),
        }
    }
}

/// Configuration for one or many brand-kit generations.
///
/// # Example
/// ```rust
/// use edgequake_brandkit::{KitConfig, TextBackend};
///
/// let config = KitConfig::builder()
///     .text_backend(TextBackend::HuggingFace)
///     .temperature(0.7)
///     .max_tokens(400)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct KitConfig {
    /// Text backend selection. Default: [`TextBackend::Auto`].
    pub text_backend: TextBackend,

    /// Model for the text backend. If None, the backend default is used
    /// (`mistralai/Mistral-7B-Instruct-v0.2` on Hugging Face,
    /// `gpt-4.1-nano` for `edgequake-llm` providers).
    pub text_model: Option<String>,

    /// `edgequake-llm` provider name (e.g. "openai", "anthropic", "ollama")
    /// when the text backend is [`TextBackend::Llm`].
    pub provider_name: Option<String>,

    /// Pre-constructed `edgequake-llm` provider. Takes precedence over
    /// `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed text generator. Takes precedence over everything else.
    pub text_generator: Option<Arc<dyn TextGenerator>>,

    /// Image backend selection. Default: [`ImageBackend::Auto`].
    pub image_backend: ImageBackend,

    /// Model for the image backend. If None, the backend default is used
    /// (`stabilityai/stable-diffusion-2-1-base` or `dall-e-3`).
    pub image_model: Option<String>,

    /// Pre-constructed image generator. Takes precedence over `image_backend`.
    pub image_generator: Option<Arc<dyn ImageGenerator>>,

    /// Hugging Face access token. If None, `HF_API_KEY` then `HF_TOKEN` are read.
    pub hf_token: Option<String>,

    /// Hugging Face inference base URL; the model id is appended.
    pub hf_base_url: String,

    /// OpenAI API key for image generation. If None, `OPENAI_API_KEY` is read.
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible base URL for image generation.
    pub openai_base_url: String,

    /// Sampling temperature for the copy. Default: 0.7.
    ///
    /// Brand copy benefits from some creativity; values near 0 produce
    /// flat, repetitive taglines.
    pub temperature: f32,

    /// Maximum new tokens for the copy. Default: 400.
    ///
    /// A tagline, a mission statement and a short story fit comfortably.
    pub max_tokens: usize,

    /// Requested logo edge length in pixels (square). Default: 512.
    ///
    /// Ignored by backends with fixed sizes (OpenAI uses `1024x1024`).
    pub image_size: u32,

    /// Maximum retry attempts on a retryable backend failure. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Upper bound for any single wait between attempts. Default: 30 000.
    ///
    /// A cold Hugging Face model can report an `estimated_time` of minutes;
    /// the wait is capped so one run never stalls indefinitely.
    pub max_backoff_ms: u64,

    /// Per-call timeout in seconds. Default: 120.
    ///
    /// Diffusion models on shared hardware regularly take 30–60 s.
    pub api_timeout_secs: u64,

    /// Custom system prompt for chat backends. If None, uses built-in default.
    pub system_prompt: Option<String>,

    /// Palette accents appended after the theme colour.
    pub palette_accents: Vec<HexColor>,

    /// Run copy and logo generation at the same time. Default: true.
    ///
    /// Neither depends on the other; running them together roughly halves
    /// wall-clock time. Disable to keep provider load strictly sequential.
    pub concurrent_assets: bool,

    /// Optional progress callback for stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            text_backend: TextBackend::default(),
            text_model: None,
            provider_name: None,
            provider: None,
            text_generator: None,
            image_backend: ImageBackend::default(),
            image_model: None,
            image_generator: None,
            hf_token: None,
            hf_base_url: huggingface::DEFAULT_BASE_URL.to_string(),
            openai_api_key: None,
            openai_base_url: openai::DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_tokens: 400,
            image_size: 512,
            max_retries: 2,
            retry_backoff_ms: 500,
            max_backoff_ms: 30_000,
            api_timeout_secs: 120,
            system_prompt: None,
            palette_accents: DEFAULT_ACCENTS.to_vec(),
            concurrent_assets: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for KitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KitConfig")
            .field("text_backend", &self.text_backend)
            .field("text_model", &self.text_model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field(
                "text_generator",
                &self.text_generator.as_ref().map(|g| g.describe()),
            )
            .field("image_backend", &self.image_backend)
            .field("image_model", &self.image_model)
            .field(
                "image_generator",
                &self.image_generator.as_ref().map(|g| g.describe()),
            )
            .field("hf_token", &self.hf_token.as_ref().map(|_| "<redacted>"))
            .field("hf_base_url", &self.hf_base_url)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("image_size", &self.image_size)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("concurrent_assets", &self.concurrent_assets)
            .finish()
    }
}

impl KitConfig {
    /// Create a new builder for `KitConfig`.
    pub fn builder() -> KitConfigBuilder {
        KitConfigBuilder {
            config: Self::default(),
        }
    }

    /// Backoff before attempt `attempt` (1-based), honouring a server hint.
    pub fn backoff_ms(&self, attempt: u32, server_hint_ms: Option<u64>) -> u64 {
        let exponential = self
            .retry_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        server_hint_ms
            .map_or(exponential, |hint| hint.max(exponential))
            .min(self.max_backoff_ms)
    }
}

/// Builder for [`KitConfig`].
#[derive(Debug)]
pub struct KitConfigBuilder {
    config: KitConfig,
}

impl KitConfigBuilder {
    pub fn text_backend(mut self, backend: TextBackend) -> Self {
        self.config.text_backend = backend;
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.text_generator = Some(generator);
        self
    }

    pub fn image_backend(mut self, backend: ImageBackend) -> Self {
        self.config.image_backend = backend;
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.config.image_model = Some(model.into());
        self
    }

    pub fn image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.config.image_generator = Some(generator);
        self
    }

    pub fn hf_token(mut self, token: impl Into<String>) -> Self {
        self.config.hf_token = Some(token.into());
        self
    }

    pub fn hf_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.hf_base_url = url.into();
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.openai_api_key = Some(key.into());
        self
    }

    pub fn openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.openai_base_url = url.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn image_size(mut self, px: u32) -> Self {
        self.config.image_size = px;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn max_backoff_ms(mut self, ms: u64) -> Self {
        self.config.max_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn palette_accents(mut self, accents: Vec<HexColor>) -> Self {
        self.config.palette_accents = accents;
        self
    }

    pub fn concurrent_assets(mut self, v: bool) -> Self {
        self.config.concurrent_assets = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<KitConfig, BrandKitError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(BrandKitError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if !(64..=2048).contains(&c.image_size) {
            return Err(BrandKitError::InvalidConfig(format!(
                "image_size must be 64–2048, got {}",
                c.image_size
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(BrandKitError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
