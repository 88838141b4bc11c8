//! Error types for the edgequake-brandkit library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`BrandKitError`]: **Fatal.** The kit cannot be produced at all
//!   (invalid brief, no provider configured, pdfium missing, archive
//!   failure). Returned as `Err(BrandKitError)` from the `generate*`
//!   functions.
//!
//! * [`AssetError`]: **Non-fatal.** One generated asset (the copy or the
//!   logo) is missing but the kit is still assembled without it. Stored in
//!   [`crate::output::CopyResult`] / [`crate::output::LogoResult`] and
//!   surfaced to the user as a warning.
//!
//! * [`BackendError`]: a single call to a hosted model failed. The
//!   pipeline decides from [`BackendError::is_retryable`] whether to try
//!   again before converting the last failure into an [`AssetError`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-brandkit library.
#[derive(Debug, Error)]
pub enum BrandKitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A required brief field is missing or malformed.
    #[error("Invalid brief: {field} {reason}")]
    InvalidBrief { field: &'static str, reason: String },

    /// The theme colour is not a hex colour.
    #[error("Invalid colour '{value}': expected #RRGGBB or #RGB")]
    InvalidColor { value: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Provider errors ───────────────────────────────────────────────────
    /// No usable text or image backend could be constructed.
    #[error("Backend '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Guide errors ──────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
The brand guide PDF is drawn with pdfium. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or containing directory).\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium into a system library path.\n"
    )]
    PdfiumBindingFailed(String),

    /// pdfium returned an error while drawing or saving the guide.
    #[error("Brand guide rendering failed: {0}")]
    GuideRenderFailed(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The zip archive could not be assembled.
    #[error("Failed to build kit archive: {0}")]
    ArchiveFailed(String),

    /// Could not create or write the output archive.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure of one generated asset.
///
/// The kit is still produced; the asset is replaced by a fallback (copy) or
/// left out (logo).
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum AssetError {
    /// Text generation failed after retries.
    #[error("Text generation failed after {retries} retries: {detail}")]
    TextFailed { retries: u32, detail: String },

    /// Image generation failed after retries.
    #[error("Logo generation failed after {retries} retries: {detail}")]
    ImageFailed { retries: u32, detail: String },

    /// The image backend answered, but the bytes are not a readable image.
    #[error("Logo generation returned an unreadable image: {detail}")]
    ImageDecodeFailed { detail: String },
}

/// Failure of a single call to a hosted model.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// 401/403: the token is missing, wrong, or lacks access to the model.
    #[error("Authentication failed for {provider}: {detail}")]
    Auth { provider: String, detail: String },

    /// 429: slow down.
    #[error("Rate limit exceeded for {provider}")]
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    /// 503 from a cold Hugging Face model that is still loading.
    #[error("Model '{model}' is loading (estimated {estimated_secs:.0}s)")]
    Loading { model: String, estimated_secs: f64 },

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection, TLS or body-read failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The body could not be interpreted.
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// The provider refused the request itself (unknown model, bad
    /// parameters, prompt too long). Sending it again cannot succeed.
    #[error("Request rejected by {provider}: {detail}")]
    Rejected { provider: String, detail: String },

    /// The model answered with nothing usable.
    #[error("Model returned empty output")]
    EmptyOutput,
}

impl BackendError {
    /// Whether repeating the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::RateLimited { .. }
            | BackendError::Loading { .. }
            | BackendError::Timeout { .. }
            | BackendError::Transport(_) => true,
            BackendError::Http { status, .. } => *status >= 500,
            BackendError::Auth { .. }
            | BackendError::Rejected { .. }
            | BackendError::InvalidResponse(_)
            | BackendError::EmptyOutput => false,
        }
    }

    /// Server-suggested wait before retrying, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            BackendError::RateLimited {
                retry_after_secs: Some(secs),
                ..
            } => Some(secs.saturating_mul(1000)),
            BackendError::Loading { estimated_secs, .. } if *estimated_secs > 0.0 => {
                Some((estimated_secs * 1000.0) as u64)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_brief_display() {
        let e = BrandKitError::InvalidBrief {
            field: "industry",
            reason: "must not be empty".into(),
        };
        assert_eq!(e.to_string(), "Invalid brief: industry must not be empty");
    }

    #[test]
    fn text_failed_display() {
        let e = AssetError::TextFailed {
            retries: 2,
            detail: "HTTP 500: boom".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("2 retries"), "got: {msg}");
        assert!(msg.contains("boom"));
    }

    #[test]
    fn retryable_classification() {
        assert!(BackendError::Http {
            status: 502,
            body: String::new()
        }
        .is_retryable());
        assert!(!BackendError::Http {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(BackendError::Timeout { secs: 5 }.is_retryable());
        assert!(!BackendError::Auth {
            provider: "huggingface".into(),
            detail: "bad token".into()
        }
        .is_retryable());
        assert!(!BackendError::EmptyOutput.is_retryable());
    }

    #[test]
    fn retry_after_from_loading_model() {
        let e = BackendError::Loading {
            model: "stabilityai/stable-diffusion-2-1-base".into(),
            estimated_secs: 1.5,
        };
        assert_eq!(e.retry_after_ms(), Some(1500));
        assert!(e.to_string().contains("loading"));
    }

    #[test]
    fn retry_after_from_rate_limit() {
        let e = BackendError::RateLimited {
            provider: "openai".into(),
            retry_after_secs: Some(3),
        };
        assert_eq!(e.retry_after_ms(), Some(3000));
        let e = BackendError::RateLimited {
            provider: "openai".into(),
            retry_after_secs: None,
        };
        assert_eq!(e.retry_after_ms(), None);
    }

    #[test]
    fn huge_retry_after_saturates() {
        let e = BackendError::RateLimited {
            provider: "huggingface".into(),
            retry_after_secs: Some(u64::MAX / 100),
        };
        assert_eq!(e.retry_after_ms(), Some(u64::MAX));
    }

    #[test]
    fn rejected_request_is_permanent() {
        let e = BackendError::Rejected {
            provider: "openai".into(),
            detail: "Model not found: gpt-9".into(),
        };
        assert!(!e.is_retryable());
        assert_eq!(e.retry_after_ms(), None);
        assert!(e.to_string().contains("gpt-9"));
    }

    #[test]
    fn asset_error_serialises() {
        let e = AssetError::ImageDecodeFailed {
            detail: "bad magic".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("ImageDecodeFailed"));
    }
}
