//! Copy stage: tagline, mission statement and brand story.
//!
//! Prompt wording lives in [`crate::prompts`]; this module only drives the
//! call, retries and cleanup.

use super::{postprocess, with_retries};
use crate::backends::{TextGenerator, TextRequest};
use crate::brief::BrandBrief;
use crate::config::KitConfig;
use crate::error::{AssetError, BackendError};
use crate::output::CopyResult;
use crate::progress::Stage;
use crate::prompts::{brand_copy_prompt, DEFAULT_SYSTEM_PROMPT};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate the brand copy for `brief`.
///
/// Always returns a `CopyResult`; a failure yields the fallback text and an
/// [`AssetError::TextFailed`] so the rest of the kit can still be built.
pub async fn generate_copy(
    generator: &Arc<dyn TextGenerator>,
    brief: &BrandBrief,
    config: &KitConfig,
) -> CopyResult {
    let start = Instant::now();
    let prompt = brand_copy_prompt(brief);
    let request = TextRequest {
        system: Some(
            config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        ),
        prompt,
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    info!("Generating brand copy with {}", generator.describe());
    let (result, retries) = with_retries(Stage::Copy, config, || async {
        let response = generator.generate(&request).await?;
        let text = postprocess::clean_copy(&response.content, &request.prompt);
        if text.is_empty() {
            // Everything the model said was decoration or an echo.
            return Err(BackendError::EmptyOutput);
        }
        Ok((response, text))
    })
    .await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok((response, text)) => {
            debug!(
                "Copy: {} chars, {} input / {} output tokens, {}ms",
                text.len(),
                response.input_tokens,
                response.output_tokens,
                duration_ms
            );
            CopyResult {
                text,
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
                duration_ms,
                retries,
                error: None,
            }
        }
        Err(err) => {
            warn!("Copy generation failed: {}", err);
            CopyResult::failed(
                AssetError::TextFailed {
                    retries,
                    detail: err.to_string(),
                },
                retries,
                duration_ms,
            )
        }
    }
}
