//! Brand-kit generation entry points.
//!
//! [`generate`] runs the whole pipeline in memory and returns a [`BrandKit`];
//! [`generate_to_dir`] additionally writes `<stem>_kit.zip`. Copy and logo
//! failures never abort a run: they become warnings on the kit.

use crate::backends::{
    huggingface, openai, HuggingFaceImage, HuggingFaceText, ImageGenerator, LlmText,
    OpenAiImage, TextGenerator,
};
use crate::brief::BrandBrief;
use crate::config::{ImageBackend, KitConfig, TextBackend};
use crate::error::{AssetError, BrandKitError};
use crate::output::{BrandKit, KitStats};
use crate::palette::Palette;
use crate::pipeline::archive::{build_archive, ArchiveContents};
use crate::pipeline::layout::GuideLayout;
use crate::pipeline::{copy, guide, logo};
use crate::progress::{KitProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default model when an `edgequake-llm` provider is named without one.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4.1-nano";

/// Generate a complete brand kit.
///
/// # Returns
/// `Ok(BrandKit)` even when the copy or logo failed; check
/// [`BrandKit::warnings`].
///
/// # Errors
/// Only fatal problems: no usable backend, pdfium unavailable, the guide or
/// the archive could not be produced.
pub async fn generate(brief: &BrandBrief, config: &KitConfig) -> Result<BrandKit, BrandKitError> {
    let total_start = Instant::now();
    let progress: ProgressCallback = config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));

    info!("Generating brand kit for '{}'", brief.brand_name());

    // ── Step 1: Backends ─────────────────────────────────────────────────
    let text_generator = resolve_text_generator(config)?;
    let image_generator = resolve_image_generator(config)?;
    progress.on_kit_start(brief.brand_name());

    // ── Step 2: Copy and logo ────────────────────────────────────────────
    let copy_stage = async {
        progress.on_stage_start(Stage::Copy);
        let result = copy::generate_copy(&text_generator, brief, config).await;
        finish_stage(progress.as_ref(), Stage::Copy, result.error.as_ref());
        result
    };
    let logo_stage = async {
        progress.on_stage_start(Stage::Logo);
        let result = logo::generate_logo(&image_generator, brief, config).await;
        finish_stage(progress.as_ref(), Stage::Logo, result.error.as_ref());
        result
    };
    let (copy, logo) = if config.concurrent_assets {
        futures::future::join(copy_stage, logo_stage).await
    } else {
        let copy = copy_stage.await;
        (copy, logo_stage.await)
    };

    // ── Step 3: Guide ────────────────────────────────────────────────────
    let palette = Palette::suggest(brief.theme_color(), &config.palette_accents);
    progress.on_stage_start(Stage::Guide);
    let guide_start = Instant::now();
    let layout = GuideLayout::build(brief, &palette, &copy.text, logo.logo.is_some());
    debug!("Guide layout: {} page(s)", layout.page_count());
    let logo_image = logo.logo.as_ref().map(|l| l.image.clone());
    let guide_pdf = guide::render_guide(layout, logo_image).await?;
    let guide_duration_ms = guide_start.elapsed().as_millis() as u64;
    progress.on_stage_complete(Stage::Guide);

    // ── Step 4: Archive ──────────────────────────────────────────────────
    progress.on_stage_start(Stage::Archive);
    let archive_start = Instant::now();
    let guide_file_name = brief.guide_file_name();
    let archive = build_archive(ArchiveContents {
        copy: &copy.text,
        logo_png: logo.logo.as_ref().map(|l| l.png.as_slice()),
        guide_name: &guide_file_name,
        guide_pdf: &guide_pdf,
    })?;
    let archive_duration_ms = archive_start.elapsed().as_millis() as u64;
    progress.on_stage_complete(Stage::Archive);

    // ── Step 5: Assemble ─────────────────────────────────────────────────
    let warnings = [copy.error.is_some(), logo.error.is_some()]
        .into_iter()
        .filter(|failed| *failed)
        .count();
    let stats = KitStats {
        input_tokens: copy.input_tokens,
        output_tokens: copy.output_tokens,
        copy_duration_ms: copy.duration_ms,
        logo_duration_ms: logo.duration_ms,
        guide_duration_ms,
        archive_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        warnings,
    };

    info!(
        "Brand kit ready: {} ({} bytes, {} warning(s), {}ms)",
        brief.archive_file_name(),
        archive.len(),
        warnings,
        stats.total_duration_ms
    );
    progress.on_kit_complete(warnings);

    Ok(BrandKit {
        brief: brief.clone(),
        palette,
        copy,
        logo,
        guide_file_name,
        guide_pdf,
        archive_file_name: brief.archive_file_name(),
        archive,
        stats,
    })
}

/// Generate a kit and write `<stem>_kit.zip` into `dir`.
///
/// The directory is created if needed. The archive is written to a temp
/// file in the same directory and then renamed, so readers never see a
/// partial zip.
pub async fn generate_to_dir(
    brief: &BrandBrief,
    dir: impl AsRef<Path>,
    config: &KitConfig,
) -> Result<BrandKit, BrandKitError> {
    let kit = generate(brief, config).await?;
    let dir = dir.as_ref().to_path_buf();
    let path = dir.join(&kit.archive_file_name);

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| BrandKitError::OutputWriteFailed {
            path: dir.clone(),
            source: e,
        })?;

    let bytes = kit.archive.clone();
    let target = path.clone();
    tokio::task::spawn_blocking(move || {
        let write_err = |source| BrandKitError::OutputWriteFailed {
            path: target.clone(),
            source,
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".brandkit-").suffix(".zip.tmp");
        // Readable like any other file the user creates (subject to umask).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let mut tmp = builder.tempfile_in(&dir).map_err(write_err)?;
        tmp.write_all(&bytes).map_err(write_err)?;
        tmp.persist(&target).map_err(|e| write_err(e.error))?;
        Ok::<_, BrandKitError>(())
    })
    .await
    .map_err(|e| BrandKitError::Internal(format!("Write task panicked: {}", e)))??;

    info!("Wrote {}", path.display());
    Ok(kit)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(brief: &BrandBrief, config: &KitConfig) -> Result<BrandKit, BrandKitError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BrandKitError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(brief, config))
}

fn finish_stage(progress: &dyn KitProgressCallback, stage: Stage, error: Option<&AssetError>) {
    match error {
        Some(err) => progress.on_stage_warning(stage, &err.to_string()),
        None => progress.on_stage_complete(stage),
    }
}

// ── Backend resolution ───────────────────────────────────────────────────

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the text backend, from most-specific to least-specific.
///
/// 1. **Pre-built generator** (`config.text_generator`), used as-is.
/// 2. **Named backend** (`config.text_backend`): Hugging Face with a token,
///    or an `edgequake-llm` provider.
/// 3. **Auto**: Hugging Face when `HF_API_KEY`/`HF_TOKEN` is set, otherwise
///    whatever provider `ProviderFactory` can build from the environment.
pub fn resolve_text_generator(
    config: &KitConfig,
) -> Result<Arc<dyn TextGenerator>, BrandKitError> {
    resolve_text_with(config, &process_env)
}

/// Resolve the image backend: pre-built generator, then the named backend,
/// then Hugging Face or OpenAI depending on which credential is present.
pub fn resolve_image_generator(
    config: &KitConfig,
) -> Result<Arc<dyn ImageGenerator>, BrandKitError> {
    resolve_image_with(config, &process_env)
}

fn hf_token(config: &KitConfig, env: EnvLookup<'_>) -> Option<String> {
    config
        .hf_token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| env("HF_API_KEY"))
        .or_else(|| env("HF_TOKEN"))
}

fn openai_key(config: &KitConfig, env: EnvLookup<'_>) -> Option<String> {
    config
        .openai_api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| env("OPENAI_API_KEY"))
}

fn resolve_text_with(
    config: &KitConfig,
    env: EnvLookup<'_>,
) -> Result<Arc<dyn TextGenerator>, BrandKitError> {
    if let Some(generator) = &config.text_generator {
        return Ok(Arc::clone(generator));
    }

    let token = hf_token(config, env);
    let use_hf = match config.text_backend {
        TextBackend::HuggingFace => true,
        TextBackend::Llm => false,
        TextBackend::Auto => token.is_some(),
    };

    let generator: Arc<dyn TextGenerator> = if use_hf {
        let model = config
            .text_model
            .as_deref()
            .unwrap_or(huggingface::DEFAULT_TEXT_MODEL);
        Arc::new(HuggingFaceText::new(
            token.as_deref().unwrap_or_default(),
            model,
            &config.hf_base_url,
            config.api_timeout_secs,
        )?)
    } else {
        let (provider, label) = resolve_llm_provider(config, env)?;
        Arc::new(LlmText::new(provider, label, config.api_timeout_secs))
    };
    debug!("Text backend: {}", generator.describe());
    Ok(generator)
}

/// Fallback chain for chat providers: explicit provider, provider
/// name, the `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL` pair, then full
/// auto-detection.
fn resolve_llm_provider(
    config: &KitConfig,
    env: EnvLookup<'_>,
) -> Result<(Arc<dyn LLMProvider>, String), BrandKitError> {
    if let Some(provider) = &config.provider {
        return Ok((Arc::clone(provider), "custom provider".to_string()));
    }

    if let Some(name) = &config.provider_name {
        let model = config.text_model.as_deref().unwrap_or(DEFAULT_LLM_MODEL);
        return create_llm_provider(name, model);
    }

    if let (Some(name), Some(model)) = (env("EDGEQUAKE_LLM_PROVIDER"), env("EDGEQUAKE_MODEL")) {
        return create_llm_provider(&name, &model);
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| BrandKitError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No text backend could be auto-detected from the environment.\n\
                Set HF_API_KEY for Hugging Face, or OPENAI_API_KEY, ANTHROPIC_API_KEY, \
                or another edgequake-llm provider key.\n\
                Error: {}",
                e
            ),
        })?;
    Ok((provider, "auto-detected provider".to_string()))
}

fn create_llm_provider(
    name: &str,
    model: &str,
) -> Result<(Arc<dyn LLMProvider>, String), BrandKitError> {
    let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        BrandKitError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    Ok((provider, format!("{name}:{model}")))
}

fn resolve_image_with(
    config: &KitConfig,
    env: EnvLookup<'_>,
) -> Result<Arc<dyn ImageGenerator>, BrandKitError> {
    if let Some(generator) = &config.image_generator {
        return Ok(Arc::clone(generator));
    }

    let token = hf_token(config, env);
    let backend = match config.image_backend {
        ImageBackend::Auto if token.is_some() => ImageBackend::HuggingFace,
        ImageBackend::Auto if openai_key(config, env).is_some() => ImageBackend::OpenAi,
        ImageBackend::Auto => {
            return Err(BrandKitError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: "No image backend could be auto-detected.\n\
                       Set HF_API_KEY (or HF_TOKEN) for Hugging Face, or OPENAI_API_KEY."
                    .to_string(),
            });
        }
        explicit => explicit,
    };

    let generator: Arc<dyn ImageGenerator> = match backend {
        ImageBackend::OpenAi => {
            let model = config
                .image_model
                .as_deref()
                .unwrap_or(openai::DEFAULT_IMAGE_MODEL);
            Arc::new(OpenAiImage::new(
                openai_key(config, env).as_deref().unwrap_or_default(),
                model,
                &config.openai_base_url,
                config.api_timeout_secs,
            )?)
        }
        _ => {
            let model = config
                .image_model
                .as_deref()
                .unwrap_or(huggingface::DEFAULT_IMAGE_MODEL);
            Arc::new(HuggingFaceImage::new(
                token.as_deref().unwrap_or_default(),
                model,
                &config.hf_base_url,
                config.api_timeout_secs,
            )?)
        }
    };
    debug!("Image backend: {}", generator.describe());
    Ok(generator)
}
