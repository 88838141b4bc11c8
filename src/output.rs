//! Result types produced by a generation run.

use crate::brief::BrandBrief;
use crate::error::AssetError;
use crate::palette::Palette;
use crate::prompts::FALLBACK_COPY;
use image::DynamicImage;
use serde::Serialize;

/// Outcome of the copy stage.
#[derive(Debug, Clone, Serialize)]
pub struct CopyResult {
    /// Cleaned copy, or [`FALLBACK_COPY`] when generation failed.
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    /// Retries used (0 when the first attempt succeeded).
    pub retries: u32,
    pub error: Option<AssetError>,
}

impl CopyResult {
    pub(crate) fn failed(error: AssetError, retries: u32, duration_ms: u64) -> Self {
        Self {
            text: FALLBACK_COPY.to_string(),
            input_tokens: 0,
            output_tokens: 0,
            duration_ms,
            retries,
            error: Some(error),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// A decoded logo and its PNG encoding.
#[derive(Debug, Clone)]
pub struct Logo {
    pub image: DynamicImage,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Outcome of the logo stage.
#[derive(Debug, Clone, Serialize)]
pub struct LogoResult {
    #[serde(skip)]
    pub logo: Option<Logo>,
    pub duration_ms: u64,
    pub retries: u32,
    pub error: Option<AssetError>,
}

/// Timings and usage for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KitStats {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub copy_duration_ms: u64,
    pub logo_duration_ms: u64,
    pub guide_duration_ms: u64,
    pub archive_duration_ms: u64,
    pub total_duration_ms: u64,
    pub warnings: usize,
}

/// Everything one generation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BrandKit {
    pub brief: BrandBrief,
    pub palette: Palette,
    pub copy: CopyResult,
    pub logo: LogoResult,
    /// `<stem>_brand_guide.pdf`
    pub guide_file_name: String,
    #[serde(skip)]
    pub guide_pdf: Vec<u8>,
    /// `<stem>_kit.zip`
    pub archive_file_name: String,
    #[serde(skip)]
    pub archive: Vec<u8>,
    pub stats: KitStats,
}

impl BrandKit {
    /// Human-readable warnings for every asset that is missing or replaced.
    pub fn warnings(&self) -> Vec<String> {
        [self.copy.error.as_ref(), self.logo.error.as_ref()]
            .into_iter()
            .flatten()
            .map(|e| e.to_string())
            .collect()
    }

    pub fn has_logo(&self) -> bool {
        self.logo.logo.is_some()
    }
}
