//! Progress-callback trait for per-stage generation events.
//!
//! Inject an [`Arc<dyn KitProgressCallback>`] via
//! [`crate::config::KitConfigBuilder::progress_callback`] to receive events
//! as the pipeline moves through its stages. The CLI drives a spinner from
//! these events; library users can forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use edgequake_brandkit::{KitConfig, KitProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl KitProgressCallback for Printer {
//!     fn on_stage_complete(&self, stage: Stage) {
//!         eprintln!("{stage} done");
//!     }
//! }
//!
//! let config = KitConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn KitProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One step of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Tagline, mission statement and story from the text model.
    Copy,
    /// Logo from the image model.
    Logo,
    /// Brand-guide PDF.
    Guide,
    /// Zip archive.
    Archive,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Copy => "brand copy",
            Stage::Logo => "logo",
            Stage::Guide => "brand guide",
            Stage::Archive => "archive",
        })
    }
}

/// Called by the pipeline as it runs.
///
/// Implementations must be `Send + Sync`: the copy and logo stages may run
/// concurrently, so their events can interleave. All methods default to
/// no-ops.
pub trait KitProgressCallback: Send + Sync {
    /// Called once before any stage starts.
    fn on_kit_start(&self, brand_name: &str) {
        let _ = brand_name;
    }

    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    fn on_stage_complete(&self, stage: Stage) {
        let _ = stage;
    }

    /// The stage finished without its asset; the kit continues without it.
    fn on_stage_warning(&self, stage: Stage, message: &str) {
        let _ = (stage, message);
    }

    /// Called once after the archive is built.
    fn on_kit_complete(&self, warnings: usize) {
        let _ = warnings;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl KitProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::KitConfig`].
pub type ProgressCallback = Arc<dyn KitProgressCallback>;
