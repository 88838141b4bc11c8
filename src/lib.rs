//! # edgequake-brandkit
//!
//! Generate a small branding kit from four inputs: brand name, industry,
//! vibe and a theme colour.
//!
//! A hosted text model writes the tagline, mission statement and brand
//! story; a hosted image model draws the logo; the crate lays both out in a
//! one-page (or longer) brand-guide PDF and bundles everything into a zip.
//!
//! ## Pipeline Overview
//!
//! ```text
//! BrandBrief
//!  │
//!  ├─ 1. Copy     text model (Hugging Face / edgequake-llm), retries, cleanup
//!  ├─ 2. Logo     image model (Hugging Face / OpenAI), decode, PNG re-encode
//!  │              (1 and 2 run concurrently)
//!  ├─ 3. Guide    layout + pdfium drawing (spawn_blocking)
//!  └─ 4. Archive  brand_text.txt + logo.png + <stem>_brand_guide.pdf → zip
//! ```
//!
//! A failed copy or logo call never aborts the run: the copy falls back to a
//! placeholder, the logo is left out, and both show up in
//! [`BrandKit::warnings`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_brandkit::{generate_to_dir, BrandBrief, KitConfig, Vibe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backends auto-detected from HF_API_KEY / OPENAI_API_KEY / …
//!     let brief = BrandBrief::new("Bean There", "Coffee", Vibe::Fun, "#6F4E37".parse()?)?;
//!     let kit = generate_to_dir(&brief, "out", &KitConfig::default()).await?;
//!     println!("{}", kit.copy.text);
//!     for warning in kit.warnings() {
//!         eprintln!("warning: {warning}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `brandkit` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `server` | on      | Enables [`server`], an axum form front-end |
//!
//! Disable both when using only the library:
//! ```toml
//! edgequake-brandkit = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! The guide is drawn with pdfium. Point `PDFIUM_LIB_PATH` at the library
//! (or its directory), place it in the working directory, or install it
//! system-wide.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backends;
pub mod brief;
pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod palette;
pub mod pipeline;
pub mod progress;
pub mod prompts;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backends::{ImageGenerator, ImageRequest, TextGenerator, TextRequest, TextResponse};
pub use brief::{BrandBrief, HexColor, Vibe};
pub use config::{ImageBackend, KitConfig, KitConfigBuilder, TextBackend};
pub use error::{AssetError, BackendError, BrandKitError};
pub use generate::{generate, generate_sync, generate_to_dir};
pub use output::{BrandKit, CopyResult, KitStats, LogoResult};
pub use palette::Palette;
pub use progress::{KitProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
