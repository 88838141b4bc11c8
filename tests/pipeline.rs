//! Full-pipeline tests with in-process mock backends.
//!
//! No network access is needed, but the brand guide is drawn with pdfium:
//! every test skips when no pdfium library can be bound.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/lib cargo test --test pipeline -- --nocapture

use async_trait::async_trait;
use edgequake_brandkit::pipeline::pdfium::pdfium_available;
use edgequake_brandkit::{
    generate, generate_to_dir, BackendError, BrandBrief, HexColor, ImageGenerator, ImageRequest,
    KitConfig, KitProgressCallback, Stage, TextGenerator, TextRequest, TextResponse, Vibe,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

macro_rules! skip_unless_pdfium {
    () => {
        init_tracing();
        if !pdfium_available() {
            println!("SKIP: pdfium library not available (set PDFIUM_LIB_PATH)");
            return;
        }
    };
}

struct MockText(Result<String, BackendError>);

#[async_trait]
impl TextGenerator for MockText {
    fn describe(&self) -> String {
        "mock-text".into()
    }

    async fn generate(&self, _request: &TextRequest) -> Result<TextResponse, BackendError> {
        self.0.clone().map(|content| TextResponse {
            content,
            input_tokens: 50,
            output_tokens: 30,
        })
    }
}

struct MockImage(Result<Vec<u8>, BackendError>);

#[async_trait]
impl ImageGenerator for MockImage {
    fn describe(&self) -> String {
        "mock-image".into()
    }

    async fn generate(&self, _request: &ImageRequest) -> Result<Vec<u8>, BackendError> {
        self.0.clone()
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl KitProgressCallback for Recorder {
    fn on_stage_complete(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("done {stage}"));
    }

    fn on_stage_warning(&self, stage: Stage, _message: &str) {
        self.events.lock().unwrap().push(format!("warn {stage}"));
    }

    fn on_kit_complete(&self, warnings: usize) {
        self.events.lock().unwrap().push(format!("complete {warnings}"));
    }
}

fn png_logo() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([255, 87, 51])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn brief() -> BrandBrief {
    BrandBrief::new("Bean There", "Coffee", Vibe::EcoFriendly, HexColor::new(0x6F, 0x4E, 0x37))
        .unwrap()
}

fn config(text: MockText, image: MockImage) -> KitConfig {
    KitConfig::builder()
        .text_generator(Arc::new(text))
        .image_generator(Arc::new(image))
        .max_retries(1)
        .retry_backoff_ms(1)
        .build()
        .unwrap()
}

fn archive_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let names = archive.file_names().map(str::to_string).collect();
    names
}

const COPY: &str = "Tagline: Brew boldly.\n\nMission: Ethically sourced coffee.\n\nStory: It began with one bean.";

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_kit_contains_all_three_files() {
    skip_unless_pdfium!();

    let cfg = config(MockText(Ok(COPY.into())), MockImage(Ok(png_logo())));
    let kit = generate(&brief(), &cfg).await.unwrap();

    assert!(kit.guide_pdf.starts_with(b"%PDF"));
    assert!(kit.has_logo());
    assert!(kit.warnings().is_empty());
    assert_eq!(kit.copy.text, COPY);
    assert_eq!(kit.stats.input_tokens, 50);
    assert_eq!(kit.archive_file_name, "Bean_There_kit.zip");

    let mut names = archive_names(&kit.archive);
    names.sort();
    assert_eq!(
        names,
        ["Bean_There_brand_guide.pdf", "brand_text.txt", "logo.png"]
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(kit.archive.clone())).unwrap();
    let mut text = String::new();
    archive
        .by_name("brand_text.txt")
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, COPY);
}

#[tokio::test]
async fn failed_logo_is_a_warning_not_an_error() {
    skip_unless_pdfium!();

    let cfg = config(
        MockText(Ok(COPY.into())),
        MockImage(Err(BackendError::Auth {
            provider: "huggingface".into(),
            detail: "Invalid credentials".into(),
        })),
    );
    let kit = generate(&brief(), &cfg).await.unwrap();

    assert!(!kit.has_logo());
    assert_eq!(kit.warnings().len(), 1);
    assert!(kit.warnings()[0].contains("Logo generation failed"));
    assert!(!archive_names(&kit.archive).contains(&"logo.png".to_string()));
}

#[tokio::test]
async fn failed_copy_uses_fallback_text() {
    skip_unless_pdfium!();

    let recorder = Arc::new(Recorder::default());
    let cfg = KitConfig::builder()
        .text_generator(Arc::new(MockText(Err(BackendError::Http {
            status: 400,
            body: "bad request".into(),
        }))))
        .image_generator(Arc::new(MockImage(Ok(png_logo()))))
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let kit = generate(&brief(), &cfg).await.unwrap();

    assert!(kit.copy.is_fallback());
    assert_eq!(kit.copy.text, "Error: No branding text generated.");
    assert_eq!(kit.stats.warnings, 1);

    let events = recorder.events.lock().unwrap();
    assert!(events.contains(&"warn brand copy".to_string()));
    assert!(events.contains(&"done logo".to_string()));
    assert!(events.contains(&"done brand guide".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("complete 1"));
}

#[tokio::test]
async fn sequential_assets_produce_the_same_kit() {
    skip_unless_pdfium!();

    let cfg = KitConfig::builder()
        .text_generator(Arc::new(MockText(Ok(COPY.into()))))
        .image_generator(Arc::new(MockImage(Ok(png_logo()))))
        .concurrent_assets(false)
        .build()
        .unwrap();
    let kit = generate(&brief(), &cfg).await.unwrap();
    assert!(kit.has_logo());
    assert_eq!(archive_names(&kit.archive).len(), 3);
}

#[tokio::test]
async fn kit_is_written_to_directory() {
    skip_unless_pdfium!();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested/kits");
    let cfg = config(MockText(Ok(COPY.into())), MockImage(Ok(png_logo())));
    let kit = generate_to_dir(&brief(), &out, &cfg).await.unwrap();

    let path = out.join("Bean_There_kit.zip");
    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk, kit.archive);

    // No temp files left behind.
    let entries: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(entries.len(), 1);

    // Same mode as a plain file written under the current umask, minus
    // group/other write.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let reference = dir.path().join("reference.txt");
        std::fs::write(&reference, b"x").unwrap();
        let plain_mode = std::fs::metadata(&reference).unwrap().permissions().mode() & 0o777;
        let kit_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(kit_mode, plain_mode & 0o644, "kit mode {kit_mode:o}");
    }
}

#[tokio::test]
async fn long_copy_spills_onto_more_pages() {
    skip_unless_pdfium!();

    let long_copy = (1..=120)
        .map(|i| format!("Story paragraph {i}: the beans travelled far."))
        .collect::<Vec<_>>()
        .join("\n");
    let cfg = config(MockText(Ok(long_copy)), MockImage(Ok(png_logo())));
    let kit = generate(&brief(), &cfg).await.unwrap();

    let pdfium = edgequake_brandkit::pipeline::pdfium::bind_pdfium().unwrap();
    let document = pdfium.load_pdf_from_byte_slice(&kit.guide_pdf, None).unwrap();
    assert!(document.pages().len() > 1);
}
