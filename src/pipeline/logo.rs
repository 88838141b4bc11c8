//! Logo stage: text-to-image call, decode, PNG re-encode.
//!
//! Backends answer with whatever format the model emits (usually JPEG from
//! diffusion endpoints, PNG from OpenAI). The kit always ships `logo.png`,
//! so the bytes are decoded with the `image` crate and re-encoded losslessly.
//! Decoding also catches error pages served with a 200 status.

use super::with_retries;
use crate::backends::{ImageGenerator, ImageRequest};
use crate::brief::BrandBrief;
use crate::config::KitConfig;
use crate::error::AssetError;
use crate::output::{Logo, LogoResult};
use crate::progress::Stage;
use crate::prompts::logo_prompt;
use image::DynamicImage;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate the logo for `brief`.
///
/// Always returns a `LogoResult`; on failure `logo` is `None` and `error`
/// says why, so the guide and archive are built without it.
pub async fn generate_logo(
    generator: &Arc<dyn ImageGenerator>,
    brief: &BrandBrief,
    config: &KitConfig,
) -> LogoResult {
    let start = Instant::now();
    let request = ImageRequest {
        prompt: logo_prompt(brief),
        width: config.image_size,
        height: config.image_size,
    };

    info!("Generating logo with {}", generator.describe());
    let (result, retries) =
        with_retries(Stage::Logo, config, || generator.generate(&request)).await;

    let outcome = match result {
        Ok(bytes) => decode_logo(&bytes),
        Err(err) => Err(AssetError::ImageFailed {
            retries,
            detail: err.to_string(),
        }),
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(logo) => {
            debug!(
                "Logo: {}x{} px, {} PNG bytes, {}ms",
                logo.width,
                logo.height,
                logo.png.len(),
                duration_ms
            );
            LogoResult {
                logo: Some(logo),
                duration_ms,
                retries,
                error: None,
            }
        }
        Err(err) => {
            warn!("Logo skipped: {}", err);
            LogoResult {
                logo: None,
                duration_ms,
                retries,
                error: Some(err),
            }
        }
    }
}

/// Decode backend bytes and re-encode them as PNG.
pub fn decode_logo(bytes: &[u8]) -> Result<Logo, AssetError> {
    let image = image::load_from_memory(bytes).map_err(|e| AssetError::ImageDecodeFailed {
        detail: e.to_string(),
    })?;
    let png = encode_png(&image).map_err(|e| AssetError::ImageDecodeFailed {
        detail: format!("PNG encoding failed: {e}"),
    })?;
    Ok(Logo {
        width: image.width(),
        height: image.height(),
        image,
        png,
    })
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::{HexColor, Vibe};
    use crate::error::BackendError;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};

    struct Fixed(Result<Vec<u8>, BackendError>);

    #[async_trait]
    impl ImageGenerator for Fixed {
        fn describe(&self) -> String {
            "fixed".into()
        }

        async fn generate(&self, _request: &ImageRequest) -> Result<Vec<u8>, BackendError> {
            self.0.clone()
        }
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([200, 80, 40])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    fn brief() -> BrandBrief {
        BrandBrief::new("Acme", "Rockets", Vibe::Techy, HexColor::new(0, 0, 0)).unwrap()
    }

    fn config() -> KitConfig {
        KitConfig::builder()
            .max_retries(1)
            .retry_backoff_ms(1)
            .build()
            .unwrap()
    }

    #[test]
    fn jpeg_is_reencoded_as_png() {
        let logo = decode_logo(&jpeg_bytes()).unwrap();
        assert_eq!((logo.width, logo.height), (16, 8));
        assert_eq!(&logo.png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_logo(b"{\"error\":\"oops\"}").unwrap_err();
        assert!(matches!(err, AssetError::ImageDecodeFailed { .. }));
    }

    #[tokio::test]
    async fn successful_generation_yields_logo() {
        let backend: Arc<dyn ImageGenerator> = Arc::new(Fixed(Ok(jpeg_bytes())));
        let r = generate_logo(&backend, &brief(), &config()).await;
        assert!(r.logo.is_some());
        assert!(r.error.is_none());
    }

    #[tokio::test]
    async fn backend_failure_skips_logo() {
        let backend: Arc<dyn ImageGenerator> = Arc::new(Fixed(Err(BackendError::Http {
            status: 500,
            body: "boom".into(),
        })));
        let r = generate_logo(&backend, &brief(), &config()).await;
        assert!(r.logo.is_none());
        assert_eq!(r.retries, 1);
        match r.error {
            Some(AssetError::ImageFailed { retries, detail }) => {
                assert_eq!(retries, 1);
                assert!(detail.contains("boom"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_bytes_skip_logo() {
        let backend: Arc<dyn ImageGenerator> = Arc::new(Fixed(Ok(b"not an image".to_vec())));
        let r = generate_logo(&backend, &brief(), &config()).await;
        assert!(r.logo.is_none());
        assert!(matches!(
            r.error,
            Some(AssetError::ImageDecodeFailed { .. })
        ));
    }
}
