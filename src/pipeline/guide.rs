//! Brand-guide PDF: replays a [`GuideLayout`] onto pdfium pages.
//!
//! pdfium is a blocking C library, so drawing runs inside
//! `tokio::task::spawn_blocking` the same way page rendering would.

use super::layout::{DrawOp, Font, GuideLayout, PAGE_HEIGHT, PAGE_WIDTH};
use super::pdfium::bind_pdfium;
use crate::error::BrandKitError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// Draw `layout` into a new PDF and return its bytes.
///
/// `logo` is drawn wherever the layout placed a [`DrawOp::Logo`]; when it is
/// `None` those operations are skipped.
pub async fn render_guide(
    layout: GuideLayout,
    logo: Option<DynamicImage>,
) -> Result<Vec<u8>, BrandKitError> {
    tokio::task::spawn_blocking(move || render_guide_blocking(&layout, logo.as_ref()))
        .await
        .map_err(|e| BrandKitError::Internal(format!("Guide task panicked: {}", e)))?
}

fn render_guide_blocking(
    layout: &GuideLayout,
    logo: Option<&DynamicImage>,
) -> Result<Vec<u8>, BrandKitError> {
    let pdfium = bind_pdfium()?;
    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| render_error("create document", e))?;

    let regular = document.fonts_mut().helvetica();
    let bold = document.fonts_mut().helvetica_bold();

    for (index, ops) in layout.pages().iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::new(PAGE_WIDTH),
                PdfPoints::new(PAGE_HEIGHT),
            ))
            .map_err(|e| render_error("add page", e))?;

        for op in ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    text,
                    font,
                    size,
                } => {
                    let token = match font {
                        Font::Helvetica => regular,
                        Font::HelveticaBold => bold,
                    };
                    page.objects_mut()
                        .create_text_object(
                            PdfPoints::new(*x),
                            PdfPoints::new(*y),
                            text,
                            token,
                            PdfPoints::new(*size),
                        )
                        .map_err(|e| render_error("draw text", e))?;
                }
                DrawOp::Logo {
                    x,
                    y,
                    width,
                    height,
                } => {
                    let Some(image) = logo else { continue };
                    let (w, h) = fit_within(image.width(), image.height(), *width, *height);
                    // Centre inside the box.
                    let left = x + (width - w) / 2.0;
                    let bottom = y + (height - h) / 2.0;
                    page.objects_mut()
                        .create_image_object(
                            PdfPoints::new(left),
                            PdfPoints::new(bottom),
                            image,
                            Some(PdfPoints::new(w)),
                            Some(PdfPoints::new(h)),
                        )
                        .map_err(|e| render_error("draw logo", e))?;
                }
                DrawOp::Swatch {
                    x,
                    y,
                    width,
                    height,
                    fill,
                } => {
                    let rect = PdfRect::new_from_values(*y, *x, y + height, x + width);
                    page.objects_mut()
                        .create_path_object_rect(
                            rect,
                            None,
                            None,
                            Some(PdfColor::new(fill.r, fill.g, fill.b, 255)),
                        )
                        .map_err(|e| render_error("draw swatch", e))?;
                }
            }
        }
        debug!("Guide page {} drawn ({} ops)", index + 1, ops.len());
    }

    document
        .save_to_bytes()
        .map_err(|e| render_error("save document", e))
}

fn render_error(step: &str, err: PdfiumError) -> BrandKitError {
    BrandKitError::GuideRenderFailed(format!("{}: {:?}", step, err))
}

/// Scale `width × height` pixels to fit a `max_w × max_h` box, keeping aspect.
fn fit_within(width: u32, height: u32, max_w: f32, max_h: f32) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (max_w, max_h);
    }
    let (w, h) = (width as f32, height as f32);
    // The bounding side is set exactly; only the other side is scaled.
    if w * max_h >= h * max_w {
        (max_w, h * max_w / w)
    } else {
        (w * max_h / h, max_h)
    }
}
