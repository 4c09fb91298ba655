use crate::cancel::CancelFlag;
use crate::layout::{fit_to_page, page_dimensions_mm};
use crate::options::AssemblyOptions;
use crate::types::{AssemblyError, Result};
use image::DynamicImage;
use imgpdf_collection::{ImageRecord, Rotation};
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, XObjectTransform};
use std::path::Path;
use std::time::Duration;

/// Result of building a document in memory
pub enum Assembled {
    /// Every page was composed; the document is ready to save
    Document(PdfDocument),
    /// Cancellation was observed between pages; the partial document is
    /// dropped, not returned
    Canceled { pages_composed: usize },
}

/// Final outcome of [`generate`]
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyOutcome {
    Completed { filename: String, page_count: usize },
    Canceled { pages_composed: usize },
}

/// Pixels after the rotation bake, re-encoded for embedding
struct BakedImage {
    jpeg: Vec<u8>,
    width_px: u32,
    height_px: u32,
}

/// Compose `pages` into a PDF document, one page per image, in order.
///
/// The loop is strictly sequential: every image is appended to the one
/// running document, progress is reported before each page as
/// `(i / n) * 100`, and the cancellation flag is checked at the top of each
/// iteration. Per-page pixel work (rotation bake, JPEG re-encode) runs on
/// the blocking pool.
pub async fn assemble<F>(
    pages: Vec<ImageRecord>,
    options: &AssemblyOptions,
    cancel: &CancelFlag,
    progress: &mut F,
) -> Result<Assembled>
where
    F: FnMut(f32, String),
{
    if pages.is_empty() {
        return Err(AssemblyError::EmptyCollection);
    }
    options.validate()?;
    let filename = options.resolved_filename()?;

    let total = pages.len();
    let mut doc = PdfDocument::new(filename.trim_end_matches(".pdf"));
    let mut composed = 0usize;

    for (i, record) in pages.into_iter().enumerate() {
        if cancel.is_canceled() {
            log::debug!("assembly canceled after {composed} of {total} pages");
            return Ok(Assembled::Canceled {
                pages_composed: composed,
            });
        }

        progress(
            (i as f32 / total as f32) * 100.0,
            format!("Processing image {} of {}", i + 1, total),
        );

        if options.page_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(options.page_delay_ms)).await;
        }

        let (page_w_mm, page_h_mm) =
            page_dimensions_mm(options.page_size, options.orientation, record.rotation);

        let name = record.name;
        let rotation = record.rotation;
        let pixels = record.pixels;
        let quality = options.jpeg_quality;
        let baked =
            tokio::task::spawn_blocking(move || bake_page_image(pixels, rotation, quality))
                .await?
                .inspect_err(|err| log::warn!("failed to prepare page for {name}: {err}"))?;

        append_page(&mut doc, &baked, page_w_mm, page_h_mm)?;
        composed += 1;
    }

    Ok(Assembled::Document(doc))
}

/// Compose and save: [`assemble`] plus the final write under the resolved
/// filename. A canceled run writes nothing and skips the save entirely.
pub async fn generate<F>(
    pages: Vec<ImageRecord>,
    options: &AssemblyOptions,
    out_dir: impl AsRef<Path>,
    cancel: &CancelFlag,
    mut progress: F,
) -> Result<AssemblyOutcome>
where
    F: FnMut(f32, String),
{
    match assemble(pages, options, cancel, &mut progress).await? {
        Assembled::Canceled { pages_composed } => {
            Ok(AssemblyOutcome::Canceled { pages_composed })
        }
        Assembled::Document(doc) => {
            progress(100.0, "Saving PDF...".to_string());
            let filename = options.resolved_filename()?;
            let page_count = doc.pages.len();
            let bytes = serialize_document(doc).await?;
            let path = out_dir.as_ref().join(&filename);
            tokio::fs::write(&path, bytes).await?;
            Ok(AssemblyOutcome::Completed {
                filename,
                page_count,
            })
        }
    }
}

/// Bake the rotation into the pixels so the page content is upright even in
/// viewers that ignore transform metadata, then re-encode as JPEG. Axis
/// swapping for quarter turns is handled by the raster layer.
fn bake_page_image(pixels: DynamicImage, rotation: Rotation, jpeg_quality: u8) -> Result<BakedImage> {
    let rotated = match rotation {
        Rotation::None => pixels,
        Rotation::Clockwise90 => pixels.rotate90(),
        Rotation::Clockwise180 => pixels.rotate180(),
        Rotation::Clockwise270 => pixels.rotate270(),
    };
    let rgb = rotated.to_rgb8();
    let (width_px, height_px) = rgb.dimensions();

    let mut jpeg = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality);
    rgb.write_with_encoder(encoder)?;

    Ok(BakedImage {
        jpeg,
        width_px,
        height_px,
    })
}

/// Fit the baked image onto a fresh page of the given geometry and append
/// it to the document.
fn append_page(
    doc: &mut PdfDocument,
    baked: &BakedImage,
    page_w_mm: f32,
    page_h_mm: f32,
) -> Result<()> {
    let mut warnings = Vec::new();
    let raw = RawImage::decode_from_bytes(&baked.jpeg, &mut warnings)
        .map_err(AssemblyError::Pdf)?;
    let image_id = doc.add_image(&raw);

    let placement = fit_to_page(
        page_w_mm,
        page_h_mm,
        baked.width_px as f32,
        baked.height_px as f32,
    );

    // At 72 dpi one pixel renders as one point, so the scale factors map
    // pixel extents straight onto the target size in points.
    let target_w_pt = Mm(placement.width).into_pt().0;
    let target_h_pt = Mm(placement.height).into_pt().0;

    let ops = vec![Op::UseXobject {
        id: image_id,
        transform: XObjectTransform {
            translate_x: Some(Mm(placement.x).into_pt()),
            translate_y: Some(Mm(placement.y).into_pt()),
            scale_x: Some(target_w_pt / baked.width_px as f32),
            scale_y: Some(target_h_pt / baked.height_px as f32),
            dpi: Some(72.0),
            ..Default::default()
        },
    }];

    doc.pages.push(PdfPage::new(Mm(page_w_mm), Mm(page_h_mm), ops));
    Ok(())
}

async fn serialize_document(doc: PdfDocument) -> Result<Vec<u8>> {
    // PDF serialization is CPU-bound. printpdf's `PdfDocument` is not `Send`
    // (`ParsedFont` holds `Rc`), so it cannot be moved into a `spawn_blocking`
    // closure; serialize inline instead. The output bytes are identical.
    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    Ok(bytes)
}
