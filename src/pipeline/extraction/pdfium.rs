//! PDF access via Google PDFium: native text layer extraction (first
//! strategy) and full-page rasterization for the OCR fallback of last resort.
//!
//! Each operation creates a fresh `Pdfium` instance because the upstream
//! type is `!Send`. The OS caches `dlopen` calls, so repeat loads are
//! near-free.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::chain::ExtractionStrategy;
use super::ocr::VisionOcr;
use super::ExtractionError;

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on extremely large pages or absurd DPI settings.
const MAX_DIMENSION_PX: u32 = 4096;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to library file)
/// 2. Alongside the running executable
/// 3. System library search paths
pub fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "loading PDFium from env var");
        let bindings =
            Pdfium::bind_to_library(&path).map_err(|e| ExtractionError::PdfRendering {
                page: 0,
                reason: format!("Failed to load PDFium from {path}: {e}"),
            })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "loaded PDFium from executable directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings =
        Pdfium::bind_to_system_library().map_err(|e| ExtractionError::PdfRendering {
            page: 0,
            reason: format!(
                "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
            ),
        })?;
    Ok(Pdfium::new(bindings))
}

/// Map PDF load errors — detect encrypted PDFs for clearer messaging.
pub fn map_load_error(e: PdfiumError) -> ExtractionError {
    let msg = format!("{e}").to_lowercase();
    if msg.contains("password") || msg.contains("encrypt") {
        ExtractionError::PdfEncrypted
    } else {
        ExtractionError::PdfParsing(format!("Failed to load PDF: {e}"))
    }
}

/// First strategy: read the PDF's embedded text layer directly.
/// No rendering, no OCR — fast and exact when the PDF is digital.
pub struct NativeText<'a> {
    bytes: &'a [u8],
}

impl<'a> NativeText<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl ExtractionStrategy for NativeText<'_> {
    fn name(&self) -> &'static str {
        "native"
    }

    fn extract(&self) -> Result<String, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(self.bytes, None)
            .map_err(map_load_error)?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(ExtractionError::EmptyDocument);
        }

        let mut parts = Vec::with_capacity(pages.len() as usize);
        for page in pages.iter() {
            let text = page.text().map(|t| t.all()).unwrap_or_default();
            parts.push(text);
        }

        Ok(parts.join("\n"))
    }
}

/// Last-resort strategy: rasterize every page and OCR the renders.
pub struct PageRenderOcr<'a> {
    bytes: &'a [u8],
    ocr: &'a VisionOcr<'a>,
    dpi: u32,
}

impl<'a> PageRenderOcr<'a> {
    pub fn new(bytes: &'a [u8], ocr: &'a VisionOcr<'a>, dpi: u32) -> Self {
        Self { bytes, ocr, dpi }
    }
}

impl ExtractionStrategy for PageRenderOcr<'_> {
    fn name(&self) -> &'static str {
        "render-ocr"
    }

    fn extract(&self) -> Result<String, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(self.bytes, None)
            .map_err(map_load_error)?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(ExtractionError::EmptyDocument);
        }

        let mut parts = Vec::with_capacity(pages.len() as usize);
        for (index, page) in pages.iter().enumerate() {
            let png = render_page_to_png(&page, index, self.dpi)?;
            let text = self.ocr.ocr_image(&png)?;
            parts.push(text);
        }

        Ok(parts.join("\n"))
    }
}

/// Render one page to PNG bytes at the requested DPI, capping dimensions.
fn render_page_to_png(page: &PdfPage, index: usize, dpi: u32) -> Result<Vec<u8>, ExtractionError> {
    let width_points = page.width().value;
    let height_points = page.height().value;
    let (target_w, target_h) = compute_render_dimensions(width_points, height_points, dpi);

    let config = PdfRenderConfig::new()
        .set_target_width(target_w as i32)
        .set_maximum_height(target_h as i32);

    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| ExtractionError::PdfRendering {
            page: index,
            reason: format!("Rendering failed: {e}"),
        })?;

    let dynamic_image = bitmap.as_image();
    let mut cursor = Cursor::new(Vec::new());
    dynamic_image
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;

    let png_bytes = cursor.into_inner();
    debug!(
        page = index,
        width = target_w,
        height = target_h,
        png_size = png_bytes.len(),
        "rendered PDF page to PNG"
    );

    Ok(png_bytes)
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, MAX_DIMENSION_PX].
/// Preserves aspect ratio when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        warn!(
            raw_width = raw_w as u32,
            raw_height = raw_h as u32,
            capped_width = w,
            capped_height = h,
            "page dimensions capped to {MAX_DIMENSION_PX}px"
        );
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}
