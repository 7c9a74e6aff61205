//! Second strategy: OCR the images embedded in the PDF pages.
//!
//! Scanned PDFs usually wrap one photo/scan per page as an image XObject
//! (JPEG or Flate-compressed). Extracting that image and OCRing it avoids a
//! full-page render. Pages whose images cannot be decoded are skipped — raw
//! pixel formats are left to the rasterize fallback.

use image::ImageOutputFormat;
use lopdf::{Document, Object, ObjectId};

use super::chain::ExtractionStrategy;
use super::ocr::VisionOcr;
use super::ExtractionError;

pub struct EmbeddedImageOcr<'a> {
    bytes: &'a [u8],
    ocr: &'a VisionOcr<'a>,
}

impl<'a> EmbeddedImageOcr<'a> {
    pub fn new(bytes: &'a [u8], ocr: &'a VisionOcr<'a>) -> Self {
        Self { bytes, ocr }
    }
}

impl ExtractionStrategy for EmbeddedImageOcr<'_> {
    fn name(&self) -> &'static str {
        "embedded-ocr"
    }

    fn extract(&self) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(self.bytes)
            .map_err(|e| ExtractionError::PdfParsing(format!("Failed to parse PDF: {e}")))?;

        let page_ids: Vec<ObjectId> = doc.page_iter().collect();
        if page_ids.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let mut parts = Vec::new();
        for (index, &page_id) in page_ids.iter().enumerate() {
            match largest_page_image(&doc, page_id) {
                Some(png) => {
                    let text = self.ocr.ocr_image(&png)?;
                    parts.push(text);
                }
                None => {
                    tracing::debug!(page = index, "no decodable embedded image on page");
                }
            }
        }

        if parts.is_empty() {
            return Err(ExtractionError::PdfParsing(
                "No decodable embedded images found".into(),
            ));
        }

        Ok(parts.join("\n"))
    }
}

/// Find the largest image XObject on a page and return it as PNG bytes.
///
/// Walks: page dict → /Resources → /XObject → /Subtype /Image entries.
/// Returns `None` when the page has no image we can decode.
fn largest_page_image(doc: &Document, page_id: ObjectId) -> Option<Vec<u8>> {
    let page_dict = doc.get_object(page_id).ok()?.as_dict().ok()?;

    let resources = resolve_dict_entry(doc, page_dict, b"Resources")?;
    let xobjects = resolve_dict_entry(doc, resources, b"XObject")?;

    let mut largest: Option<Vec<u8>> = None;

    for (_name, obj_ref) in xobjects.iter() {
        let xobj = match obj_ref {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(obj) => obj,
                Err(_) => continue,
            },
            other => other,
        };

        let stream = match xobj {
            Object::Stream(ref s) => s,
            _ => continue,
        };

        if !is_image_subtype(&stream.dict) {
            continue;
        }

        // DCTDecode streams ARE JPEG files; anything else must decode as a
        // complete image (TIFF/PNG). Raw pixel data is not reconstructed
        // here — the rasterize fallback covers those PDFs.
        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        if image::load_from_memory(&content).is_err() {
            continue;
        }

        if largest
            .as_ref()
            .map_or(true, |prev| content.len() > prev.len())
        {
            largest = Some(content);
        }
    }

    // Re-encode to PNG so the OCR path sees one consistent format.
    let raw = largest?;
    let img = image::load_from_memory(&raw).ok()?;
    let mut png_buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut png_buf, ImageOutputFormat::Png).ok()?;
    Some(png_buf.into_inner())
}

/// Check if a stream dictionary has /Subtype /Image.
fn is_image_subtype(dict: &lopdf::Dictionary) -> bool {
    dict.get(b"Subtype")
        .map(|obj| matches!(obj, Object::Name(ref n) if n == b"Image"))
        .unwrap_or(false)
}

/// Get a dictionary entry, following references, as a Dictionary.
fn resolve_dict_entry<'a>(
    doc: &'a Document,
    dict: &'a lopdf::Dictionary,
    key: &[u8],
) -> Option<&'a lopdf::Dictionary> {
    let obj = dict.get(key).ok()?;
    let resolved = match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    };
    resolved.as_dict().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use lopdf::{dictionary, Stream};

    /// Build a one-page PDF whose page carries a single JPEG image XObject.
    fn pdf_with_embedded_jpeg() -> Vec<u8> {
        // Minimal JPEG: a 1x1 white pixel encoded via the image crate.
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            1,
            1,
            image::Rgb([255, 255, 255]),
        ));
        let mut jpeg = std::io::Cursor::new(Vec::new());
        img.write_to(&mut jpeg, ImageOutputFormat::Jpeg(90)).unwrap();

        let mut doc = Document::with_version("1.5");
        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg.into_inner(),
        );
        let image_id = doc.add_object(image_stream);

        let resources_id = doc.add_object(dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn extracts_and_ocrs_embedded_jpeg() {
        let pdf = pdf_with_embedded_jpeg();
        let llm = MockLlmClient::new("").with_vision_response("Scan Inhalt");
        let ocr = VisionOcr::new(&llm, "vision-model", "de");
        let strategy = EmbeddedImageOcr::new(&pdf, &ocr);
        let text = strategy.extract().unwrap();
        assert_eq!(text, "Scan Inhalt");
    }

    #[test]
    fn invalid_pdf_is_a_strategy_error() {
        let llm = MockLlmClient::new("");
        let ocr = VisionOcr::new(&llm, "vision-model", "de");
        let strategy = EmbeddedImageOcr::new(b"not a pdf", &ocr);
        assert!(strategy.extract().is_err());
    }
}
