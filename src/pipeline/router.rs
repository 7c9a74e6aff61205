//! Type routing: pick the extraction branch from the file extension.
//!
//! Total function — anything that is not a recognized image extension,
//! including an empty path, takes the document (PDF) branch.

use std::path::Path;

/// Extensions routed to the image branch (case-insensitive).
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// The two extraction branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
}

/// Route a file path to its extraction branch.
pub fn route(path: &Path) -> FileKind {
    let is_image = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == e)
        })
        .unwrap_or(false);

    if is_image {
        // Image intake is newer and sees less traffic than the PDF path.
        tracing::info!(path = %path.display(), "routing to image branch (experimental)");
        FileKind::Image
    } else {
        FileKind::Document
    }
}
