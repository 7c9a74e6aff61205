//! Document date resolution.
//!
//! The extracted date is a free-form string; we try a fixed, ordered list of
//! known formats and take the first match. The two-digit dotted year comes
//! before the four-digit form on purpose: chrono's `%Y` happily parses
//! "01.03.24" as year 24, so the narrower pattern must win first. Ambiguous
//! strings like "01.02.03" therefore resolve by list priority, not locale.

use chrono::{Local, NaiveDate};

/// Known date formats, in priority order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d.%m.%y",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%Y.%m.%d",
    "%d %B %Y",
    "%B %d, %Y",
];

/// Parse the extracted document date; fall back to today when nothing
/// matches or no date was extracted.
pub fn resolve_document_date(raw: Option<&str>) -> NaiveDate {
    if let Some(raw) = raw {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            for fmt in DATE_FORMATS {
                if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                    return date;
                }
            }
            tracing::warn!(raw = %trimmed, "document date did not match any known format");
        }
    }
    Local::now().date_naive()
}
