//! Folder/filename templating and filesystem sanitization.
//!
//! Templates use `{placeholder}` substitution with a closed variable set.
//! Failure behavior differs by call site and is deliberate: a broken folder
//! template is returned unchanged, a broken filename template falls back to
//! a deterministic `{date}_{category}_{company}_{summary}{ext}` name that
//! never errors.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::AppConfig;

/// Maximum sanitized filename length, extension included.
const MAX_FILENAME_LEN: usize = 120;

/// Substitute `{name}` placeholders from a closed variable list.
/// An unknown placeholder or an unclosed brace is an error — callers decide
/// the fallback.
fn substitute(template: &str, vars: &[(&str, &str)]) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices();

    while let Some((_, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            name.push(c);
        }
        if !closed {
            return Err(format!("unclosed placeholder in template '{template}'"));
        }
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => return Err(format!("unknown placeholder '{{{name}}}'")),
        }
    }

    Ok(out)
}

/// Compute the destination directory for a category.
///
/// Template lookup: label override → category folder → output folder root.
/// On substitution failure the template string is used as-is.
pub fn destination_folder(
    config: &AppConfig,
    category: &str,
    label: Option<&str>,
    company: &str,
    date: NaiveDate,
) -> PathBuf {
    let Some(template) = config.folder_for_category(category, label) else {
        return config.output_folder.clone();
    };

    let year = date.format("%Y").to_string();
    let date_str = date.format(&config.date_format).to_string();
    let vars = [
        ("year", year.as_str()),
        ("company", company),
        ("date", date_str.as_str()),
        ("content_summary", ""),
    ];

    let folder = match substitute(&template, &vars) {
        Ok(folder) => folder,
        Err(reason) => {
            tracing::warn!(template = %template, %reason, "folder template substitution failed, using template as-is");
            template
        }
    };

    config.output_folder.join(folder)
}

/// Compute the destination filename for a category.
///
/// The source file's extension is preserved regardless of what the template
/// says; substitution failure falls back to a deterministic name. Never
/// errors.
pub fn destination_filename(
    config: &AppConfig,
    category: &str,
    label: Option<&str>,
    company: &str,
    content_summary: &str,
    date: NaiveDate,
    source_path: &Path,
) -> String {
    let ext = source_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let naming = config.naming_for_category(category, label);
    // Drop any extension baked into the template; the source's wins.
    let stem = Path::new(&naming)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&naming)
        .to_string();

    let date_str = date.format(&config.date_format).to_string();
    let summary = content_summary.replace(' ', "_");
    let vars = [
        ("date", date_str.as_str()),
        ("category", category),
        ("company", company),
        ("content_summary", summary.as_str()),
    ];

    match substitute(&stem, &vars) {
        Ok(name) => format!("{name}{ext}"),
        Err(reason) => {
            tracing::warn!(template = %naming, %reason, "filename template substitution failed, using safe fallback");
            format!("{date_str}_{category}_{company}_{summary}{ext}")
        }
    }
}

/// Make a filename safe for the filesystem: lowercase, spaces and illegal
/// characters replaced with underscores, newlines stripped, truncated to
/// `MAX_FILENAME_LEN` characters while preserving the extension.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| match c {
            ' ' => '_',
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();

    let truncated = if cleaned.chars().count() > MAX_FILENAME_LEN {
        let path = Path::new(&cleaned);
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&cleaned);
        let keep = MAX_FILENAME_LEN.saturating_sub(ext.chars().count());
        let stem: String = stem.chars().take(keep).collect();
        format!("{stem}{ext}")
    } else {
        cleaned
    };

    truncated.to_lowercase()
}
