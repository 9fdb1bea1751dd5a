//! File naming for temporary downloads and attached documents.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Byte budget for an attachment stem, leaving room for `_N` and the extension
/// under the common 255-byte file name limit.
const MAX_STEM_BYTES: usize = 200;

/// Returns a collision-resistant temporary file name such as
/// `scidb_1718035200123_4242_0.pdf`.
///
/// Millisecond timestamp, process id and an in-process sequence number keep
/// names unique across concurrent processes and fast successive downloads.
#[must_use]
pub fn temp_file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("scidb_{millis}_{}_{sequence}.pdf", std::process::id())
}

/// Returns the attachment title for a record: its display title plus `.pdf`.
#[must_use]
pub fn attachment_title(display_title: &str) -> String {
    let title = display_title.trim();
    if title.is_empty() {
        "document.pdf".to_string()
    } else {
        format!("{title}.pdf")
    }
}

/// Sanitizes a file name for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Resolves a unique file path under `dir`, adding `_2`, `_3`, ... on conflict.
///
/// Long stems are cut to `MAX_STEM_BYTES` so the name fits common filesystems.
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = {
        let sanitized = sanitize_filename(filename);
        if sanitized.trim_matches('_').is_empty() {
            "document.pdf".to_string()
        } else {
            sanitized
        }
    };
    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename.as_str(), ""),
    };
    let stem = truncate_to_bytes(stem, MAX_STEM_BYTES).trim_end();
    let base_path = dir.join(format!("{stem}{ext}"));

    if !base_path.exists() {
        return base_path;
    }

    for i in 2..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

/// Cuts `value` to at most `max_bytes`, on a char boundary.
fn truncate_to_bytes(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
