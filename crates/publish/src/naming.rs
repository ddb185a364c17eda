//! File naming and content type detection for uploaded images.

use std::path::Path;

/// Extension used when the content type does not name an image subtype.
pub const FALLBACK_EXTENSION: &str = "png";

/// Content type used when nothing better can be derived from the payload.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Builds the asset file name from a display name and content type.
///
/// Whitespace runs become a single `-`; the extension is the `image/*`
/// subtype, or [`FALLBACK_EXTENSION`] for anything else.
pub fn sanitize_file_name(name: &str, content_type: &str) -> String {
    let stem = name.split_whitespace().collect::<Vec<_>>().join("-");
    format!("{stem}.{}", file_extension(content_type))
}

/// Derives a file extension from a MIME content type.
pub fn file_extension(content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or_default().trim();

    match essence.split_once('/') {
        Some((kind, subtype)) if kind.eq_ignore_ascii_case("image") => {
            let subtype = subtype.trim().to_ascii_lowercase();
            if is_extension_safe(&subtype) {
                subtype
            } else {
                FALLBACK_EXTENSION.to_string()
            }
        }
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

/// Only `[a-z0-9+.-]` may appear in an extension.
fn is_extension_safe(subtype: &str) -> bool {
    !subtype.is_empty()
        && subtype
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"+.-".contains(&b))
}

/// Detects an image content type from the leading bytes of a payload.
pub fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    match data {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [_, _, _, _, b'f', b't', b'y', b'p', b'a', b'v', b'i', b'f' | b's', ..] => {
            Some("image/avif")
        }
        [b'B', b'M', ..] => Some("image/bmp"),
        [0x00, 0x00, 0x01, 0x00, ..] => Some("image/x-icon"),
        _ => None,
    }
}

/// Detects an image content type from a file path extension.
pub fn detect_content_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("webp") => Some("image/webp"),
        Some("gif") => Some("image/gif"),
        Some("avif") => Some("image/avif"),
        Some("bmp") => Some("image/bmp"),
        Some("ico") => Some("image/x-icon"),
        _ => None,
    }
}
