use std::path::{Component, Path};

use super::FileStoreError;

/// Recover a UTF-8 file name that the transport handed over as Latin-1 code points.
///
/// Multipart clients commonly send raw UTF-8 bytes in `filename=`, which end up
/// as one char per byte. Names that already contain chars above U+00FF, or
/// whose bytes are not valid UTF-8, are returned unchanged.
///
/// The check cannot tell mojibake from a genuine name that happens to be
/// valid UTF-8 when read as Latin-1: `"Ã©.txt"` becomes `"é.txt"`. axum's
/// multipart parser already yields UTF-8 names, so this only changes names
/// from clients that sent such a sequence on purpose.
pub fn decode_upload_name(raw: &str) -> String {
    if raw.is_ascii() {
        return raw.to_string();
    }

    let mut bytes = Vec::with_capacity(raw.len());
    for ch in raw.chars() {
        match u8::try_from(u32::from(ch)) {
            Ok(b) => bytes.push(b),
            Err(_) => return raw.to_string(),
        }
    }

    String::from_utf8(bytes).unwrap_or_else(|_| raw.to_string())
}

/// Check that `name` is exactly one normal path segment.
pub fn validate_name(name: &str) -> Result<(), FileStoreError> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(FileStoreError::InvalidPath(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(FileStoreError::InvalidPath(name.to_string())),
    }
}
