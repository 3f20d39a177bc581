//! Content addressing for embedded images.
//!
//! Images are stored under a name derived from their decoded bytes, so the
//! same picture exported by two participants ends up with one filename.

use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 digest of `bytes`.
///
/// # Example
///
/// ```rust
/// use qqmerge::hash::content_hash;
///
/// let a = content_hash(b"GIF89a");
/// assert_eq!(a, content_hash(b"GIF89a"));
/// assert_eq!(a.len(), 64);
/// ```
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Maps a media subtype onto the file extension used for storage.
///
/// `jpeg` becomes `jpg`; other subtypes are lowercased and passed through.
/// Parameters after `;` are ignored.
pub fn image_extension(subtype: &str) -> String {
    let subtype = subtype.split(';').next().unwrap_or_default().trim();
    match subtype.to_ascii_lowercase().as_str() {
        "jpeg" | "pjpeg" => "jpg".to_string(),
        other => other.to_string(),
    }
}
