//! Photo object store
//!
//! Uploaded images live under the data directory as opaque keys and
//! stream back with long-lived cache headers. Handlers only see
//! put/get on opaque keys; the on-disk layout is private to this
//! module.

use std::path::PathBuf;

use plantarium_common::{Error, Result};
use uuid::Uuid;

/// Maximum accepted upload size (5 MiB)
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Image content types accepted for upload, with the extension used
/// for their stored keys
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Stored-key extension for an accepted content type; None for
/// anything that is not an accepted image type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ACCEPTED_TYPES
        .iter()
        .find(|(accepted, _)| *accepted == content_type)
        .map(|(_, extension)| *extension)
}

/// Content type recovered from a stored key's extension
pub fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Filesystem-backed photo store
#[derive(Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// Open the store, creating its directory if missing
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store image bytes under a fresh opaque key
    pub async fn put(&self, plant_id: i64, extension: &str, bytes: &[u8]) -> Result<String> {
        let key = format!("plant-{}-{}.{}", plant_id, Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&key), bytes).await?;
        Ok(key)
    }

    /// Fetch stored bytes by key; None when the key is unknown.
    /// Keys are single path segments; anything else is treated as
    /// unknown rather than resolved against the filesystem.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Ok(None);
        }

        match tokio::fs::read(self.dir.join(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
