//! Local disk storage for report photos
//!
//! Photos are written to `<static_dir>/uploads/<cedula>_<sanitized name>` and
//! referenced from the database by the relative path `uploads/<file>`.
//! A second upload with the same citizen id and filename overwrites the first.

use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::shared::constants::{ALLOWED_PHOTO_EXTENSIONS, UPLOADS_DIR};
use crate::shared::validation::sanitize_filename;

/// Photo received in a multipart form
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

pub struct PhotoStore {
    static_dir: PathBuf,
}

impl PhotoStore {
    pub fn new(static_dir: impl Into<PathBuf>) -> Self {
        Self {
            static_dir: static_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.static_dir.join(UPLOADS_DIR)
    }

    /// Create the uploads directory if it does not exist yet
    pub async fn ensure_upload_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.upload_dir()).await?;
        Ok(())
    }

    /// Whether the filename carries one of the allowed photo extensions
    pub fn is_allowed(filename: &str) -> bool {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .is_some_and(|ext| ALLOWED_PHOTO_EXTENSIONS.contains(&ext.as_str()))
    }

    /// MIME type for a stored photo, derived from its extension
    pub fn content_type_for(stored_path: &str) -> &'static str {
        let ext = stored_path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "jpg" | "jpeg" => "image/jpeg",
            _ => "application/octet-stream",
        }
    }

    /// Public URL of a stored photo
    pub fn public_url(stored_path: &str) -> String {
        format!("/static/{}", stored_path.trim_start_matches('/'))
    }

    /// Save an uploaded photo.
    ///
    /// Returns `Ok(None)` when the file is not an allowed photo or its name
    /// sanitises to nothing, in which case nothing is written.
    pub async fn save(
        &self,
        cedula: &str,
        original_filename: &str,
        data: &[u8],
    ) -> Result<Option<String>> {
        if data.is_empty() || !Self::is_allowed(original_filename) {
            debug!("Skipping photo '{}': not an allowed upload", original_filename);
            return Ok(None);
        }

        let Some(filename) = sanitize_filename(original_filename) else {
            debug!("Skipping photo '{}': unusable filename", original_filename);
            return Ok(None);
        };
        let owner = sanitize_filename(cedula).unwrap_or_else(|| "anon".to_string());
        let stored_name = format!("{}_{}", owner, filename);

        self.ensure_upload_dir().await?;
        let target = self.upload_dir().join(&stored_name);
        tokio::fs::write(&target, data).await?;

        info!("Saved photo {} ({} bytes)", target.display(), data.len());
        Ok(Some(format!("{}/{}", UPLOADS_DIR, stored_name)))
    }

    /// Map a stored photo path to a file under the static directory.
    ///
    /// Paths without the `uploads/` prefix are taken as relative to the
    /// uploads directory. Absolute paths and `..` components are rejected.
    pub fn resolve(&self, stored_path: &str) -> Option<PathBuf> {
        let relative = stored_path.trim().trim_start_matches('/');
        if relative.is_empty() {
            return None;
        }

        let relative = if relative.starts_with(&format!("{}/", UPLOADS_DIR)) {
            PathBuf::from(relative)
        } else {
            Path::new(UPLOADS_DIR).join(relative)
        };

        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            warn!("Rejected photo path outside the static directory: {}", stored_path);
            return None;
        }

        Some(self.static_dir.join(relative))
    }

    /// Delete a stored photo. Returns whether a file was removed.
    pub async fn delete(&self, stored_path: &str) -> Result<bool> {
        let Some(path) = self.resolve(stored_path) else {
            return Ok(false);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted photo {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Photo {} already gone", path.display());
                Ok(false)
            }
            Err(e) => Err(AppError::Storage(e)),
        }
    }

    /// Delete a photo whose owning row is already gone; failures are only logged
    pub async fn discard(&self, stored_path: Option<&str>) {
        let Some(stored_path) = stored_path else {
            return;
        };
        if let Err(e) = self.delete(stored_path).await {
            warn!("Failed to delete photo {}: {}", stored_path, e);
        }
    }

    /// Read a stored photo's bytes
    pub async fn read(&self, stored_path: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve(stored_path)
            .ok_or_else(|| AppError::NotFound(format!("Photo '{}' not found", stored_path)))?;
        Ok(tokio::fs::read(path).await?)
    }
}
