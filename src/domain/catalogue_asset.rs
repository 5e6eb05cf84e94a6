use std::io;
use std::path::PathBuf;

use crate::configuration::CatalogueSettings;

/// Mail relays commonly refuse attachments above this size.
pub const MAX_ATTACHMENT_BYTES: u64 = 25 * 1024 * 1024;

/// The downloadable catalogue PDF.
#[derive(Debug, Clone)]
pub struct CatalogueAsset {
    pub path: PathBuf,
    pub attachment_filename: String,
    pub download_filename: String,
}

impl CatalogueAsset {
    pub fn from_settings(settings: &CatalogueSettings) -> Self {
        Self {
            path: settings.path.clone(),
            attachment_filename: settings.attachment_filename.clone(),
            download_filename: settings.download_filename.clone(),
        }
    }

    /// Size of the asset in bytes, `None` when it is missing.
    pub async fn size(&self) -> io::Result<Option<u64>> {
        match tokio::fs::metadata(&self.path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}
