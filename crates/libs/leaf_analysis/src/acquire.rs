use crate::data_url::{DataUrl, encode_data_url};
use crate::AnalysisError;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Image bytes as picked by the user, before any processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl RawImage {
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Wraps raw bytes, sniffing the MIME type from the magic bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = infer::get(&bytes).map_or("image/jpeg", |kind| kind.mime_type());
        Self::new(bytes, mime_type)
    }

    pub fn from_data_url(data_url: &str) -> Result<Self, AnalysisError> {
        let parsed = DataUrl::parse(data_url)?;
        Ok(Self::new(parsed.decode_payload()?, parsed.mime_type))
    }

    pub async fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| AnalysisError::decode(format!("{}: {e}", path.display())))?;
        let image = Self::from_bytes(bytes);
        debug!(
            "Read {} ({}, {} bytes)",
            path.display(),
            image.mime_type,
            image.bytes.len()
        );
        Ok(image)
    }

    #[must_use]
    pub fn to_data_url(&self) -> String {
        encode_data_url(&self.mime_type, &self.bytes)
    }
}
