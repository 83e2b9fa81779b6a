use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;

use crate::editor::preview::{PreviewHandle, PreviewRegistry};

/// Resumes above this size are refused before upload.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resume must be a PDF, got {0}")]
    NotPdf(String),

    #[error("Resume is {size} bytes; the limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Which array a pending binary belongs to. Determines the multipart part name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    CompanyLogo,
    ProjectCover,
    SkillIcon,
}

impl AssetKind {
    pub fn part_prefix(self) -> &'static str {
        match self {
            AssetKind::CompanyLogo => "logo",
            AssetKind::ProjectCover => "projectCover",
            AssetKind::SkillIcon => "skillIcon",
        }
    }

    /// `<kind>-<index>`, the name the backend correlates back to an array position.
    pub fn part_name(self, index: usize) -> String {
        format!("{}-{index}", self.part_prefix())
    }
}

/// A file selected locally but not yet uploaded.
#[derive(Debug)]
pub struct PendingAsset {
    file_name: String,
    content_type: String,
    bytes: Bytes,
    preview: PreviewHandle,
}

impl PendingAsset {
    pub fn new(
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        previews: &PreviewRegistry,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes: bytes.into(),
            preview: previews.create(),
        }
    }

    pub async fn from_path(path: &Path, previews: &PreviewRegistry) -> Result<Self, AssetError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| AssetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes, previews))
    }

    /// Checks the constraints the resume ingestion endpoint expects.
    pub fn ensure_resume(&self) -> Result<(), AssetError> {
        if self.content_type != "application/pdf" {
            return Err(AssetError::NotPdf(self.file_name.clone()));
        }
        if self.bytes.len() > MAX_RESUME_BYTES {
            return Err(AssetError::TooLarge {
                size: self.bytes.len(),
                limit: MAX_RESUME_BYTES,
            });
        }
        Ok(())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}
