//! Rendered media on the local filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;

use crate::infrastructure::ports::{ArtifactKind, ArtifactStore, MediaError, RandomPort};

pub const DEFAULT_MEDIA_DIR: &str = "media";

/// Writes each artifact to `{root}/{prefix}_{uuid}.{format}`.
pub struct FileArtifactStore {
    root: PathBuf,
    random: Arc<dyn RandomPort>,
}

impl FileArtifactStore {
    pub fn new(root: impl Into<PathBuf>, random: Arc<dyn RandomPort>) -> Self {
        Self {
            root: root.into(),
            random,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the media directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), MediaError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn file_name(&self, kind: ArtifactKind, format: &str) -> String {
        let extension = format.trim().trim_start_matches('.');
        let extension = if extension.is_empty() { "bin" } else { extension };
        format!(
            "{}_{}.{}",
            kind.file_prefix(),
            self.random.gen_uuid(),
            extension.to_ascii_lowercase()
        )
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn save(
        &self,
        kind: ArtifactKind,
        data: Vec<u8>,
        format: String,
    ) -> Result<PathBuf, MediaError> {
        if data.is_empty() {
            return Err(MediaError::GenerationFailed(format!(
                "Refusing to store empty {} artifact",
                kind.file_prefix()
            )));
        }

        self.ensure_root().await?;
        let path = self.root.join(self.file_name(kind, &format));
        fs::write(&path, &data).await?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored media artifact");
        Ok(path)
    }
}
