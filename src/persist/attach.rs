//! Attachment collaborator: final placement of a downloaded file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::filename::resolve_unique_path;
use crate::batch::BatchItem;

/// Host-side collaborator that takes ownership of a downloaded file.
///
/// The file at `file` is temporary and is removed after `attach` returns;
/// implementations must copy or import it, never keep the path.
///
/// # Object Safety
///
/// Uses `async_trait` so the orchestrator can hold a `dyn AttachmentSink`.
#[async_trait]
pub trait AttachmentSink: Send + Sync {
    /// Attaches `file` to `item` under `title`, returning where it ended up.
    async fn attach(&self, item: &BatchItem, file: &Path, title: &str) -> std::io::Result<PathBuf>;
}

/// Attachment sink that stores files in a directory, named by title.
#[derive(Debug, Clone)]
pub struct DirectoryAttachments {
    output_dir: PathBuf,
}

impl DirectoryAttachments {
    /// Creates a sink writing into `output_dir` (created on first use).
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the target directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl AttachmentSink for DirectoryAttachments {
    #[instrument(skip(self, item, file), fields(title = %title))]
    async fn attach(&self, item: &BatchItem, file: &Path, title: &str) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let target = resolve_unique_path(&self.output_dir, title);
        tokio::fs::copy(file, &target).await?;
        debug!(
            identifier = item.identifier.as_deref().unwrap_or_default(),
            path = %target.display(),
            "Attached document"
        );
        Ok(target)
    }
}
