//! Download and persist: fetch a candidate file and hand it to the host.
//!
//! The body is buffered in full and checked before anything touches disk, so
//! a failed or empty download never produces a temporary file, and the host
//! never sees partial content.

mod attach;
mod filename;

pub use attach::{AttachmentSink, DirectoryAttachments};
pub use filename::{attachment_title, temp_file_name};

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::batch::BatchItem;
use crate::fetch::PageClient;
use crate::pipeline::{CandidateFile, RetrievalError};

/// Downloads `candidate`, writes it to a uniquely named file in `temp_dir`,
/// attaches it to `item` through `sink`, and removes the temporary file.
///
/// Returns the path reported by the sink.
///
/// # Errors
///
/// - `DownloadFailed` for transport errors or a non-200 answer
/// - `EmptyPayload` when the body is empty
/// - `Persist` when the temporary file cannot be written
/// - `Attach` when the sink rejects the file
#[instrument(skip(client, item, sink, temp_dir), fields(url = %candidate))]
pub async fn download_and_attach(
    client: &PageClient,
    candidate: &CandidateFile,
    item: &BatchItem,
    sink: &dyn AttachmentSink,
    temp_dir: &Path,
) -> Result<PathBuf, RetrievalError> {
    let bytes = client
        .fetch_bytes(candidate.url())
        .await
        .map_err(|e| RetrievalError::download_failed(candidate.as_str(), e))?;

    if bytes.is_empty() {
        return Err(RetrievalError::EmptyPayload {
            url: candidate.to_string(),
        });
    }

    let temp_path = temp_dir.join(temp_file_name());
    tokio::fs::write(&temp_path, &bytes)
        .await
        .map_err(|source| RetrievalError::Persist {
            path: temp_path.clone(),
            source,
        })?;
    debug!(path = %temp_path.display(), bytes = bytes.len(), "Wrote temporary file");

    let title = attachment_title(&item.title);
    let attached = sink.attach(item, &temp_path, &title).await;

    if let Err(error) = tokio::fs::remove_file(&temp_path).await {
        warn!(path = %temp_path.display(), error = %error, "Failed to remove temporary file");
    }

    let attached = attached.map_err(|source| RetrievalError::Attach {
        title: title.clone(),
        source,
    })?;
    info!(path = %attached.display(), bytes = bytes.len(), "Document attached");
    Ok(attached)
}
