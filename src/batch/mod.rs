//! Batch orchestration across caller-supplied items.
//!
//! Items are processed strictly one after another. This is deliberate: the
//! mirrors rate-limit and challenge bursts of requests, so the batch must not
//! be parallelized. For the same reason the first outcome that looks like a
//! challenge (anything other than a clean "not found" or a missing
//! identifier) stops the remaining batch and sends the user to a browser.
//!
//! Per run the state goes `Idle → Running → {Completed, Aborted}`; hosts
//! observe it through the progress lines.

mod opener;
mod progress;

pub use opener::{RecordingOpener, SystemBrowser, UrlOpener};
pub use progress::{ProgressLine, ProgressSink, RecordingProgress, Severity};

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::endpoint::{Preferences, build_item_url, resolve_endpoint};
use crate::persist::{AttachmentSink, download_and_attach};
use crate::pipeline::{Availability, RetrievalError, Retriever};

/// One caller-owned work unit (for example a library record).
///
/// The pipeline reads it and never mutates it; the only side effect on the
/// record is the attachment made through the [`AttachmentSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// Document identifier such as a DOI; `None` or blank means missing.
    pub identifier: Option<String>,
    /// Display title used in progress lines and the attachment title.
    pub title: String,
}

impl BatchItem {
    /// Creates an item.
    pub fn new(identifier: Option<String>, title: impl Into<String>) -> Self {
        Self {
            identifier,
            title: title.into(),
        }
    }

    /// Returns the identifier when present and non-blank.
    #[must_use]
    pub fn usable_identifier(&self) -> Option<&str> {
        self.identifier
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Lifecycle of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Not started.
    Idle,
    /// Processing items.
    Running,
    /// Every item was attempted.
    Completed,
    /// Stopped early after a batch-aborting outcome.
    Aborted,
}

impl BatchState {
    /// Returns true for `Completed` and `Aborted`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemDisposition {
    Continue,
    Abort,
}

enum ItemOutcome {
    Attached(PathBuf),
    FallbackAvailable(Url),
}

/// Drives the retrieval pipeline over a sequence of items.
///
/// Constructed once by the host and handed to whatever triggers runs.
pub struct BatchRunner {
    retriever: Retriever,
    preferences: Arc<dyn Preferences>,
    attachments: Arc<dyn AttachmentSink>,
    opener: Arc<dyn UrlOpener>,
    progress: Arc<dyn ProgressSink>,
    temp_dir: PathBuf,
}

impl BatchRunner {
    /// Creates a runner that writes temporary files to the system temp directory.
    #[must_use]
    pub fn new(
        retriever: Retriever,
        preferences: Arc<dyn Preferences>,
        attachments: Arc<dyn AttachmentSink>,
        opener: Arc<dyn UrlOpener>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            retriever,
            preferences,
            attachments,
            opener,
            progress,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Overrides the directory used for temporary downloads.
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Processes `items` in order and returns the terminal state.
    ///
    /// Every item yields one outcome line. An empty slice reports a single
    /// failure line and does no work.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn run(&self, items: &[BatchItem]) -> BatchState {
        if items.is_empty() {
            self.report(ProgressLine::run("No items selected", Severity::Fail));
            return BatchState::Completed;
        }

        let mut state = BatchState::Running;
        let endpoint = resolve_endpoint(self.preferences.as_ref());
        info!(endpoint = %endpoint, "Batch started");
        self.report(ProgressLine::run(
            format!("Processing {} items...", items.len()),
            Severity::Default,
        ));

        for (index, item) in items.iter().enumerate() {
            if self.process_item(index, item, &endpoint).await == ItemDisposition::Abort {
                warn!(
                    index,
                    skipped = items.len() - index - 1,
                    "Stopping batch after blocked or failed item"
                );
                state = BatchState::Aborted;
                break;
            }
        }

        if state == BatchState::Running {
            state = BatchState::Completed;
        }
        info!(state = ?state, "Batch finished");
        state
    }

    #[instrument(skip(self, item, endpoint), fields(title = %item.title))]
    async fn process_item(&self, index: usize, item: &BatchItem, endpoint: &str) -> ItemDisposition {
        let Some(identifier) = item.usable_identifier() else {
            let error = RetrievalError::missing_identifier(&item.title);
            debug!(error = %error, "Skipping item");
            self.report(ProgressLine::item(
                index,
                format!("No DOI found for \"{}\"", item.title),
                Severity::Fail,
            ));
            return ItemDisposition::Continue;
        };

        let item_url = match build_item_url(endpoint, identifier) {
            Ok(url) => url,
            Err(error) => {
                warn!(error = %error, "Cannot build item URL");
                self.report(ProgressLine::item(
                    index,
                    format!("Invalid endpoint \"{endpoint}\"; cannot fetch \"{}\"", item.title),
                    Severity::Fail,
                ));
                return ItemDisposition::Abort;
            }
        };

        self.report(ProgressLine::item(
            index,
            format!("Fetching PDF for \"{}\"...", item.title),
            Severity::Default,
        ));

        match self.fetch_item(item, &item_url).await {
            Ok(ItemOutcome::Attached(path)) => {
                debug!(path = %path.display(), "Item completed");
                self.report(ProgressLine::item(
                    index,
                    format!("Downloaded PDF for \"{}\"", item.title),
                    Severity::Success,
                ));
                ItemDisposition::Continue
            }
            Ok(ItemOutcome::FallbackAvailable(link)) => {
                self.report(ProgressLine::item(
                    index,
                    format!(
                        "Alternative download link found for \"{}\". Opening in browser...",
                        item.title
                    ),
                    Severity::Fail,
                ));
                self.opener.open(link.as_str());
                self.opener.open(item_url.as_str());
                ItemDisposition::Abort
            }
            Err(error) if !error.aborts_batch() => {
                debug!(error = %error, "Item unavailable");
                self.report(ProgressLine::item(
                    index,
                    format!("PDF not available for \"{}\". Try again later.", item.title),
                    Severity::Fail,
                ));
                ItemDisposition::Continue
            }
            Err(error) => {
                warn!(error = %error, "Item failed; handing over to browser");
                self.report(ProgressLine::item(
                    index,
                    failure_text(&item.title, &error),
                    Severity::Fail,
                ));
                self.opener.open(item_url.as_str());
                ItemDisposition::Abort
            }
        }
    }

    async fn fetch_item(
        &self,
        item: &BatchItem,
        item_url: &Url,
    ) -> Result<ItemOutcome, RetrievalError> {
        match self.retriever.retrieve(item_url).await? {
            Availability::Direct { candidate, .. } => {
                let path = download_and_attach(
                    self.retriever.client(),
                    &candidate,
                    item,
                    self.attachments.as_ref(),
                    &self.temp_dir,
                )
                .await?;
                Ok(ItemOutcome::Attached(path))
            }
            Availability::FallbackAvailable { link, .. } => Ok(ItemOutcome::FallbackAvailable(link)),
        }
    }

    fn report(&self, line: ProgressLine) {
        self.progress.report(line);
    }
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("retriever", &self.retriever)
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

fn failure_text(title: &str, error: &RetrievalError) -> String {
    match error {
        RetrievalError::FetchFailed { source, .. } if source.is_transport() => format!(
            "Could not reach the mirror for \"{title}\" ({source}). Opening in browser..."
        ),
        RetrievalError::RedirectLoop { hops, .. } => format!(
            "Redirect loop after {hops} hop(s) for \"{title}\". Opening in browser..."
        ),
        RetrievalError::DownloadFailed { source, .. } => format!(
            "PDF download failed for \"{title}\" ({source}). Opening in browser..."
        ),
        RetrievalError::EmptyPayload { .. }
        | RetrievalError::Persist { .. }
        | RetrievalError::Attach { .. } => {
            format!("Could not save PDF for \"{title}\". Opening in browser...")
        }
        _ => format!(
            "Captcha may be required or PDF is not ready for \"{title}\". Opening in browser..."
        ),
    }
}
