//! "Open externally" collaborator.

use std::process::{Child, Command};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

/// Hands a URL to something that lets the user finish the request manually.
///
/// Fire-and-forget: failures are logged by the implementation, never
/// returned to the pipeline.
pub trait UrlOpener: Send + Sync {
    /// Opens `url`.
    fn open(&self, url: &str);
}

/// Opens URLs with the platform's default URL handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) {
        debug!(url, "Opening URL in default browser");
        if let Err(error) = spawn_url_handler(url) {
            warn!(url, error = %error, "Failed to open URL in browser");
        }
    }
}

fn spawn_url_handler(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(url);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    };
    reap_in_background(command.spawn()?);
    Ok(())
}

/// Waits for the launcher off-thread so it does not linger as a zombie.
fn reap_in_background(mut child: Child) {
    std::thread::spawn(move || {
        if let Err(error) = child.wait() {
            debug!(error = %error, "URL handler did not exit cleanly");
        }
    });
}

/// Collects URLs instead of opening them.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    urls: Mutex<Vec<String>>,
}

impl RecordingOpener {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the URLs opened so far, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
    }
}
