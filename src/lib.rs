//! SciDB Core Library
//!
//! Turns document identifiers (DOIs) into downloaded PDFs by way of a
//! shadow-library mirror, and attaches them to caller-owned items.
//!
//! # Architecture
//!
//! - [`endpoint`] - Mirror endpoint preference and item URL construction
//! - [`identifier`] - Normalization of host-supplied identifiers
//! - [`fetch`] - HTTP page/binary fetching with the mobile User-Agent
//! - [`pipeline`] - Frame unwrapping, availability classification, fallback links
//! - [`persist`] - Download, temporary file handling and attachment
//! - [`batch`] - Sequential batch orchestration with progress and browser hand-off
//!
//! The host supplies four collaborators: [`Preferences`], [`AttachmentSink`],
//! [`ProgressSink`] and [`UrlOpener`].

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod endpoint;
pub mod fetch;
pub mod identifier;
pub mod persist;
pub mod pipeline;
pub mod user_agent;

// Re-export commonly used types
pub use batch::{
    BatchItem, BatchRunner, BatchState, ProgressLine, ProgressSink, RecordingOpener,
    RecordingProgress, Severity, SystemBrowser, UrlOpener,
};
pub use endpoint::{DEFAULT_ENDPOINT, Preferences, StaticPreferences, build_item_url, resolve_endpoint};
pub use fetch::{FetchError, FetchResult, HttpTimeouts, PageClient};
pub use identifier::normalize_identifier;
pub use persist::{AttachmentSink, DirectoryAttachments, download_and_attach};
pub use pipeline::{
    Availability, CandidateFile, Classification, DEFAULT_MAX_UNWRAP_DEPTH, PipelineConfig,
    RetrievalError, Retriever,
};
pub use user_agent::MOBILE_USER_AGENT;
