//! Page fetching with a fixed outbound identity.
//!
//! [`PageClient`] performs the blocking request/response calls the pipeline
//! suspends on: HTML page fetches for classification and fully buffered
//! binary fetches for download.

mod client;
mod error;

pub use client::{
    CONNECT_TIMEOUT_SECS, FetchResult, HttpTimeouts, PageClient, REQUEST_TIMEOUT_SECS,
};
pub use error::FetchError;
