//! Error taxonomy for the catalog browser.
//!
//! Every failure is caught at the flow that initiated the operation and
//! converted into a user-visible message; no failure terminates the
//! browsing session.

use thiserror::Error;

/// Errors surfaced by catalog loading, facet control, and asset retrieval.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// Catalog fetch or parse failed at startup.
    #[error("failed to load catalog: {reason}")]
    DataLoad { reason: String },

    /// A tag outside the loaded vocabulary was toggled.
    #[error("unknown tag: {tag}")]
    UnknownTag { tag: String },

    /// An asset request returned a non-success status.
    #[error("resource not found: {name} (status {status})")]
    ResourceNotFound { name: String, status: u16 },

    /// Transport-level failure during a fetch.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Filesystem failure while saving a download.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A resource path could not be constructed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ShelfError {
    /// Build a `DataLoad` error from any displayable cause.
    pub fn data_load(cause: impl std::fmt::Display) -> Self {
        Self::DataLoad {
            reason: cause.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShelfError>;
