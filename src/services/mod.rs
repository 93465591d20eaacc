//! Service layer: domain flows separated from UI concerns.

pub mod download;

pub use download::{DownloadEvent, DownloadResult, DownloadService};
