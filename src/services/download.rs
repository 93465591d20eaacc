//! On-demand retrieval of sheet assets as named local downloads.
//!
//! Solution files live under a per-sheet folder named after the primary
//! asset with its extension stripped; folder and file segments are fully
//! percent-encoded so names may contain spaces, parentheses, and non-ASCII
//! characters. Retrieved bytes are written into the downloads directory
//! under exactly the requested filename, so the saved file never carries a
//! server-chosen name.

use std::path::{Path, PathBuf};

use tracing::info;
use url::Url;

use crate::client::ShelfClient;
use crate::error::Result;
use crate::models::Sheet;

/// A completed download.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// Filename the payload was requested and saved under.
    pub filename: String,
    /// Full path of the saved file.
    pub path: PathBuf,
    /// Payload size in bytes.
    pub size: u64,
}

/// Outcome messages emitted by download tasks back to the event loop.
#[derive(Debug)]
pub enum DownloadEvent {
    Finished(DownloadResult),
    Failed {
        filename: String,
        error: crate::error::ShelfError,
    },
}

/// Fetches primary and solution assets and saves them under their own names.
#[derive(Clone)]
pub struct DownloadService {
    client: ShelfClient,
    sheets_root: Url,
    solutions_root: Url,
    downloads_dir: PathBuf,
}

impl DownloadService {
    /// Create a service over the given asset roots and downloads directory.
    pub fn new(
        client: ShelfClient,
        sheets_root: Url,
        solutions_root: Url,
        downloads_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            sheets_root,
            solutions_root,
            downloads_dir,
        }
    }

    /// URL of a sheet's primary asset.
    pub fn primary_url(&self, sheet: &Sheet) -> Result<Url> {
        Ok(self.sheets_root.join(&escape_segment(&sheet.file))?)
    }

    /// URL of one solution file:
    /// `{solutions-root}/{escaped(stem(file))}/{escaped(filename)}`.
    pub fn solution_url(&self, sheet: &Sheet, filename: &str) -> Result<Url> {
        let folder = escape_segment(solution_folder(&sheet.file));
        let file = escape_segment(filename);
        Ok(self.solutions_root.join(&format!("{folder}/{file}"))?)
    }

    /// Download the primary asset, saved under the sheet's own filename.
    pub async fn fetch_primary(&self, sheet: &Sheet) -> Result<DownloadResult> {
        let url = self.primary_url(sheet)?;
        self.fetch_to_downloads(&url, &sheet.file).await
    }

    /// Download one solution file for a sheet.
    ///
    /// A failure here never affects sibling retrievals: the caller gets a
    /// per-file error and the service stays usable.
    pub async fn fetch_solution(&self, sheet: &Sheet, filename: &str) -> Result<DownloadResult> {
        let url = self.solution_url(sheet, filename)?;
        self.fetch_to_downloads(&url, filename).await
    }

    /// Probe whether the primary asset is reachable.
    pub async fn primary_exists(&self, sheet: &Sheet) -> Result<bool> {
        let url = self.primary_url(sheet)?;
        self.client.exists(&url).await
    }

    async fn fetch_to_downloads(&self, url: &Url, filename: &str) -> Result<DownloadResult> {
        info!(%url, filename, "fetching asset");
        let bytes = self.client.fetch_bytes(url, filename).await?;
        let path = save_as(&self.downloads_dir, filename, &bytes)?;
        info!(path = %path.display(), size = bytes.len(), "asset saved");
        Ok(DownloadResult {
            filename: filename.to_string(),
            size: bytes.len() as u64,
            path,
        })
    }
}

/// Solution folder for a sheet: the primary filename without its extension.
pub fn solution_folder(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}

/// Percent-encode one path segment (space → `%20`, `(` → `%28`, `)` → `%29`,
/// non-ASCII bytes encoded).
pub fn escape_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Reduce a requested filename to a bare name safe to create locally.
///
/// Catalog data controls solution filenames; stripping directory components
/// keeps a hostile entry from writing outside the downloads directory.
pub fn sanitize_filename(filename: &str) -> String {
    let bare = filename.rsplit(['/', '\\']).next().unwrap_or(filename).trim();
    if bare.is_empty() || bare == "." || bare == ".." {
        "download.bin".to_string()
    } else {
        bare.to_string()
    }
}

/// Write the payload under the requested name, creating the directory first.
fn save_as(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(sanitize_filename(filename));
    std::fs::write(&path, bytes)?;
    Ok(path)
}
