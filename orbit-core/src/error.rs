//! Launcher error taxonomy.
//!
//! Lookup misses and files missing on disk are deliberately not errors:
//! `pull_installation` and friends return `None`/`false` for those so a
//! single absent file never aborts a whole command.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    /// The remote version catalog could not be fetched or parsed. Callers
    /// may fall back to a locally cached catalog copy.
    #[error("version catalog unavailable from {url}: {reason}")]
    CatalogUnavailable { url: String, reason: String },

    /// The version publishes no manifest document and no direct client
    /// artifact URL is known. Fatal for that version only.
    #[error("version {0} has no resolvable manifest")]
    ManifestUnresolvable(String),

    /// A single artifact download failed. The install is aborted;
    /// already-written files are left on disk.
    #[error("failed to fetch artifact {path}: {reason}")]
    ArtifactFetchFailed { path: PathBuf, reason: String },

    /// The registry document exists but cannot be parsed. Recovered by
    /// resetting to an empty registry and rescanning the filesystem.
    #[error("registry document is corrupt: {0}")]
    RegistryCorrupt(String),

    /// The runtime child process could not be started or awaited.
    #[error("failed to launch runtime: {0}")]
    LaunchFailed(String),

    #[error("path error: {0}")]
    Path(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, LauncherError>;
