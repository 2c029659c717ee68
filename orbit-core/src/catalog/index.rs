//! Remote version catalog parsing.
//!
//! The catalog is a single JSON document listing every published version
//! with its kind, release time, and the URL of its manifest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a published version.
///
/// Kinds other than `release` and `snapshot` (historical betas and the
/// like) collapse to `Unknown`; they are still installable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Release,
    Snapshot,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionKind::Release => write!(f, "release"),
            VersionKind::Snapshot => write!(f, "snapshot"),
            VersionKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// One version entry in the remote catalog. Identity is `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: VersionKind,

    /// URL of this version's manifest document.
    pub url: String,

    pub release_time: DateTime<Utc>,
}

/// Pointers to the newest release and snapshot ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestPointers {
    pub release: String,
    pub snapshot: String,
}

/// The remote catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionCatalog {
    #[serde(default)]
    pub latest: Option<LatestPointers>,

    /// All published versions, newest first.
    pub versions: Vec<VersionDescriptor>,
}

impl VersionCatalog {
    /// Parse a catalog from a JSON string.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Look up a version by id.
    pub fn find(&self, id: &str) -> Option<&VersionDescriptor> {
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn releases(&self) -> impl Iterator<Item = &VersionDescriptor> {
        self.versions
            .iter()
            .filter(|v| v.kind == VersionKind::Release)
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &VersionDescriptor> {
        self.versions
            .iter()
            .filter(|v| v.kind == VersionKind::Snapshot)
    }

    /// Newest release, preferring the catalog's own `latest` pointer.
    pub fn latest_release(&self) -> Option<&VersionDescriptor> {
        self.latest
            .as_ref()
            .and_then(|l| self.find(&l.release))
            .or_else(|| self.releases().next())
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }
}
