//! Version manifest parsing and normalization.
//!
//! A manifest describes one version: the client artifact URL, the entry
//! class, an optional assets index id, and the dependency libraries.
//! Historical catalog entries no longer publish a manifest at all; those
//! are covered by [`VersionManifest::synthesize`], which produces a fully
//! populated minimal document rather than a partially filled one.

use serde::{Deserialize, Serialize};

use super::index::VersionKind;
use super::rules::library_applicable;

/// Entry class used when a manifest does not name one. Every client from
/// the legacy era uses this class, which is why the fallback is safe.
pub const DEFAULT_MAIN_CLASS: &str = "net.minecraft.client.main.Main";

/// A per-version manifest document.
///
/// Unknown fields are ignored on parse; the document written back to disk
/// is the normalized form below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifest {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: VersionKind,

    /// Entry class; absent in some older manifests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,

    /// Assets index id ("assets" on the wire); absent in older manifests.
    #[serde(default, rename = "assets", skip_serializing_if = "Option::is_none")]
    pub assets_index: Option<String>,

    pub downloads: ClientDownloads,

    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

/// Download targets for the primary artifacts of a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientDownloads {
    pub client: DownloadTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTarget {
    pub url: String,
}

/// One dependency library declared by a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Maven-style coordinate, kept for log lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,

    /// Conditional-inclusion rules; empty means always applicable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<LibraryRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactRef>,
}

/// A downloadable artifact with its repository-relative path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Path relative to the libraries directory, `/`-separated.
    pub path: String,
    pub url: String,
}

/// A single inclusion/exclusion rule on a library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryRule {
    pub action: RuleAction,

    /// Platform condition; only the `os.name` shape is recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsCondition>,

    /// Condition keys this launcher does not recognize. Kept so the rule
    /// evaluator can log what it skipped.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VersionManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Minimal manifest for catalog entries that publish only a direct
    /// client URL: default entry class, no assets index, no libraries.
    pub fn synthesize(id: &str, kind: VersionKind, client_url: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            main_class: Some(DEFAULT_MAIN_CLASS.to_string()),
            assets_index: None,
            downloads: ClientDownloads {
                client: DownloadTarget {
                    url: client_url.to_string(),
                },
            },
            libraries: Vec::new(),
        }
    }

    /// Entry class, falling back to the documented legacy default.
    pub fn main_class(&self) -> &str {
        self.main_class.as_deref().unwrap_or(DEFAULT_MAIN_CLASS)
    }

    /// Artifacts of every applicable library, in manifest order.
    pub fn applicable_artifacts(&self) -> impl Iterator<Item = (&LibraryEntry, &ArtifactRef)> {
        self.libraries
            .iter()
            .filter(|lib| library_applicable(&lib.rules))
            .filter_map(|lib| {
                lib.downloads
                    .as_ref()
                    .and_then(|d| d.artifact.as_ref())
                    .map(|artifact| (lib, artifact))
            })
    }
}
