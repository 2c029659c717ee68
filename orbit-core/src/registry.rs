//! Durable installation registry.
//!
//! Maps profile keys to installation records, persisted as one
//! pretty-printed JSON document. Every mutation rewrites the whole
//! document, so the file is never left half-patched; a crash between a
//! mutation and its persist loses at most that one mutation. The registry
//! is an explicit store constructed per process run and threaded through
//! by the caller; there is no process-wide instance.
//!
//! One process owns the registry file at a time. Concurrent external
//! writers are undefined behavior and out of scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::catalog::VersionKind;
use crate::paths::LauncherPaths;
use crate::{LauncherError, Result};

/// A registered installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationRecord {
    /// External lookup key; equals the version id when no explicit
    /// profile layer is in play.
    pub profile_key: String,

    /// Version id this profile points at.
    pub id: String,

    #[serde(rename = "type")]
    pub kind: VersionKind,

    pub installed_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,

    pub jar_path: PathBuf,
    pub manifest_path: PathBuf,

    /// Total size of the version directory at registration time.
    pub size_bytes: u64,

    /// Mod-loader extension state; untouched by the core pipeline.
    pub has_mod_loader: bool,
    pub mod_loader_version: Option<String>,
}

/// Paths returned by a pull. Each is independently `None` when the
/// recorded file is missing on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PulledInstallation {
    pub jar_path: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
}

/// Durable profile -> installation mapping.
pub struct InstallationRegistry {
    paths: LauncherPaths,
    installations: BTreeMap<String, InstallationRecord>,
}

/// Minimal probe for reading the `type` field out of a manifest whose
/// rest may not parse.
#[derive(Deserialize)]
struct KindProbe {
    #[serde(rename = "type", default)]
    kind: VersionKind,
}

impl InstallationRegistry {
    /// Load the registry document, recovering to an empty registry when
    /// the file is absent or corrupt. Never fails the process; corrupt
    /// state is rebuilt by [`Self::scan_existing_installations`].
    pub fn load(paths: LauncherPaths) -> Self {
        let file = paths.registry_file();
        let installations = match Self::read_document(&file) {
            Ok(map) => map,
            Err(LauncherError::Io(e)) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("could not load registry, starting empty: {err}");
                BTreeMap::new()
            }
        };

        Self {
            paths,
            installations,
        }
    }

    fn read_document(path: &Path) -> Result<BTreeMap<String, InstallationRecord>> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| LauncherError::RegistryCorrupt(e.to_string()))
    }

    /// Rewrite the whole document. Failures are logged, not propagated;
    /// the in-memory state stays authoritative for the rest of the run.
    fn persist(&self) {
        let file = self.paths.registry_file();
        let result = (|| -> Result<()> {
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&file, serde_json::to_string_pretty(&self.installations)?)?;
            Ok(())
        })();

        if let Err(err) = result {
            error!("failed to persist registry to {}: {err}", file.display());
        }
    }

    /// Create or overwrite the record under `profile_key` and persist.
    pub fn add_installation(
        &mut self,
        version_id: &str,
        kind: VersionKind,
        jar_path: PathBuf,
        manifest_path: PathBuf,
        profile_key: &str,
    ) -> &InstallationRecord {
        let now = Utc::now();
        let record = InstallationRecord {
            profile_key: profile_key.to_string(),
            id: version_id.to_string(),
            kind,
            installed_at: now,
            last_accessed_at: now,
            jar_path,
            manifest_path,
            size_bytes: self.installation_size(version_id),
            has_mod_loader: false,
            mod_loader_version: None,
        };

        info!(profile = profile_key, id = version_id, "registered installation");
        self.installations.insert(profile_key.to_string(), record);
        self.persist();
        &self.installations[profile_key]
    }

    /// Total size of files under the version directory; 0 when absent.
    fn installation_size(&self, version_id: &str) -> u64 {
        let dir = self.paths.version_dir(version_id);
        if !dir.exists() {
            return 0;
        }

        WalkDir::new(&dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum()
    }

    /// Walk the versions directory and register every installation not
    /// already recorded under some profile. Idempotent: a second run on an
    /// unchanged tree registers nothing.
    ///
    /// This is the recovery path after registry loss or manual filesystem
    /// changes.
    pub fn scan_existing_installations(&mut self) -> usize {
        let versions_dir = self.paths.versions_dir();
        if !versions_dir.exists() {
            return 0;
        }

        debug!("scanning {} for installations", versions_dir.display());

        let entries = match fs::read_dir(&versions_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("could not read {}: {err}", versions_dir.display());
                return 0;
            }
        };

        let mut discovered = 0;
        for entry in entries.filter_map(|e| e.ok()) {
            if !entry.path().is_dir() {
                continue;
            }
            let Some(version_id) = entry.file_name().to_str().map(String::from) else {
                continue;
            };

            let jar_path = self.paths.client_jar(&version_id);
            if !jar_path.exists() {
                continue;
            }
            if self.installations.values().any(|r| r.id == version_id) {
                continue;
            }

            let manifest_path = self.paths.version_manifest(&version_id);
            let kind = read_manifest_kind(&manifest_path);
            self.add_installation(&version_id, kind, jar_path, manifest_path, &version_id);
            discovered += 1;
        }

        if discovered > 0 {
            info!(discovered, "registered installations found on disk");
        }
        discovered
    }

    /// Touch `last_accessed_at` and persist.
    pub fn update_last_accessed(&mut self, profile_key: &str) {
        if let Some(record) = self.installations.get_mut(profile_key) {
            record.last_accessed_at = Utc::now();
            self.persist();
        }
    }

    /// Resolve a profile to its on-disk paths.
    ///
    /// `None` for an unknown profile. Each recorded path is checked
    /// independently; a missing file yields `None` for that field only.
    /// Touches `last_accessed_at` when at least one file resolved.
    pub fn pull_installation(&mut self, profile_key: &str) -> Option<PulledInstallation> {
        let record = self.installations.get(profile_key)?;

        let jar_path = record.jar_path.exists().then(|| record.jar_path.clone());
        if jar_path.is_none() {
            warn!(profile = profile_key, "jar missing on disk: {}", record.jar_path.display());
        }

        let manifest_path = record
            .manifest_path
            .exists()
            .then(|| record.manifest_path.clone());
        if manifest_path.is_none() {
            warn!(
                profile = profile_key,
                "manifest missing on disk: {}",
                record.manifest_path.display()
            );
        }

        if jar_path.is_some() || manifest_path.is_some() {
            self.update_last_accessed(profile_key);
        }

        Some(PulledInstallation {
            jar_path,
            manifest_path,
        })
    }

    /// Delete the record if present; files on disk are untouched.
    pub fn remove_installation(&mut self, profile_key: &str) -> bool {
        if self.installations.remove(profile_key).is_some() {
            info!(profile = profile_key, "removed installation from registry");
            self.persist();
            true
        } else {
            false
        }
    }

    pub fn get_installation(&self, profile_key: &str) -> Option<&InstallationRecord> {
        self.installations.get(profile_key)
    }

    pub fn installations(&self) -> impl Iterator<Item = &InstallationRecord> {
        self.installations.values()
    }

    pub fn len(&self) -> usize {
        self.installations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installations.is_empty()
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.installations.values().map(|r| r.size_bytes).sum()
    }
}

fn read_manifest_kind(manifest_path: &Path) -> VersionKind {
    fs::read_to_string(manifest_path)
        .ok()
        .and_then(|content| serde_json::from_str::<KindProbe>(&content).ok())
        .map(|probe| probe.kind)
        .unwrap_or(VersionKind::Unknown)
}

/// Human-readable size, binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = (bytes.ilog2() / 10).min(UNITS.len() as u32 - 1);
    let value = bytes as f64 / f64::powi(1024.0, exponent as i32);
    format!("{:.2} {}", value, UNITS[exponent as usize])
}
