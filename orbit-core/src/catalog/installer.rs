//! Artifact download and placement.
//!
//! Installs one version into the launcher data directory: the client jar
//! (always refreshed, since the manifest may have changed), the manifest
//! document itself, and every applicable library not already on disk.
//! Downloads run strictly sequentially; a failed fetch aborts the install
//! and leaves already-written files in place, so the caller must not
//! register the installation until `download` returns successfully.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::manifest::VersionManifest;
use crate::paths::{self, LauncherPaths};
use crate::{LauncherError, Result};

/// Downloads version artifacts into the data directory.
pub struct Installer {
    http: reqwest::Client,
    paths: LauncherPaths,
}

/// Result of a completed install.
#[derive(Debug, Clone)]
pub struct InstallResult {
    pub client_jar: PathBuf,
    pub manifest_path: PathBuf,
    /// Every applicable library path in manifest order, fetched or
    /// pre-existing; this is the complete classpath input.
    pub libraries: Vec<PathBuf>,
}

/// A library artifact resolved to its local path.
#[derive(Debug, Clone)]
pub struct PlannedLibrary {
    pub path: PathBuf,
    pub url: String,
    /// Whether the file already exists on disk (and will be skipped).
    pub present: bool,
}

impl Installer {
    pub fn new(paths: LauncherPaths) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("orbit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self { http, paths })
    }

    /// Resolve every applicable library to its local path, marking which
    /// files are already present on disk.
    pub fn plan_libraries(&self, manifest: &VersionManifest) -> Result<Vec<PlannedLibrary>> {
        let mut planned = Vec::new();

        for (library, artifact) in manifest.applicable_artifacts() {
            if !paths::is_safe_relative(&artifact.path) {
                return Err(LauncherError::ArtifactFetchFailed {
                    path: PathBuf::from(&artifact.path),
                    reason: "artifact path escapes the libraries directory".to_string(),
                });
            }

            let path = self.paths.library(&artifact.path);
            let present = path.exists();
            if present {
                debug!(library = ?library.name, "library already present");
            }
            planned.push(PlannedLibrary {
                path,
                url: artifact.url.clone(),
                present,
            });
        }

        Ok(planned)
    }

    /// Download a version: client jar, manifest document, and any
    /// applicable libraries missing from disk.
    pub async fn download(&self, manifest: &VersionManifest) -> Result<InstallResult> {
        let version_dir = self.paths.version_dir(&manifest.id);
        fs::create_dir_all(&version_dir)?;

        info!(id = %manifest.id, "installing version");

        // The client jar is always refreshed; only libraries are treated
        // as immutable by path.
        let client_jar = self.paths.client_jar(&manifest.id);
        self.fetch_to_path(&manifest.downloads.client.url, &client_jar)
            .await?;

        // The manifest on disk must always match the manifest just
        // resolved.
        let manifest_path = self.paths.version_manifest(&manifest.id);
        fs::write(&manifest_path, manifest.to_pretty_json()?)?;

        let planned = self.plan_libraries(manifest)?;
        let pending = planned.iter().filter(|l| !l.present).count();
        info!(
            libraries = planned.len(),
            pending, "downloading missing libraries"
        );

        for library in &planned {
            if library.present {
                continue;
            }
            if let Some(parent) = library.path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| fetch_failed(&library.path, e))?;
            }
            self.fetch_to_path(&library.url, &library.path).await?;
        }

        info!(id = %manifest.id, "install complete");

        Ok(InstallResult {
            client_jar,
            manifest_path,
            libraries: planned.into_iter().map(|l| l.path).collect(),
        })
    }

    async fn fetch_to_path(&self, url: &str, dest: &Path) -> Result<()> {
        debug!(url, dest = %dest.display(), "fetching artifact");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_failed(dest, e))?;

        if !response.status().is_success() {
            return Err(fetch_failed(
                dest,
                format!("HTTP {} from {url}", response.status()),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| fetch_failed(dest, e))?;
        fs::write(dest, &bytes).map_err(|e| fetch_failed(dest, e))?;
        Ok(())
    }
}

fn fetch_failed(path: &Path, reason: impl fmt::Display) -> LauncherError {
    LauncherError::ArtifactFetchFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod installer_tests {
    use super::*;
    use crate::catalog::VersionManifest;
    use tempfile::TempDir;

    fn manifest_with_libraries() -> VersionManifest {
        VersionManifest::from_json(
            r#"{
                "id": "1.20.1",
                "type": "release",
                "downloads": { "client": { "url": "https://files.example.com/client.jar" } },
                "libraries": [
                    {
                        "downloads": { "artifact": {
                            "path": "com/example/a/1.0/a-1.0.jar",
                            "url": "https://libs.example.com/a-1.0.jar"
                        } }
                    },
                    {
                        "downloads": { "artifact": {
                            "path": "com/example/b/1.0/b-1.0.jar",
                            "url": "https://libs.example.com/b-1.0.jar"
                        } }
                    },
                    {
                        "downloads": { "artifact": {
                            "path": "com/example/c/1.0/c-1.0.jar",
                            "url": "https://libs.example.com/c-1.0.jar"
                        } },
                        "rules": [ { "action": "disallow" } ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_plan_excludes_ruled_out_libraries() {
        let temp = TempDir::new().unwrap();
        let installer = Installer::new(LauncherPaths::for_root(temp.path())).unwrap();

        let planned = installer.plan_libraries(&manifest_with_libraries()).unwrap();

        assert_eq!(planned.len(), 2);
        assert!(planned.iter().all(|l| !l.present));
        assert!(planned[0].path.ends_with(Path::new("com/example/a/1.0/a-1.0.jar")));
        assert!(planned[1].path.ends_with(Path::new("com/example/b/1.0/b-1.0.jar")));
    }

    #[test]
    fn test_plan_marks_existing_files_present() {
        let temp = TempDir::new().unwrap();
        let paths = LauncherPaths::for_root(temp.path());
        let installer = Installer::new(paths.clone()).unwrap();

        let existing = paths.library("com/example/a/1.0/a-1.0.jar");
        fs::create_dir_all(existing.parent().unwrap()).unwrap();
        fs::write(&existing, b"jar bytes").unwrap();

        let planned = installer.plan_libraries(&manifest_with_libraries()).unwrap();

        assert!(planned[0].present);
        assert!(!planned[1].present);
    }

    #[test]
    fn test_plan_is_stable_across_calls() {
        let temp = TempDir::new().unwrap();
        let paths = LauncherPaths::for_root(temp.path());
        let installer = Installer::new(paths.clone()).unwrap();
        let manifest = manifest_with_libraries();

        // Materialize every planned file, as a completed download would.
        for library in installer.plan_libraries(&manifest).unwrap() {
            fs::create_dir_all(library.path.parent().unwrap()).unwrap();
            fs::write(&library.path, b"jar bytes").unwrap();
        }

        let first: Vec<_> = installer
            .plan_libraries(&manifest)
            .unwrap()
            .into_iter()
            .map(|l| l.path)
            .collect();
        let replanned = installer.plan_libraries(&manifest).unwrap();

        // Nothing left to fetch, and the path list is unchanged.
        assert_eq!(replanned.iter().filter(|l| !l.present).count(), 0);
        let second: Vec<_> = replanned.into_iter().map(|l| l.path).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_plan_rejects_traversal_paths() {
        let temp = TempDir::new().unwrap();
        let installer = Installer::new(LauncherPaths::for_root(temp.path())).unwrap();

        let manifest = VersionManifest::from_json(
            r#"{
                "id": "evil",
                "downloads": { "client": { "url": "https://files.example.com/client.jar" } },
                "libraries": [
                    {
                        "downloads": { "artifact": {
                            "path": "../../outside.jar",
                            "url": "https://libs.example.com/outside.jar"
                        } }
                    }
                ]
            }"#,
        )
        .unwrap();

        let err = installer.plan_libraries(&manifest).unwrap_err();
        assert!(matches!(err, LauncherError::ArtifactFetchFailed { .. }));
    }
}
