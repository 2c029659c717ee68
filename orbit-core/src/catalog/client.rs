//! Catalog retrieval and manifest resolution.
//!
//! Fetches the remote version catalog and per-version manifests. A
//! successful catalog fetch refreshes a local cache copy so callers have
//! an explicit fallback when the catalog host is unreachable; the
//! fallback is never taken silently.

use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use super::index::{VersionCatalog, VersionDescriptor};
use super::manifest::VersionManifest;
use crate::paths::LauncherPaths;
use crate::{LauncherError, Result};

/// Default remote catalog URL.
pub const DEFAULT_CATALOG_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// Client for the remote version catalog.
pub struct CatalogClient {
    http: reqwest::Client,
    catalog_url: String,
    paths: LauncherPaths,
}

impl CatalogClient {
    /// Create a client against the default catalog.
    pub fn new(paths: LauncherPaths) -> Result<Self> {
        Self::with_catalog_url(paths, DEFAULT_CATALOG_URL)
    }

    /// Create a client against a custom catalog URL.
    pub fn with_catalog_url(paths: LauncherPaths, catalog_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("orbit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            catalog_url: catalog_url.to_string(),
            paths,
        })
    }

    /// Fetch the remote catalog.
    ///
    /// Refreshes the local cache copy on success (best effort). On any
    /// network or parse failure returns [`LauncherError::CatalogUnavailable`];
    /// callers decide whether to fall back to [`Self::load_cached_catalog`].
    pub async fn list_versions(&self) -> Result<VersionCatalog> {
        let response = self
            .http
            .get(&self.catalog_url)
            .send()
            .await
            .map_err(|e| self.catalog_unavailable(e))?;

        if !response.status().is_success() {
            return Err(self.catalog_unavailable(format!("HTTP {}", response.status())));
        }

        let catalog: VersionCatalog = response
            .json()
            .await
            .map_err(|e| self.catalog_unavailable(e))?;

        debug!(versions = catalog.version_count(), "fetched version catalog");

        if let Err(err) = self.save_catalog_cache(&catalog) {
            warn!("failed to cache version catalog: {err}");
        }

        Ok(catalog)
    }

    /// Load the catalog copy saved on the last successful fetch.
    pub fn load_cached_catalog(&self) -> Result<VersionCatalog> {
        let path = self.paths.catalog_cache_file();
        let content = std::fs::read_to_string(&path)?;
        let catalog = VersionCatalog::from_json(&content)?;
        debug!(
            versions = catalog.version_count(),
            "loaded cached catalog from {}",
            path.display()
        );
        Ok(catalog)
    }

    /// Resolve a descriptor to a full manifest.
    ///
    /// When the manifest fetch fails but the caller already knows a direct
    /// client artifact URL (legacy catalog entries), a minimal manifest is
    /// synthesized instead; old versions stay installable. The result is
    /// always either fully parsed or fully synthesized, never a mix.
    pub async fn resolve_manifest(
        &self,
        descriptor: &VersionDescriptor,
        legacy_client_url: Option<&str>,
    ) -> Result<VersionManifest> {
        match self.fetch_manifest(&descriptor.url).await {
            Ok(manifest) => Ok(manifest),
            Err(err) => match legacy_client_url {
                Some(url) => {
                    warn!(
                        id = %descriptor.id,
                        error = %err,
                        "manifest fetch failed, synthesizing from direct client URL"
                    );
                    Ok(VersionManifest::synthesize(
                        &descriptor.id,
                        descriptor.kind,
                        url,
                    ))
                }
                None => {
                    warn!(id = %descriptor.id, error = %err, "manifest unresolvable");
                    Err(LauncherError::ManifestUnresolvable(descriptor.id.clone()))
                }
            },
        }
    }

    async fn fetch_manifest(&self, url: &str) -> Result<VersionManifest> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    fn save_catalog_cache(&self, catalog: &VersionCatalog) -> Result<()> {
        let path = self.paths.catalog_cache_file();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(catalog)?)?;
        debug!("saved catalog cache to {}", path.display());
        Ok(())
    }

    fn catalog_unavailable(&self, reason: impl fmt::Display) -> LauncherError {
        LauncherError::CatalogUnavailable {
            url: self.catalog_url.clone(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod client_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cached_catalog_roundtrip() {
        let temp = TempDir::new().unwrap();
        let paths = LauncherPaths::for_root(temp.path());
        let client = CatalogClient::new(paths.clone()).unwrap();

        let catalog = VersionCatalog::from_json(
            r#"{
                "versions": [{
                    "id": "1.20.1",
                    "type": "release",
                    "url": "https://meta.example.com/1.20.1.json",
                    "releaseTime": "2023-06-12T13:25:51+00:00"
                }]
            }"#,
        )
        .unwrap();

        client.save_catalog_cache(&catalog).unwrap();

        let loaded = client.load_cached_catalog().unwrap();
        assert_eq!(loaded.version_count(), 1);
        assert!(loaded.find("1.20.1").is_some());
    }

    #[test]
    fn test_cached_catalog_missing_is_an_error() {
        let temp = TempDir::new().unwrap();
        let client = CatalogClient::new(LauncherPaths::for_root(temp.path())).unwrap();

        assert!(client.load_cached_catalog().is_err());
    }
}
