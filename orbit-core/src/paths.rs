//! Path layout for the launcher data directory.
//!
//! Every on-disk location is derived from a single root:
//!
//! ```text
//! <root>/
//!     installations.json        <- installation registry
//!     version_catalog.json      <- cached remote catalog
//!     versions/<id>/<id>.jar    <- client artifact
//!     versions/<id>/<id>.json   <- version manifest
//!     libraries/<artifact-path> <- dependency libraries
//!     assets/                   <- asset store
//! ```

use directories::ProjectDirs;
use std::path::{Component, Path, PathBuf};

use crate::{LauncherError, Result};

/// Registry document file name inside the data root.
const REGISTRY_FILE: &str = "installations.json";

/// Cached copy of the remote version catalog.
const CATALOG_CACHE_FILE: &str = "version_catalog.json";

/// Path management for the launcher data directory.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    root: PathBuf,
}

impl LauncherPaths {
    /// Create a paths instance rooted at the platform data directory.
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "orbit").ok_or_else(|| {
            LauncherError::Path("failed to determine platform data directory".to_string())
        })?;
        Ok(Self::for_root(dirs.data_dir()))
    }

    /// Create a paths instance rooted at an explicit directory.
    pub fn for_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }

    pub fn client_jar(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{id}.jar"))
    }

    pub fn version_manifest(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{id}.json"))
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    /// Local path for a library artifact, from its manifest-relative path.
    ///
    /// Manifest paths use `/` separators regardless of platform.
    pub fn library(&self, artifact_path: &str) -> PathBuf {
        let mut path = self.libraries_dir();
        for part in artifact_path.split('/') {
            path.push(part);
        }
        path
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn registry_file(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    pub fn catalog_cache_file(&self) -> PathBuf {
        self.root.join(CATALOG_CACHE_FILE)
    }
}

/// Check that a manifest-relative path stays inside its base directory.
///
/// Manifest content is remote input; a `..` component must never place an
/// artifact outside the libraries directory.
pub fn is_safe_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.is_absolute()
        && !path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_root() {
        let paths = LauncherPaths::for_root(Path::new("/data/orbit"));

        assert_eq!(
            paths.client_jar("1.20.1"),
            PathBuf::from("/data/orbit/versions/1.20.1/1.20.1.jar")
        );
        assert_eq!(
            paths.version_manifest("1.20.1"),
            PathBuf::from("/data/orbit/versions/1.20.1/1.20.1.json")
        );
        assert_eq!(
            paths.registry_file(),
            PathBuf::from("/data/orbit/installations.json")
        );
    }

    #[test]
    fn test_library_path_uses_platform_separators() {
        let paths = LauncherPaths::for_root(Path::new("/data/orbit"));
        let lib = paths.library("com/example/util/1.0/util-1.0.jar");

        assert!(lib.starts_with(paths.libraries_dir()));
        assert!(lib.ends_with(Path::new("com/example/util/1.0/util-1.0.jar")));
    }

    #[test]
    fn test_safe_relative_paths() {
        assert!(is_safe_relative("com/example/util/1.0/util-1.0.jar"));
        assert!(!is_safe_relative("../../../etc/passwd"));
        assert!(!is_safe_relative("com/../../outside.jar"));
        assert!(!is_safe_relative("/absolute/path.jar"));
    }
}
