//! Version catalog access and artifact installation.
//!
//! This module covers the remote half of the launcher: listing published
//! versions, resolving a version to its manifest, and downloading the
//! client jar plus its applicable dependency libraries.
//!
//! # Architecture
//!
//! ```text
//! Remote catalog (JSON over HTTP)
//!     │
//!     ├── version_manifest.json   <- lists every published version
//!     └── <id>.json               <- per-version manifest
//!            │
//!            ▼
//!     CatalogClient ── resolve ──▶ VersionManifest
//!            │
//!            ▼
//!     Installer ── download ──▶ versions/<id>/, libraries/
//! ```
//!
//! Downloads are strictly sequential and skip files already on disk, so a
//! repeated install of an unchanged version fetches nothing but the client
//! jar.

mod client;
mod index;
mod installer;
mod manifest;
mod rules;

pub use client::{CatalogClient, DEFAULT_CATALOG_URL};
pub use index::{LatestPointers, VersionCatalog, VersionDescriptor, VersionKind};
pub use installer::{InstallResult, Installer, PlannedLibrary};
pub use manifest::{
    ArtifactRef, ClientDownloads, DownloadTarget, LibraryDownloads, LibraryEntry, LibraryRule,
    OsCondition, RuleAction, VersionManifest, DEFAULT_MAIN_CLASS,
};
pub use rules::library_applicable;

#[cfg(test)]
mod tests;
