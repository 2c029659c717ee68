//! Subcommand implementations.
//!
//! Each function is a thin adapter over one core contract; the CLI owns
//! only presentation and the explicit cached-catalog fallback.

use anyhow::{Context, Result};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::warn;

use orbit_core::catalog::{
    CatalogClient, Installer, VersionCatalog, VersionDescriptor, VersionKind, VersionManifest,
};
use orbit_core::launcher::{build_invocation, launch as launch_runtime, LaunchOptions};
use orbit_core::paths::LauncherPaths;
use orbit_core::registry::{format_size, InstallationRegistry};
use orbit_core::LauncherError;

/// Fetch the catalog, falling back to the locally cached copy when the
/// remote is unreachable. The fallback is explicit and visible, never a
/// silent retry.
async fn fetch_catalog(client: &CatalogClient) -> Result<VersionCatalog> {
    match client.list_versions().await {
        Ok(catalog) => Ok(catalog),
        Err(err @ LauncherError::CatalogUnavailable { .. }) => {
            warn!("{err}; falling back to cached catalog");
            client
                .load_cached_catalog()
                .context("catalog unreachable and no cached copy available")
        }
        Err(err) => Err(err.into()),
    }
}

/// Table row for catalog versions
#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Released")]
    released: String,
}

pub async fn versions(
    paths: &LauncherPaths,
    catalog_url: &str,
    snapshots: bool,
    limit: usize,
    json: bool,
) -> Result<()> {
    let client = CatalogClient::with_catalog_url(paths.clone(), catalog_url)?;
    let catalog = fetch_catalog(&client).await?;

    let mut selected: Vec<&VersionDescriptor> = catalog.releases().take(limit).collect();
    if snapshots {
        selected.extend(catalog.snapshots().take(limit / 2));
    }

    if selected.is_empty() {
        println!("No versions found in catalog.");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
    } else {
        let rows: Vec<VersionRow> = selected
            .iter()
            .map(|v| VersionRow {
                id: v.id.clone(),
                kind: v.kind.to_string(),
                released: v.release_time.format("%Y-%m-%d").to_string(),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        println!("{table}");
        println!(
            "\n{} of {} catalog versions shown.",
            rows.len(),
            catalog.version_count()
        );
    }

    Ok(())
}

pub async fn install(
    paths: &LauncherPaths,
    catalog_url: &str,
    version: Option<&str>,
    profile: Option<&str>,
) -> Result<()> {
    let client = CatalogClient::with_catalog_url(paths.clone(), catalog_url)?;
    let catalog = fetch_catalog(&client).await?;

    let descriptor = match version {
        Some(id) => catalog
            .find(id)
            .with_context(|| format!("version '{id}' not found in catalog"))?,
        None => catalog.latest_release().context("catalog lists no releases")?,
    };

    println!("Installing {} ({})...", descriptor.id, descriptor.kind);

    let manifest = client.resolve_manifest(descriptor, None).await?;
    let installer = Installer::new(paths.clone())?;
    let result = installer.download(&manifest).await?;

    let mut registry = InstallationRegistry::load(paths.clone());
    let profile_key = profile.unwrap_or(&descriptor.id);
    let record = registry.add_installation(
        &manifest.id,
        manifest.kind,
        result.client_jar,
        result.manifest_path,
        profile_key,
    );

    println!(
        "Installed {} as profile '{}' ({} libraries, {})",
        manifest.id,
        profile_key,
        result.libraries.len(),
        format_size(record.size_bytes)
    );

    Ok(())
}

/// Table row for registered installations
#[derive(Tabled)]
struct InstallationRow {
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Installed")]
    installed: String,
    #[tabled(rename = "Last used")]
    last_used: String,
}

pub fn list(paths: &LauncherPaths, json: bool) -> Result<()> {
    let registry = InstallationRegistry::load(paths.clone());

    if registry.is_empty() {
        println!("No installations registered.");
        return Ok(());
    }

    if json {
        let records: Vec<_> = registry.installations().collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let rows: Vec<InstallationRow> = registry
        .installations()
        .map(|r| InstallationRow {
            profile: r.profile_key.clone(),
            version: r.id.clone(),
            kind: r.kind.to_string(),
            size: format_size(r.size_bytes),
            installed: r.installed_at.format("%Y-%m-%d").to_string(),
            last_used: r.last_accessed_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");

    let releases = registry
        .installations()
        .filter(|r| r.kind == VersionKind::Release)
        .count();
    let snapshots = registry
        .installations()
        .filter(|r| r.kind == VersionKind::Snapshot)
        .count();
    println!(
        "\n{} installation(s), {} release(s), {} snapshot(s), {} on disk.",
        registry.len(),
        releases,
        snapshots,
        format_size(registry.total_size_bytes())
    );

    Ok(())
}

pub fn scan(paths: &LauncherPaths) -> Result<()> {
    let mut registry = InstallationRegistry::load(paths.clone());
    let discovered = registry.scan_existing_installations();

    if discovered == 0 {
        println!("No unregistered installations found.");
    } else {
        println!("Registered {discovered} installation(s) found on disk.");
    }

    Ok(())
}

pub fn pull(paths: &LauncherPaths, profile: &str) -> Result<()> {
    let mut registry = InstallationRegistry::load(paths.clone());

    let Some(pulled) = registry.pull_installation(profile) else {
        println!("Profile '{profile}' not found in registry.");
        return Ok(());
    };

    match &pulled.jar_path {
        Some(path) => println!("Jar:      {}", path.display()),
        None => println!("Jar:      (missing on disk)"),
    }
    match &pulled.manifest_path {
        Some(path) => println!("Manifest: {}", path.display()),
        None => println!("Manifest: (missing on disk)"),
    }

    Ok(())
}

pub fn remove(paths: &LauncherPaths, profile: &str) -> Result<()> {
    let mut registry = InstallationRegistry::load(paths.clone());

    if registry.remove_installation(profile) {
        println!("Removed profile '{profile}' from the registry. Files on disk are untouched.");
    } else {
        println!("Profile '{profile}' not found in registry.");
    }

    Ok(())
}

pub async fn launch(
    paths: &LauncherPaths,
    profile: &str,
    max_heap: String,
    username: String,
) -> Result<()> {
    let mut registry = InstallationRegistry::load(paths.clone());
    // Recover registry state from disk before looking the profile up.
    registry.scan_existing_installations();

    let pulled = registry
        .pull_installation(profile)
        .with_context(|| format!("profile '{profile}' not found in registry"))?;
    let jar = pulled
        .jar_path
        .context("client jar is missing on disk; reinstall the version")?;
    let manifest_path = pulled
        .manifest_path
        .context("manifest is missing on disk; reinstall the version")?;

    let manifest = VersionManifest::from_json(&std::fs::read_to_string(&manifest_path)?)
        .with_context(|| format!("failed to parse manifest {}", manifest_path.display()))?;

    let installer = Installer::new(paths.clone())?;
    let libraries: Vec<_> = installer
        .plan_libraries(&manifest)?
        .into_iter()
        .map(|l| l.path)
        .collect();

    let options = LaunchOptions {
        max_heap,
        username,
        extra_jvm_args: Vec::new(),
    };
    let invocation = build_invocation(&manifest, &jar, &libraries, paths, &options);

    let code = launch_runtime(&invocation).await?;
    if code != 0 {
        println!("Runtime exited with code {code}.");
    }

    Ok(())
}
