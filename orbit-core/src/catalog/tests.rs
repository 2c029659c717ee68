//! Integration tests for the catalog module.

#[cfg(test)]
mod integration_tests {
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::catalog::{Installer, VersionKind, VersionManifest};
    use crate::launcher::{build_invocation, LaunchOptions};
    use crate::paths::LauncherPaths;
    use crate::registry::InstallationRegistry;

    /// Manifest with three applicable libraries and one filtered out by a
    /// disallow rule.
    fn sample_manifest() -> VersionManifest {
        VersionManifest::from_json(
            r#"{
                "id": "1.20.1",
                "type": "release",
                "mainClass": "net.minecraft.client.main.Main",
                "assets": "5",
                "downloads": { "client": { "url": "https://files.example.com/client.jar" } },
                "libraries": [
                    { "downloads": { "artifact": {
                        "path": "org/example/alpha/1.0/alpha-1.0.jar",
                        "url": "https://libs.example.com/alpha-1.0.jar" } } },
                    { "downloads": { "artifact": {
                        "path": "org/example/beta/2.0/beta-2.0.jar",
                        "url": "https://libs.example.com/beta-2.0.jar" } } },
                    { "downloads": { "artifact": {
                        "path": "org/example/gamma/3.0/gamma-3.0.jar",
                        "url": "https://libs.example.com/gamma-3.0.jar" } } },
                    { "downloads": { "artifact": {
                        "path": "org/example/excluded/1.0/excluded-1.0.jar",
                        "url": "https://libs.example.com/excluded-1.0.jar" } },
                      "rules": [ { "action": "allow" }, { "action": "disallow" } ] }
                ]
            }"#,
        )
        .unwrap()
    }

    /// Materialize an install on disk the way a completed download would.
    fn materialize_install(paths: &LauncherPaths, manifest: &VersionManifest) -> Vec<PathBuf> {
        let dir = paths.version_dir(&manifest.id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(paths.client_jar(&manifest.id), b"client jar bytes").unwrap();
        fs::write(
            paths.version_manifest(&manifest.id),
            manifest.to_pretty_json().unwrap(),
        )
        .unwrap();

        let installer = Installer::new(paths.clone()).unwrap();
        let planned = installer.plan_libraries(manifest).unwrap();
        for library in &planned {
            fs::create_dir_all(library.path.parent().unwrap()).unwrap();
            fs::write(&library.path, b"library bytes").unwrap();
        }
        planned.into_iter().map(|l| l.path).collect()
    }

    #[test]
    fn test_install_register_pull_launch_pipeline() {
        let temp = TempDir::new().unwrap();
        let paths = LauncherPaths::for_root(temp.path());
        let manifest = sample_manifest();

        // Install (sans network) and register.
        let libraries = materialize_install(&paths, &manifest);
        assert_eq!(libraries.len(), 3);

        let mut registry = InstallationRegistry::load(paths.clone());
        registry.add_installation(
            &manifest.id,
            manifest.kind,
            paths.client_jar(&manifest.id),
            paths.version_manifest(&manifest.id),
            &manifest.id,
        );

        // Exactly one record, with real on-disk size.
        assert_eq!(registry.len(), 1);
        let record = registry.get_installation("1.20.1").unwrap();
        assert!(record.size_bytes > 0);
        assert_eq!(record.kind, VersionKind::Release);

        // Pull resolves both paths.
        let pulled = registry.pull_installation("1.20.1").unwrap();
        let jar = pulled.jar_path.expect("jar should exist");
        let manifest_path = pulled.manifest_path.expect("manifest should exist");

        // Re-read the manifest from disk, as a later launch would.
        let on_disk = VersionManifest::from_json(&fs::read_to_string(manifest_path).unwrap())
            .unwrap();
        assert_eq!(on_disk.id, manifest.id);

        // Invocation: the three applicable libraries then the client jar.
        let invocation = build_invocation(
            &on_disk,
            &jar,
            &libraries,
            &paths,
            &LaunchOptions::default(),
        );
        let cp_index = invocation.args.iter().position(|a| a == "-cp").unwrap();
        let classpath = &invocation.args[cp_index + 1];

        assert!(classpath.contains("alpha-1.0.jar"));
        assert!(classpath.contains("beta-2.0.jar"));
        assert!(classpath.contains("gamma-3.0.jar"));
        assert!(!classpath.contains("excluded-1.0.jar"));
        assert!(classpath.ends_with("1.20.1.jar"));
    }

    #[test]
    fn test_registry_loss_recovered_by_scan() {
        let temp = TempDir::new().unwrap();
        let paths = LauncherPaths::for_root(temp.path());
        let manifest = sample_manifest();
        materialize_install(&paths, &manifest);

        // Register, then lose the registry document.
        let mut registry = InstallationRegistry::load(paths.clone());
        registry.add_installation(
            &manifest.id,
            manifest.kind,
            paths.client_jar(&manifest.id),
            paths.version_manifest(&manifest.id),
            &manifest.id,
        );
        drop(registry);
        fs::remove_file(paths.registry_file()).unwrap();

        // A fresh load is empty; scanning rebuilds the record from disk.
        let mut recovered = InstallationRegistry::load(paths);
        assert!(recovered.is_empty());
        assert_eq!(recovered.scan_existing_installations(), 1);

        let record = recovered.get_installation("1.20.1").unwrap();
        assert_eq!(record.kind, VersionKind::Release);
        assert!(record.size_bytes > 0);
    }
}
