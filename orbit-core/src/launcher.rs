//! Runtime invocation composition and child process management.
//!
//! Builds the classpath and argument vector for an installed version and
//! starts the `java` child. The session arguments are fixed offline
//! placeholders; no real authentication happens here. Once started the
//! child is not cancellable and has no timeout; we stream its output
//! through and log the exit code when it terminates.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::catalog::VersionManifest;
use crate::paths::LauncherPaths;
use crate::{LauncherError, Result};

/// Platform separator for classpath lists.
const CLASSPATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Offline-session placeholders.
const OFFLINE_UUID: &str = "00000000-0000-0000-0000-000000000000";
const OFFLINE_ACCESS_TOKEN: &str = "0";
const OFFLINE_USER_TYPE: &str = "legacy";

/// Tunables for the spawned runtime.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Maximum heap, passed as `-Xmx`.
    pub max_heap: String,
    pub username: String,
    /// Extra JVM arguments inserted before the classpath.
    pub extra_jvm_args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            max_heap: "2G".to_string(),
            username: "OfflinePlayer".to_string(),
            extra_jvm_args: Vec::new(),
        }
    }
}

/// A fully composed runtime invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Build the `java` argument vector for an installed version.
///
/// The classpath is every library path in order followed by the client
/// jar. Asset flags are appended only when the manifest names an assets
/// index, so the argument list never carries a dangling flag.
pub fn build_invocation(
    manifest: &VersionManifest,
    client_jar: &Path,
    libraries: &[PathBuf],
    paths: &LauncherPaths,
    options: &LaunchOptions,
) -> Invocation {
    let classpath = libraries
        .iter()
        .map(|p| p.display().to_string())
        .chain([client_jar.display().to_string()])
        .collect::<Vec<_>>()
        .join(CLASSPATH_SEPARATOR);

    let mut args = vec![format!("-Xmx{}", options.max_heap)];
    args.extend(options.extra_jvm_args.iter().cloned());
    args.extend([
        "-cp".to_string(),
        classpath,
        manifest.main_class().to_string(),
        "--username".to_string(),
        options.username.clone(),
        "--version".to_string(),
        manifest.id.clone(),
        "--gameDir".to_string(),
        paths.root().display().to_string(),
    ]);

    if let Some(assets_index) = &manifest.assets_index {
        args.extend([
            "--assetsDir".to_string(),
            paths.assets_dir().display().to_string(),
            "--assetIndex".to_string(),
            assets_index.clone(),
        ]);
    }

    args.extend([
        "--uuid".to_string(),
        OFFLINE_UUID.to_string(),
        "--accessToken".to_string(),
        OFFLINE_ACCESS_TOKEN.to_string(),
        "--userType".to_string(),
        OFFLINE_USER_TYPE.to_string(),
    ]);

    Invocation {
        program: "java".to_string(),
        args,
    }
}

/// Spawn the runtime and stream its output through until it exits.
///
/// Returns the child's exit code (-1 when terminated by signal). Both
/// pipes are drained concurrently with `wait()` so the child never blocks
/// on a full pipe.
pub async fn launch(invocation: &Invocation) -> Result<i32> {
    info!(program = %invocation.program, "launching runtime");
    debug!(args = ?invocation.args, "runtime arguments");

    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            LauncherError::LaunchFailed(format!("could not spawn {}: {e}", invocation.program))
        })?;

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    let stdout_stream = async {
        if let Some(out) = stdout.as_mut() {
            let _ = tokio::io::copy(out, &mut tokio::io::stdout()).await;
        }
    };
    let stderr_stream = async {
        if let Some(err) = stderr.as_mut() {
            let _ = tokio::io::copy(err, &mut tokio::io::stderr()).await;
        }
    };

    let (status, (), ()) = tokio::join!(child.wait(), stdout_stream, stderr_stream);
    let status = status
        .map_err(|e| LauncherError::LaunchFailed(format!("failed waiting for runtime: {e}")))?;

    let code = status.code().unwrap_or(-1);
    info!(code, "runtime exited");
    Ok(code)
}
