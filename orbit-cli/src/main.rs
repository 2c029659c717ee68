//! Orbit - install and launch versioned JVM runtime clients.
//!
//! Thin adapter over the core components: every subcommand maps onto one
//! of the catalog, registry, or launcher contracts.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use orbit_core::catalog::DEFAULT_CATALOG_URL;
use orbit_core::paths::LauncherPaths;

mod commands;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "orbit",
    about = "Install and launch versioned JVM runtime clients",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Override the launcher data directory
    #[clap(long, global = true)]
    root: Option<PathBuf>,

    /// Override the remote version catalog URL
    #[clap(long, global = true, default_value = DEFAULT_CATALOG_URL)]
    catalog_url: String,
}

#[derive(Parser, Debug)]
enum Command {
    /// List versions published in the remote catalog
    Versions {
        /// Include snapshot versions
        #[clap(long)]
        snapshots: bool,

        /// Maximum number of releases to show
        #[clap(long, default_value_t = 20)]
        limit: usize,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Download a version and register it
    Install {
        /// Version id (defaults to the latest release)
        version: Option<String>,

        /// Profile name to register under (defaults to the version id)
        #[clap(long)]
        profile: Option<String>,
    },

    /// List registered installations
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Scan the versions directory and register anything missing
    Scan,

    /// Print the installed paths for a profile
    Pull {
        /// Profile name
        profile: String,
    },

    /// Remove a profile from the registry (files stay on disk)
    Remove {
        /// Profile name
        profile: String,
    },

    /// Launch an installed profile
    Launch {
        /// Profile name
        profile: String,

        /// Maximum heap for the runtime (-Xmx)
        #[clap(long, default_value = "2G")]
        max_heap: String,

        /// Offline username
        #[clap(long, default_value = "OfflinePlayer")]
        username: String,
    },
}

/// Initialize tracing from the --log-level flag; logs go to stderr so
/// command output stays clean on stdout.
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    let paths = match &cli.root {
        Some(root) => LauncherPaths::for_root(root),
        None => LauncherPaths::new()?,
    };

    match cli.command {
        Command::Versions {
            snapshots,
            limit,
            json,
        } => commands::versions(&paths, &cli.catalog_url, snapshots, limit, json).await,
        Command::Install { version, profile } => {
            commands::install(&paths, &cli.catalog_url, version.as_deref(), profile.as_deref())
                .await
        }
        Command::List { json } => commands::list(&paths, json),
        Command::Scan => commands::scan(&paths),
        Command::Pull { profile } => commands::pull(&paths, &profile),
        Command::Remove { profile } => commands::remove(&paths, &profile),
        Command::Launch {
            profile,
            max_heap,
            username,
        } => commands::launch(&paths, &profile, max_heap, username).await,
    }
}
