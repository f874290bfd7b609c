//! Command-line surface of the daemon.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "sonargated",
    version,
    about = "Reconciles SonarQube quality gates against a declarative manifest"
)]
pub struct Cli {
    /// Path of the configuration file.
    #[arg(long, env = "SONARGATE_CONFIG", default_value = "sonargate.toml")]
    pub config: PathBuf,

    /// Run a single reconcile sweep and exit instead of polling.
    #[arg(long)]
    pub once: bool,
}
