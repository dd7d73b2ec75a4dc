use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // A git tag at HEAD means a release build
    if let Some(tag) = option_env!("GRAB_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("GRAB_GIT_COMMIT").unwrap_or("unknown");
    let version = format!("v{}-{}", BASE_VERSION, commit);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "grab")]
#[command(about = "User centric dotfile dependency manager")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Logging level (debug, info, warn, error)
    #[arg(long, env = "GRAB_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the manifest listing the binaries to manage
    #[arg(long, env = "GRAB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install every binary in the manifest that is not already present
    Install,

    /// Bump manifest versions to the latest upstream releases
    Update {
        /// Only report available updates, leave the manifest untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the current version
    Version,
}
