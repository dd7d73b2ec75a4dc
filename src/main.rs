mod cli;
mod config;
mod download;
mod github;
mod install;
mod platform;
mod source;
mod template;
mod types;
mod update;
mod version;


use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::{load_manifest, load_settings, manifest_path};
use github::GitHubClient;
use install::Installer;
use platform::get_system_info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    match cli.command {
        Commands::Version => {
            println!("grab {}", cli::get_version());
        }

        Commands::Install => {
            let settings = load_settings()?;
            let manifest = load_manifest(&manifest_path(cli.config.as_deref())?)
                .context("Error loading config")?;
            let client = GitHubClient::new(&settings)?;

            let installer = Installer::new(&client, get_system_info(), settings.bin_dir);
            installer.install_all(&manifest.binaries)?;
        }

        Commands::Update { dry_run } => {
            let settings = load_settings()?;
            let path = manifest_path(cli.config.as_deref())?;
            let manifest = load_manifest(&path).context("Error loading config")?;
            let client = GitHubClient::new(&settings)?;

            let updates = update::check_updates(&client, &manifest.binaries)?;
            if updates.is_empty() {
                println!("All binaries are up to date");
                return Ok(());
            }

            for pending in &updates {
                println!("{}: {} -> {}", pending.name, pending.current, pending.latest);
            }

            if dry_run {
                tracing::info!("Dry run, not writing {}", path.display());
            } else {
                let changed = update::apply_updates(&path, &updates)?;
                println!("Updated {} binaries in {}", changed, path.display());
            }
        }
    }

    Ok(())
}

fn log_level(cli: &Cli) -> Result<&'static str> {
    if let Some(level) = cli.log_level.as_deref() {
        return match level.to_lowercase().as_str() {
            "" => Ok("warn"),
            "debug" => Ok("debug"),
            "info" => Ok("info"),
            "warn" => Ok("warn"),
            "error" => Ok("error"),
            _ => bail!("invalid log level {:?}", level),
        };
    }

    Ok(if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    })
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = log_level(cli)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}
