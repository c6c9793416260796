//! Command line interface

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{self, Config};
use crate::release::{NamingStrategy, Options, ReleaseManager, VersionCatalog, Versions};

#[derive(Debug, Parser)]
#[command(name = "release-catalog")]
#[command(version, about = "Resolve, rank and install binaries published as GitHub releases")]
pub struct Cli {
    /// GitHub organization or user that owns the repository
    #[arg(long)]
    pub org: String,

    /// Repository name
    #[arg(long)]
    pub repo: String,

    /// Target operating system (defaults to the running platform)
    #[arg(long, default_value = "")]
    pub os: String,

    /// Target architecture (defaults to the running platform)
    #[arg(long, default_value = "")]
    pub arch: String,

    /// Release asset name; `{version}`, `{os}` and `{arch}` are substituted
    #[arg(long)]
    pub asset_template: String,

    /// Executable name inside the asset (defaults to the asset template)
    #[arg(long)]
    pub exe_template: Option<String>,

    /// Directory releases are installed into
    #[arg(long)]
    pub releases_path: Option<PathBuf>,

    /// Config file (defaults to the data directory's config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List remote releases with an asset for the target platform.
    /// Newest first; tags that are not semantic versions come last.
    List {
        #[arg(default_value = "")]
        constraint: String,
    },
    /// Show the latest remote release matching the constraint
    Latest {
        #[arg(default_value = "")]
        constraint: String,
    },
    /// Download the latest remote release matching the constraint
    Install {
        #[arg(default_value = "")]
        constraint: String,
    },
    /// List installed releases.
    /// Newest first; tags that are not semantic versions come last.
    Installed {
        #[arg(default_value = "")]
        constraint: String,
    },
    /// Show the latest installed release matching the constraint
    Current {
        #[arg(default_value = "")]
        constraint: String,
    },
}

impl Cli {
    /// Options for the repository named on the command line
    pub fn options(&self, config: &Config) -> Options {
        let exe_template = self
            .exe_template
            .clone()
            .unwrap_or_else(|| self.asset_template.clone());
        let naming = NamingStrategy::from_templates(self.asset_template.clone(), exe_template);

        Options::builder(&self.org, &self.repo, naming)
            .os(&self.os)
            .arch(&self.arch)
            .releases_path(
                self.releases_path
                    .clone()
                    .unwrap_or_else(|| config.releases_path()),
            )
            .build()
    }
}

/// Load configuration, build the release manager and run the command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = Config::load(&config_path)?;
    let options = cli.options(&config);
    info!(
        "Using {}/{} for {}/{}, releases in {:?}",
        options.organization(),
        options.repository(),
        options.os(),
        options.arch(),
        options.releases_path()
    );

    let manager =
        ReleaseManager::from_config(options, &config).context("failed to create HTTP client")?;

    let stdout = std::io::stdout();
    execute(&manager, &cli.command, &mut stdout.lock()).await
}

pub async fn execute<V, W>(versions: &V, command: &Command, out: &mut W) -> anyhow::Result<()>
where
    V: Versions + ?Sized,
    W: Write,
{
    match command {
        Command::List { constraint } => {
            let catalog = versions.list_releases(constraint).await?;
            write_catalog(&catalog, out)?;
        }
        Command::Latest { constraint } => match versions.latest_release(constraint).await? {
            Some((tag, url)) => writeln!(out, "{tag}\t{url}")?,
            None => writeln!(out, "No release matches {constraint:?}")?,
        },
        Command::Install { constraint } => {
            let Some((tag, url)) = versions.latest_release(constraint).await? else {
                bail!("No release matches {constraint:?}");
            };
            let path = versions.download_release(&tag, &url).await?;
            writeln!(out, "{tag}\t{}", path.display())?;
        }
        Command::Installed { constraint } => {
            let catalog = versions.list_installed(constraint)?;
            write_catalog(&catalog, out)?;
        }
        Command::Current { constraint } => match versions.installed_version(constraint)? {
            Some((tag, path)) => writeln!(out, "{tag}\t{path}")?,
            None => writeln!(out, "No installed release matches {constraint:?}")?,
        },
    }

    Ok(())
}

/// Newest version first, then tags that are not semantic versions
fn write_catalog<W: Write>(catalog: &VersionCatalog, out: &mut W) -> std::io::Result<()> {
    let tags = catalog
        .sorted_tags(true)
        .into_iter()
        .chain(catalog.unversioned_tags());
    for tag in tags {
        if let Some(location) = catalog.get(&tag) {
            writeln!(out, "{tag}\t{location}")?;
        }
    }
    Ok(())
}
