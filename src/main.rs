//! node_exporter installer binary
//!
//! Installs the Prometheus node_exporter monitoring agent as a systemd
//! service: discovers the latest release on GitHub, downloads and extracts
//! the tarball, provisions a service account, installs the binary, writes
//! the unit file, starts the service, and verifies it is listening.

use anyhow::Result;
use clap::Parser;

mod cli;
mod detection;
mod download;
mod install;
mod uninstall;
mod wizard;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    if cli.uninstall {
        return uninstall::run_uninstall(&cli).await;
    }

    let options = if wizard::is_non_interactive(&cli) {
        wizard::InstallOptions::from_cli(&cli)
    } else {
        // Refuse before prompting; answering the whole wizard only to be
        // told to rerun with sudo is wasted effort
        install::privileges::check_privileges()?;
        wizard::run_wizard(&cli)?
    };

    install::run_install(&cli, &options).await
}
