//! Uninstallation: reverse the install pipeline.
//!
//! Stops and disables the service, removes the unit file and binary, and
//! with --purge removes the service account. Missing pieces are skipped,
//! not errors, so a partial installation can still be cleaned up.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::Cli;
use crate::install::{UNIT_DIR, privileges, service_control, unit, user};

pub async fn run_uninstall(cli: &Cli) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "🗑  node_exporter uninstallation\n");
    let _ = stdout.reset();

    if cli.dry_run {
        let _ = writeln!(stdout, "Dry run, no changes made:");
        let _ = writeln!(stdout, "  would stop and disable {}", cli.service_name);
        let _ = writeln!(stdout, "  would remove {}", cli.unit_path().display());
        let _ = writeln!(stdout, "  would remove {}", cli.binary_dest().display());
        if cli.purge {
            let _ = writeln!(stdout, "  would remove user {}", cli.user);
        }
        return Ok(());
    }

    privileges::check_privileges()?;

    // Stop/disable tolerate a service that was never started or enabled
    if let Err(e) = service_control::stop_service(&cli.service_name) {
        log::info!("Service not stopped: {}", e);
    }
    if let Err(e) = service_control::disable_service(&cli.service_name) {
        log::info!("Service not disabled: {}", e);
    }

    if unit::remove_systemd_unit(&cli.service_name, Path::new(UNIT_DIR))? {
        let _ = writeln!(stdout, "Removed unit file {}", cli.unit_path().display());
    }
    service_control::reload_daemon()?;

    let binary_dest = cli.binary_dest();
    if binary_dest.exists() {
        std::fs::remove_file(&binary_dest)
            .with_context(|| format!("Failed to remove {}", binary_dest.display()))?;
        let _ = writeln!(stdout, "Removed binary {}", binary_dest.display());
    }

    if cli.purge {
        if user::user_exists(&cli.user)? {
            user::remove_system_user(&cli.user)?;
            let _ = writeln!(stdout, "Removed user {}", cli.user);
        } else {
            log::info!("User {} does not exist, nothing to purge", cli.user);
        }
    }

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "\n✓ Uninstallation complete");
    let _ = stdout.reset();
    Ok(())
}
