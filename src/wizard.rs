//! Interactive installation wizard for exporter-install

use anyhow::Result;
use inquire::{Confirm, Text};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::Cli;

/// Installation options gathered from the interactive wizard (or CLI flags
/// in non-interactive mode)
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub user: String,
    pub auto_start: bool,
}

impl InstallOptions {
    /// Build options straight from CLI flags for non-interactive mode
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            user: cli.user.clone(),
            auto_start: !cli.no_start,
        }
    }
}

/// What the run actually installed, for the completion summary
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub version: String,
    pub binary_path: PathBuf,
    pub unit_path: PathBuf,
    pub service_started: bool,
    pub listening_port: Option<u16>,
}

/// Display welcome banner
fn show_welcome(cli: &Cli) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(
        stdout,
        "\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    );
    let _ = stdout.reset();

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "\n             node_exporter service installer");
    let _ = stdout.reset();

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(
        stdout,
        "\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n"
    );
    let _ = stdout.reset();

    let _ = writeln!(stdout, "This will install:");
    let _ = writeln!(stdout, "  • node_exporter binary in {}", cli.prefix.display());
    let _ = writeln!(stdout, "  • a dedicated system account");
    let _ = writeln!(
        stdout,
        "  • systemd service \"{}\" listening on port {}\n",
        cli.service_name, cli.port
    );
}

/// Display installation completion summary
pub fn show_completion(report: &InstallReport) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "\n✓ INSTALLATION COMPLETE\n");
    let _ = stdout.reset();

    let _ = writeln!(stdout, "Installed components:");
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
    let _ = writeln!(
        stdout,
        "  ✓ node_exporter {} at {}",
        report.version,
        report.binary_path.display()
    );
    let _ = writeln!(stdout, "  ✓ Unit file {}", report.unit_path.display());
    let _ = stdout.reset();

    let _ = writeln!(stdout, "\nService status:");
    match (report.service_started, report.listening_port) {
        (true, Some(port)) => {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
            let _ = writeln!(stdout, "  ✓ Running, listening on port {}", port);
            let _ = stdout.reset();
        }
        _ => {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
            let _ = writeln!(stdout, "  ⚠ Installed but not started");
            let _ = stdout.reset();
        }
    }

    if report.listening_port.is_some() {
        let _ = writeln!(
            stdout,
            "\nMetrics: http://localhost:{}/metrics",
            report.listening_port.unwrap_or_default()
        );
    }
    let _ = writeln!(stdout);
}

/// Run interactive installation wizard
pub fn run_wizard(cli: &Cli) -> Result<InstallOptions> {
    show_welcome(cli);

    let user = Text::new("Service account to run the agent as:")
        .with_default(&cli.user)
        .with_help_message("Created as a system user (no login shell) if missing")
        .prompt()
        .map_err(|e| anyhow::anyhow!("Prompt cancelled: {}", e))?;

    let auto_start = Confirm::new("Start the service after installation?")
        .with_default(!cli.no_start)
        .with_help_message("Enables the unit so it also starts on boot")
        .prompt()
        .map_err(|e| anyhow::anyhow!("Prompt cancelled: {}", e))?;

    println!("\nInstallation summary:");
    println!("  • Service account: {}", user);
    println!("  • Listen port: {}", cli.port);
    println!(
        "  • Auto-start: {}",
        if auto_start { "Yes (on boot)" } else { "No (manual start)" }
    );
    println!();

    let proceed = Confirm::new("Proceed with these settings?")
        .with_default(true)
        .prompt()
        .map_err(|e| anyhow::anyhow!("Prompt cancelled: {}", e))?;

    if !proceed {
        return Err(anyhow::anyhow!("Installation cancelled by user"));
    }

    Ok(InstallOptions { user, auto_start })
}

/// Ask whether to remove artifacts a previous run left behind
pub fn confirm_stale_removal(path: &Path) -> Result<bool> {
    Confirm::new(&format!(
        "Previous run left {} behind. Remove it?",
        path.display()
    ))
    .with_default(true)
    .prompt()
    .map_err(|e| anyhow::anyhow!("Prompt cancelled: {}", e))
}

/// Check if running in non-interactive mode
///
/// Non-interactive mode is triggered by:
/// 1. Explicit `--no-interaction` flag (highest priority)
/// 2. Automation-specific flags (`--dry-run` or `--uninstall`)
/// 3. stdin not being a terminal (piped or service context), in which case
///    prompting cannot work and CLI defaults apply
pub fn is_non_interactive(cli: &Cli) -> bool {
    if cli.no_interaction {
        return true;
    }

    if cli.dry_run || cli.uninstall {
        return true;
    }

    !std::io::stdin().is_terminal()
}
