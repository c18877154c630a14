//! Installation pipeline
//!
//! A linear, fail-fast sequence: privilege check, version discovery,
//! dependency check, stale-artifact check, download, extract, user
//! provisioning, binary install, unit-file generation, service start,
//! health check, cleanup.
//!
//! # Module Structure
//!
//! - `privileges` - root check
//! - `deps` - PATH check for the external tools the run invokes
//! - `user` - service account provisioning
//! - `file_ops` - atomic file operations
//! - `unit` - systemd unit file generation and management
//! - `service_control` - systemctl wrappers
//! - `health` - post-start listen/active verification

use anyhow::{Context, Result, anyhow};
use std::io::Write;
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub mod deps;
pub mod error;
pub mod file_ops;
pub mod health;
pub mod privileges;
pub mod service_control;
pub mod unit;
pub mod user;

pub use error::InstallerError;

use crate::cli::Cli;
use crate::detection::{self, InstallState};
use crate::download::github::{self, AGENT_BINARY};
use crate::download::platform::Platform;
use crate::download::{core as download_core, extract};
use crate::wizard::{self, InstallOptions, InstallReport};

/// Where system unit files are installed
pub const UNIT_DIR: &str = "/etc/systemd/system";

/// Fixed scratch location so reruns can detect leftovers from a crashed run
const SCRATCH_DIR_NAME: &str = "exporter-install";

fn print_step(stdout: &mut StandardStream, msg: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(stdout, "{}", msg);
    let _ = stdout.reset();
}

fn print_ok(stdout: &mut StandardStream, msg: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
    let _ = writeln!(stdout, "✓ {}", msg);
    let _ = stdout.reset();
}

/// ExecStart arguments for the generated unit
fn exec_args(cli: &Cli) -> Vec<String> {
    let mut args = vec![format!("--web.listen-address=:{}", cli.port)];
    args.extend(cli.agent_args.iter().cloned());
    args
}

/// Idempotent rerun: a complete install of the requested version is a
/// no-op unless --force asks for a reinstall
fn is_noop_rerun(
    state: InstallState,
    installed: Option<&str>,
    requested: &str,
    force: bool,
) -> bool {
    state == InstallState::Installed && !force && installed == Some(requested)
}

/// A scratch root counts as stale only when a previous run left files in
/// it; a missing or empty directory is clean
fn scratch_is_stale(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Run the full installation pipeline
pub async fn run_install(cli: &Cli, options: &InstallOptions) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "🔧 node_exporter installation");
    let _ = stdout.reset();
    let _ = writeln!(
        stdout,
        "Platform: {} {}\n",
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    if !cli.dry_run {
        privileges::check_privileges()?;
        deps::check_dependencies()?;
    }

    let platform = Platform::detect()?;

    // Version discovery
    print_step(&mut stdout, "🔍 Resolving release version...");
    let target = github::resolve_target(cli.agent_version.as_deref(), platform).await?;
    let _ = writeln!(stdout, "   node_exporter {}", target.version);

    // Idempotent rerun: matching version already installed is a no-op
    let binary_dest = cli.binary_dest();
    let unit_path = cli.unit_path();
    let state = detection::check_install_state(&binary_dest, &unit_path);
    if is_noop_rerun(
        state,
        detection::installed_version(&binary_dest).as_deref(),
        &target.version,
        cli.force,
    ) {
        print_ok(
            &mut stdout,
            &format!(
                "node_exporter {} already installed, nothing to do (use --force to reinstall)",
                target.version
            ),
        );
        return Ok(());
    }

    // Stale artifacts from a previous crashed run
    let scratch_root = std::env::temp_dir().join(SCRATCH_DIR_NAME);
    if scratch_is_stale(&scratch_root) {
        if cli.dry_run {
            let _ = writeln!(
                stdout,
                "   would remove stale artifacts at {}",
                scratch_root.display()
            );
        } else {
            let remove = if wizard::is_non_interactive(cli) {
                log::warn!("Removing stale artifacts at {}", scratch_root.display());
                true
            } else {
                wizard::confirm_stale_removal(&scratch_root)?
            };
            if !remove {
                return Err(anyhow!(
                    "Refusing to run with stale artifacts at {}",
                    scratch_root.display()
                ));
            }
            std::fs::remove_dir_all(&scratch_root).with_context(|| {
                format!("Failed to remove stale {}", scratch_root.display())
            })?;
        }
    }

    if cli.dry_run {
        let _ = writeln!(stdout, "\nDry run, no changes made:");
        let _ = writeln!(stdout, "  would download {}", target.download_url);
        let _ = writeln!(
            stdout,
            "  would create system user {} if missing",
            options.user
        );
        let _ = writeln!(stdout, "  would install binary to {}", binary_dest.display());
        let _ = writeln!(stdout, "  would write unit file {}", unit_path.display());
        if options.auto_start {
            let _ = writeln!(
                stdout,
                "  would enable and start {}, then wait for port {}",
                cli.service_name, cli.port
            );
        }
        return Ok(());
    }

    // Scratch dir guard reclaims partial downloads if anything below fails
    std::fs::create_dir_all(&scratch_root)
        .with_context(|| format!("Failed to create {}", scratch_root.display()))?;
    let scratch = tempfile::Builder::new()
        .prefix("run-")
        .tempdir_in(&scratch_root)?;

    // Download
    print_step(
        &mut stdout,
        &format!("📥 Downloading node_exporter {}...", target.version),
    );
    let tarball = download_core::fetch_tarball(&target, scratch.path())
        .await
        .context("Download failed")?;
    print_ok(&mut stdout, "Tarball downloaded");

    // Extract
    print_step(&mut stdout, "📦 Extracting agent binary...");
    let staged = extract::extract_agent_binary(&tarball, AGENT_BINARY, scratch.path())
        .await
        .context("Extraction failed")?;
    print_ok(&mut stdout, "Binary extracted");

    // User provisioning
    if user::user_exists(&options.user)? {
        log::info!("Service account {} already exists", options.user);
    } else {
        user::create_system_user(&options.user)?;
        print_ok(&mut stdout, &format!("Created system user {}", options.user));
    }

    // Binary install
    std::fs::create_dir_all(&cli.prefix)
        .with_context(|| format!("Failed to create {}", cli.prefix.display()))?;
    file_ops::install_binary_atomic(&staged, &binary_dest)?;
    print_ok(
        &mut stdout,
        &format!("Installed binary to {}", binary_dest.display()),
    );

    // Unit-file generation
    let args = exec_args(cli);
    let config = unit::SystemdConfig {
        service_name: &cli.service_name,
        description: "Prometheus node_exporter metrics agent",
        binary_path: binary_dest
            .to_str()
            .ok_or_else(|| anyhow!("Invalid binary path encoding"))?,
        args: &args,
        user: &options.user,
        group: &options.user,
        auto_restart: true,
    };
    let unit_path = unit::create_systemd_unit_with_dir(&config, Path::new(UNIT_DIR))?;
    service_control::reload_daemon()?;
    print_ok(
        &mut stdout,
        &format!("Unit file written to {}", unit_path.display()),
    );

    // Service start + health check
    let mut service_started = false;
    if options.auto_start {
        print_step(&mut stdout, "🚀 Starting service...");
        service_control::enable_service(&cli.service_name)?;
        service_control::start_service(&cli.service_name)?;
        health::verify_service(&cli.service_name, cli.port)
            .await
            .context("Service started but failed the health check")?;
        service_started = true;
    } else {
        log::info!(
            "Skipping service start; run: systemctl enable --now {}",
            cli.service_name
        );
    }

    // Cleanup
    drop(scratch);
    if let Err(e) = std::fs::remove_dir_all(&scratch_root) {
        log::warn!("Could not clean up {}: {}", scratch_root.display(), e);
    }

    wizard::show_completion(&InstallReport {
        version: target.version,
        binary_path: binary_dest,
        unit_path,
        service_started,
        listening_port: service_started.then_some(cli.port),
    });

    Ok(())
}
