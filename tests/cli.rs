//! CLI surface tests
//!
//! These only exercise argument handling and the side-effect-free dry-run
//! path; the real pipeline needs root, systemd, and network.

use assert_cmd::Command;
use predicates::prelude::*;

fn install_cmd() -> Command {
    Command::cargo_bin("exporter-install").expect("binary builds")
}

#[test]
fn help_lists_pipeline_flags() {
    install_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--agent-version"))
        .stdout(predicate::str::contains("--no-start"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--uninstall"));
}

#[test]
fn version_flag_works() {
    install_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("exporter-install"));
}

#[test]
fn purge_requires_uninstall() {
    install_cmd()
        .arg("--purge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--uninstall"));
}

#[test]
fn port_must_fit_u16() {
    install_cmd()
        .args(["--port", "70000", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn non_root_install_is_refused_before_side_effects() {
    // Only meaningful without root; CI containers often run as uid 0
    if unsafe { libc::getuid() } == 0 {
        return;
    }

    install_cmd()
        .args(["--no-interaction", "--agent-version", "1.8.2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must run as root"));
}

#[test]
fn dry_run_with_pinned_version_plans_without_side_effects() {
    install_cmd()
        .args([
            "--dry-run",
            "--agent-version",
            "1.8.2",
            "--prefix",
            "/nonexistent/prefix",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run, no changes made"))
        .stdout(predicate::str::contains(
            "node_exporter-1.8.2.linux",
        ))
        .stdout(predicate::str::contains("/nonexistent/prefix/node_exporter"));
}

#[test]
fn dry_run_uninstall_plans_removals() {
    install_cmd()
        .args(["--uninstall", "--purge", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would stop and disable node_exporter"))
        .stdout(predicate::str::contains("would remove user node_exporter"));
}
