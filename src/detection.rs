//! Installation state detection
//!
//! Determines whether the agent is installed, partially installed, or not
//! installed by checking the pieces a finished run leaves behind:
//! - agent binary at the install prefix
//! - systemd unit file
//!
//! Used for the idempotent-rerun decision: a matching installed version is
//! a no-op unless --force is given.

use std::path::Path;
use std::process::Command;

/// Installation state enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// No binary or unit file found
    NotInstalled,
    /// Some components present but incomplete (repair needed)
    PartiallyInstalled,
    /// Binary and unit file both present
    Installed,
}

/// Check current installation state
pub fn check_install_state(binary_path: &Path, unit_path: &Path) -> InstallState {
    let binary_ok = binary_path.is_file();
    let unit_ok = unit_path.is_file();

    match (binary_ok, unit_ok) {
        (false, false) => InstallState::NotInstalled,
        (true, true) => InstallState::Installed,
        _ => InstallState::PartiallyInstalled,
    }
}

/// Ask the installed binary for its version.
///
/// node_exporter prints `node_exporter, version X.Y.Z (branch: ...)`;
/// the token after "version" is returned. `None` means the binary is
/// absent, refuses to run, or prints something unrecognized.
pub fn installed_version(binary_path: &Path) -> Option<String> {
    if !binary_path.is_file() {
        return None;
    }

    let output = Command::new(binary_path).arg("--version").output().ok()?;

    // Older releases report the version on stderr
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    parse_version_output(&text)
}

fn parse_version_output(text: &str) -> Option<String> {
    let mut words = text.split_whitespace();
    while let Some(word) = words.next() {
        if word == "version" {
            return words
                .next()
                .map(|v| v.trim_start_matches('v').to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_exporter_version_banner() {
        let text = "node_exporter, version 1.8.2 (branch: HEAD, revision: f1e0e8)\n";
        assert_eq!(parse_version_output(text), Some("1.8.2".to_string()));
    }

    #[test]
    fn unrecognized_output_yields_none() {
        assert_eq!(parse_version_output("usage: node_exporter [flags]"), None);
    }

    #[test]
    fn state_reflects_present_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binary = dir.path().join("node_exporter");
        let unit = dir.path().join("node_exporter.service");

        assert_eq!(
            check_install_state(&binary, &unit),
            InstallState::NotInstalled
        );

        std::fs::write(&binary, b"").expect("binary");
        assert_eq!(
            check_install_state(&binary, &unit),
            InstallState::PartiallyInstalled
        );

        std::fs::write(&unit, b"").expect("unit");
        assert_eq!(check_install_state(&binary, &unit), InstallState::Installed);
    }
}
