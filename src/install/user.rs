//! Service account provisioning.
//!
//! The agent runs under a dedicated system account with no login shell
//! and no home directory.

use std::process::Command;

use super::InstallerError;

const NOLOGIN_SHELL: &str = "/usr/sbin/nologin";

/// Check whether an account already exists (`getent passwd <name>`)
pub fn user_exists(name: &str) -> Result<bool, InstallerError> {
    let output = Command::new("getent")
        .args(["passwd", name])
        .output()
        .map_err(|e| InstallerError::System(format!("Failed to execute getent: {}", e)))?;

    // getent exits 2 when the key is unknown
    Ok(output.status.success())
}

/// Create a system account for the agent
pub fn create_system_user(name: &str) -> Result<(), InstallerError> {
    let output = Command::new("useradd")
        .args(["--system", "--no-create-home", "--shell", NOLOGIN_SHELL, name])
        .output()
        .map_err(|e| InstallerError::System(format!("Failed to execute useradd: {}", e)))?;

    if !output.status.success() {
        return Err(InstallerError::System(format!(
            "Failed to create user {}: {}",
            name,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

/// Remove the service account (uninstall --purge)
pub fn remove_system_user(name: &str) -> Result<(), InstallerError> {
    let output = Command::new("userdel")
        .arg(name)
        .output()
        .map_err(|e| InstallerError::System(format!("Failed to execute userdel: {}", e)))?;

    if !output.status.success() {
        return Err(InstallerError::System(format!(
            "Failed to remove user {}: {}",
            name,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}
