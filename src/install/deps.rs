//! External tool availability check.
//!
//! The pipeline shells out to systemd and the shadow utilities; missing
//! tools abort the run before anything is downloaded.

use super::InstallerError;

/// Tools the install pipeline invokes
pub const REQUIRED_TOOLS: &[&str] = &["systemctl", "useradd", "getent"];

/// Verify every required tool resolves on PATH
pub fn check_dependencies() -> Result<(), InstallerError> {
    for tool in REQUIRED_TOOLS {
        which::which(tool).map_err(|_| InstallerError::MissingDependency(tool.to_string()))?;
    }

    Ok(())
}
