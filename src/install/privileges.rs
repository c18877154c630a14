//! Privilege checking for system installation.
//!
//! Installing to /usr/local/bin, creating accounts, and writing to
//! /etc/systemd/system all require root, so the check runs before any
//! side effect.

use super::InstallerError;

/// Check that we are running as root
pub fn check_privileges() -> Result<(), InstallerError> {
    let uid = unsafe { libc::getuid() };
    if uid != 0 {
        return Err(InstallerError::PermissionDenied);
    }

    Ok(())
}
