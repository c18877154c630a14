//! Systemd service control operations.
//!
//! Thin wrappers over systemctl for enable, start, stop, disable,
//! daemon-reload, and activation queries. System scope only; the
//! privilege check guarantees we are root by the time these run.

use std::process::Command;

use super::InstallerError;

fn systemctl(args: &[&str], action: &str) -> Result<(), InstallerError> {
    let output = Command::new("systemctl")
        .args(args)
        .output()
        .map_err(|e| InstallerError::System(format!("Failed to execute systemctl {}: {}", action, e)))?;

    if !output.status.success() {
        return Err(InstallerError::System(format!(
            "Failed to {}: {}",
            action,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

/// Enable the systemd service
pub fn enable_service(service_name: &str) -> Result<(), InstallerError> {
    systemctl(
        &["enable", &format!("{}.service", service_name)],
        "enable service",
    )
}

/// Start the systemd service
pub fn start_service(service_name: &str) -> Result<(), InstallerError> {
    systemctl(
        &["start", &format!("{}.service", service_name)],
        "start service",
    )
}

/// Stop the systemd service
pub fn stop_service(service_name: &str) -> Result<(), InstallerError> {
    systemctl(
        &["stop", &format!("{}.service", service_name)],
        "stop service",
    )
}

/// Disable the systemd service
pub fn disable_service(service_name: &str) -> Result<(), InstallerError> {
    systemctl(
        &["disable", &format!("{}.service", service_name)],
        "disable service",
    )
}

/// Reload systemd daemon to pick up unit file changes
pub fn reload_daemon() -> Result<(), InstallerError> {
    systemctl(&["daemon-reload"], "reload systemd daemon")
}

/// Query whether the service reports active
pub fn is_active(service_name: &str) -> Result<bool, InstallerError> {
    let output = Command::new("systemctl")
        .args(["is-active", "--quiet", &format!("{}.service", service_name)])
        .output()
        .map_err(|e| {
            InstallerError::System(format!("Failed to execute systemctl is-active: {}", e))
        })?;

    Ok(output.status.success())
}
