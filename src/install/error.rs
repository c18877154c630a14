//! Installer error type shared by the system-facing primitives

use thiserror::Error;

/// Errors from privilege checks, user provisioning, unit installation,
/// and service control.
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("this installer must run as root (try sudo)")]
    PermissionDenied,

    #[error("required tool not found on PATH: {0}")]
    MissingDependency(String),

    #[error("{0}")]
    System(String),
}
