//! Atomic file operations for binary and unit installation.
//!
//! Writes go to a temp file in the destination directory and are renamed
//! into place, so a crashed run never leaves a half-written binary or unit
//! file behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::InstallerError;

/// Write file atomically to prevent corruption
pub fn write_file_atomic(path: &Path, content: &str) -> Result<(), InstallerError> {
    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| InstallerError::System(format!("Failed to create temp file: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| InstallerError::System(format!("Failed to write temp file: {}", e)))?;

        file.sync_all()
            .map_err(|e| InstallerError::System(format!("Failed to sync temp file: {}", e)))?;
    }

    fs::rename(&temp_path, path)
        .map_err(|e| InstallerError::System(format!("Failed to rename temp file: {}", e)))?;

    Ok(())
}

/// Install a binary to its destination atomically with mode 0755.
///
/// The copy lands next to the destination so the rename stays on one
/// filesystem.
pub fn install_binary_atomic(src: &Path, dest: &Path) -> Result<(), InstallerError> {
    let temp_path = dest.with_extension("tmp");

    fs::copy(src, &temp_path).map_err(|e| {
        InstallerError::System(format!(
            "Failed to copy {} to {}: {}",
            src.display(),
            temp_path.display(),
            e
        ))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&temp_path)
            .map_err(|e| InstallerError::System(format!("Failed to read metadata: {}", e)))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&temp_path, perms)
            .map_err(|e| InstallerError::System(format!("Failed to set permissions: {}", e)))?;
    }

    fs::rename(&temp_path, dest).map_err(|e| {
        InstallerError::System(format!("Failed to install {}: {}", dest.display(), e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.service");

        write_file_atomic(&path, "first").expect("first write");
        write_file_atomic(&path, "second").expect("second write");

        assert_eq!(fs::read_to_string(&path).expect("readable"), "second");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    #[cfg(unix)]
    fn installed_binary_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("staged");
        let dest = dir.path().join("installed");
        fs::write(&src, b"#!/bin/sh\n").expect("stage");

        install_binary_atomic(&src, &dest).expect("install");

        let mode = fs::metadata(&dest).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
