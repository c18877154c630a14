//! Systemd unit file generation and management.

use std::fs;
use std::path::{Path, PathBuf};

use super::InstallerError;
use super::file_ops::write_file_atomic;

/// Systemd service configuration
#[derive(Clone)]
pub struct SystemdConfig<'a> {
    pub service_name: &'a str,
    pub description: &'a str,
    pub binary_path: &'a str,
    pub args: &'a [String],
    pub user: &'a str,
    pub group: &'a str,
    pub auto_restart: bool,
}

/// Create the systemd unit file in the specified directory
pub fn create_systemd_unit_with_dir(
    config: &SystemdConfig,
    unit_dir: &Path,
) -> Result<PathBuf, InstallerError> {
    let unit_content = generate_unit_content(config);
    let unit_path = unit_dir.join(format!("{}.service", config.service_name));

    if let Some(parent) = unit_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            InstallerError::System(format!("Failed to create systemd directory: {}", e))
        })?;
    }

    write_file_atomic(&unit_path, &unit_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&unit_path)
            .map_err(|e| InstallerError::System(format!("Failed to get unit file metadata: {}", e)))?
            .permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&unit_path, perms).map_err(|e| {
            InstallerError::System(format!("Failed to set unit file permissions: {}", e))
        })?;
    }

    Ok(unit_path)
}

/// Generate systemd unit file content
pub fn generate_unit_content(config: &SystemdConfig) -> String {
    let mut content = String::with_capacity(1024);

    // [Unit] section
    content.push_str("[Unit]\n");
    content.push_str(&format!("Description={}\n", config.description));
    content.push_str("Wants=network-online.target\n");
    content.push_str("After=network-online.target\n");
    content.push('\n');

    // [Service] section
    content.push_str("[Service]\n");
    content.push_str("Type=simple\n");

    let exec_start = if config.args.is_empty() {
        format!("ExecStart={}\n", config.binary_path)
    } else {
        format!("ExecStart={} {}\n", config.binary_path, config.args.join(" "))
    };
    content.push_str(&exec_start);

    content.push_str(&format!("User={}\n", config.user));
    content.push_str(&format!("Group={}\n", config.group));

    if config.auto_restart {
        content.push_str("Restart=on-failure\n");
        content.push_str("RestartSec=5s\n");
    } else {
        content.push_str("Restart=no\n");
    }

    // Hardening
    content.push_str("NoNewPrivileges=true\n");
    content.push_str("ProtectSystem=strict\n");
    content.push_str("ProtectHome=true\n");

    // Logging
    content.push_str("StandardOutput=journal\n");
    content.push_str("StandardError=journal\n");
    content.push_str(&format!("SyslogIdentifier={}\n", config.service_name));
    content.push('\n');

    // [Install] section
    content.push_str("[Install]\n");
    content.push_str("WantedBy=multi-user.target\n");

    content
}

/// Remove the systemd unit file if present
pub fn remove_systemd_unit(service_name: &str, unit_dir: &Path) -> Result<bool, InstallerError> {
    let unit_path = unit_dir.join(format!("{}.service", service_name));

    if unit_path.exists() {
        fs::remove_file(&unit_path)
            .map_err(|e| InstallerError::System(format!("Failed to remove unit file: {}", e)))?;
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config<'a>(args: &'a [String]) -> SystemdConfig<'a> {
        SystemdConfig {
            service_name: "node_exporter",
            description: "Prometheus node_exporter",
            binary_path: "/usr/local/bin/node_exporter",
            args,
            user: "node_exporter",
            group: "node_exporter",
            auto_restart: true,
        }
    }

    #[test]
    fn unit_carries_exec_line_account_and_hardening() {
        let args = vec!["--web.listen-address=:9100".to_string()];
        let content = generate_unit_content(&sample_config(&args));

        assert!(content.contains(
            "ExecStart=/usr/local/bin/node_exporter --web.listen-address=:9100\n"
        ));
        assert!(content.contains("User=node_exporter\n"));
        assert!(content.contains("Group=node_exporter\n"));
        assert!(content.contains("NoNewPrivileges=true\n"));
        assert!(content.contains("ProtectSystem=strict\n"));
        assert!(content.contains("Restart=on-failure\n"));
        assert!(content.contains("WantedBy=multi-user.target\n"));
    }

    #[test]
    fn unit_without_restart_disables_it() {
        let args: Vec<String> = Vec::new();
        let mut config = sample_config(&args);
        config.auto_restart = false;

        let content = generate_unit_content(&config);
        assert!(content.contains("Restart=no\n"));
        assert!(!content.contains("RestartSec"));
    }

    #[test]
    fn unit_file_created_and_removed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args: Vec<String> = Vec::new();

        let path = create_systemd_unit_with_dir(&sample_config(&args), dir.path())
            .expect("unit written");
        assert_eq!(path, dir.path().join("node_exporter.service"));
        assert!(path.is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).expect("metadata").permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }

        assert!(remove_systemd_unit("node_exporter", dir.path()).expect("removed"));
        assert!(!path.exists());
        assert!(!remove_systemd_unit("node_exporter", dir.path()).expect("second removal no-op"));
    }
}
