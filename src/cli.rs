//! CLI argument parsing and mode detection for exporter-install

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for exporter-install
#[derive(Parser, Clone)]
#[command(name = "exporter-install")]
#[command(version, about = "Install the node_exporter monitoring agent as a systemd service")]
pub struct Cli {
    /// Agent version to install (skips GitHub release discovery)
    #[arg(long, value_name = "X.Y.Z")]
    pub agent_version: Option<String>,

    /// TCP port the agent listens on
    #[arg(long, default_value_t = 9100)]
    pub port: u16,

    /// Service account that runs the agent
    #[arg(long, default_value = "node_exporter")]
    pub user: String,

    /// Directory the agent binary is installed into
    #[arg(long, default_value = "/usr/local/bin")]
    pub prefix: PathBuf,

    /// Name of the generated systemd service
    #[arg(long, default_value = "node_exporter")]
    pub service_name: String,

    /// Extra arguments appended to the agent's ExecStart line
    #[arg(long = "agent-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub agent_args: Vec<String>,

    /// Don't start the service after install
    #[arg(long)]
    pub no_start: bool,

    /// Reinstall even if the requested version is already installed
    #[arg(long)]
    pub force: bool,

    /// Show what would be done without doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Uninstall instead of install
    #[arg(long)]
    pub uninstall: bool,

    /// Also remove the service account (uninstall only)
    #[arg(long, requires = "uninstall")]
    pub purge: bool,

    /// Non-interactive mode for CI/server environments
    ///
    /// Runs installation without any prompts, taking every answer from
    /// the command-line defaults.
    #[arg(long)]
    pub no_interaction: bool,
}

impl Cli {
    /// Path the agent binary is installed to.
    pub fn binary_dest(&self) -> PathBuf {
        self.prefix.join(crate::download::github::AGENT_BINARY)
    }

    /// Path of the generated unit file.
    pub fn unit_path(&self) -> PathBuf {
        PathBuf::from(crate::install::UNIT_DIR).join(format!("{}.service", self.service_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_node_exporter_conventions() {
        let cli = Cli::parse_from(["exporter-install"]);
        assert_eq!(cli.port, 9100);
        assert_eq!(cli.user, "node_exporter");
        assert_eq!(cli.service_name, "node_exporter");
        assert_eq!(cli.prefix, PathBuf::from("/usr/local/bin"));
        assert!(!cli.force);
    }

    #[test]
    fn unit_path_uses_service_name() {
        let cli = Cli::parse_from(["exporter-install", "--service-name", "metrics-agent"]);
        assert_eq!(
            cli.unit_path(),
            PathBuf::from("/etc/systemd/system/metrics-agent.service")
        );
    }
}
