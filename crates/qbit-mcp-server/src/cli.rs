use std::{path::PathBuf, time::Duration};

use clap::Parser;

use qbit_mcp_controller::QbitConfig;

/// Top-level CLI struct for the binary.
///
/// Every connection flag overrides the matching `QBITTORRENT_*` variable.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// WebUI base URL, e.g. http://127.0.0.1:8080
    #[arg(long)]
    pub host: Option<String>,

    /// WebUI username.
    #[arg(short, long)]
    pub username: Option<String>,

    /// WebUI password.
    #[arg(long)]
    pub password: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Append logs to this file instead of stderr. Falls back to QBITTORRENT_MCP_LOG.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Applies the flags that were given on top of `config`.
    pub(crate) fn apply(&self, mut config: QbitConfig) -> QbitConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "qbit-mcp",
            "--host",
            "http://nas:8080",
            "-u",
            "alice",
            "--timeout-secs",
            "30",
        ])
        .unwrap();

        let config = cli.apply(QbitConfig::default());

        assert_eq!(config.host, "http://nas:8080");
        assert_eq!(config.username, "alice");
        assert_eq!(config.password, qbit_mcp_controller::DEFAULT_PASSWORD);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::try_parse_from(["qbit-mcp"]).unwrap();
        let config = cli.apply(QbitConfig::default());
        assert_eq!(config.host, qbit_mcp_controller::DEFAULT_HOST);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["qbit-mcp", "--timeout-secs", "0"]).is_err());
    }
}
