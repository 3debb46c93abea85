//! Connection settings for the WebUI.

use std::{env, fmt, time::Duration};

/// Default WebUI address of a local qBittorrent.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:8080";
/// Default WebUI user.
pub const DEFAULT_USERNAME: &str = "admin";
/// Default WebUI password.
pub const DEFAULT_PASSWORD: &str = "adminadmin";
/// Upper bound on every WebUI request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the [`QbitClient`](crate::QbitClient).
#[derive(Clone, PartialEq, Eq)]
pub struct QbitConfig {
    /// WebUI base address, e.g. `http://127.0.0.1:8080`.
    pub host: String,
    /// WebUI user.
    pub username: String,
    /// WebUI password.
    pub password: String,
    /// Request timeout applied to the login and to the action request.
    pub timeout: Duration,
}

impl Default for QbitConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            username: DEFAULT_USERNAME.into(),
            password: DEFAULT_PASSWORD.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl QbitConfig {
    /// Reads the configuration from the environment, falling back to the defaults per field.
    ///
    /// - `QBITTORRENT_HOST`
    /// - `QBITTORRENT_USERNAME`
    /// - `QBITTORRENT_PASSWORD`
    /// - `QBITTORRENT_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("QBITTORRENT_HOST").unwrap_or(defaults.host),
            username: lookup("QBITTORRENT_USERNAME").unwrap_or(defaults.username),
            password: lookup("QBITTORRENT_PASSWORD").unwrap_or(defaults.password),
            timeout: lookup("QBITTORRENT_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

impl fmt::Debug for QbitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print credentials.
        write!(
            f,
            "QbitConfig(host=\"{}\", username=\"{}\", password=<{}>, timeout={:?})",
            self.host,
            self.username,
            if self.password.is_empty() {
                "unset"
            } else {
                "set"
            },
            self.timeout,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        assert_eq!(QbitConfig::from_lookup(lookup(&[])), QbitConfig::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = QbitConfig::from_lookup(lookup(&[
            ("QBITTORRENT_HOST", "http://nas:8090"),
            ("QBITTORRENT_PASSWORD", "hunter2"),
            ("QBITTORRENT_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.host, "http://nas:8090");
        assert_eq!(config.username, DEFAULT_USERNAME);
        assert_eq!(config.password, "hunter2");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn bad_timeout_falls_back() {
        for value in ["soon", "0", "-3"] {
            let config = QbitConfig::from_lookup(lookup(&[("QBITTORRENT_TIMEOUT_SECS", value)]));
            assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        }
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", QbitConfig::default());
        assert!(!rendered.contains(DEFAULT_PASSWORD));
        assert!(rendered.contains("password=<set>"));
    }
}
