use crate::error::ConfigError;
use crate::policy::PolicyKind;
use crate::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Experiment settings shared by the server and its clients, read from a
/// JSON object. Missing keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_ip: String,
    pub server_port: u16,
    pub filename: PathBuf,
    /// Words asked for per request.
    pub k: u32,
    pub num_clients: usize,
    /// Requests the greedy client sends back-to-back.
    pub c: u32,
    pub policy: PolicyKind,
    pub stats_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_ip: "127.0.0.1".into(),
            server_port: 12345,
            filename: "words.txt".into(),
            k: 5,
            num_clients: 10,
            c: 1,
            policy: PolicyKind::Fcfs,
            stats_interval_secs: 10,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |source: ConfigError| Error::Config { path: path.to_owned(), source };
        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.into()))?;
        serde_json::from_str(&text).map_err(|e| config_error(e.into()))
    }

    /// `server_ip:server_port`, as accepted by `ToSocketAddrs`.
    pub fn address(&self) -> (&str, u16) {
        (&self.server_ip, self.server_port)
    }

    pub fn stats_interval(&self) -> Option<time::Duration> {
        Some(self.stats_interval_secs)
            .filter(|&s| s > 0)
            .map(time::Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_experiment_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "server_ip": "10.0.0.1",
                "server_port": 5000,
                "k": 7,
                "filename": "data/words.txt",
                "num_clients": 4,
                "c": 3,
                "policy": "rr",
                "num_repetitions": 5
            }"#,
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.address(), ("10.0.0.1", 5000));
        assert_eq!(config.k, 7);
        assert_eq!(config.filename, PathBuf::from("data/words.txt"));
        assert_eq!(config.num_clients, 4);
        assert_eq!(config.c, 3);
        assert_eq!(config.policy, PolicyKind::RoundRobin);
        assert_eq!(config.stats_interval(), Some(time::Duration::from_secs(10)));
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config: Config = serde_json::from_str(r#"{"stats_interval_secs": 0}"#).unwrap();
        assert_eq!(config.stats_interval(), None);
        assert_eq!(config, Config { stats_interval_secs: 0, ..Config::default() });
    }

    #[test]
    fn reports_unreadable_configs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(matches!(
            Config::load(&path),
            Err(Error::Config { source: ConfigError::Read(_), .. })
        ));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(Error::Config { source: ConfigError::Parse(_), .. })
        ));
    }
}
