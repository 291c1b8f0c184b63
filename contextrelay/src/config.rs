use serde::Deserialize;
use std::fs::File;
use webhook_router::config::{Config as RelayConfig, ValidationError};

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_level")]
    pub level: String,
    pub sentry_dsn: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            sentry_dsn: None,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub relay: Option<RelayConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    /// Takes the relay section, applies environment overrides and validates it.
    pub fn relay_config<F>(&mut self, env: F) -> Result<RelayConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut relay = self.relay.take().ok_or(ConfigError::MissingSection("relay"))?;
        relay.apply_env_overrides(env)?;
        relay.validate()?;
        Ok(relay)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("missing config section: {0}")]
    MissingSection(&'static str),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    const RELAY_YAML: &str = r#"
logging:
    level: debug
    sentry_dsn: "https://public@sentry.example.com/1"
metrics:
    statsd_host: 127.0.0.1
    statsd_port: 8125
relay:
    listener:
        host: 0.0.0.0
        port: 5000
    admin_listener:
        host: 127.0.0.1
        port: 5001
    timeouts:
        http_timeout_secs: 5
    github:
        owner: acme
        repo: relay
    openproject:
        url: "https://openproject.example.com"
        projects:
            Scrum project: 2
            Kanban: 7
    notifications:
        slack_webhook_url: "https://hooks.slack.com/services/T000/B000/XXXX"
    task_queue:
        url: "http://127.0.0.1:8000/tasks"
        capacity: 8
    backups:
        base_dir: /var/lib/contextrelay/output
"#;

    #[test]
    fn relay_config() {
        let tmp = write_tmp_file(RELAY_YAML);
        let mut config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.common.logging.level, "debug");
        assert!(config.common.logging.sentry_dsn.is_some());
        assert_eq!(config.common.metrics.as_ref().unwrap().statsd_port, 8125);

        let env = HashMap::from([("GITHUB_TOKEN", "ghp_env")]);
        let relay = config
            .relay_config(|name| env.get(name).map(|v| v.to_string()))
            .expect("relay config");

        assert_eq!(relay.listener.port, 5000);
        assert_eq!(relay.timeouts.http_timeout_secs, 5);
        assert_eq!(relay.github.token, "ghp_env");
        assert_eq!(relay.openproject.projects.get("Kanban"), Some(&7));
        assert_eq!(relay.task_queue.capacity, 8);
        assert_eq!(
            relay.backups.base_dir,
            std::path::PathBuf::from("/var/lib/contextrelay/output")
        );
    }

    #[test]
    fn common_config_defaults() {
        let tmp = write_tmp_file("relay: null\n");
        let mut config = Config::from_file(tmp.path()).expect("load config");
        assert_eq!(config.common.logging.level, "info");
        assert!(config.common.metrics.is_none());

        assert!(matches!(
            config.relay_config(|_| None),
            Err(ConfigError::MissingSection("relay"))
        ));
    }

    #[test]
    fn invalid_relay_config() {
        let tmp = write_tmp_file(&RELAY_YAML.replace("capacity: 8", "capacity: 0"));
        let mut config = Config::from_file(tmp.path()).expect("load config");
        assert!(matches!(
            config.relay_config(|_| None),
            Err(ConfigError::Invalid(ValidationError::InvalidQueueCapacity))
        ));
    }

    #[test]
    fn example_config_is_valid() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../example_config.yaml");
        let mut config = Config::from_file(&path).expect("load example config");
        let relay = config.relay_config(|_| None).expect("valid relay config");
        assert_eq!(relay.openproject.default_project, "Scrum project");
        assert_eq!(relay.dashboard.refresh_interval_secs, 60);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Config::from_file(std::path::Path::new("/nonexistent/contextrelay.yaml")),
            Err(ConfigError::LoadError(_))
        ));
    }
}
