//! Configuration loading: YAML file, then environment overrides.

use super::types::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taskboard.yaml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TASKBOARD_CONFIG_PATH";

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the config file, load it (or defaults), then apply environment overrides.
    ///
    /// An explicitly named file must exist; the implicit `taskboard.yaml` is optional.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::load(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `TASKBOARD_*` overrides read through `lookup`.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TASKBOARD_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }

        override_parsed(&lookup, "TASKBOARD_HOST", &mut self.server.host);
        override_parsed(&lookup, "TASKBOARD_PORT", &mut self.server.port);
        override_parsed(&lookup, "TASKBOARD_ROUTES", &mut self.server.routes);
        override_parsed(&lookup, "TASKBOARD_STARTUP_MODE", &mut self.readiness.mode);
        override_parsed(&lookup, "TASKBOARD_READY_ATTEMPTS", &mut self.readiness.attempts);
        override_parsed(&lookup, "TASKBOARD_READY_DELAY_MS", &mut self.readiness.delay_ms);
        override_parsed(&lookup, "TASKBOARD_ON_EXHAUSTED", &mut self.readiness.on_exhausted);
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.database.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(e) => warn!(key, value = %raw, error = %e, "Ignoring invalid environment override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExhaustedPolicy, RouteLayout, StartupMode};
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.routes, RouteLayout::Root);
        assert_eq!(config.readiness.mode, StartupMode::Retry);
        assert_eq!(config.readiness.attempts, 10);
        assert_eq!(config.readiness.delay_ms, 2000);
        assert_eq!(config.readiness.on_exhausted, ExhaustedPolicy::Proceed);
        assert_eq!(config.database.path, PathBuf::from("taskboard.db"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("TASKBOARD_DB_PATH", "/tmp/x/tasks.db"),
            ("TASKBOARD_PORT", "9090"),
            ("TASKBOARD_ROUTES", "main"),
            ("TASKBOARD_STARTUP_MODE", "once"),
            ("TASKBOARD_READY_ATTEMPTS", "3"),
            ("TASKBOARD_ON_EXHAUSTED", "FAIL"),
        ]));

        assert_eq!(config.database.path, PathBuf::from("/tmp/x/tasks.db"));
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.routes, RouteLayout::Main);
        assert_eq!(config.readiness.mode, StartupMode::Once);
        assert_eq!(config.readiness.attempts, 3);
        assert_eq!(config.readiness.on_exhausted, ExhaustedPolicy::Fail);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("TASKBOARD_PORT", "not-a-port"),
            ("TASKBOARD_ROUTES", "sideways"),
        ]));

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.routes, RouteLayout::Root);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 8123\n  routes: main\nreadiness:\n  attempts: 4\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.routes, RouteLayout::Main);
        assert_eq!(config.readiness.attempts, 4);
        assert_eq!(config.readiness.delay_ms, 2000);
        assert_eq!(config.database.path, PathBuf::from("taskboard.db"));
    }

    #[test]
    fn ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.database.path = dir.path().join("nested/deeper/tasks.db");

        config.ensure_db_dir().unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
    }
}
