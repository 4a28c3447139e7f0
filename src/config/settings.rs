//! Process configuration read from the environment (after `dotenvy`).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

/// What to do when a plugin constructor fails at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and continue without the plugin.
    #[default]
    Skip,
    /// Fail startup.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(format!("expected 'skip' or 'abort', got '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub worker_threads: usize,
    /// Unset selects the in-memory store.
    pub database_url: Option<String>,
    pub schema: String,
    pub db_max_connections: u32,
    pub body_limit_bytes: usize,
    pub plugin_failure_policy: FailurePolicy,
    pub disabled_plugins: Vec<String>,
    pub seed_sample_data: bool,
    pub public_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            worker_threads: 10,
            database_url: None,
            schema: "microkernel".into(),
            db_max_connections: 5,
            body_limit_bytes: 1024 * 1024,
            plugin_failure_policy: FailurePolicy::Skip,
            disabled_plugins: Vec::new(),
            seed_sample_data: false,
            public_url: "http://localhost:8080".into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing or blank keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let worker_threads = parse_or(get("WORKER_THREADS"), "WORKER_THREADS", defaults.worker_threads)?;
        if worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "WORKER_THREADS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let disabled_plugins = get("DISABLED_PLUGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|name| name.trim().to_ascii_lowercase())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(AppConfig {
            bind_addr: parse_or(get("BIND_ADDR"), "BIND_ADDR", defaults.bind_addr)?,
            worker_threads,
            database_url: get("DATABASE_URL"),
            schema: get("MICROKERNEL_SCHEMA").unwrap_or(defaults.schema),
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            body_limit_bytes: parse_or(get("BODY_LIMIT_BYTES"), "BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
            plugin_failure_policy: parse_or(
                get("PLUGIN_FAILURE_POLICY"),
                "PLUGIN_FAILURE_POLICY",
                defaults.plugin_failure_policy,
            )?,
            disabled_plugins,
            seed_sample_data: parse_bool(get("SEED_SAMPLE_DATA"), "SEED_SAMPLE_DATA", defaults.seed_sample_data)?,
            public_url: get("PUBLIC_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_url),
        })
    }

    pub fn is_disabled(&self, plugin: &str) -> bool {
        self.disabled_plugins.iter().any(|name| name.eq_ignore_ascii_case(plugin))
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_bool(raw: Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected a boolean".into(),
        }),
    }
}
