//! Server settings read from the environment.

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Include handler error text in 500 bodies.
    pub verbose_errors: bool,
    pub body_limit: usize,
    pub request_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "0.0.0.0".into(),
            port: 3000,
            verbose_errors: false,
            body_limit: DEFAULT_BODY_LIMIT,
            request_timeout: None,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Settings(format!("{} must be a boolean, got '{}'", key, value))),
    }
}

fn parse_num<N: std::str::FromStr>(key: &str, value: &str, what: &str) -> Result<N, ConfigError> {
    value
        .trim()
        .parse::<N>()
        .map_err(|_| ConfigError::Settings(format!("{} must be {}, got '{}'", key, what, value)))
}

impl Settings {
    /// Reads `FLUENT_*` variables; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();
        if let Some(host) = lookup("FLUENT_HOST") {
            settings.host = host;
        }
        if let Some(port) = lookup("FLUENT_PORT") {
            settings.port = parse_num("FLUENT_PORT", &port, "a port number (0-65535)")?;
        }
        if let Some(verbose) = lookup("FLUENT_VERBOSE_ERRORS") {
            settings.verbose_errors = parse_bool("FLUENT_VERBOSE_ERRORS", &verbose)?;
        }
        if let Some(limit) = lookup("FLUENT_BODY_LIMIT") {
            settings.body_limit = parse_num("FLUENT_BODY_LIMIT", &limit, "a byte count")?;
        }
        if let Some(secs) = lookup("FLUENT_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_num("FLUENT_REQUEST_TIMEOUT_SECS", &secs, "whole seconds")?;
            settings.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(settings)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Settings loaded:");
        tracing::info!("  Listening on: {}", self.bind_addr());
        tracing::info!("  Verbose errors: {}", self.verbose_errors);
        tracing::info!("  Body limit: {} bytes", self.body_limit);
        match self.request_timeout {
            Some(t) => tracing::info!("  Request timeout: {}s", t.as_secs()),
            None => tracing::info!("  Request timeout: disabled"),
        }
    }
}
