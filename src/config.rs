use std::fmt;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

// CLI argument structure; every flag falls back to an env var, then a default
#[derive(Parser, Debug, Clone)]
#[command(name = "calc-api")]
#[command(about = "Stateless HTTP calculator API", version)]
pub struct Config {
    // Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Max time to read a request body
    #[arg(long, env = "READ_TIMEOUT", default_value = "10s", value_parser = humantime::parse_duration)]
    pub read_timeout: Duration,

    #[arg(long, env = "WRITE_TIMEOUT", default_value = "10s", value_parser = humantime::parse_duration)]
    pub write_timeout: Duration,

    #[arg(long, env = "IDLE_TIMEOUT", default_value = "120s", value_parser = humantime::parse_duration)]
    pub idle_timeout: Duration,

    // How long to wait for in-flight requests on shutdown
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value = "15s", value_parser = humantime::parse_duration)]
    pub shutdown_timeout: Duration,

    // Per-request processing deadline
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "30s", value_parser = humantime::parse_duration)]
    pub request_timeout: Duration,

    // Sustained requests per minute per client
    #[arg(long, env = "RATE_LIMIT_RPM", default_value_t = 100.0)]
    pub rate_limit_rpm: f64,

    // Bucket capacity per client
    #[arg(long, env = "RATE_LIMIT_BURST", default_value_t = 20)]
    pub rate_limit_burst: u32,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,
    #[error("{name} must be positive")]
    NonPositiveDuration { name: &'static str },
    #[error("rate limit rpm must be a positive number, got {0}")]
    InvalidRate(f64),
    #[error("rate limit burst must be positive")]
    ZeroBurst,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(120),
            shutdown_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(30),
            rate_limit_rpm: 100.0,
            rate_limit_burst: 20,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        for (name, value) in [
            ("read timeout", self.read_timeout),
            ("write timeout", self.write_timeout),
            ("idle timeout", self.idle_timeout),
            ("shutdown timeout", self.shutdown_timeout),
            ("request timeout", self.request_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::NonPositiveDuration { name });
            }
        }

        if !self.rate_limit_rpm.is_finite() || self.rate_limit_rpm <= 0.0 {
            return Err(ConfigError::InvalidRate(self.rate_limit_rpm));
        }
        if self.rate_limit_burst == 0 {
            return Err(ConfigError::ZeroBurst);
        }
        Ok(())
    }
}
