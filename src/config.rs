//! Configuration module

use std::env;
use std::net::SocketAddr;

use crate::analysis::ClassifierOptions;

/// Default number of requests kept in history
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Upper bound on the configured history capacity
pub const MAX_HISTORY_CAPACITY: usize = 1000;

/// Default cap on inbound request bodies (2 MiB)
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum number of requests kept in history (1..=MAX_HISTORY_CAPACITY)
    pub history_capacity: usize,

    /// Bodies larger than this are recorded as if they had no body
    pub body_limit_bytes: usize,

    /// Keep full headers, body and query on every record
    pub retain_raw_payload: bool,

    /// Treat a JSON Slack envelope as official traffic even without signature headers
    pub trust_envelope_shape: bool,

    /// Log output format
    pub log_format: LogFormat,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST")
                .unwrap_or_else(|| "0.0.0.0".to_string()),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),

            history_capacity: lookup("HISTORY_CAPACITY")
                .and_then(|c| c.parse::<usize>().ok())
                .unwrap_or(DEFAULT_HISTORY_CAPACITY)
                .clamp(1, MAX_HISTORY_CAPACITY),

            body_limit_bytes: lookup("BODY_LIMIT_BYTES")
                .and_then(|b| b.parse::<usize>().ok())
                .filter(|b| *b > 0)
                .unwrap_or(DEFAULT_BODY_LIMIT_BYTES),

            retain_raw_payload: lookup("RETAIN_RAW_PAYLOAD")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),

            trust_envelope_shape: lookup("TRUST_ENVELOPE_SHAPE")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),

            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },

            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Socket address to bind the listener to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }

    /// Options handed to the source classifier
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            trust_envelope_shape: self.trust_envelope_shape,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
