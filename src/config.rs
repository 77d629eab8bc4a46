// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    /// Directory for the daily rolling log file.
    pub log_dir: String,
    /// Upper bound on request bodies, checked before any sanitizing.
    pub max_body_bytes: usize,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Reads the configuration from the environment (and `.env`).
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.bind_addr);

        let rust_log = env::var("RUST_LOG").unwrap_or(defaults.rust_log);

        let log_dir = env::var("LOG_DIR").unwrap_or(defaults.log_dir);

        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_body_bytes);

        let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or(defaults.allowed_origins);

        Self {
            bind_addr,
            rust_log,
            log_dir,
            max_body_bytes,
            allowed_origins,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000))),
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
