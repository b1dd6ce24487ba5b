//! Server configuration from environment.

use std::env;
use std::path::PathBuf;

use campus_core::{SearchLimits, DEFAULT_MAX_SETTLED_NODES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub admin_token: String,
    pub max_settled_nodes: usize,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("CAMPUS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            data_dir: env::var("CAMPUS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            admin_token: env::var("CAMPUS_ADMIN_TOKEN")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            max_settled_nodes: env::var("CAMPUS_MAX_SETTLED_NODES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_SETTLED_NODES),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_settled_nodes: self.max_settled_nodes,
        }
    }
}
