//! Configuration module for Signalpost.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Path to the SQLite database file (default: "signalpost.db")
    pub db_path: String,
    /// Days to keep uptime logs; 0 disables the sweeper (default: 365)
    pub log_retention_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            db_path: "signalpost.db".to_string(),
            log_retention_days: 365,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SIGNALPOST_HTTP_PORT`: HTTP port (default: 8080)
    /// - `SIGNALPOST_DB_PATH`: Database file path (default: "signalpost.db")
    /// - `SIGNALPOST_LOG_RETENTION_DAYS`: uptime-log retention, 0 = off (default: 365)
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("SIGNALPOST_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Ok(db_path) = env::var("SIGNALPOST_DB_PATH") {
            cfg.db_path = db_path;
        }

        if let Ok(days_str) = env::var("SIGNALPOST_LOG_RETENTION_DAYS") {
            if let Ok(days) = days_str.parse() {
                cfg.log_retention_days = days;
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.db_path, "signalpost.db");
        assert_eq!(cfg.log_retention_days, 365);
    }
}
