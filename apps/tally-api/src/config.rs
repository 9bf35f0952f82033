//! Tally API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tally_core::receipt::{ReceiptLayout, MAX_RECEIPT_WIDTH, MIN_RECEIPT_WIDTH};
use tally_core::report::{offset_from_minutes, MAX_UTC_OFFSET_MINUTES};
use tally_db::DbConfig;

/// Tally API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Interface to bind (default: all interfaces)
    pub bind_addr: String,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Printed at the top of every receipt
    pub store_name: String,

    /// Prefix for amounts on receipts
    pub currency_symbol: String,

    /// Offset of the shop's local time from UTC, in minutes. Decides which
    /// calendar day a bill belongs to in reports and receipts.
    pub report_utc_offset_minutes: i32,

    /// Receipt width in characters
    pub receipt_width: usize,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            http_port: var("TALLY_HTTP_PORT", "8080")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TALLY_HTTP_PORT".to_string()))?,

            bind_addr: var("TALLY_BIND_ADDR", "0.0.0.0"),

            db_path: PathBuf::from(var("TALLY_DB_PATH", "./tally.db")),

            db_max_connections: var("TALLY_DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TALLY_DB_MAX_CONNECTIONS".to_string()))?,

            store_name: var("TALLY_STORE_NAME", "Tally Store"),

            currency_symbol: var("TALLY_CURRENCY_SYMBOL", "Rs."),

            report_utc_offset_minutes: var("TALLY_REPORT_UTC_OFFSET_MINUTES", "0")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TALLY_REPORT_UTC_OFFSET_MINUTES".to_string()))?,

            receipt_width: var("TALLY_RECEIPT_WIDTH", "42")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TALLY_RECEIPT_WIDTH".to_string()))?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::OutOfRange {
                key: "TALLY_DB_MAX_CONNECTIONS".to_string(),
                min: 1,
                max: i64::from(u32::MAX),
            });
        }

        if config.report_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::OutOfRange {
                key: "TALLY_REPORT_UTC_OFFSET_MINUTES".to_string(),
                min: -i64::from(MAX_UTC_OFFSET_MINUTES),
                max: i64::from(MAX_UTC_OFFSET_MINUTES),
            });
        }

        if !(MIN_RECEIPT_WIDTH..=MAX_RECEIPT_WIDTH).contains(&config.receipt_width) {
            return Err(ConfigError::OutOfRange {
                key: "TALLY_RECEIPT_WIDTH".to_string(),
                min: MIN_RECEIPT_WIDTH as i64,
                max: MAX_RECEIPT_WIDTH as i64,
            });
        }

        if config.store_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("TALLY_STORE_NAME".to_string()));
        }

        Ok(config)
    }

    /// Socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_BIND_ADDR".to_string()))
    }

    /// Pool configuration for the database file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.db_max_connections)
    }

    /// Reporting offset as a chrono offset.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        offset_from_minutes(self.report_utc_offset_minutes)
            .map_err(|_| ConfigError::InvalidValue("TALLY_REPORT_UTC_OFFSET_MINUTES".to_string()))
    }

    /// Receipt layout for this shop.
    pub fn receipt_layout(&self) -> Result<ReceiptLayout, ConfigError> {
        Ok(ReceiptLayout {
            store_name: self.store_name.clone(),
            currency_symbol: self.currency_symbol.clone(),
            width: self.receipt_width,
            utc_offset: self.utc_offset()?,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("{key} must be between {min} and {max}")]
    OutOfRange { key: String, min: i64, max: i64 },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.db_path, PathBuf::from("./tally.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.currency_symbol, "Rs.");
        assert_eq!(config.receipt_width, 42);
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TALLY_HTTP_PORT", "9000"),
            ("TALLY_BIND_ADDR", "127.0.0.1"),
            ("TALLY_STORE_NAME", "Corner Shop"),
            ("TALLY_REPORT_UTC_OFFSET_MINUTES", "300"),
            ("TALLY_RECEIPT_WIDTH", "32"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
        let layout = config.receipt_layout().unwrap();
        assert_eq!(layout.store_name, "Corner Shop");
        assert_eq!(layout.width, 32);
        assert_eq!(layout.utc_offset.local_minus_utc(), 5 * 3600);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("TALLY_HTTP_PORT", "eighty")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("TALLY_REPORT_UTC_OFFSET_MINUTES", "900")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            load(&[("TALLY_RECEIPT_WIDTH", "10")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            load(&[("TALLY_DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            load(&[("TALLY_STORE_NAME", "  ")]),
            Err(ConfigError::MissingRequired(_))
        ));
    }
}
