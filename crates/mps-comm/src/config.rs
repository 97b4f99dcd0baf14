//! Station configuration
//!
//! Loaded from a JSON document, by default
//! `<config dir>/mps-comm/stations.json`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mps_protocol::StationKind;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::transport::Endpoint;

/// Highest logical address, the unit id is a single byte
pub const MAX_UNIT_ID: u16 = 255;

/// Reconnect backoff settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,
    /// Upper bound for the delay
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
    /// Growth factor per failed attempt
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Random spread applied to each delay (0.0 - 1.0)
    #[serde(default)]
    pub jitter: f64,
    /// Failed attempts in a row before the station is reported degraded
    #[serde(default = "default_degraded_after")]
    pub degraded_after: u32,
}

fn default_initial_ms() -> u64 {
    200
}

fn default_max_ms() -> u64 {
    5000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_degraded_after() -> u32 {
    5
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
            multiplier: default_multiplier(),
            jitter: 0.0,
            degraded_after: default_degraded_after(),
        }
    }
}

/// One configured station
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationConfig {
    /// Display name, e.g. "C-BS"
    pub name: String,
    /// Station kind
    pub kind: StationKind,
    /// Host name or IP address
    pub host: String,
    /// Modbus TCP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Logical station address (unit id and receiver word)
    pub address: u16,
}

fn default_port() -> u16 {
    502
}

impl StationConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port, self.address)
    }
}

/// Communication settings and the station list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommConfig {
    /// Sender address written into every command frame
    #[serde(default)]
    pub controller_address: u16,
    /// Bound for every network call
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
    /// Status poll period
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Pending requests per station before callers wait
    #[serde(default = "default_request_queue")]
    pub request_queue: usize,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    pub stations: Vec<StationConfig>,
}

fn default_io_timeout_ms() -> u64 {
    300
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_request_queue() -> usize {
    32
}

impl Default for CommConfig {
    fn default() -> Self {
        Self {
            controller_address: 0,
            io_timeout_ms: default_io_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            request_queue: default_request_queue(),
            reconnect: ReconnectConfig::default(),
            stations: Vec::new(),
        }
    }
}

impl CommConfig {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("mps-comm").join("stations.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a config document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CommConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject zero timeouts, an empty request queue and station addresses
    /// that are duplicated or do not fit a unit id
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("io_timeout_ms"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("poll_interval_ms"));
        }
        if self.reconnect.initial_ms == 0 {
            return Err(ConfigError::ZeroDuration("reconnect.initial_ms"));
        }
        if self.request_queue == 0 {
            return Err(ConfigError::ZeroValue("request_queue"));
        }

        let mut seen: HashMap<u16, &str> = HashMap::new();
        for station in &self.stations {
            if station.address > MAX_UNIT_ID {
                return Err(ConfigError::AddressOutOfRange {
                    name: station.name.clone(),
                    address: station.address,
                });
            }
            if let Some(first) = seen.insert(station.address, &station.name) {
                return Err(ConfigError::DuplicateAddress {
                    address: station.address,
                    first: first.to_string(),
                    second: station.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = CommConfig::from_json(
            r#"{ "stations": [
                { "name": "C-BS", "kind": "incoming_station", "host": "192.168.2.27", "address": 3 }
            ] }"#,
        )
        .unwrap();
        assert_eq!(config.io_timeout_ms, 300);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.reconnect.degraded_after, 5);
        assert_eq!(config.stations[0].kind, StationKind::IncomingStation);
        assert_eq!(config.stations[0].port, 502);
    }

    #[test]
    fn test_rejects_duplicate_address() {
        let err = CommConfig::from_json(
            r#"{ "stations": [
                { "name": "A", "kind": "band", "host": "a", "address": 1 },
                { "name": "B", "kind": "deliver", "host": "b", "address": 1 }
            ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateAddress { address: 1, .. }));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = CommConfig::from_json(r#"{ "io_timeout_ms": 0, "stations": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDuration("io_timeout_ms")));
    }

    #[test]
    fn test_rejects_empty_request_queue() {
        let err = CommConfig::from_json(r#"{ "request_queue": 0, "stations": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroValue("request_queue")));
    }

    #[test]
    fn test_rejects_address_above_unit_id_range() {
        let err = CommConfig::from_json(
            r#"{ "stations": [ { "name": "C-RS2", "kind": "pick_place_2", "host": "a", "address": 256 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::AddressOutOfRange { address: 256, .. }
        ));

        let config = CommConfig::from_json(
            r#"{ "stations": [ { "name": "C-RS2", "kind": "pick_place_2", "host": "a", "address": 255 } ] }"#,
        )
        .unwrap();
        assert_eq!(config.stations[0].address, 255);
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let err = CommConfig::from_json(
            r#"{ "stations": [ { "name": "A", "kind": "robot", "host": "a", "address": 1 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
