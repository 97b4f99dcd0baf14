//! Error types for station communication

use std::time::Duration;

use mps_protocol::{ArgumentError, ProtocolError, StationKind};
use thiserror::Error;

use crate::handle::ConnectionHandle;

/// Transport level failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommError {
    /// The station refused or could not be reached
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// A network call exceeded the I/O timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Any other transport failure
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// Register I/O attempted while the connection is not established
    #[error("connection is not established")]
    NotConnected,

    /// The connection is being re-established; retry later
    #[error("station is unavailable while reconnecting")]
    Unavailable,
}

impl CommError {
    /// Whether the error must fault the connection
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CommError::ConnectionRefused(_) | CommError::Timeout(_) | CommError::IoFailure(_)
        )
    }
}

impl From<std::io::Error> for CommError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::ConnectionRefused | ErrorKind::AddrNotAvailable | ErrorKind::NotFound => {
                CommError::ConnectionRefused(e.to_string())
            }
            ErrorKind::TimedOut => CommError::Timeout(Duration::ZERO),
            _ => CommError::IoFailure(e.to_string()),
        }
    }
}

/// Errors returned by station handlers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StationError {
    /// Transport failure or station unavailable
    #[error(transparent)]
    Comm(#[from] CommError),

    /// Status region could not be decoded
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Argument outside the station's legal domain
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// Handler of a different station kind was requested
    #[error("station is a {actual}, not a {expected}")]
    WrongKind {
        expected: StationKind,
        actual: StationKind,
    },

    /// The station worker has shut down
    #[error("station connection is closed")]
    Closed,
}

/// Errors from the device registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No record for this handle or address
    #[error("station not found")]
    NotFound,

    /// Logical station address already bound
    #[error("station address {0} is already registered")]
    DuplicateAddress(u16),

    /// Connection handle already bound
    #[error("connection handle {0} is already registered")]
    DuplicateHandle(ConnectionHandle),
}

/// Errors while loading the station configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the schema
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// Two stations share a logical address
    #[error("stations '{first}' and '{second}' share address {address}")]
    DuplicateAddress {
        address: u16,
        first: String,
        second: String,
    },

    /// A timeout or interval is zero
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// A count or capacity is zero
    #[error("{0} must be at least 1")]
    ZeroValue(&'static str),

    /// Logical address does not fit a Modbus unit id
    #[error("station '{name}' has address {address}, the maximum is 255")]
    AddressOutOfRange { name: String, address: u16 },

    /// No platform config directory
    #[error("could not determine the config directory")]
    NoConfigDir,
}
