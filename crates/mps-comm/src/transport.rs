//! Register transport seam
//!
//! A [`Connector`] opens a [`RegisterTransport`] to one station endpoint. The
//! production implementation is Modbus TCP ([`crate::modbus`]); tests and the
//! simulator plug in-process fakes in here.

use async_trait::async_trait;

use crate::error::CommError;

/// Network location and logical address of one station
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Host name or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Logical station address (Modbus unit id)
    pub address: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, address: u16) -> Self {
        Self {
            host: host.into(),
            port,
            address,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} unit {}", self.host, self.port, self.address)
    }
}

/// An open register-level link to one station
///
/// Calls are made by a single worker task at a time; implementations need not
/// guard against concurrent use.
#[async_trait]
pub trait RegisterTransport: Send {
    /// Write consecutive holding registers starting at `start`
    async fn write_registers(&mut self, start: u16, words: &[u16]) -> Result<(), CommError>;

    /// Read `count` consecutive input registers starting at `start`
    async fn read_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>, CommError>;

    /// Release the link; further calls are undefined
    async fn close(&mut self) {}
}

/// Opens transports to station endpoints
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RegisterTransport>, CommError>;
}
