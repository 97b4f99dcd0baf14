//! Modbus TCP transport
//!
//! Commands are sent with "write multiple registers" (FC16) into the holding
//! register command region, status is fetched with "read input registers"
//! (FC04). The logical station address is used as the unit id.

use async_trait::async_trait;
use tokio::net::lookup_host;
use tokio_modbus::client::{tcp, Context};
use tokio_modbus::prelude::*;
use tracing::{debug, trace};

use crate::error::CommError;
use crate::transport::{Connector, Endpoint, RegisterTransport};

/// Connector opening Modbus TCP sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct ModbusTcpConnector;

#[async_trait]
impl Connector for ModbusTcpConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RegisterTransport>, CommError> {
        let unit = u8::try_from(endpoint.address).map_err(|_| {
            CommError::ConnectionRefused(format!(
                "station address {} is not a valid unit id",
                endpoint.address
            ))
        })?;
        let addr = lookup_host((endpoint.host.as_str(), endpoint.port))
            .await?
            .next()
            .ok_or_else(|| {
                CommError::ConnectionRefused(format!("no address for host {}", endpoint.host))
            })?;

        debug!("Connecting to Modbus TCP station at {} (unit {})", addr, unit);
        let ctx = tcp::connect_slave(addr, Slave(unit)).await?;
        Ok(Box::new(ModbusTcpTransport { ctx: Some(ctx) }))
    }
}

/// Open Modbus TCP session to one station
pub struct ModbusTcpTransport {
    ctx: Option<Context>,
}

impl ModbusTcpTransport {
    fn ctx(&mut self) -> Result<&mut Context, CommError> {
        self.ctx.as_mut().ok_or(CommError::NotConnected)
    }
}

#[async_trait]
impl RegisterTransport for ModbusTcpTransport {
    async fn write_registers(&mut self, start: u16, words: &[u16]) -> Result<(), CommError> {
        trace!("FC16 write at {}: {:?}", start, words);
        self.ctx()?.write_multiple_registers(start, words).await?;
        Ok(())
    }

    async fn read_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>, CommError> {
        let words = self.ctx()?.read_input_registers(start, count).await?;
        trace!("FC04 read at {}: {:?}", start, words);
        Ok(words)
    }

    async fn close(&mut self) {
        // Dropping the context closes the TCP stream
        self.ctx = None;
    }
}
