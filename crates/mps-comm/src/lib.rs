//! MPS Station Communication
//!
//! This crate keeps a reliable command/status channel open to every MPS
//! production station and provides a directory to find stations by identity.
//!
//! # Architecture
//!
//! - [`DeviceRegistry`]: bound stations by connection handle and logical address
//! - [`StationConnection`]: one transport endpoint and its connect/reconnect
//!   state machine
//! - [`StationWorker`]: one tokio task per connection serving requests in
//!   submission order, polling status and reconnecting with backoff
//! - [`StationHandler`]: typed command/status methods per station kind, talking
//!   to the worker through a cloneable [`StationLink`]
//! - [`Supervisor`]: binds configured stations and shuts them down
//!
//! Register I/O goes through the [`RegisterTransport`] and [`Connector`] traits;
//! [`ModbusTcpConnector`] is the production implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mps_comm::{CommConfig, DeviceRegistry, ModbusTcpConnector, Supervisor};
//! use mps_protocol::{Side, WorkpieceColor};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CommConfig::load(&CommConfig::default_path()?)?;
//! let registry = Arc::new(DeviceRegistry::new());
//! let supervisor = Supervisor::new(registry.clone(), Arc::new(ModbusTcpConnector), config)?;
//! supervisor.bind_all()?;
//!
//! let record = registry.lookup_by_address(3)?;
//! let incoming = record.handler.as_incoming()?;
//! incoming.get_cap(WorkpieceColor::Red, Side::Left).await?;
//! if incoming.cap_ready().await? {
//!     println!("cap ready");
//! }
//!
//! supervisor.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod handle;
pub mod handler;
pub mod link;
pub mod modbus;
pub mod reconnect;
pub mod registry;
pub mod supervisor;
pub mod transport;
pub mod worker;

pub use config::{CommConfig, ReconnectConfig, StationConfig};
pub use connection::{ConnectionState, StationConnection};
pub use error::{CommError, ConfigError, RegistryError, StationError};
pub use events::StationEvent;
pub use handle::ConnectionHandle;
pub use handler::{
    BandHandler, DeliverHandler, IncomingHandler, PickPlace1Handler, PickPlace2Handler,
    StationHandler,
};
pub use link::StationLink;
pub use modbus::{ModbusTcpConnector, ModbusTcpTransport};
pub use reconnect::ReconnectPolicy;
pub use registry::{DeviceRecord, DeviceRegistry};
pub use supervisor::Supervisor;
pub use transport::{Connector, Endpoint, RegisterTransport};
pub use worker::{StationTask, StationWorker};
