//! MPS Station Simulation Library
//!
//! This crate provides virtual stations for exercising station communication
//! without a PLC. It includes:
//!
//! - **VirtualStation**: register memory of one station that decodes written
//!   commands and reports protocol-accurate status events
//! - **SimBus**: a set of virtual stations with failure injection, reachable
//!   through [`SimConnector`] wherever an `mps_comm::Connector` is expected
//!
//! # Example
//!
//! ```rust
//! use mps_sim::{SimBus, VirtualStation};
//! use mps_protocol::StationKind;
//!
//! let bus = SimBus::new();
//! bus.add_station(VirtualStation::new("C-BS", StationKind::IncomingStation, 3));
//!
//! // Hand `bus.connector()` to a supervisor instead of the Modbus connector
//! let _connector = bus.connector();
//! assert_eq!(bus.addresses(), vec![3]);
//! ```

pub mod bus;
pub mod station;

pub use bus::{SimBus, SimConnector, SimTransport};
pub use station::{Light, VirtualStation, VirtualStationConfig};
