//! Station event stream
//!
//! Every station worker publishes its lifecycle and polled status on a
//! broadcast channel. Handlers hand out receivers through `subscribe()`.

use mps_protocol::{ProtocolError, StationStatus};

use crate::connection::ConnectionState;

/// Event published by a station worker
#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    /// The connection changed state
    StateChanged {
        /// Logical station address
        address: u16,
        /// New state
        state: ConnectionState,
    },

    /// A poll decoded a status different from the previous one
    Status {
        /// Logical station address
        address: u16,
        /// Decoded status event
        status: StationStatus,
    },

    /// A poll read a status region that could not be decoded
    StatusUnknown {
        /// Logical station address
        address: u16,
        /// Why decoding failed
        error: ProtocolError,
    },

    /// Reconnecting failed repeatedly; reported once per outage
    Degraded {
        /// Logical station address
        address: u16,
        /// Failed attempts in a row
        attempts: u32,
    },
}

impl StationEvent {
    /// Logical address of the station that published the event
    pub fn address(&self) -> u16 {
        match self {
            StationEvent::StateChanged { address, .. }
            | StationEvent::Status { address, .. }
            | StationEvent::StatusUnknown { address, .. }
            | StationEvent::Degraded { address, .. } => *address,
        }
    }
}
