use mps_protocol::incoming::{IncomingCommand, IncomingStatus};
use mps_protocol::{Side, StationCommand, StationStatus, WorkpieceColor};

use crate::error::StationError;
use crate::link::StationLink;

/// Incoming station (cap feeder)
#[derive(Debug, Clone)]
pub struct IncomingHandler {
    link: StationLink,
}

impl IncomingHandler {
    pub(crate) fn new(link: StationLink) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &StationLink {
        &self.link
    }

    /// Dispense a cap of `color` on `side`
    pub async fn get_cap(&self, color: WorkpieceColor, side: Side) -> Result<(), StationError> {
        self.link
            .send(StationCommand::IncomingStation(IncomingCommand::GetCap {
                color,
                side,
            }))
            .await
    }

    /// Whether a cap is ready for pickup
    pub async fn cap_ready(&self) -> Result<bool, StationError> {
        Ok(matches!(
            self.link.status().await?,
            StationStatus::IncomingStation(IncomingStatus::CapReady { ready: true, .. })
        ))
    }

    /// Whether the feeder for `color` reports empty
    pub async fn is_empty(&self, color: WorkpieceColor) -> Result<bool, StationError> {
        Ok(matches!(
            self.link.status().await?,
            StationStatus::IncomingStation(IncomingStatus::Empty { color: c, empty: true })
                if c == color
        ))
    }
}
