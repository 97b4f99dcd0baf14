use mps_protocol::pick_place_1::{PickPlace1Command, PickPlace1Status};
use mps_protocol::{StationCommand, StationStatus};

use crate::error::StationError;
use crate::link::StationLink;

/// Ring station 1 (single pick & place)
#[derive(Debug, Clone)]
pub struct PickPlace1Handler {
    link: StationLink,
}

impl PickPlace1Handler {
    pub(crate) fn new(link: StationLink) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &StationLink {
        &self.link
    }

    /// Place the end piece
    pub async fn produce_end(&self) -> Result<(), StationError> {
        self.link
            .send(StationCommand::PickPlace1(PickPlace1Command::ProduceEnd))
            .await
    }

    /// Whether the end piece feeder reports empty
    pub async fn is_empty(&self) -> Result<bool, StationError> {
        Ok(matches!(
            self.link.status().await?,
            StationStatus::PickPlace1(PickPlace1Status::Empty { empty: true })
        ))
    }

    /// Whether the product is ready
    pub async fn is_ready(&self) -> Result<bool, StationError> {
        Ok(matches!(
            self.link.status().await?,
            StationStatus::PickPlace1(PickPlace1Status::Ready { ready: true })
        ))
    }
}
