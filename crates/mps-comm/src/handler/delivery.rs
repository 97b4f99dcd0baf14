use mps_protocol::delivery::{DeliverCommand, DeliverStatus};
use mps_protocol::{Lane, StationCommand, StationKind, StationStatus};

use crate::error::StationError;
use crate::link::StationLink;

/// Delivery station
#[derive(Debug, Clone)]
pub struct DeliverHandler {
    link: StationLink,
}

impl DeliverHandler {
    pub(crate) fn new(link: StationLink) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &StationLink {
        &self.link
    }

    /// Open delivery lane `lane` (1..=3)
    pub async fn deliver(&self, lane: u16) -> Result<(), StationError> {
        let lane = Lane::new(StationKind::Deliver, lane)?;
        self.link
            .send(StationCommand::Deliver(DeliverCommand::Deliver { lane }))
            .await
    }

    /// Whether the station reports a completed delivery
    pub async fn is_delivered(&self) -> Result<bool, StationError> {
        Ok(matches!(
            self.link.status().await?,
            StationStatus::Deliver(DeliverStatus::Delivered {
                delivered: true,
                ..
            })
        ))
    }
}
