use mps_protocol::band::{BandCommand, BandStatus};
use mps_protocol::{StationCommand, StationStatus};

use crate::error::StationError;
use crate::link::StationLink;

/// Conveyor band
#[derive(Debug, Clone)]
pub struct BandHandler {
    link: StationLink,
}

impl BandHandler {
    pub(crate) fn new(link: StationLink) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &StationLink {
        &self.link
    }

    /// Move the workpiece to the output
    pub async fn run(&self) -> Result<(), StationError> {
        self.link.send(StationCommand::Band(BandCommand::Run)).await
    }

    /// Whether a workpiece waits at the output
    pub async fn is_ready(&self) -> Result<bool, StationError> {
        Ok(matches!(
            self.link.status().await?,
            StationStatus::Band(BandStatus::Ready { ready: true })
        ))
    }
}
