use std::sync::{Arc, Mutex};

use mps_protocol::pick_place_2::{PickPlace2Command, PickPlace2Status};
use mps_protocol::{Lane, RingColor, StationCommand, StationKind, StationStatus};

use crate::error::StationError;
use crate::link::StationLink;

/// Ring station 2 (double pick & place)
///
/// Remembers the ring type of the last acknowledged `produce_ring` for
/// diagnostics. Clones share it.
#[derive(Debug, Clone)]
pub struct PickPlace2Handler {
    link: StationLink,
    last_ring: Arc<Mutex<Option<RingColor>>>,
}

impl PickPlace2Handler {
    pub(crate) fn new(link: StationLink) -> Self {
        Self {
            link,
            last_ring: Arc::new(Mutex::new(None)),
        }
    }

    pub fn link(&self) -> &StationLink {
        &self.link
    }

    /// Mount a ring of type `ring`
    pub async fn produce_ring(&self, ring: RingColor) -> Result<(), StationError> {
        self.link
            .send(StationCommand::PickPlace2(PickPlace2Command::ProduceRing {
                ring,
            }))
            .await?;
        *self
            .last_ring
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(ring);
        Ok(())
    }

    /// Whether a mounted ring is ready
    pub async fn ring_ready(&self) -> Result<bool, StationError> {
        Ok(matches!(
            self.link.status().await?,
            StationStatus::PickPlace2(PickPlace2Status::RingReady { ready: true, .. })
        ))
    }

    /// Whether feeder lane `lane` (1..=2) reports empty
    pub async fn is_empty(&self, lane: u16) -> Result<bool, StationError> {
        let lane = Lane::new(StationKind::PickPlace2, lane)?;
        Ok(matches!(
            self.link.status().await?,
            StationStatus::PickPlace2(PickPlace2Status::Empty { lane: l, empty: true })
                if l == lane
        ))
    }

    /// Ring type of the last acknowledged `produce_ring`
    pub fn last_ring(&self) -> Option<RingColor> {
        *self
            .last_ring
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
