//! Typed station handlers
//!
//! A [`StationHandler`] binds one station link to the command and status
//! contract of its kind. The variant is chosen when the station is bound and
//! never changes; rebinding means unregistering and registering again.
//!
//! Command methods validate their arguments before any I/O and resolve once
//! the transport acknowledged the write. Status methods read the status region
//! and interpret what the station reports; a station reporting a different
//! event yields `false`.

mod band;
mod delivery;
mod incoming;
mod pick_place_1;
mod pick_place_2;

pub use band::BandHandler;
pub use delivery::DeliverHandler;
pub use incoming::IncomingHandler;
pub use pick_place_1::PickPlace1Handler;
pub use pick_place_2::PickPlace2Handler;

use mps_protocol::StationKind;

use crate::error::StationError;
use crate::link::StationLink;

/// Handler for one bound station, by kind
#[derive(Debug, Clone)]
pub enum StationHandler {
    Band(BandHandler),
    Deliver(DeliverHandler),
    IncomingStation(IncomingHandler),
    PickPlace1(PickPlace1Handler),
    PickPlace2(PickPlace2Handler),
}

impl StationHandler {
    /// Bind a link to the handler matching its station kind
    pub fn bind(link: StationLink) -> Self {
        match link.kind() {
            StationKind::Band => StationHandler::Band(BandHandler::new(link)),
            StationKind::Deliver => StationHandler::Deliver(DeliverHandler::new(link)),
            StationKind::IncomingStation => {
                StationHandler::IncomingStation(IncomingHandler::new(link))
            }
            StationKind::PickPlace1 => StationHandler::PickPlace1(PickPlace1Handler::new(link)),
            StationKind::PickPlace2 => StationHandler::PickPlace2(PickPlace2Handler::new(link)),
        }
    }

    /// Station kind of the bound station
    pub fn kind(&self) -> StationKind {
        self.link().kind()
    }

    /// Link for the commands and status every kind supports
    pub fn link(&self) -> &StationLink {
        match self {
            StationHandler::Band(h) => h.link(),
            StationHandler::Deliver(h) => h.link(),
            StationHandler::IncomingStation(h) => h.link(),
            StationHandler::PickPlace1(h) => h.link(),
            StationHandler::PickPlace2(h) => h.link(),
        }
    }

    fn wrong_kind(&self, expected: StationKind) -> StationError {
        StationError::WrongKind {
            expected,
            actual: self.kind(),
        }
    }

    pub fn as_band(&self) -> Result<&BandHandler, StationError> {
        match self {
            StationHandler::Band(h) => Ok(h),
            _ => Err(self.wrong_kind(StationKind::Band)),
        }
    }

    pub fn as_deliver(&self) -> Result<&DeliverHandler, StationError> {
        match self {
            StationHandler::Deliver(h) => Ok(h),
            _ => Err(self.wrong_kind(StationKind::Deliver)),
        }
    }

    pub fn as_incoming(&self) -> Result<&IncomingHandler, StationError> {
        match self {
            StationHandler::IncomingStation(h) => Ok(h),
            _ => Err(self.wrong_kind(StationKind::IncomingStation)),
        }
    }

    pub fn as_pick_place_1(&self) -> Result<&PickPlace1Handler, StationError> {
        match self {
            StationHandler::PickPlace1(h) => Ok(h),
            _ => Err(self.wrong_kind(StationKind::PickPlace1)),
        }
    }

    pub fn as_pick_place_2(&self) -> Result<&PickPlace2Handler, StationError> {
        match self {
            StationHandler::PickPlace2(h) => Ok(h),
            _ => Err(self.wrong_kind(StationKind::PickPlace2)),
        }
    }
}
