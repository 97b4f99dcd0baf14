//! Handler side of a station worker
//!
//! A [`StationLink`] is a cheap, cloneable handle: it queues register requests
//! to the worker and waits for the reply. It also carries the commands every
//! station kind understands.

use std::time::Duration;

use mps_protocol::{
    decode_status, encode_command, ArgumentError, CommonCommand, LightColor, LightState,
    MessageHeader, StationCommand, StationKind, StationStatus,
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::debug;

use crate::connection::ConnectionState;
use crate::error::StationError;
use crate::events::StationEvent;
use crate::worker::Request;

/// Queue handle into one station worker
#[derive(Debug, Clone)]
pub struct StationLink {
    kind: StationKind,
    address: u16,
    controller: u16,
    requests: mpsc::Sender<Request>,
    state: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<StationEvent>,
}

impl StationLink {
    pub(crate) fn new(
        kind: StationKind,
        address: u16,
        controller: u16,
        requests: mpsc::Sender<Request>,
        state: watch::Receiver<ConnectionState>,
        events: broadcast::Sender<StationEvent>,
    ) -> Self {
        Self {
            kind,
            address,
            controller,
            requests,
            state,
            events,
        }
    }

    /// Station kind behind this link
    pub fn kind(&self) -> StationKind {
        self.kind
    }

    /// Logical station address
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Current connection state, without a round trip to the worker
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state changes
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Subscribe to polled status and lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<StationEvent> {
        self.events.subscribe()
    }

    fn header(&self) -> MessageHeader {
        MessageHeader::new(self.controller, self.address)
    }

    /// Encode and write a command; resolves once the transport acknowledged
    /// the write
    pub async fn send(&self, cmd: StationCommand) -> Result<(), StationError> {
        if cmd.kind() != self.kind {
            return Err(StationError::WrongKind {
                expected: cmd.kind(),
                actual: self.kind,
            });
        }
        let words = encode_command(&cmd, &self.header());
        debug!("Station {}: sending {:?}", self.address, cmd);
        self.write(self.kind.layout().command_start, words).await
    }

    /// Read and decode the status region
    pub async fn status(&self) -> Result<StationStatus, StationError> {
        let layout = self.kind.layout();
        let words = self
            .read(layout.status_start, layout.status_len() as u16)
            .await?;
        Ok(decode_status(self.kind, &words)?)
    }

    /// Return the station to idle
    pub async fn reset(&self) -> Result<(), StationError> {
        self.send_common(CommonCommand::Reset).await
    }

    /// Announce the station type to the PLC
    pub async fn identify(&self) -> Result<(), StationError> {
        self.send_common(CommonCommand::Identify).await
    }

    /// Set one light of the light tower
    ///
    /// `duration` is rounded down to whole seconds; zero keeps the light in
    /// the requested state until changed.
    pub async fn set_light(
        &self,
        color: LightColor,
        state: LightState,
        duration: Duration,
    ) -> Result<(), StationError> {
        let secs = duration.as_secs();
        let seconds = u16::try_from(secs).map_err(|_| ArgumentError::InvalidDuration(secs))?;
        self.send_common(CommonCommand::SetLight {
            color,
            state,
            seconds,
        })
        .await
    }

    /// Switch all lights off
    pub async fn reset_lights(&self) -> Result<(), StationError> {
        self.send_common(CommonCommand::ResetLights).await
    }

    async fn send_common(&self, cmd: CommonCommand) -> Result<(), StationError> {
        self.send(StationCommand::common(self.kind, cmd)).await
    }

    async fn write(&self, start: u16, words: Vec<u16>) -> Result<(), StationError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request::Write { start, words, reply })
            .await
            .map_err(|_| StationError::Closed)?;
        rx.await.map_err(|_| StationError::Closed)?
    }

    async fn read(&self, start: u16, count: u16) -> Result<Vec<u16>, StationError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request::Read {
                start,
                count,
                reply,
            })
            .await
            .map_err(|_| StationError::Closed)?;
        rx.await.map_err(|_| StationError::Closed)?
    }
}
