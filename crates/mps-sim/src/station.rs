//! Virtual station simulation
//!
//! A [`VirtualStation`] holds the register memory of one station. Writes to
//! the command region are decoded and applied; reads from the status region
//! return the encoded status event. Production commands report `Busy` for a
//! configurable number of status reads before the completion event appears,
//! which is roughly how the PLC behaves while a workpiece is moving.

use std::time::Instant;

use mps_protocol::band::BandStatus;
use mps_protocol::delivery::{DeliverCommand, DeliverStatus};
use mps_protocol::incoming::{IncomingCommand, IncomingStatus};
use mps_protocol::pick_place_1::{PickPlace1Command, PickPlace1Status};
use mps_protocol::pick_place_2::{PickPlace2Command, PickPlace2Status};
use mps_protocol::{
    decode_command, encode_status, CommonCommand, CommonStatus, LightColor, LightState,
    ProtocolError, StationCommand, StationKind, StationStatus,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Error code reported after a command that could not be decoded
pub const ERR_BAD_COMMAND: u16 = 1;

/// Default number of `Busy` reads before a production command completes
pub const DEFAULT_SETTLE_READS: u32 = 2;

/// Configuration for creating a virtual station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualStationConfig {
    /// Display name
    pub name: String,
    /// Station kind
    pub kind: StationKind,
    /// Logical station address
    pub address: u16,
    /// Status reads reporting `Busy` before a production command completes
    #[serde(default = "default_settle_reads")]
    pub settle_reads: u32,
}

fn default_settle_reads() -> u32 {
    DEFAULT_SETTLE_READS
}

/// Light tower output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Light {
    pub state: LightState,
    pub seconds: u16,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    done: StationStatus,
    remaining: u32,
}

/// A simulated station backed by register memory
#[derive(Debug)]
pub struct VirtualStation {
    name: String,
    kind: StationKind,
    address: u16,
    settle_reads: u32,
    status: StationStatus,
    pending: Option<Pending>,
    /// Red, yellow, green
    lights: [Light; 3],
    identified: bool,
    commands: Vec<StationCommand>,
    last_change: Instant,
}

impl VirtualStation {
    /// Create an idle station
    pub fn new(name: impl Into<String>, kind: StationKind, address: u16) -> Self {
        Self {
            name: name.into(),
            kind,
            address,
            settle_reads: DEFAULT_SETTLE_READS,
            status: StationStatus::common(kind, CommonStatus::Idle),
            pending: None,
            lights: [Light::default(); 3],
            identified: false,
            commands: Vec::new(),
            last_change: Instant::now(),
        }
    }

    pub fn from_config(config: VirtualStationConfig) -> Self {
        let mut station = Self::new(config.name, config.kind, config.address);
        station.settle_reads = config.settle_reads;
        station
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StationKind {
        self.kind
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    /// Status event currently in the status region
    pub fn status(&self) -> StationStatus {
        self.status
    }

    /// Number of `Busy` reads before production commands complete
    pub fn set_settle_reads(&mut self, reads: u32) {
        self.settle_reads = reads;
    }

    /// Overwrite the status region
    ///
    /// Cancels a running production command. Returns `false`, leaving the
    /// station unchanged, if the event belongs to another station kind.
    pub fn set_status(&mut self, status: StationStatus) -> bool {
        if status.kind() != self.kind {
            warn!(
                "Virtual station {}: ignoring {} status",
                self.name,
                status.kind()
            );
            return false;
        }
        self.pending = None;
        self.update(status);
        true
    }

    /// Report a PLC error
    pub fn set_error(&mut self, code: u16) {
        self.pending = None;
        self.update(StationStatus::common(self.kind, CommonStatus::Error { code }));
    }

    /// Current output of one light
    pub fn light(&self, color: LightColor) -> Light {
        self.lights[light_index(color)]
    }

    /// Whether the station received an identify command
    pub fn identified(&self) -> bool {
        self.identified
    }

    /// Commands applied so far, oldest first
    pub fn commands(&self) -> &[StationCommand] {
        &self.commands
    }

    /// Take and clear the applied command log
    pub fn take_commands(&mut self) -> Vec<StationCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Time of the last status change
    pub fn last_change(&self) -> Instant {
        self.last_change
    }

    /// Write words into the command region and apply the command they hold
    ///
    /// A frame that does not decode leaves an error event in the status
    /// region and is returned as an error.
    pub fn write_registers(
        &mut self,
        start: u16,
        words: &[u16],
    ) -> Result<StationCommand, ProtocolError> {
        let layout = self.kind.layout();
        if start != layout.command_start {
            self.set_error(ERR_BAD_COMMAND);
            return Err(ProtocolError::MalformedPayload(format!(
                "command written at register {start}, expected {}",
                layout.command_start
            )));
        }

        match decode_command(self.kind, words) {
            Ok((_, cmd)) => {
                self.apply(cmd);
                Ok(cmd)
            }
            Err(e) => {
                warn!("Virtual station {}: rejected command: {}", self.name, e);
                self.set_error(ERR_BAD_COMMAND);
                Err(e)
            }
        }
    }

    /// Read `count` words of the status region starting at `start`
    ///
    /// Each read advances a running production command. Words outside the
    /// status region read as zero.
    pub fn read_registers(&mut self, start: u16, count: u16) -> Vec<u16> {
        if let Some(mut pending) = self.pending.take() {
            if pending.remaining == 0 {
                self.update(pending.done);
            } else {
                pending.remaining -= 1;
                self.pending = Some(pending);
            }
        }

        let frame = encode_status(&self.status);
        let offset = start.wrapping_sub(self.kind.layout().status_start) as usize;
        (0..count as usize)
            .map(|i| frame.get(offset + i).copied().unwrap_or(0))
            .collect()
    }

    fn apply(&mut self, cmd: StationCommand) {
        debug!("Virtual station {} applying {:?}", self.name, cmd);
        self.commands.push(cmd);

        if let Some(common) = cmd.as_common() {
            match common {
                CommonCommand::Reset => {
                    self.pending = None;
                    self.update(StationStatus::common(self.kind, CommonStatus::Idle));
                }
                CommonCommand::Identify => self.identified = true,
                CommonCommand::SetLight {
                    color,
                    state,
                    seconds,
                } => self.lights[light_index(color)] = Light { state, seconds },
                CommonCommand::ResetLights => self.lights = [Light::default(); 3],
            }
            return;
        }

        if let Some(done) = completion(&cmd) {
            self.update(StationStatus::common(self.kind, CommonStatus::Busy));
            self.pending = Some(Pending {
                done,
                remaining: self.settle_reads,
            });
        }
    }

    fn update(&mut self, status: StationStatus) {
        if self.status != status {
            self.status = status;
            self.last_change = Instant::now();
        }
    }

    /// Get a summary of current state
    pub fn state_summary(&self) -> String {
        format!(
            "{} ({} @ {}) - {:?}",
            self.name, self.kind, self.address, self.status
        )
    }
}

fn light_index(color: LightColor) -> usize {
    match color {
        LightColor::Red => 0,
        LightColor::Yellow => 1,
        LightColor::Green => 2,
    }
}

/// Event a production command ends with
fn completion(cmd: &StationCommand) -> Option<StationStatus> {
    let done = match cmd {
        StationCommand::Band(_) => StationStatus::Band(BandStatus::Ready { ready: true }),
        StationCommand::Deliver(DeliverCommand::Deliver { lane }) => {
            StationStatus::Deliver(DeliverStatus::Delivered {
                lane: *lane,
                delivered: true,
            })
        }
        StationCommand::IncomingStation(IncomingCommand::GetCap { color, side }) => {
            StationStatus::IncomingStation(IncomingStatus::CapReady {
                color: *color,
                side: *side,
                ready: true,
            })
        }
        StationCommand::PickPlace1(PickPlace1Command::ProduceEnd) => {
            StationStatus::PickPlace1(PickPlace1Status::Ready { ready: true })
        }
        StationCommand::PickPlace2(PickPlace2Command::ProduceRing { ring }) => {
            StationStatus::PickPlace2(PickPlace2Status::RingReady {
                ring: *ring,
                ready: true,
            })
        }
        _ => return None,
    };
    Some(done)
}
