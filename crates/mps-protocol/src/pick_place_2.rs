//! Ring station 2 (double pick & place)
//!
//! Mounts a colored ring from one of two ring feeders. Reports when the ring
//! is mounted and when a feeder lane ran empty.

use crate::common::{CommonCommand, CommonStatus, SUB_STATUS_EVENT};
use crate::error::ProtocolError;
use crate::layout::RegisterLayout;
use crate::types::{flag, flag_to_word, word, Lane, RingColor};
use crate::{StationCodec, StationKind};

/// Register layout of ring station 2
pub const LAYOUT: RegisterLayout = RegisterLayout {
    command_start: 0,
    command_payload: 2,
    status_start: 0,
    status_payload: 2,
};

/// Produce-ring sub code
pub const SUB_PRODUCE_RING: u16 = 3;
/// Ring ready status sub code
pub const SUB_RING_READY: u16 = SUB_STATUS_EVENT;
/// Feeder empty status sub code
pub const SUB_EMPTY: u16 = SUB_STATUS_EVENT + 1;

/// Ring station 2 commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPlace2Command {
    /// Mount a ring of the given color
    ProduceRing { ring: RingColor },
    /// Shared command
    Common(CommonCommand),
}

/// Ring station 2 status events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPlace2Status {
    /// Readiness of a mounted ring
    RingReady { ring: RingColor, ready: bool },
    /// Fill state of a feeder lane
    Empty { lane: Lane, empty: bool },
    /// Shared status
    Common(CommonStatus),
}

/// Codec for ring station 2
pub struct PickPlace2Codec;

impl StationCodec for PickPlace2Codec {
    type Command = PickPlace2Command;
    type Status = PickPlace2Status;

    const KIND: StationKind = StationKind::PickPlace2;

    fn command_words(cmd: &PickPlace2Command) -> (u16, Vec<u16>) {
        match cmd {
            PickPlace2Command::ProduceRing { ring } => {
                (Self::KIND.prefix() + SUB_PRODUCE_RING, vec![ring.code()])
            }
            PickPlace2Command::Common(common) => common.words(Self::KIND),
        }
    }

    fn parse_command(opcode: u16, payload: &[u16]) -> Result<PickPlace2Command, ProtocolError> {
        if opcode == Self::KIND.prefix() + SUB_PRODUCE_RING {
            return Ok(PickPlace2Command::ProduceRing {
                ring: RingColor::try_from(word(payload, 0, "ring type")?)?,
            });
        }
        match CommonCommand::parse(Self::KIND, opcode, payload) {
            Some(common) => common.map(PickPlace2Command::Common),
            None => Err(ProtocolError::unknown(Self::KIND, opcode)),
        }
    }

    fn status_words(status: &PickPlace2Status) -> (u16, Vec<u16>) {
        match status {
            PickPlace2Status::RingReady { ring, ready } => (
                Self::KIND.prefix() + SUB_RING_READY,
                vec![ring.code(), flag_to_word(*ready)],
            ),
            PickPlace2Status::Empty { lane, empty } => (
                Self::KIND.prefix() + SUB_EMPTY,
                vec![lane.number(), flag_to_word(*empty)],
            ),
            PickPlace2Status::Common(common) => common.words(),
        }
    }

    fn parse_status(opcode: u16, payload: &[u16]) -> Result<PickPlace2Status, ProtocolError> {
        let prefix = Self::KIND.prefix();
        if opcode == prefix + SUB_RING_READY {
            return Ok(PickPlace2Status::RingReady {
                ring: RingColor::try_from(word(payload, 0, "ring type")?)?,
                ready: flag(payload, 1, "ready")?,
            });
        }
        if opcode == prefix + SUB_EMPTY {
            return Ok(PickPlace2Status::Empty {
                lane: Lane::from_word(Self::KIND, word(payload, 0, "lane")?)?,
                empty: flag(payload, 1, "empty")?,
            });
        }
        CommonStatus::parse(opcode, payload)
            .map(PickPlace2Status::Common)
            .ok_or_else(|| ProtocolError::unknown(Self::KIND, opcode))
    }
}
