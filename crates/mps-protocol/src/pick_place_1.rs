//! Ring station 1 (single pick & place)
//!
//! Places the end piece on the workpiece. Reports when the product is ready
//! and when the end piece feeder ran empty.

use crate::common::{CommonCommand, CommonStatus, SUB_STATUS_EVENT};
use crate::error::ProtocolError;
use crate::layout::RegisterLayout;
use crate::types::{flag, flag_to_word};
use crate::{StationCodec, StationKind};

/// Register layout of ring station 1
pub const LAYOUT: RegisterLayout = RegisterLayout {
    command_start: 0,
    command_payload: 2,
    status_start: 0,
    status_payload: 1,
};

/// Produce-end sub code
pub const SUB_PRODUCE_END: u16 = 1;
/// Product ready status sub code
pub const SUB_READY: u16 = SUB_STATUS_EVENT;
/// Feeder empty status sub code
pub const SUB_EMPTY: u16 = SUB_STATUS_EVENT + 1;

/// Ring station 1 commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPlace1Command {
    /// Place the end piece
    ProduceEnd,
    /// Shared command
    Common(CommonCommand),
}

/// Ring station 1 status events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPlace1Status {
    /// Product readiness
    Ready { ready: bool },
    /// Fill state of the end piece feeder
    Empty { empty: bool },
    /// Shared status
    Common(CommonStatus),
}

/// Codec for ring station 1
pub struct PickPlace1Codec;

impl StationCodec for PickPlace1Codec {
    type Command = PickPlace1Command;
    type Status = PickPlace1Status;

    const KIND: StationKind = StationKind::PickPlace1;

    fn command_words(cmd: &PickPlace1Command) -> (u16, Vec<u16>) {
        match cmd {
            PickPlace1Command::ProduceEnd => (Self::KIND.prefix() + SUB_PRODUCE_END, vec![]),
            PickPlace1Command::Common(common) => common.words(Self::KIND),
        }
    }

    fn parse_command(opcode: u16, payload: &[u16]) -> Result<PickPlace1Command, ProtocolError> {
        if opcode == Self::KIND.prefix() + SUB_PRODUCE_END {
            return Ok(PickPlace1Command::ProduceEnd);
        }
        match CommonCommand::parse(Self::KIND, opcode, payload) {
            Some(common) => common.map(PickPlace1Command::Common),
            None => Err(ProtocolError::unknown(Self::KIND, opcode)),
        }
    }

    fn status_words(status: &PickPlace1Status) -> (u16, Vec<u16>) {
        match status {
            PickPlace1Status::Ready { ready } => {
                (Self::KIND.prefix() + SUB_READY, vec![flag_to_word(*ready)])
            }
            PickPlace1Status::Empty { empty } => {
                (Self::KIND.prefix() + SUB_EMPTY, vec![flag_to_word(*empty)])
            }
            PickPlace1Status::Common(common) => common.words(),
        }
    }

    fn parse_status(opcode: u16, payload: &[u16]) -> Result<PickPlace1Status, ProtocolError> {
        let prefix = Self::KIND.prefix();
        if opcode == prefix + SUB_READY {
            return Ok(PickPlace1Status::Ready {
                ready: flag(payload, 0, "ready")?,
            });
        }
        if opcode == prefix + SUB_EMPTY {
            return Ok(PickPlace1Status::Empty {
                empty: flag(payload, 0, "empty")?,
            });
        }
        CommonStatus::parse(opcode, payload)
            .map(PickPlace1Status::Common)
            .ok_or_else(|| ProtocolError::unknown(Self::KIND, opcode))
    }
}
