//! Incoming station
//!
//! Dispenses caps from the red, silver or black feeder onto the left or right
//! output. Reports readiness of a cap and empty feeders.

use crate::common::{CommonCommand, CommonStatus, SUB_STATUS_EVENT};
use crate::error::ProtocolError;
use crate::layout::RegisterLayout;
use crate::types::{flag, flag_to_word, word, Side, WorkpieceColor};
use crate::{StationCodec, StationKind};

/// Register layout of the incoming station
pub const LAYOUT: RegisterLayout = RegisterLayout {
    command_start: 0,
    command_payload: 2,
    status_start: 0,
    status_payload: 3,
};

/// Get-cap sub code
pub const SUB_GET_CAP: u16 = 1;
/// Cap ready status sub code
pub const SUB_CAP_READY: u16 = SUB_STATUS_EVENT;
/// Feeder empty status sub code
pub const SUB_EMPTY: u16 = SUB_STATUS_EVENT + 1;

/// Incoming station commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomingCommand {
    /// Dispense a cap of the given color on the given side
    GetCap { color: WorkpieceColor, side: Side },
    /// Shared command
    Common(CommonCommand),
}

/// Incoming station status events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomingStatus {
    /// Readiness of a cap on one side
    CapReady {
        color: WorkpieceColor,
        side: Side,
        ready: bool,
    },
    /// Fill state of a feeder
    Empty { color: WorkpieceColor, empty: bool },
    /// Shared status
    Common(CommonStatus),
}

/// Codec for the incoming station
pub struct IncomingCodec;

impl StationCodec for IncomingCodec {
    type Command = IncomingCommand;
    type Status = IncomingStatus;

    const KIND: StationKind = StationKind::IncomingStation;

    fn command_words(cmd: &IncomingCommand) -> (u16, Vec<u16>) {
        match cmd {
            IncomingCommand::GetCap { color, side } => (
                Self::KIND.prefix() + SUB_GET_CAP,
                vec![color.code(), side.code()],
            ),
            IncomingCommand::Common(common) => common.words(Self::KIND),
        }
    }

    fn parse_command(opcode: u16, payload: &[u16]) -> Result<IncomingCommand, ProtocolError> {
        if opcode == Self::KIND.prefix() + SUB_GET_CAP {
            return Ok(IncomingCommand::GetCap {
                color: WorkpieceColor::try_from(word(payload, 0, "color")?)?,
                side: Side::try_from(word(payload, 1, "side")?)?,
            });
        }
        match CommonCommand::parse(Self::KIND, opcode, payload) {
            Some(common) => common.map(IncomingCommand::Common),
            None => Err(ProtocolError::unknown(Self::KIND, opcode)),
        }
    }

    fn status_words(status: &IncomingStatus) -> (u16, Vec<u16>) {
        match status {
            IncomingStatus::CapReady { color, side, ready } => (
                Self::KIND.prefix() + SUB_CAP_READY,
                vec![color.code(), side.code(), flag_to_word(*ready)],
            ),
            IncomingStatus::Empty { color, empty } => (
                Self::KIND.prefix() + SUB_EMPTY,
                vec![color.code(), flag_to_word(*empty)],
            ),
            IncomingStatus::Common(common) => common.words(),
        }
    }

    fn parse_status(opcode: u16, payload: &[u16]) -> Result<IncomingStatus, ProtocolError> {
        let prefix = Self::KIND.prefix();
        if opcode == prefix + SUB_CAP_READY {
            return Ok(IncomingStatus::CapReady {
                color: WorkpieceColor::try_from(word(payload, 0, "color")?)?,
                side: Side::try_from(word(payload, 1, "side")?)?,
                ready: flag(payload, 2, "ready")?,
            });
        }
        if opcode == prefix + SUB_EMPTY {
            return Ok(IncomingStatus::Empty {
                color: WorkpieceColor::try_from(word(payload, 0, "color")?)?,
                empty: flag(payload, 1, "empty")?,
            });
        }
        CommonStatus::parse(opcode, payload)
            .map(IncomingStatus::Common)
            .ok_or_else(|| ProtocolError::unknown(Self::KIND, opcode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageHeader;

    #[test]
    fn test_encode_get_cap() {
        let words = IncomingCodec::encode(
            &IncomingCommand::GetCap {
                color: WorkpieceColor::Black,
                side: Side::Right,
            },
            &MessageHeader::new(0, 3),
        );
        assert_eq!(words, vec![201, 0, 3, 0, 3, 2]);
    }

    #[test]
    fn test_decode_cap_ready() {
        assert_eq!(
            IncomingCodec::decode(&[250, 2, 1, 0]),
            Ok(IncomingStatus::CapReady {
                color: WorkpieceColor::Silver,
                side: Side::Left,
                ready: false
            })
        );
    }

    #[test]
    fn test_decode_empty_ignores_padding() {
        assert_eq!(
            IncomingCodec::decode(&[251, 1, 1, 0]),
            Ok(IncomingStatus::Empty {
                color: WorkpieceColor::Red,
                empty: true
            })
        );
    }

    #[test]
    fn test_decode_rejects_bad_side() {
        assert!(matches!(
            IncomingCodec::decode(&[250, 1, 9, 1]),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_foreign_opcode() {
        assert!(matches!(
            IncomingCodec::decode(&[150, 1, 0, 0]),
            Err(ProtocolError::UnknownOpcode { opcode: 150, .. })
        ));
    }
}
