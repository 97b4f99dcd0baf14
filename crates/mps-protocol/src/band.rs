//! Conveyor band
//!
//! The band moves a workpiece from the input to the output sensor and reports
//! readiness once the workpiece arrived.

use crate::common::{CommonCommand, CommonStatus, SUB_STATUS_EVENT};
use crate::error::ProtocolError;
use crate::layout::RegisterLayout;
use crate::types::{flag, flag_to_word};
use crate::{StationCodec, StationKind};

/// Register layout of the conveyor band
pub const LAYOUT: RegisterLayout = RegisterLayout {
    command_start: 0,
    command_payload: 2,
    status_start: 0,
    status_payload: 1,
};

/// Move-conveyor sub code
pub const SUB_RUN: u16 = 2;
/// Ready status sub code
pub const SUB_READY: u16 = SUB_STATUS_EVENT;

/// Conveyor band commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandCommand {
    /// Run the band until the workpiece reaches the output
    Run,
    /// Shared command
    Common(CommonCommand),
}

/// Conveyor band status events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandStatus {
    /// Workpiece readiness at the output
    Ready { ready: bool },
    /// Shared status
    Common(CommonStatus),
}

/// Codec for the conveyor band
pub struct BandCodec;

impl StationCodec for BandCodec {
    type Command = BandCommand;
    type Status = BandStatus;

    const KIND: StationKind = StationKind::Band;

    fn command_words(cmd: &BandCommand) -> (u16, Vec<u16>) {
        match cmd {
            BandCommand::Run => (Self::KIND.prefix() + SUB_RUN, vec![]),
            BandCommand::Common(common) => common.words(Self::KIND),
        }
    }

    fn parse_command(opcode: u16, payload: &[u16]) -> Result<BandCommand, ProtocolError> {
        if opcode == Self::KIND.prefix() + SUB_RUN {
            return Ok(BandCommand::Run);
        }
        match CommonCommand::parse(Self::KIND, opcode, payload) {
            Some(common) => common.map(BandCommand::Common),
            None => Err(ProtocolError::unknown(Self::KIND, opcode)),
        }
    }

    fn status_words(status: &BandStatus) -> (u16, Vec<u16>) {
        match status {
            BandStatus::Ready { ready } => {
                (Self::KIND.prefix() + SUB_READY, vec![flag_to_word(*ready)])
            }
            BandStatus::Common(common) => common.words(),
        }
    }

    fn parse_status(opcode: u16, payload: &[u16]) -> Result<BandStatus, ProtocolError> {
        if opcode == Self::KIND.prefix() + SUB_READY {
            return Ok(BandStatus::Ready {
                ready: flag(payload, 0, "ready")?,
            });
        }
        CommonStatus::parse(opcode, payload)
            .map(BandStatus::Common)
            .ok_or_else(|| ProtocolError::unknown(Self::KIND, opcode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageHeader;

    #[test]
    fn test_encode_run() {
        let words = BandCodec::encode(&BandCommand::Run, &MessageHeader::new(0, 1));
        assert_eq!(words, vec![102, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_decode_ready() {
        assert_eq!(BandCodec::decode(&[150, 1]), Ok(BandStatus::Ready { ready: true }));
        assert_eq!(BandCodec::decode(&[150, 0]), Ok(BandStatus::Ready { ready: false }));
    }

    #[test]
    fn test_decode_unknown_opcode() {
        assert_eq!(
            BandCodec::decode(&[250, 1]),
            Err(ProtocolError::UnknownOpcode {
                kind: StationKind::Band,
                opcode: 250
            })
        );
    }

    #[test]
    fn test_decode_idle() {
        assert_eq!(
            BandCodec::decode(&[0, 0]),
            Ok(BandStatus::Common(CommonStatus::Idle))
        );
    }
}
