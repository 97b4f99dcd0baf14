//! Delivery station
//!
//! Opens one of three delivery gates and reports once the product passed it.

use crate::common::{CommonCommand, CommonStatus, SUB_STATUS_EVENT};
use crate::error::ProtocolError;
use crate::layout::RegisterLayout;
use crate::types::{flag, flag_to_word, word, Lane};
use crate::{StationCodec, StationKind};

/// Register layout of the delivery station
pub const LAYOUT: RegisterLayout = RegisterLayout {
    command_start: 0,
    command_payload: 2,
    status_start: 0,
    status_payload: 2,
};

/// Deliver sub code
pub const SUB_DELIVER: u16 = 1;
/// Delivered status sub code
pub const SUB_DELIVERED: u16 = SUB_STATUS_EVENT;

/// Delivery station commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverCommand {
    /// Deliver the product through a lane
    Deliver { lane: Lane },
    /// Shared command
    Common(CommonCommand),
}

/// Delivery station status events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverStatus {
    /// Delivery result for a lane
    Delivered { lane: Lane, delivered: bool },
    /// Shared status
    Common(CommonStatus),
}

/// Codec for the delivery station
pub struct DeliverCodec;

impl StationCodec for DeliverCodec {
    type Command = DeliverCommand;
    type Status = DeliverStatus;

    const KIND: StationKind = StationKind::Deliver;

    fn command_words(cmd: &DeliverCommand) -> (u16, Vec<u16>) {
        match cmd {
            DeliverCommand::Deliver { lane } => {
                (Self::KIND.prefix() + SUB_DELIVER, vec![lane.number()])
            }
            DeliverCommand::Common(common) => common.words(Self::KIND),
        }
    }

    fn parse_command(opcode: u16, payload: &[u16]) -> Result<DeliverCommand, ProtocolError> {
        if opcode == Self::KIND.prefix() + SUB_DELIVER {
            let lane = Lane::from_word(Self::KIND, word(payload, 0, "lane")?)?;
            return Ok(DeliverCommand::Deliver { lane });
        }
        match CommonCommand::parse(Self::KIND, opcode, payload) {
            Some(common) => common.map(DeliverCommand::Common),
            None => Err(ProtocolError::unknown(Self::KIND, opcode)),
        }
    }

    fn status_words(status: &DeliverStatus) -> (u16, Vec<u16>) {
        match status {
            DeliverStatus::Delivered { lane, delivered } => (
                Self::KIND.prefix() + SUB_DELIVERED,
                vec![lane.number(), flag_to_word(*delivered)],
            ),
            DeliverStatus::Common(common) => common.words(),
        }
    }

    fn parse_status(opcode: u16, payload: &[u16]) -> Result<DeliverStatus, ProtocolError> {
        if opcode == Self::KIND.prefix() + SUB_DELIVERED {
            return Ok(DeliverStatus::Delivered {
                lane: Lane::from_word(Self::KIND, word(payload, 0, "lane")?)?,
                delivered: flag(payload, 1, "delivered")?,
            });
        }
        CommonStatus::parse(opcode, payload)
            .map(DeliverStatus::Common)
            .ok_or_else(|| ProtocolError::unknown(Self::KIND, opcode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageHeader;

    fn lane(n: u16) -> Lane {
        Lane::new(StationKind::Deliver, n).unwrap()
    }

    #[test]
    fn test_encode_deliver() {
        let words = DeliverCodec::encode(
            &DeliverCommand::Deliver { lane: lane(2) },
            &MessageHeader::new(0, 5),
        );
        assert_eq!(words, vec![501, 0, 5, 0, 2, 0]);
    }

    #[test]
    fn test_decode_delivered() {
        assert_eq!(
            DeliverCodec::decode(&[550, 3, 1]),
            Ok(DeliverStatus::Delivered {
                lane: lane(3),
                delivered: true
            })
        );
    }

    #[test]
    fn test_decode_rejects_bad_lane() {
        assert!(matches!(
            DeliverCodec::decode(&[550, 7, 1]),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_command_roundtrip() {
        let header = MessageHeader::new(0, 5).with_priority(1);
        let cmd = DeliverCommand::Deliver { lane: lane(1) };
        let words = DeliverCodec::encode(&cmd, &header);
        assert_eq!(DeliverCodec::decode_command(&words), Ok((header, cmd)));
    }
}
