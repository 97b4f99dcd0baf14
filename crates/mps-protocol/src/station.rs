//! Kind-independent command and status values
//!
//! [`StationCommand`] and [`StationStatus`] wrap the per-kind enums so that
//! code handling any station (the connection worker, the simulator) can
//! dispatch on the station kind at runtime.

use tracing::trace;

use crate::band::{BandCodec, BandCommand, BandStatus};
use crate::common::{CommonCommand, CommonStatus};
use crate::delivery::{DeliverCodec, DeliverCommand, DeliverStatus};
use crate::error::ProtocolError;
use crate::incoming::{IncomingCodec, IncomingCommand, IncomingStatus};
use crate::message::MessageHeader;
use crate::pick_place_1::{PickPlace1Codec, PickPlace1Command, PickPlace1Status};
use crate::pick_place_2::{PickPlace2Codec, PickPlace2Command, PickPlace2Status};
use crate::{StationCodec, StationKind};

/// A command for any station kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationCommand {
    Band(BandCommand),
    Deliver(DeliverCommand),
    IncomingStation(IncomingCommand),
    PickPlace1(PickPlace1Command),
    PickPlace2(PickPlace2Command),
}

impl StationCommand {
    /// Wrap a shared command for the given station kind
    pub fn common(kind: StationKind, cmd: CommonCommand) -> Self {
        match kind {
            StationKind::Band => StationCommand::Band(BandCommand::Common(cmd)),
            StationKind::Deliver => StationCommand::Deliver(DeliverCommand::Common(cmd)),
            StationKind::IncomingStation => {
                StationCommand::IncomingStation(IncomingCommand::Common(cmd))
            }
            StationKind::PickPlace1 => StationCommand::PickPlace1(PickPlace1Command::Common(cmd)),
            StationKind::PickPlace2 => StationCommand::PickPlace2(PickPlace2Command::Common(cmd)),
        }
    }

    /// Station kind this command is addressed to
    pub fn kind(&self) -> StationKind {
        match self {
            StationCommand::Band(_) => StationKind::Band,
            StationCommand::Deliver(_) => StationKind::Deliver,
            StationCommand::IncomingStation(_) => StationKind::IncomingStation,
            StationCommand::PickPlace1(_) => StationKind::PickPlace1,
            StationCommand::PickPlace2(_) => StationKind::PickPlace2,
        }
    }

    /// The shared command, if this is one
    pub fn as_common(&self) -> Option<CommonCommand> {
        match self {
            StationCommand::Band(BandCommand::Common(c))
            | StationCommand::Deliver(DeliverCommand::Common(c))
            | StationCommand::IncomingStation(IncomingCommand::Common(c))
            | StationCommand::PickPlace1(PickPlace1Command::Common(c))
            | StationCommand::PickPlace2(PickPlace2Command::Common(c)) => Some(*c),
            _ => None,
        }
    }
}

/// A status event of any station kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    Band(BandStatus),
    Deliver(DeliverStatus),
    IncomingStation(IncomingStatus),
    PickPlace1(PickPlace1Status),
    PickPlace2(PickPlace2Status),
}

impl StationStatus {
    /// Wrap a shared status event for the given station kind
    pub fn common(kind: StationKind, status: CommonStatus) -> Self {
        match kind {
            StationKind::Band => StationStatus::Band(BandStatus::Common(status)),
            StationKind::Deliver => StationStatus::Deliver(DeliverStatus::Common(status)),
            StationKind::IncomingStation => {
                StationStatus::IncomingStation(IncomingStatus::Common(status))
            }
            StationKind::PickPlace1 => StationStatus::PickPlace1(PickPlace1Status::Common(status)),
            StationKind::PickPlace2 => StationStatus::PickPlace2(PickPlace2Status::Common(status)),
        }
    }

    /// Station kind that reported this event
    pub fn kind(&self) -> StationKind {
        match self {
            StationStatus::Band(_) => StationKind::Band,
            StationStatus::Deliver(_) => StationKind::Deliver,
            StationStatus::IncomingStation(_) => StationKind::IncomingStation,
            StationStatus::PickPlace1(_) => StationKind::PickPlace1,
            StationStatus::PickPlace2(_) => StationKind::PickPlace2,
        }
    }

    /// The shared status event, if this is one
    pub fn as_common(&self) -> Option<CommonStatus> {
        match self {
            StationStatus::Band(BandStatus::Common(s))
            | StationStatus::Deliver(DeliverStatus::Common(s))
            | StationStatus::IncomingStation(IncomingStatus::Common(s))
            | StationStatus::PickPlace1(PickPlace1Status::Common(s))
            | StationStatus::PickPlace2(PickPlace2Status::Common(s)) => Some(*s),
            _ => None,
        }
    }
}

/// Encode any command to the words of its station's command region
pub fn encode_command(cmd: &StationCommand, header: &MessageHeader) -> Vec<u16> {
    let words = match cmd {
        StationCommand::Band(c) => BandCodec::encode(c, header),
        StationCommand::Deliver(c) => DeliverCodec::encode(c, header),
        StationCommand::IncomingStation(c) => IncomingCodec::encode(c, header),
        StationCommand::PickPlace1(c) => PickPlace1Codec::encode(c, header),
        StationCommand::PickPlace2(c) => PickPlace2Codec::encode(c, header),
    };
    trace!(kind = %cmd.kind(), ?words, "Encoded command");
    words
}

/// Decode the status region of a station of the given kind
pub fn decode_status(kind: StationKind, words: &[u16]) -> Result<StationStatus, ProtocolError> {
    trace!(%kind, ?words, "Decoding status");
    match kind {
        StationKind::Band => BandCodec::decode(words).map(StationStatus::Band),
        StationKind::Deliver => DeliverCodec::decode(words).map(StationStatus::Deliver),
        StationKind::IncomingStation => {
            IncomingCodec::decode(words).map(StationStatus::IncomingStation)
        }
        StationKind::PickPlace1 => PickPlace1Codec::decode(words).map(StationStatus::PickPlace1),
        StationKind::PickPlace2 => PickPlace2Codec::decode(words).map(StationStatus::PickPlace2),
    }
}

/// Encode any status event to the words of its station's status region
pub fn encode_status(status: &StationStatus) -> Vec<u16> {
    match status {
        StationStatus::Band(s) => BandCodec::encode_status(s),
        StationStatus::Deliver(s) => DeliverCodec::encode_status(s),
        StationStatus::IncomingStation(s) => IncomingCodec::encode_status(s),
        StationStatus::PickPlace1(s) => PickPlace1Codec::encode_status(s),
        StationStatus::PickPlace2(s) => PickPlace2Codec::encode_status(s),
    }
}

/// Decode the command region of a station of the given kind
pub fn decode_command(
    kind: StationKind,
    words: &[u16],
) -> Result<(MessageHeader, StationCommand), ProtocolError> {
    match kind {
        StationKind::Band => {
            BandCodec::decode_command(words).map(|(h, c)| (h, StationCommand::Band(c)))
        }
        StationKind::Deliver => {
            DeliverCodec::decode_command(words).map(|(h, c)| (h, StationCommand::Deliver(c)))
        }
        StationKind::IncomingStation => IncomingCodec::decode_command(words)
            .map(|(h, c)| (h, StationCommand::IncomingStation(c))),
        StationKind::PickPlace1 => {
            PickPlace1Codec::decode_command(words).map(|(h, c)| (h, StationCommand::PickPlace1(c)))
        }
        StationKind::PickPlace2 => {
            PickPlace2Codec::decode_command(words).map(|(h, c)| (h, StationCommand::PickPlace2(c)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Side, WorkpieceColor};

    #[test]
    fn test_common_wraps_per_kind() {
        for kind in StationKind::ALL {
            let cmd = StationCommand::common(kind, CommonCommand::Reset);
            assert_eq!(cmd.kind(), kind);
            assert_eq!(cmd.as_common(), Some(CommonCommand::Reset));
            let words = encode_command(&cmd, &MessageHeader::new(0, 1));
            assert_eq!(words[0], kind.prefix());
            assert_eq!(words.len(), kind.layout().command_len());
        }
    }

    #[test]
    fn test_decode_status_dispatches_on_kind() {
        let status = decode_status(StationKind::IncomingStation, &[250, 1, 1, 1]).unwrap();
        assert_eq!(
            status,
            StationStatus::IncomingStation(IncomingStatus::CapReady {
                color: WorkpieceColor::Red,
                side: Side::Left,
                ready: true
            })
        );
        assert!(decode_status(StationKind::Band, &[250, 1]).is_err());
    }

    #[test]
    fn test_idle_frame_per_kind() {
        for kind in StationKind::ALL {
            let status = StationStatus::common(kind, CommonStatus::Idle);
            let words = encode_status(&status);
            assert_eq!(words.len(), kind.layout().status_len());
            assert_eq!(decode_status(kind, &words), Ok(status));
        }
    }
}
