//! MPS Register Protocol Library
//!
//! This crate provides encoding and decoding for the register protocol
//! spoken by the MPS production stations of the logistics testbed:
//!
//! - **Conveyor band**: run the band, report when the workpiece arrived
//! - **Delivery station**: open a delivery lane, report delivery
//! - **Incoming station**: dispense a cap, report readiness and empty feeders
//! - **Ring station 1** (single pick & place): produce the end piece
//! - **Ring station 2** (double pick & place): mount a ring
//!
//! # Architecture
//!
//! Every station kind exposes two register regions:
//! - a **command region** of holding registers the controller writes:
//!   `[opcode, sender, receiver, priority, payload..]`
//! - a **status region** of input registers the controller reads:
//!   `[opcode, payload..]`
//!
//! Each station module provides a codec implementing [`StationCodec`], with
//! typed command and status enums for that station. The frame widths are fixed
//! per kind (see [`RegisterLayout`]), so a frame never depends on the values it
//! carries.
//!
//! Opcodes follow the station prefix scheme of the PLC programs: every kind has
//! a base prefix (100, 200, ...) and sub codes are added to it. Commands and
//! status events shared by all kinds (reset, lights, idle/busy/error) live in
//! [`common`].
//!
//! # Example
//!
//! ```rust
//! use mps_protocol::incoming::{IncomingCodec, IncomingCommand, IncomingStatus};
//! use mps_protocol::{MessageHeader, StationCodec, Side, WorkpieceColor};
//!
//! let header = MessageHeader::new(0, 3);
//! let words = IncomingCodec::encode(
//!     &IncomingCommand::GetCap { color: WorkpieceColor::Red, side: Side::Left },
//!     &header,
//! );
//! assert_eq!(words[0], 201);
//!
//! let status = IncomingCodec::decode(&[250, 1, 1, 1]).unwrap();
//! assert!(matches!(status, IncomingStatus::CapReady { ready: true, .. }));
//! ```

pub mod band;
pub mod common;
pub mod delivery;
pub mod error;
pub mod incoming;
pub mod layout;
pub mod message;
pub mod pick_place_1;
pub mod pick_place_2;
pub mod station;
pub mod types;

pub use common::{CommonCommand, CommonStatus};
pub use error::{ArgumentError, ProtocolError};
pub use layout::RegisterLayout;
pub use message::{CommandMessage, MessageHeader};
pub use station::{
    decode_command, decode_status, encode_command, encode_status, StationCommand, StationStatus,
};
pub use types::{Lane, LightColor, LightState, RingColor, Side, WorkpieceColor};

/// Identifies which kind of production station sits behind a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StationKind {
    /// Conveyor band
    Band,
    /// Delivery / output station
    Deliver,
    /// Incoming station (cap feeder)
    IncomingStation,
    /// Ring station 1 (single pick & place)
    PickPlace1,
    /// Ring station 2 (double pick & place)
    PickPlace2,
}

impl StationKind {
    /// All station kinds, in type-code order
    pub const ALL: [StationKind; 5] = [
        StationKind::Band,
        StationKind::IncomingStation,
        StationKind::PickPlace1,
        StationKind::PickPlace2,
        StationKind::Deliver,
    ];

    /// Returns a human-readable name for the station kind
    pub fn name(&self) -> &'static str {
        match self {
            StationKind::Band => "Conveyor Band",
            StationKind::Deliver => "Delivery Station",
            StationKind::IncomingStation => "Incoming Station",
            StationKind::PickPlace1 => "Ring Station 1",
            StationKind::PickPlace2 => "Ring Station 2",
        }
    }

    /// Opcode prefix; station specific sub codes are added to it
    pub fn prefix(&self) -> u16 {
        match self {
            StationKind::Band => 100,
            StationKind::IncomingStation => 200,
            StationKind::PickPlace1 => 300,
            StationKind::PickPlace2 => 400,
            StationKind::Deliver => 500,
        }
    }

    /// Type code announced to the PLC by the identify command
    pub fn type_code(&self) -> u16 {
        self.prefix() / 100
    }

    /// Look up a station kind by its identify type code
    pub fn from_type_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_code() == code)
    }

    /// Register layout used by this station kind
    pub fn layout(&self) -> RegisterLayout {
        match self {
            StationKind::Band => band::LAYOUT,
            StationKind::Deliver => delivery::LAYOUT,
            StationKind::IncomingStation => incoming::LAYOUT,
            StationKind::PickPlace1 => pick_place_1::LAYOUT,
            StationKind::PickPlace2 => pick_place_2::LAYOUT,
        }
    }

    /// Number of selectable lanes (delivery gates or ring feeders); zero if
    /// the station has no lanes
    pub fn lane_count(&self) -> u16 {
        match self {
            StationKind::Deliver => 3,
            StationKind::PickPlace2 => 2,
            _ => 0,
        }
    }
}

impl std::fmt::Display for StationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Codec for one station kind
///
/// Implementors map their typed commands and status events to opcode and
/// payload words; the provided methods handle framing against the station's
/// [`RegisterLayout`]. Both directions are implemented so that virtual
/// stations can parse what the controller writes and publish status frames.
pub trait StationCodec {
    /// Commands accepted by this station kind
    type Command;
    /// Status events reported by this station kind
    type Status;

    /// The station kind this codec speaks
    const KIND: StationKind;

    /// Opcode and payload words for a command
    fn command_words(cmd: &Self::Command) -> (u16, Vec<u16>);

    /// Parse a command from its opcode and fixed-size payload
    fn parse_command(opcode: u16, payload: &[u16]) -> Result<Self::Command, ProtocolError>;

    /// Opcode and payload words for a status event
    fn status_words(status: &Self::Status) -> (u16, Vec<u16>);

    /// Parse a status event from its opcode and fixed-size payload
    fn parse_status(opcode: u16, payload: &[u16]) -> Result<Self::Status, ProtocolError>;

    /// Build the command message for a command
    fn message(cmd: &Self::Command, header: &MessageHeader) -> CommandMessage {
        let (opcode, payload) = Self::command_words(cmd);
        CommandMessage::new(*header, opcode, payload)
    }

    /// Encode a command to the words of the command region
    fn encode(cmd: &Self::Command, header: &MessageHeader) -> Vec<u16> {
        Self::KIND.layout().frame_command(&Self::message(cmd, header))
    }

    /// Decode the words of the status region
    fn decode(words: &[u16]) -> Result<Self::Status, ProtocolError> {
        let (opcode, payload) = Self::KIND.layout().split_status(words)?;
        Self::parse_status(opcode, payload)
    }

    /// Encode a status event to the words of the status region
    fn encode_status(status: &Self::Status) -> Vec<u16> {
        let (opcode, payload) = Self::status_words(status);
        Self::KIND.layout().frame_status(opcode, &payload)
    }

    /// Decode the words of the command region
    fn decode_command(words: &[u16]) -> Result<(MessageHeader, Self::Command), ProtocolError> {
        let message = Self::KIND.layout().split_command(words)?;
        let cmd = Self::parse_command(message.opcode, &message.payload)?;
        Ok((message.header, cmd))
    }
}
