//! Error types for MPS register encoding and decoding

use thiserror::Error;

use crate::StationKind;

/// Errors that can occur while decoding register frames
///
/// All of these are recoverable: a frame that cannot be decoded is reported
/// and treated as "unknown", the connection stays usable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Opcode is not part of the station kind's known set
    #[error("unknown opcode {opcode} for {kind}")]
    UnknownOpcode { kind: StationKind, opcode: u16 },

    /// Frame has the wrong length or a payload word outside its domain
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl ProtocolError {
    pub(crate) fn unknown(kind: StationKind, opcode: u16) -> Self {
        Self::UnknownOpcode { kind, opcode }
    }

    pub(crate) fn malformed(field: &str, value: u16) -> Self {
        Self::MalformedPayload(format!("{field} = {value}"))
    }
}

/// Errors for command arguments outside a station's legal domain
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// Lane number not available on this station kind
    #[error("lane {lane} is not available on {kind} (valid: 1..={max})")]
    InvalidLane { kind: StationKind, lane: u16, max: u16 },

    /// Blink duration does not fit in a register
    #[error("blink duration of {0}s is out of range")]
    InvalidDuration(u64),
}
