//! Payload value types shared by the station codecs

use crate::error::{ArgumentError, ProtocolError};
use crate::StationKind;

/// Decode a boolean flag word (0 or 1)
pub(crate) fn flag_from_word(field: &str, word: u16) -> Result<bool, ProtocolError> {
    match word {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ProtocolError::malformed(field, other)),
    }
}

/// Fetch a payload word, failing if the frame is too short
pub(crate) fn word(payload: &[u16], index: usize, field: &str) -> Result<u16, ProtocolError> {
    payload
        .get(index)
        .copied()
        .ok_or_else(|| ProtocolError::MalformedPayload(format!("missing {field}")))
}

/// Fetch and decode a flag payload word
pub(crate) fn flag(payload: &[u16], index: usize, field: &str) -> Result<bool, ProtocolError> {
    flag_from_word(field, word(payload, index, field)?)
}

/// Encode a boolean flag word
pub(crate) fn flag_to_word(flag: bool) -> u16 {
    u16::from(flag)
}

/// Color of a base or cap workpiece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WorkpieceColor {
    Red = 1,
    Silver = 2,
    Black = 3,
}

impl WorkpieceColor {
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for WorkpieceColor {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Red),
            2 => Ok(Self::Silver),
            3 => Ok(Self::Black),
            other => Err(ProtocolError::malformed("color", other)),
        }
    }
}

/// Side of the incoming station a workpiece is provided on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    Left = 1,
    Right = 2,
}

impl Side {
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Side {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Left),
            2 => Ok(Self::Right),
            other => Err(ProtocolError::malformed("side", other)),
        }
    }
}

/// Ring type mounted by ring station 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RingColor {
    Blue = 1,
    Green = 2,
    Orange = 3,
    Yellow = 4,
}

impl RingColor {
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for RingColor {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Blue),
            2 => Ok(Self::Green),
            3 => Ok(Self::Orange),
            4 => Ok(Self::Yellow),
            other => Err(ProtocolError::malformed("ring type", other)),
        }
    }
}

/// A lane number validated against the station kind it is used with
///
/// Delivery stations have three gates, ring station 2 has two ring feeders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lane(u16);

impl Lane {
    /// Validate a lane number for a station kind
    pub fn new(kind: StationKind, lane: u16) -> Result<Self, ArgumentError> {
        let max = kind.lane_count();
        if lane == 0 || lane > max {
            return Err(ArgumentError::InvalidLane { kind, lane, max });
        }
        Ok(Self(lane))
    }

    /// Decode a lane word reported by a station
    pub(crate) fn from_word(kind: StationKind, word: u16) -> Result<Self, ProtocolError> {
        Self::new(kind, word).map_err(|_| ProtocolError::malformed("lane", word))
    }

    /// Get the raw lane number
    pub fn number(&self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lane {}", self.0)
    }
}

/// Signal light of the station's light tower
///
/// The discriminants are the command opcodes; light commands are not combined
/// with the station prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LightColor {
    Red = 21,
    Yellow = 22,
    Green = 23,
}

impl LightColor {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub(crate) fn from_opcode(opcode: u16) -> Option<Self> {
        match opcode {
            21 => Some(Self::Red),
            22 => Some(Self::Yellow),
            23 => Some(Self::Green),
            _ => None,
        }
    }
}

/// State of a signal light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LightState {
    #[default]
    Off = 0,
    On = 1,
    Blink = 2,
}

impl LightState {
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for LightState {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            2 => Ok(Self::Blink),
            other => Err(ProtocolError::malformed("light state", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_validation() {
        assert!(Lane::new(StationKind::Deliver, 1).is_ok());
        assert!(Lane::new(StationKind::Deliver, 3).is_ok());
        assert!(Lane::new(StationKind::Deliver, 4).is_err());
        assert!(Lane::new(StationKind::Deliver, 0).is_err());
        assert!(Lane::new(StationKind::PickPlace2, 2).is_ok());
        assert!(Lane::new(StationKind::PickPlace2, 3).is_err());
        assert!(Lane::new(StationKind::Band, 1).is_err());
    }

    #[test]
    fn test_flag_words() {
        assert_eq!(flag_from_word("ready", 0), Ok(false));
        assert_eq!(flag_from_word("ready", 1), Ok(true));
        assert!(matches!(
            flag_from_word("ready", 7),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_color_codes() {
        for color in [WorkpieceColor::Red, WorkpieceColor::Silver, WorkpieceColor::Black] {
            assert_eq!(WorkpieceColor::try_from(color.code()), Ok(color));
        }
        assert!(WorkpieceColor::try_from(0).is_err());
        assert!(RingColor::try_from(5).is_err());
    }
}
