//! Commands and status events shared by every station kind
//!
//! Reset and identify are combined with the station prefix. Light commands are
//! sent as they are: the light color is the opcode.

use crate::error::ProtocolError;
use crate::types::{LightColor, LightState};
use crate::StationKind;

/// Reset sub code (added to the station prefix)
pub const SUB_RESET: u16 = 0;
/// Identify / set-type sub code (added to the station prefix)
pub const SUB_IDENTIFY: u16 = 10;
/// Light reset opcode (not combined with the station prefix)
pub const OP_LIGHT_RESET: u16 = 20;

/// Status opcode: nothing to report
pub const ST_IDLE: u16 = 0;
/// Status opcode: station is processing
pub const ST_BUSY: u16 = 1;
/// Status opcode: station reported an error
pub const ST_ERROR: u16 = 3;

/// Sub code of the first station specific status event
pub const SUB_STATUS_EVENT: u16 = 50;

/// Commands every station understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonCommand {
    /// Return the station to its idle state
    Reset,
    /// Tell the PLC which station type it runs
    Identify,
    /// Set one light of the light tower
    SetLight {
        color: LightColor,
        state: LightState,
        /// Blink / on duration in seconds, 0 for unlimited
        seconds: u16,
    },
    /// Switch all lights off
    ResetLights,
}

impl CommonCommand {
    /// Opcode and payload for this command on the given station kind
    pub fn words(&self, kind: StationKind) -> (u16, Vec<u16>) {
        match self {
            CommonCommand::Reset => (kind.prefix() + SUB_RESET, vec![]),
            CommonCommand::Identify => (kind.prefix() + SUB_IDENTIFY, vec![kind.type_code()]),
            CommonCommand::SetLight {
                color,
                state,
                seconds,
            } => (color.code(), vec![state.code(), *seconds]),
            CommonCommand::ResetLights => (OP_LIGHT_RESET, vec![]),
        }
    }

    /// Parse a shared command; `None` if the opcode is not a shared command
    pub fn parse(
        kind: StationKind,
        opcode: u16,
        payload: &[u16],
    ) -> Option<Result<Self, ProtocolError>> {
        if opcode == kind.prefix() + SUB_RESET {
            return Some(Ok(CommonCommand::Reset));
        }
        if opcode == kind.prefix() + SUB_IDENTIFY {
            let code = payload.first().copied().unwrap_or(0);
            return Some(if code == kind.type_code() {
                Ok(CommonCommand::Identify)
            } else {
                Err(ProtocolError::malformed("type code", code))
            });
        }
        if opcode == OP_LIGHT_RESET {
            return Some(Ok(CommonCommand::ResetLights));
        }
        let color = LightColor::from_opcode(opcode)?;
        let state = payload.first().copied().unwrap_or(0);
        Some(LightState::try_from(state).map(|state| CommonCommand::SetLight {
            color,
            state,
            seconds: payload.get(1).copied().unwrap_or(0),
        }))
    }
}

/// Status events every station can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonStatus {
    /// Nothing to report
    Idle,
    /// Processing a command
    Busy,
    /// PLC error with station specific code
    Error { code: u16 },
}

impl CommonStatus {
    /// Opcode and payload for this status event
    pub fn words(&self) -> (u16, Vec<u16>) {
        match self {
            CommonStatus::Idle => (ST_IDLE, vec![]),
            CommonStatus::Busy => (ST_BUSY, vec![]),
            CommonStatus::Error { code } => (ST_ERROR, vec![*code]),
        }
    }

    /// Parse a shared status event; `None` if the opcode is not shared
    pub fn parse(opcode: u16, payload: &[u16]) -> Option<Self> {
        match opcode {
            ST_IDLE => Some(CommonStatus::Idle),
            ST_BUSY => Some(CommonStatus::Busy),
            ST_ERROR => Some(CommonStatus::Error {
                code: payload.first().copied().unwrap_or(0),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_uses_station_prefix() {
        assert_eq!(CommonCommand::Reset.words(StationKind::Band).0, 100);
        assert_eq!(CommonCommand::Reset.words(StationKind::Deliver).0, 500);
    }

    #[test]
    fn test_identify_carries_type_code() {
        let (opcode, payload) = CommonCommand::Identify.words(StationKind::PickPlace2);
        assert_eq!(opcode, 410);
        assert_eq!(payload, vec![4]);
    }

    #[test]
    fn test_identify_rejects_foreign_type_code() {
        let parsed = CommonCommand::parse(StationKind::Band, 110, &[3, 0]);
        assert!(matches!(parsed, Some(Err(ProtocolError::MalformedPayload(_)))));
    }

    #[test]
    fn test_light_is_not_prefixed() {
        let cmd = CommonCommand::SetLight {
            color: LightColor::Yellow,
            state: LightState::Blink,
            seconds: 5,
        };
        let (opcode, payload) = cmd.words(StationKind::IncomingStation);
        assert_eq!(opcode, 22);
        assert_eq!(payload, vec![2, 5]);
        assert_eq!(
            CommonCommand::parse(StationKind::IncomingStation, opcode, &payload),
            Some(Ok(cmd))
        );
    }

    #[test]
    fn test_station_opcode_is_not_common() {
        assert_eq!(CommonCommand::parse(StationKind::Band, 102, &[0, 0]), None);
        assert_eq!(CommonStatus::parse(150, &[1]), None);
    }
}
