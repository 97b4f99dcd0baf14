//! Property tests for the station codecs
//!
//! These check that:
//! - every command survives the trip through its command region
//! - status events reporting command parameters echo them unchanged
//! - frame widths never depend on the values carried
//! - arbitrary register contents decode to a value or an error, never a panic

use mps_protocol::band::BandCommand;
use mps_protocol::delivery::{DeliverCommand, DeliverStatus};
use mps_protocol::incoming::{IncomingCommand, IncomingStatus};
use mps_protocol::pick_place_1::PickPlace1Command;
use mps_protocol::pick_place_2::{PickPlace2Command, PickPlace2Status};
use mps_protocol::{
    decode_command, decode_status, encode_command, encode_status, CommonCommand, Lane,
    LightColor, LightState, MessageHeader, ProtocolError, RingColor, Side, StationCommand,
    StationKind, StationStatus, WorkpieceColor,
};
use proptest::prelude::*;

mod strategies {
    use super::*;

    pub fn kind() -> impl Strategy<Value = StationKind> {
        prop::sample::select(StationKind::ALL.to_vec())
    }

    pub fn color() -> impl Strategy<Value = WorkpieceColor> {
        prop_oneof![
            Just(WorkpieceColor::Red),
            Just(WorkpieceColor::Silver),
            Just(WorkpieceColor::Black),
        ]
    }

    pub fn side() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Left), Just(Side::Right)]
    }

    pub fn ring() -> impl Strategy<Value = RingColor> {
        prop_oneof![
            Just(RingColor::Blue),
            Just(RingColor::Green),
            Just(RingColor::Orange),
            Just(RingColor::Yellow),
        ]
    }

    pub fn lane(kind: StationKind) -> impl Strategy<Value = Lane> {
        (1..=kind.lane_count()).prop_map(move |n| Lane::new(kind, n).unwrap())
    }

    pub fn common() -> impl Strategy<Value = CommonCommand> {
        let light = (
            prop_oneof![
                Just(LightColor::Red),
                Just(LightColor::Yellow),
                Just(LightColor::Green)
            ],
            prop_oneof![Just(LightState::Off), Just(LightState::On), Just(LightState::Blink)],
            any::<u16>(),
        )
            .prop_map(|(color, state, seconds)| CommonCommand::SetLight {
                color,
                state,
                seconds,
            });
        prop_oneof![
            Just(CommonCommand::Reset),
            Just(CommonCommand::Identify),
            Just(CommonCommand::ResetLights),
            light,
        ]
    }

    pub fn command() -> impl Strategy<Value = StationCommand> {
        prop_oneof![
            Just(StationCommand::Band(BandCommand::Run)),
            lane(StationKind::Deliver)
                .prop_map(|lane| StationCommand::Deliver(DeliverCommand::Deliver { lane })),
            (color(), side()).prop_map(|(color, side)| {
                StationCommand::IncomingStation(IncomingCommand::GetCap { color, side })
            }),
            Just(StationCommand::PickPlace1(PickPlace1Command::ProduceEnd)),
            ring().prop_map(|ring| StationCommand::PickPlace2(PickPlace2Command::ProduceRing {
                ring
            })),
            (kind(), common()).prop_map(|(kind, cmd)| StationCommand::common(kind, cmd)),
        ]
    }

    pub fn header() -> impl Strategy<Value = MessageHeader> {
        (any::<u16>(), 1u16..=247, 0u16..4)
            .prop_map(|(sender, receiver, prio)| MessageHeader::new(sender, receiver).with_priority(prio))
    }
}

proptest! {
    #[test]
    fn command_survives_command_region(cmd in strategies::command(), header in strategies::header()) {
        let words = encode_command(&cmd, &header);
        prop_assert_eq!(words.len(), cmd.kind().layout().command_len());
        prop_assert_eq!(decode_command(cmd.kind(), &words), Ok((header, cmd)));
    }

    #[test]
    fn get_cap_parameters_are_echoed(color in strategies::color(), side in strategies::side(), ready: bool) {
        let status = StationStatus::IncomingStation(IncomingStatus::CapReady { color, side, ready });
        let decoded = decode_status(StationKind::IncomingStation, &encode_status(&status));
        prop_assert_eq!(decoded, Ok(status));
    }

    #[test]
    fn deliver_lane_is_echoed(lane in strategies::lane(StationKind::Deliver), delivered: bool) {
        let status = StationStatus::Deliver(DeliverStatus::Delivered { lane, delivered });
        let words = encode_status(&status);
        prop_assert_eq!(words[1], lane.number());
        prop_assert_eq!(decode_status(StationKind::Deliver, &words), Ok(status));
    }

    #[test]
    fn ring_type_is_echoed(ring in strategies::ring(), ready: bool) {
        let status = StationStatus::PickPlace2(PickPlace2Status::RingReady { ring, ready });
        prop_assert_eq!(decode_status(StationKind::PickPlace2, &encode_status(&status)), Ok(status));
    }

    #[test]
    fn arbitrary_status_words_never_panic(kind in strategies::kind(), words in prop::collection::vec(any::<u16>(), 0..8)) {
        match decode_status(kind, &words) {
            Ok(status) => prop_assert_eq!(status.kind(), kind),
            Err(ProtocolError::UnknownOpcode { kind: k, .. }) => prop_assert_eq!(k, kind),
            Err(ProtocolError::MalformedPayload(_)) => {}
        }
    }

    #[test]
    fn short_reads_are_malformed(kind in strategies::kind(), opcode: u16) {
        let words = vec![opcode; kind.layout().status_len() - 1];
        prop_assert!(
            matches!(decode_status(kind, &words), Err(ProtocolError::MalformedPayload(_))),
            "expected malformed payload"
        );
    }
}

#[test]
fn opcodes_are_unique_per_kind() {
    let header = MessageHeader::new(0, 1);
    let per_kind: Vec<(StationKind, Vec<StationCommand>)> = vec![
        (
            StationKind::Band,
            vec![StationCommand::Band(BandCommand::Run)],
        ),
        (
            StationKind::Deliver,
            vec![StationCommand::Deliver(DeliverCommand::Deliver {
                lane: Lane::new(StationKind::Deliver, 1).unwrap(),
            })],
        ),
        (
            StationKind::IncomingStation,
            vec![StationCommand::IncomingStation(IncomingCommand::GetCap {
                color: WorkpieceColor::Red,
                side: Side::Left,
            })],
        ),
        (
            StationKind::PickPlace1,
            vec![StationCommand::PickPlace1(PickPlace1Command::ProduceEnd)],
        ),
        (
            StationKind::PickPlace2,
            vec![StationCommand::PickPlace2(PickPlace2Command::ProduceRing {
                ring: RingColor::Blue,
            })],
        ),
    ];

    for (kind, mut commands) in per_kind {
        commands.push(StationCommand::common(kind, CommonCommand::Reset));
        commands.push(StationCommand::common(kind, CommonCommand::Identify));
        commands.push(StationCommand::common(kind, CommonCommand::ResetLights));
        for color in [LightColor::Red, LightColor::Yellow, LightColor::Green] {
            commands.push(StationCommand::common(
                kind,
                CommonCommand::SetLight {
                    color,
                    state: LightState::On,
                    seconds: 0,
                },
            ));
        }
        let mut opcodes: Vec<u16> = commands
            .iter()
            .map(|c| encode_command(c, &header)[0])
            .collect();
        let total = opcodes.len();
        opcodes.sort_unstable();
        opcodes.dedup();
        assert_eq!(opcodes.len(), total, "duplicate opcode on {kind}");
    }
}

#[test]
fn pick_place_2_empty_lane_is_reported() {
    let lane = Lane::new(StationKind::PickPlace2, 1).unwrap();
    let status = StationStatus::PickPlace2(PickPlace2Status::Empty { lane, empty: true });
    assert_eq!(encode_status(&status), vec![451, 1, 1]);
}
