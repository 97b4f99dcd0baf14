//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mps_protocol::{LightColor, LightState, RingColor, Side, WorkpieceColor};

const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
pub struct Cli {
    /// Station config file (defaults to the user config directory)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Talk to virtual stations instead of the PLCs
    #[arg(short = 's', long = "simulate")]
    pub simulate: bool,
    /// Seconds to wait for the target station to connect
    #[arg(long = "connect-timeout", default_value_t = 5)]
    pub connect_timeout: u64,
    #[command(subcommand)]
    pub action: Action,
}

/// Station by name ("C-BS") or logical address ("3")
pub type StationArg = String;

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Write a config file with the default plant layout
    InitConfig {
        /// Host every station is reached at
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Print the connection state of every station
    States,
    /// Print status and lifecycle events until interrupted
    Watch,
    /// Read and print the status region of a station
    Status { station: StationArg },
    /// Return a station to idle
    Reset { station: StationArg },
    /// Announce the station type to the PLC
    Identify { station: StationArg },
    /// Set one light of the light tower
    Light {
        station: StationArg,
        #[arg(value_enum)]
        color: LightArg,
        #[arg(value_enum)]
        state: LightStateArg,
        /// Duration in seconds, 0 for unlimited
        #[arg(long, default_value_t = 0)]
        seconds: u64,
    },
    /// Switch all lights off
    ResetLights { station: StationArg },
    /// Run the conveyor band
    RunBand { station: StationArg },
    /// Deliver through a lane of the delivery station
    Deliver { station: StationArg, lane: u16 },
    /// Fetch a cap base from the incoming station
    GetCap {
        station: StationArg,
        #[arg(value_enum)]
        color: ColorArg,
        #[arg(value_enum)]
        side: SideArg,
    },
    /// Ask whether the requested cap is ready
    CapReady { station: StationArg },
    /// Finish production on ring station 1
    ProduceEnd { station: StationArg },
    /// Mount a ring on ring station 2
    ProduceRing {
        station: StationArg,
        #[arg(value_enum)]
        ring: RingArg,
    },
}

impl Action {
    /// Station the action targets, if any
    pub fn station(&self) -> Option<&str> {
        match self {
            Action::InitConfig { .. } | Action::States | Action::Watch => None,
            Action::Status { station }
            | Action::Reset { station }
            | Action::Identify { station }
            | Action::Light { station, .. }
            | Action::ResetLights { station }
            | Action::RunBand { station }
            | Action::Deliver { station, .. }
            | Action::GetCap { station, .. }
            | Action::CapReady { station }
            | Action::ProduceEnd { station }
            | Action::ProduceRing { station, .. } => Some(station),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LightArg {
    Red,
    Yellow,
    Green,
}

impl From<LightArg> for LightColor {
    fn from(arg: LightArg) -> Self {
        match arg {
            LightArg::Red => LightColor::Red,
            LightArg::Yellow => LightColor::Yellow,
            LightArg::Green => LightColor::Green,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LightStateArg {
    Off,
    On,
    Blink,
}

impl From<LightStateArg> for LightState {
    fn from(arg: LightStateArg) -> Self {
        match arg {
            LightStateArg::Off => LightState::Off,
            LightStateArg::On => LightState::On,
            LightStateArg::Blink => LightState::Blink,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorArg {
    Red,
    Silver,
    Black,
}

impl From<ColorArg> for WorkpieceColor {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Red => WorkpieceColor::Red,
            ColorArg::Silver => WorkpieceColor::Silver,
            ColorArg::Black => WorkpieceColor::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RingArg {
    Blue,
    Green,
    Orange,
    Yellow,
}

impl From<RingArg> for RingColor {
    fn from(arg: RingArg) -> Self {
        match arg {
            RingArg::Blue => RingColor::Blue,
            RingArg::Green => RingColor::Green,
            RingArg::Orange => RingColor::Orange,
            RingArg::Yellow => RingColor::Yellow,
        }
    }
}
