pub mod config;
pub mod cpu;
pub mod error;
pub mod machine;

pub use config::EmulatorConfig;
pub use error::{CartridgeError, CoreError};
pub use machine::{
    Cartridge, EmulatorHost, FrameOutcome, GameBoy, HostCommand, Snapshot, StepOutcome,
};

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;
