mod bus;
pub mod cartridge;
mod dma;
mod gameboy;
mod host;
mod joypad;
pub mod ppu;
mod scheduler;
mod serial;
mod snapshot;
mod timer;

pub(crate) use bus::GameBoyBus;
pub use cartridge::Cartridge;
pub use gameboy::{FrameOutcome, GameBoy, StepOutcome};
pub use host::{EmulatorHost, HostCommand};
pub use ppu::{Ppu, PpuMode, PpuRegisters};
pub use scheduler::{Scheduler, CYCLES_PER_FRAME, CYCLES_PER_SCANLINE};
pub use serial::SerialListener;
pub use snapshot::{FlagView, InterruptView, MemoryView, PpuView, RegisterView, Snapshot};
