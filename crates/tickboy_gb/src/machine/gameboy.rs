use std::collections::BTreeMap;

use tickboy_common::input::InputProvider;

use crate::config::EmulatorConfig;
use crate::cpu::regs::Registers;
use crate::cpu::{Cpu, CpuState, CycleState};
use crate::error::CoreError;

use super::cartridge::Cartridge;
use super::ppu::Ppu;
use super::scheduler::Scheduler;
use super::serial::SerialListener;
use super::snapshot::Snapshot;
use super::GameBoyBus;

/// Largest custom memory window a snapshot may carry.
const MAX_SNAPSHOT_WINDOW: u16 = 0x40;

/// How a call to [`GameBoy::step_instruction`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction, interrupt dispatch or halted M-cycle finished.
    Completed,
    /// PC sits on an enabled breakpoint; nothing ran and the core paused.
    Breakpoint(u16),
    Halted,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Completed,
    /// Nothing ran: the core is paused or has no cartridge.
    Paused,
    Breakpoint(u16),
}

/// The whole machine: CPU plus the bus that owns every other device.
///
/// ```
/// use tickboy_gb::{EmulatorConfig, FrameOutcome, GameBoy};
///
/// let mut gb = GameBoy::new(EmulatorConfig::default());
/// // Without a cartridge there is nothing to run.
/// assert_eq!(gb.run_frame(), Ok(FrameOutcome::Paused));
/// ```
pub struct GameBoy {
    pub cpu: Cpu,
    pub(crate) bus: GameBoyBus,
    paused: bool,
    breakpoints: BTreeMap<u16, bool>,
    /// Breakpoint that already fired and must let its instruction run once.
    skip_breakpoint: Option<u16>,
    snapshot_range: Option<(u16, u16)>,
    /// A frame was interrupted by a breakpoint and has cycles left.
    frame_pending: bool,
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}

impl GameBoy {
    pub fn new(config: EmulatorConfig) -> Self {
        let mut bus = GameBoyBus::new(config.seed_ram);
        bus.clock.set_frame_limit(config.frame_limit);

        let mut gb = Self {
            cpu: Cpu::new(),
            bus,
            paused: false,
            breakpoints: config.breakpoints.iter().map(|&addr| (addr, true)).collect(),
            skip_breakpoint: None,
            snapshot_range: None,
            frame_pending: false,
        };
        if let Some((start, end)) = config.snapshot_range {
            if let Err(err) = gb.set_snapshot_range(start, end) {
                log::warn!("ignoring configured snapshot range: {err}");
            }
        }
        gb
    }

    /// Insert a cartridge and power-cycle the machine.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) {
        log::info!(
            "loaded \"{}\" ({}, {} KiB ROM, {} KiB RAM)",
            cartridge.title(),
            cartridge.header().cartridge_type.name(),
            cartridge.header().rom_size / 1024,
            cartridge.header().ram_size / 1024,
        );
        self.bus.insert_cartridge(cartridge);
        self.reset();
    }

    /// Back to the post-boot state at PC=0x0100. Breakpoints, the
    /// snapshot range and the pause flag are debugger state and survive.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.skip_breakpoint = None;
        self.frame_pending = false;
    }

    /// Run until the frame's cycle budget is spent, then pace.
    ///
    /// Returns early, paused, when an enabled breakpoint is reached. An
    /// error (invalid opcode) also pauses the core.
    pub fn run_frame(&mut self) -> Result<FrameOutcome, CoreError> {
        if self.paused || self.bus.cartridge().is_none() {
            return Ok(FrameOutcome::Paused);
        }

        if !self.frame_pending {
            self.bus.clock.start_frame();
            self.frame_pending = true;
        }
        while !self.bus.clock.frame_complete() {
            match self.step_instruction() {
                Ok(StepOutcome::Breakpoint(addr)) => return Ok(FrameOutcome::Breakpoint(addr)),
                // STOP consumes no cycles; only a joypad edge can end it.
                Ok(StepOutcome::Stopped) => break,
                Ok(_) => {}
                Err(err) => {
                    self.paused = true;
                    return Err(err);
                }
            }
        }

        self.frame_pending = false;
        self.bus.joypad.update(&mut self.bus.interrupts);
        self.bus.clock.end_frame();
        Ok(FrameOutcome::Completed)
    }

    /// Run CPU steps until the current instruction, interrupt dispatch or
    /// halted M-cycle completes.
    pub fn step_instruction(&mut self) -> Result<StepOutcome, CoreError> {
        if self.bus.cartridge().is_none() {
            return Err(CoreError::NoCartridge);
        }
        if self.cpu.state() == CpuState::Running && !self.cpu.in_progress() {
            let pc = self.cpu.regs.pc;
            if self.skip_breakpoint.take() != Some(pc)
                && self.breakpoints.get(&pc).copied().unwrap_or(false)
            {
                log::debug!("breakpoint at {pc:04X}");
                self.paused = true;
                self.skip_breakpoint = Some(pc);
                return Ok(StepOutcome::Breakpoint(pc));
            }
        }

        loop {
            match self.cpu.step(&mut self.bus)? {
                CycleState::Continue => continue,
                CycleState::Stop => return Ok(StepOutcome::Stopped),
                CycleState::Halt | CycleState::Done => break,
            }
        }

        Ok(match self.cpu.state() {
            CpuState::Halted => StepOutcome::Halted,
            CpuState::Stopped => StepOutcome::Stopped,
            _ => StepOutcome::Completed,
        })
    }

    /// One raw engine step, with no breakpoint handling.
    pub fn step(&mut self) -> Result<CycleState, CoreError> {
        self.cpu.step(&mut self.bus)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_frame_limit(&mut self, enabled: bool) {
        self.bus.clock.set_frame_limit(enabled);
    }

    pub fn set_input_provider(&mut self, provider: Box<dyn InputProvider + Send>) {
        self.bus.joypad.set_provider(provider);
    }

    pub fn set_serial_listener(&mut self, listener: SerialListener) {
        self.bus.serial.set_listener(listener);
    }

    /// Register an enabled breakpoint.
    pub fn add_breakpoint(&mut self, addr: u16) {
        self.breakpoints.insert(addr, true);
    }

    /// Returns false when no breakpoint existed at `addr`.
    pub fn remove_breakpoint(&mut self, addr: u16) -> bool {
        self.breakpoints.remove(&addr).is_some()
    }

    /// Returns false when no breakpoint exists at `addr`.
    pub fn set_breakpoint_enabled(&mut self, addr: u16, enabled: bool) -> bool {
        match self.breakpoints.get_mut(&addr) {
            Some(flag) => {
                *flag = enabled;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn breakpoints(&self) -> &BTreeMap<u16, bool> {
        &self.breakpoints
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
        self.skip_breakpoint = None;
    }

    /// Set the custom snapshot window `[start, end)`. An invalid range is
    /// rejected and the previous one kept. The end is exclusive, so IE at
    /// 0xFFFF is never part of it; it is always in
    /// [`Snapshot::interrupts`] instead.
    pub fn set_snapshot_range(&mut self, start: u16, end: u16) -> Result<(), CoreError> {
        if end <= start || end - start > MAX_SNAPSHOT_WINDOW {
            return Err(CoreError::InvalidSnapshotRange { start, end });
        }
        self.snapshot_range = Some((start, end));
        Ok(())
    }

    #[inline]
    pub fn snapshot_range(&self) -> Option<(u16, u16)> {
        self.snapshot_range
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.cpu, &self.bus, self.snapshot_range)
    }

    /// Last completed frame as 2-bit shade indices, row-major 160x144.
    #[inline]
    pub fn frame(&self) -> &[u8] {
        self.bus.ppu.frame()
    }

    #[inline]
    pub fn clock(&self) -> &Scheduler {
        &self.bus.clock
    }

    #[inline]
    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    #[inline]
    pub fn ppu(&self) -> &Ppu {
        &self.bus.ppu
    }

    #[inline]
    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.bus.cartridge()
    }

    #[inline]
    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.bus.cartridge_mut()
    }

    /// Every byte sent over the link port since the last reset.
    #[inline]
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial.output()
    }

    /// Ungated, side-effect free memory read.
    #[inline]
    pub fn peek(&self, addr: u16) -> u8 {
        use crate::cpu::Bus;
        self.bus.peek8(addr)
    }
}
