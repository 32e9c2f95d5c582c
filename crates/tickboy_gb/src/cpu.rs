//! SM83 execution engine.
//!
//! The CPU advances in small steps: one step either fetches and decodes an
//! opcode, runs one stage of the loaded instruction, performs a complete
//! interrupt dispatch, or idles while halted. Every memory access goes
//! through [`Bus`] and is preceded by one M-cycle (4 T-cycles) of bus time,
//! so peripherals observe CPU accesses at the right moment.

pub mod alu;
pub mod disasm;
mod exec;
pub mod instructions;
pub mod interrupts;
pub mod regs;

#[cfg(test)]
mod tests;

use crate::error::CoreError;

use self::instructions::{Instruction, CB_PREFIX};
use self::interrupts::InterruptController;
pub use self::regs::{Flags, Registers};

/// Abstraction over the Game Boy bus as the CPU sees it.
///
/// `read8`/`write8` are pure accesses; time only passes through `tick`.
pub trait Bus {
    /// Advance every peripheral by `cycles` T-cycles.
    fn tick(&mut self, cycles: u32);
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);
    /// Side-effect free, ungated read for debugging views.
    fn peek8(&self, addr: u16) -> u8;
    fn interrupts(&self) -> &InterruptController;
    fn interrupts_mut(&mut self) -> &mut InterruptController;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuState {
    Running,
    Halted,
    Stopped,
    /// An unused opcode was fetched. Only a reset leaves this state.
    Locked { opcode: u8, address: u16 },
}

/// Result of a single CPU step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    /// The loaded instruction needs more stages.
    Continue,
    /// The instruction, dispatch or idle tick finished.
    Done,
    /// HALT completed.
    Halt,
    /// STOP completed.
    Stop,
}

#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    state: CpuState,
    current: Option<&'static Instruction>,
    last: Option<&'static Instruction>,
    /// Address `current` was fetched from.
    current_address: u16,
    halt_bug: bool,
    micro_stage: u8,
    micro_imm16: u16,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: Registers::post_boot(),
            state: CpuState::Running,
            current: None,
            last: None,
            current_address: 0,
            halt_bug: false,
            micro_stage: 0,
            micro_imm16: 0,
        }
    }

    /// Back to the post-boot register state with nothing in flight.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn state(&self) -> CpuState {
        self.state
    }

    /// True while an instruction is loaded and has stages left.
    #[inline]
    pub fn in_progress(&self) -> bool {
        self.current.is_some()
    }

    #[inline]
    pub fn current_instruction(&self) -> Option<&'static Instruction> {
        self.current
    }

    #[inline]
    pub fn current_address(&self) -> u16 {
        self.current_address
    }

    #[inline]
    pub fn last_instruction(&self) -> Option<&'static Instruction> {
        self.last
    }

    #[inline]
    pub fn halt_bug(&self) -> bool {
        self.halt_bug
    }

    /// Run one step of the engine.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<CycleState, CoreError> {
        match self.state {
            CpuState::Locked { opcode, address } => {
                return Err(CoreError::InvalidOpcode { opcode, address });
            }
            CpuState::Halted => return Ok(self.step_halted(bus)),
            CpuState::Stopped => return Ok(self.step_stopped(bus)),
            CpuState::Running => {}
        }

        match self.current {
            Some(instruction) => Ok(self.step_loaded(instruction, bus)),
            None if bus.interrupts().should_dispatch() => Ok(self.dispatch_interrupt(bus)),
            None => self.fetch_and_decode(bus),
        }
    }

    fn step_halted<B: Bus>(&mut self, bus: &mut B) -> CycleState {
        self.tick_mcycle(bus);
        if bus.interrupts().has_pending() {
            self.state = CpuState::Running;
        }
        CycleState::Done
    }

    fn step_stopped<B: Bus>(&mut self, bus: &mut B) -> CycleState {
        if bus.interrupts().has_pending() {
            self.state = CpuState::Running;
        }
        CycleState::Done
    }

    /// Interrupt entry: 2 idle M-cycles, push PCh, push PCl, 1 idle M-cycle.
    fn dispatch_interrupt<B: Bus>(&mut self, bus: &mut B) -> CycleState {
        let Some(interrupt) = bus.interrupts_mut().acknowledge() else {
            return CycleState::Done;
        };
        log::trace!("dispatch {:?} from PC={:04X}", interrupt, self.regs.pc);

        self.tick_mcycle(bus);
        self.tick_mcycle(bus);
        let [hi, lo] = self.regs.pc.to_be_bytes();
        self.push8(bus, hi);
        self.push8(bus, lo);
        self.tick_mcycle(bus);
        self.regs.pc = interrupt.vector();
        CycleState::Done
    }

    fn fetch_and_decode<B: Bus>(&mut self, bus: &mut B) -> Result<CycleState, CoreError> {
        let address = self.regs.pc;
        let opcode = self.fetch8(bus);
        if self.halt_bug {
            // The byte after HALT is read twice.
            self.halt_bug = false;
            self.regs.pc = address;
        }

        let instruction = if opcode == CB_PREFIX {
            Some(instructions::extended(self.fetch8(bus)))
        } else {
            instructions::primary(opcode)
        };

        let Some(instruction) = instruction else {
            log::warn!("invalid opcode {opcode:02X} at {address:04X}, CPU locked");
            self.state = CpuState::Locked { opcode, address };
            return Err(CoreError::InvalidOpcode { opcode, address });
        };

        self.current = Some(instruction);
        self.current_address = address;
        self.micro_stage = 0;
        self.micro_imm16 = 0;
        Ok(CycleState::Continue)
    }

    fn step_loaded<B: Bus>(&mut self, instruction: &'static Instruction, bus: &mut B) -> CycleState {
        let result = self.execute(instruction.op, bus);
        match result {
            CycleState::Continue => {
                self.micro_stage = self.micro_stage.wrapping_add(1);
            }
            CycleState::Done => self.complete(instruction, bus),
            CycleState::Halt => {
                self.complete(instruction, bus);
                let ic = bus.interrupts();
                if ic.has_pending() && !ic.ime() {
                    self.halt_bug = true;
                } else {
                    self.state = CpuState::Halted;
                }
            }
            CycleState::Stop => {
                self.complete(instruction, bus);
                self.state = CpuState::Stopped;
            }
        }
        result
    }

    fn complete<B: Bus>(&mut self, instruction: &'static Instruction, bus: &mut B) {
        bus.interrupts_mut().update_ime();
        self.current = None;
        self.last = Some(instruction);
        self.micro_stage = 0;
    }

    #[inline]
    pub(crate) fn tick_mcycle<B: Bus>(&mut self, bus: &mut B) {
        bus.tick(4);
    }

    #[inline]
    pub(crate) fn cycle_read<B: Bus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        bus.tick(4);
        bus.read8(addr)
    }

    #[inline]
    pub(crate) fn cycle_write<B: Bus>(&mut self, bus: &mut B, addr: u16, value: u8) {
        bus.tick(4);
        bus.write8(addr, value);
    }

    #[inline]
    pub(crate) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.pc;
        self.regs.pc = pc.wrapping_add(1);
        self.cycle_read(bus, pc)
    }

    #[inline]
    pub(crate) fn push8<B: Bus>(&mut self, bus: &mut B, value: u8) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        let sp = self.regs.sp;
        self.cycle_write(bus, sp, value);
    }

    #[inline]
    pub(crate) fn pop8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let sp = self.regs.sp;
        self.regs.sp = sp.wrapping_add(1);
        self.cycle_read(bus, sp)
    }
}
