//! Owned, read-only view of the machine for debuggers.

use crate::cpu::disasm::{disassemble_range, DisassembledInstruction};
use crate::cpu::{Bus, Cpu, Flags};

use super::ppu::PpuMode;
use super::GameBoyBus;

/// Instructions disassembled after the current one.
const LOOKAHEAD: usize = 10;
const STACK_WINDOW: u16 = 32;
const CODE_BEFORE: u16 = 16;
const CODE_AFTER: u16 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterView {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlagView {
    pub z: bool,
    pub n: bool,
    pub h: bool,
    pub c: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Each window is `(address, byte)` pairs in address-window order, so a
/// window that wraps past 0xFFFF continues at 0x0000.
pub struct MemoryView {
    pub stack: Vec<(u16, u8)>,
    pub code: Vec<(u16, u8)>,
    /// Present when a snapshot range is configured.
    pub custom: Option<Vec<(u16, u8)>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptView {
    pub ime: bool,
    pub ie: u8,
    pub iflag: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PpuView {
    pub lcdc: u8,
    pub stat: u8,
    pub scy: u8,
    pub scx: u8,
    pub ly: u8,
    pub lyc: u8,
    pub bgp: u8,
    pub obp0: u8,
    pub obp1: u8,
    pub wy: u8,
    pub wx: u8,
    pub mode: PpuMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub registers: RegisterView,
    pub flags: FlagView,
    /// The current instruction first, then the ones that follow it.
    pub instructions: Vec<DisassembledInstruction>,
    pub memory: MemoryView,
    pub interrupts: InterruptView,
    pub ppu: PpuView,
}

impl Snapshot {
    /// Everything is read through `peek8`, so capturing never disturbs
    /// the machine.
    pub(crate) fn capture(cpu: &Cpu, bus: &GameBoyBus, range: Option<(u16, u16)>) -> Self {
        let regs = &cpu.regs;
        let flags = regs.flags();

        let current = if cpu.in_progress() {
            cpu.current_address()
        } else {
            regs.pc
        };

        let ppu_regs = bus.ppu.registers();
        let ic = bus.interrupts();

        Self {
            registers: RegisterView {
                a: regs.a,
                b: regs.b,
                c: regs.c,
                d: regs.d,
                e: regs.e,
                h: regs.h,
                l: regs.l,
                sp: regs.sp,
                pc: regs.pc,
            },
            flags: FlagView {
                z: flags.contains(Flags::Z),
                n: flags.contains(Flags::N),
                h: flags.contains(Flags::H),
                c: flags.contains(Flags::C),
            },
            instructions: disassemble_range(bus, current, LOOKAHEAD + 1),
            memory: MemoryView {
                stack: window(bus, regs.sp, STACK_WINDOW),
                code: window(bus, regs.pc.wrapping_sub(CODE_BEFORE), CODE_BEFORE + CODE_AFTER),
                custom: range.map(|(start, end)| window(bus, start, end - start)),
            },
            interrupts: InterruptView {
                ime: ic.ime(),
                ie: ic.ie(),
                iflag: ic.read_if(),
            },
            ppu: PpuView {
                lcdc: ppu_regs.lcdc,
                stat: bus.ppu.read_register(super::ppu::STAT),
                scy: ppu_regs.scy,
                scx: ppu_regs.scx,
                ly: ppu_regs.ly,
                lyc: ppu_regs.lyc,
                bgp: ppu_regs.bgp,
                obp0: ppu_regs.obp0,
                obp1: ppu_regs.obp1,
                wy: ppu_regs.wy,
                wx: ppu_regs.wx,
                mode: bus.ppu.mode(),
            },
        }
    }
}

/// `len` bytes from `start`, wrapping at the top of the address space.
fn window(bus: &GameBoyBus, start: u16, len: u16) -> Vec<(u16, u8)> {
    (0..len)
        .map(|offset| {
            let addr = start.wrapping_add(offset);
            (addr, bus.peek8(addr))
        })
        .collect()
}
