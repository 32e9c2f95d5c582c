use super::disasm::{disassemble, disassemble_range};
use super::interrupts::Interrupt;
use super::*;

struct TestBus {
    memory: Box<[u8; 0x10000]>,
    interrupts: InterruptController,
    cycles: u64,
}

impl Default for TestBus {
    fn default() -> Self {
        let mut interrupts = InterruptController::default();
        interrupts.write_if(0);
        Self {
            memory: Box::new([0; 0x10000]),
            interrupts,
            cycles: 0,
        }
    }
}

impl TestBus {
    fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut bus = Self::default();
        bus.load(origin, program);
        bus
    }

    fn load(&mut self, origin: u16, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            self.memory[origin as usize + i] = *byte;
        }
    }
}

impl Bus for TestBus {
    fn tick(&mut self, cycles: u32) {
        self.cycles += cycles as u64;
    }

    fn read8(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    fn peek8(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    fn interrupts_mut(&mut self) -> &mut InterruptController {
        &mut self.interrupts
    }
}

fn cpu_at(pc: u16) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.regs.pc = pc;
    cpu
}

/// Step until the loaded instruction (or dispatch) finishes and return the
/// T-cycles it consumed.
fn run_instruction(cpu: &mut Cpu, bus: &mut TestBus) -> u64 {
    let start = bus.cycles;
    loop {
        match cpu.step(bus) {
            Ok(CycleState::Continue) => continue,
            Ok(_) => break,
            Err(err) => panic!("unexpected CPU error: {err}"),
        }
    }
    bus.cycles - start
}

#[test]
fn register_pairs_round_trip_and_f_drops_low_nibble() {
    let mut regs = Registers::default();
    regs.set_bc(0x1234);
    regs.set_de(0xABCD);
    regs.set_hl(0x8001);
    regs.set_af(0x12FF);

    assert_eq!(regs.bc(), 0x1234);
    assert_eq!(regs.de(), 0xABCD);
    assert_eq!(regs.hl(), 0x8001);
    assert_eq!(regs.af(), 0x12F0);
    assert_eq!(regs.f, 0xF0);
    assert_eq!((regs.b, regs.c), (0x12, 0x34));
}

#[test]
fn post_boot_state() {
    let cpu = Cpu::new();
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
    assert_eq!(cpu.state(), CpuState::Running);
}

#[test]
fn nop_fetch_then_complete() {
    let mut bus = TestBus::with_program(0x0100, &[0x00]);
    let mut cpu = Cpu::new();

    assert_eq!(cpu.step(&mut bus), Ok(CycleState::Continue));
    assert!(cpu.in_progress());
    assert_eq!(bus.cycles, 4);
    assert_eq!(cpu.step(&mut bus), Ok(CycleState::Done));
    assert!(!cpu.in_progress());
    assert_eq!(bus.cycles, 4);
    assert_eq!(cpu.regs.pc, 0x0101);
    assert_eq!(cpu.last_instruction().map(|i| i.mnemonic()), Some("NOP".to_string()));
}

#[test]
fn instruction_costs_in_mcycles() {
    // Post-boot flags are Z=1 N=0 H=1 C=1.
    let cases: &[(&[u8], u64, &str)] = &[
        (&[0x00], 1, "NOP"),
        (&[0x06, 0x12], 2, "LD B,n"),
        (&[0x46], 2, "LD B,(HL)"),
        (&[0x36, 0x12], 3, "LD (HL),n"),
        (&[0xFA, 0x00, 0xC0], 4, "LD A,(nn)"),
        (&[0xEA, 0x00, 0xC0], 4, "LD (nn),A"),
        (&[0xF0, 0x80], 3, "LDH A,(n)"),
        (&[0xE0, 0x80], 3, "LDH (n),A"),
        (&[0xF2], 2, "LD A,(C)"),
        (&[0x08, 0x00, 0xC0], 5, "LD (nn),SP"),
        (&[0xC5], 4, "PUSH BC"),
        (&[0xC1], 3, "POP BC"),
        (&[0x03], 2, "INC BC"),
        (&[0x09], 2, "ADD HL,BC"),
        (&[0xE8, 0x02], 4, "ADD SP,e"),
        (&[0xF8, 0x02], 3, "LD HL,SP+e"),
        (&[0xF9], 2, "LD SP,HL"),
        (&[0x34], 3, "INC (HL)"),
        (&[0xC3, 0x00, 0x02], 4, "JP nn"),
        (&[0xC2, 0x00, 0x02], 3, "JP NZ (not taken)"),
        (&[0xCA, 0x00, 0x02], 4, "JP Z (taken)"),
        (&[0xE9], 1, "JP HL"),
        (&[0x18, 0x02], 3, "JR e"),
        (&[0x20, 0x02], 2, "JR NZ (not taken)"),
        (&[0x28, 0x02], 3, "JR Z (taken)"),
        (&[0xCD, 0x00, 0x02], 6, "CALL nn"),
        (&[0xC4, 0x00, 0x02], 3, "CALL NZ (not taken)"),
        (&[0xCC, 0x00, 0x02], 6, "CALL Z (taken)"),
        (&[0xC9], 4, "RET"),
        (&[0xD9], 4, "RETI"),
        (&[0xC8], 5, "RET Z (taken)"),
        (&[0xC0], 2, "RET NZ (not taken)"),
        (&[0xFF], 4, "RST 38"),
        (&[0xCB, 0x11], 2, "RL C"),
        (&[0xCB, 0x46], 3, "BIT 0,(HL)"),
        (&[0xCB, 0xC6], 4, "SET 0,(HL)"),
        (&[0xCB, 0x16], 4, "RL (HL)"),
    ];

    for (program, mcycles, name) in cases {
        let mut bus = TestBus::with_program(0x0100, program);
        let mut cpu = Cpu::new();
        cpu.regs.set_hl(0xC000);
        cpu.regs.sp = 0xDFF0;
        let cycles = run_instruction(&mut cpu, &mut bus);
        assert_eq!(cycles, mcycles * 4, "{name}");
    }
}

#[test]
fn cycles_are_always_whole_mcycles() {
    let program = [
        0x3E, 0x05, // LD A,5
        0x3D, // DEC A
        0x20, 0xFD, // JR NZ,-3
        0xCD, 0x10, 0x01, // CALL 0x0110
        0x76, // HALT (not reached before the loop ends)
    ];
    let mut bus = TestBus::with_program(0x0100, &program);
    bus.load(0x0110, &[0xC5, 0xC1, 0xC9]); // PUSH BC; POP BC; RET
    let mut cpu = Cpu::new();

    for _ in 0..20 {
        cpu.step(&mut bus).ok();
        assert_eq!(bus.cycles % 4, 0);
    }
}

#[test]
fn alu_and_loads_produce_expected_values() {
    let program = [
        0x3E, 0x45, // LD A,0x45
        0xC6, 0x38, // ADD A,0x38
        0x27, // DAA
        0x47, // LD B,A
        0xD6, 0x83, // SUB 0x83
        0x21, 0x00, 0xC0, // LD HL,0xC000
        0x22, // LD (HL+),A
        0x32, // LD (HL-),A
    ];
    let mut bus = TestBus::with_program(0x0100, &program);
    let mut cpu = Cpu::new();

    run_instruction(&mut cpu, &mut bus);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x7D);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x83);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.b, 0x83);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.regs.flag(Flags::Z));
    assert!(cpu.regs.flag(Flags::N));
    run_instruction(&mut cpu, &mut bus);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.hl(), 0xC001);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.hl(), 0xC000);
}

#[test]
fn inc_dec_preserve_carry() {
    let mut bus = TestBus::with_program(0x0100, &[0x3C, 0x05]); // INC A; DEC B
    let mut cpu = Cpu::new();
    cpu.regs.a = 0x0F;
    cpu.regs.b = 0x01;
    cpu.regs.set_flags(Flags::C);

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x10);
    assert_eq!(cpu.regs.flags(), Flags::H | Flags::C);

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.b, 0x00);
    assert_eq!(cpu.regs.flags(), Flags::Z | Flags::N | Flags::C);
}

#[test]
fn accumulator_rotates_clear_zero() {
    let mut bus = TestBus::with_program(0x0100, &[0x07, 0xCB, 0x07]); // RLCA; RLC A
    let mut cpu = Cpu::new();
    cpu.regs.a = 0x00;

    run_instruction(&mut cpu, &mut bus);
    assert!(!cpu.regs.flag(Flags::Z));
    run_instruction(&mut cpu, &mut bus);
    assert!(cpu.regs.flag(Flags::Z));
}

#[test]
fn push_pop_af_masks_low_flag_bits() {
    let program = [
        0x01, 0xFF, 0x12, // LD BC,0x12FF
        0xC5, // PUSH BC
        0xF1, // POP AF
    ];
    let mut bus = TestBus::with_program(0x0100, &program);
    let mut cpu = Cpu::new();
    for _ in 0..3 {
        run_instruction(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.regs.a, 0x12);
    assert_eq!(cpu.regs.f, 0xF0);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn call_and_ret_use_stack() {
    let mut bus = TestBus::with_program(0x0100, &[0xCD, 0x00, 0x02]);
    bus.load(0x0200, &[0xC9]);
    let mut cpu = Cpu::new();

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0200);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFC], 0x03);
    assert_eq!(bus.memory[0xFFFD], 0x01);

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0103);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn jr_negative_offset() {
    let mut bus = TestBus::with_program(0x0100, &[0x18, 0xFE]); // JR -2
    let mut cpu = Cpu::new();
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test]
fn interrupt_dispatch_pushes_pc_and_costs_five_mcycles() {
    let mut bus = TestBus::with_program(0x0100, &[0x00]);
    let mut cpu = Cpu::new();
    bus.interrupts.set_ie(0x1F);
    bus.interrupts.enable();
    bus.interrupts.request(Interrupt::Timer);
    bus.interrupts.request(Interrupt::Joypad);

    let cycles = run_instruction(&mut cpu, &mut bus);
    assert_eq!(cycles, 20);
    assert_eq!(cpu.regs.pc, 0x0050);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFD], 0x01);
    assert_eq!(bus.memory[0xFFFC], 0x00);
    assert!(!bus.interrupts.ime());
    assert_eq!(bus.interrupts.read_if() & 0x1F, Interrupt::Joypad.mask());
}

#[test]
fn ei_enables_after_next_instruction() {
    let mut bus = TestBus::with_program(0x0100, &[0xFB, 0x00, 0x00]); // EI; NOP; NOP
    let mut cpu = Cpu::new();
    bus.interrupts.set_ie(Interrupt::VBlank.mask());
    bus.interrupts.request(Interrupt::VBlank);

    run_instruction(&mut cpu, &mut bus);
    assert!(!bus.interrupts.ime());
    assert_eq!(cpu.regs.pc, 0x0101);

    // The instruction right after EI still runs uninterrupted.
    run_instruction(&mut cpu, &mut bus);
    assert!(bus.interrupts.ime());
    assert_eq!(cpu.regs.pc, 0x0102);

    let cycles = run_instruction(&mut cpu, &mut bus);
    assert_eq!(cycles, 20);
    assert_eq!(cpu.regs.pc, 0x0040);
}

#[test]
fn reti_enables_immediately() {
    let mut bus = TestBus::with_program(0x0100, &[0xD9]);
    let mut cpu = Cpu::new();
    cpu.regs.sp = 0xC000;
    bus.load(0xC000, &[0x34, 0x12]);

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x1234);
    assert!(bus.interrupts.ime());
}

#[test]
fn halt_idles_until_interrupt_pending() {
    let mut bus = TestBus::with_program(0x0100, &[0x76, 0x3C]); // HALT; INC A
    let mut cpu = Cpu::new();
    bus.interrupts.set_ie(Interrupt::Timer.mask());

    assert_eq!(cpu.step(&mut bus), Ok(CycleState::Continue));
    assert_eq!(cpu.step(&mut bus), Ok(CycleState::Halt));
    assert_eq!(cpu.state(), CpuState::Halted);

    let before = bus.cycles;
    for _ in 0..3 {
        assert_eq!(cpu.step(&mut bus), Ok(CycleState::Done));
    }
    assert_eq!(bus.cycles - before, 12);
    assert_eq!(cpu.state(), CpuState::Halted);

    // Wakes without IME and continues after HALT, no dispatch.
    bus.interrupts.request(Interrupt::Timer);
    cpu.step(&mut bus).ok();
    assert_eq!(cpu.state(), CpuState::Running);
    let a = cpu.regs.a;
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, a.wrapping_add(1));
    assert_eq!(cpu.regs.pc, 0x0102);
}

#[test]
fn halt_bug_executes_next_byte_twice() {
    let mut bus = TestBus::with_program(0x0100, &[0x76, 0x3C, 0x00]); // HALT; INC A; NOP
    let mut cpu = Cpu::new();
    cpu.regs.a = 0;
    bus.interrupts.set_ie(Interrupt::VBlank.mask());
    bus.interrupts.request(Interrupt::VBlank);

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.state(), CpuState::Running);
    assert!(cpu.halt_bug());

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0101);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0102);
    assert_eq!(cpu.regs.a, 2);
}

#[test]
fn stop_waits_for_pending_without_cycles() {
    let mut bus = TestBus::with_program(0x0100, &[0x10, 0x00, 0x00]);
    let mut cpu = Cpu::new();
    bus.interrupts.set_ie(Interrupt::Joypad.mask());

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.state(), CpuState::Stopped);
    assert_eq!(cpu.regs.pc, 0x0102);

    let before = bus.cycles;
    cpu.step(&mut bus).ok();
    assert_eq!(bus.cycles, before);
    assert_eq!(cpu.state(), CpuState::Stopped);

    bus.interrupts.request(Interrupt::Joypad);
    cpu.step(&mut bus).ok();
    assert_eq!(cpu.state(), CpuState::Running);
}

#[test]
fn invalid_opcode_locks_until_reset() {
    let mut bus = TestBus::with_program(0x0100, &[0xD3]);
    let mut cpu = Cpu::new();

    let expected = Err(CoreError::InvalidOpcode {
        opcode: 0xD3,
        address: 0x0100,
    });
    assert_eq!(cpu.step(&mut bus), expected);
    assert_eq!(
        cpu.state(),
        CpuState::Locked {
            opcode: 0xD3,
            address: 0x0100
        }
    );
    let cycles = bus.cycles;
    assert_eq!(cpu.step(&mut bus), expected);
    assert_eq!(bus.cycles, cycles);

    cpu.reset();
    assert_eq!(cpu.state(), CpuState::Running);
}

#[test]
fn cb_hl_read_modify_write() {
    let mut bus = TestBus::with_program(0x0100, &[0xCB, 0xFE, 0xCB, 0x7E, 0xCB, 0x36]);
    let mut cpu = Cpu::new();
    cpu.regs.set_hl(0xC000);
    bus.memory[0xC000] = 0x01;

    run_instruction(&mut cpu, &mut bus); // SET 7,(HL)
    assert_eq!(bus.memory[0xC000], 0x81);
    run_instruction(&mut cpu, &mut bus); // BIT 7,(HL)
    assert!(!cpu.regs.flag(Flags::Z));
    assert!(cpu.regs.flag(Flags::H));
    run_instruction(&mut cpu, &mut bus); // SWAP (HL)
    assert_eq!(bus.memory[0xC000], 0x18);
    assert_eq!(cpu.regs.flags(), Flags::empty());
}

#[test]
fn add_sp_signed_flags() {
    let mut bus = TestBus::with_program(0x0100, &[0xE8, 0xFF, 0xF8, 0x01]);
    let mut cpu = Cpu::new();
    cpu.regs.sp = 0x00FF;

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.sp, 0x00FE);
    assert_eq!(cpu.regs.flags(), Flags::H | Flags::C);

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.hl(), 0x00FF);
    assert_eq!(cpu.regs.flags(), Flags::empty());
}

#[test]
fn disassembly_formats_operands() {
    let program = [
        0x3E, 0x42, // LD A,$42
        0xC3, 0x34, 0x12, // JP $1234
        0x18, 0xFE, // JR -2
        0xF8, 0x05, // LD HL,SP+5
        0xCB, 0x7C, // BIT 7,H
        0xD3, // invalid
    ];
    let bus = TestBus::with_program(0x0100, &program);

    let listing = disassemble_range(&bus, 0x0100, 6);
    let mnemonics: Vec<&str> = listing.iter().map(|i| i.mnemonic.as_str()).collect();
    assert_eq!(
        mnemonics,
        [
            "LD A, $42",
            "JP $1234",
            "JR -2",
            "LD HL, SP+5",
            "BIT 7, H",
            "??? $D3"
        ]
    );
    assert_eq!(listing[1].operands, vec![0x34, 0x12]);
    assert_eq!(listing[4].address, 0x0109);
    assert_eq!(disassemble(&bus, 0x010B).length, 1);
}
