//! Opcode tables.
//!
//! Both 256-entry tables (primary and `CB`-prefixed) are built once from the
//! pure decode functions below and never change afterwards. An entry only
//! describes *what* an opcode does; the per-M-cycle behaviour lives in
//! `cpu::exec`.

use lazy_static::lazy_static;

use super::regs::{Cond, R16, R8};

/// Memory operand for the accumulator load/store family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indirect {
    BC,
    DE,
    /// `(HL+)`
    HlInc,
    /// `(HL-)`
    HlDec,
    /// `(nn)`
    Absolute,
    /// `(FF00+n)`
    HighImm,
    /// `(FF00+C)`
    HighC,
}

/// Source operand of the 8-bit ALU group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Src8 {
    Reg(R8),
    /// `(HL)`
    Hl,
    Imm,
}

/// Register-or-`(HL)` operand used by INC/DEC and the CB table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Reg(R8),
    Hl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CbOp {
    Rot(RotOp),
    Bit(u8),
    Res(u8),
    Set(u8),
}

/// Operation kind plus operand descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Nop,
    Halt,
    Stop,
    Di,
    Ei,

    LdRR(R8, R8),
    LdRImm(R8),
    LdRHl(R8),
    LdHlR(R8),
    LdHlImm,
    LdAInd(Indirect),
    LdIndA(Indirect),

    LdRrImm(R16),
    LdAbsSp,
    LdSpHl,
    LdHlSpE,
    Push(R16),
    Pop(R16),

    Alu(AluOp, Src8),
    Inc8(Target),
    Dec8(Target),
    Inc16(R16),
    Dec16(R16),
    AddHl(R16),
    AddSpE,

    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,

    Jp(Option<Cond>),
    JpHl,
    Jr(Option<Cond>),
    Call(Option<Cond>),
    Ret(Option<Cond>),
    Reti,
    Rst(u8),

    Cb(CbOp, Target),
}

/// Immutable opcode descriptor.
///
/// `template` is the display name with operand placeholders `{n}`, `{nn}`
/// and `{e}` that the disassembler fills in from the operand bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub length: u8,
    pub template: String,
    pub op: Op,
}

impl Instruction {
    fn new(length: u8, template: impl Into<String>, op: Op) -> Self {
        Self {
            length,
            template: template.into(),
            op,
        }
    }

    /// Display name with placeholders shown as bare operand names.
    pub fn mnemonic(&self) -> String {
        self.template
            .replace("{nn}", "nn")
            .replace("{n}", "n")
            .replace("{e}", "e")
    }
}

lazy_static! {
    static ref PRIMARY: [Option<Instruction>; 256] =
        std::array::from_fn(|opcode| decode_primary(opcode as u8));
    static ref EXTENDED: [Instruction; 256] =
        std::array::from_fn(|opcode| decode_cb(opcode as u8));
}

pub const CB_PREFIX: u8 = 0xCB;

/// Primary-table lookup. `None` for the unused opcodes and for the `CB`
/// prefix itself.
#[inline]
pub fn primary(opcode: u8) -> Option<&'static Instruction> {
    PRIMARY[opcode as usize].as_ref()
}

/// Extended (`CB xx`) table lookup; every slot is populated.
#[inline]
pub fn extended(opcode: u8) -> &'static Instruction {
    &EXTENDED[opcode as usize]
}

/// Register field order used throughout the encoding; index 6 is `(HL)`.
fn r8_field(bits: u8) -> Option<R8> {
    match bits & 0x07 {
        0 => Some(R8::B),
        1 => Some(R8::C),
        2 => Some(R8::D),
        3 => Some(R8::E),
        4 => Some(R8::H),
        5 => Some(R8::L),
        6 => None,
        _ => Some(R8::A),
    }
}

fn target_field(bits: u8) -> Target {
    r8_field(bits).map_or(Target::Hl, Target::Reg)
}

fn target_name(target: Target) -> &'static str {
    match target {
        Target::Reg(r) => r.name(),
        Target::Hl => "(HL)",
    }
}

fn rp_field(opcode: u8) -> R16 {
    match (opcode >> 4) & 0x03 {
        0 => R16::BC,
        1 => R16::DE,
        2 => R16::HL,
        _ => R16::SP,
    }
}

/// Register pair field for PUSH/POP, where SP's slot is taken by AF.
fn rp2_field(opcode: u8) -> R16 {
    match rp_field(opcode) {
        R16::SP => R16::AF,
        other => other,
    }
}

fn cond_field(opcode: u8) -> Cond {
    match (opcode >> 3) & 0x03 {
        0 => Cond::NZ,
        1 => Cond::Z,
        2 => Cond::NC,
        _ => Cond::C,
    }
}

fn alu_field(opcode: u8) -> AluOp {
    match (opcode >> 3) & 0x07 {
        0 => AluOp::Add,
        1 => AluOp::Adc,
        2 => AluOp::Sub,
        3 => AluOp::Sbc,
        4 => AluOp::And,
        5 => AluOp::Xor,
        6 => AluOp::Or,
        _ => AluOp::Cp,
    }
}

fn alu_prefix(op: AluOp) -> &'static str {
    match op {
        AluOp::Add => "ADD A, ",
        AluOp::Adc => "ADC A, ",
        AluOp::Sub => "SUB ",
        AluOp::Sbc => "SBC A, ",
        AluOp::And => "AND ",
        AluOp::Xor => "XOR ",
        AluOp::Or => "OR ",
        AluOp::Cp => "CP ",
    }
}

fn decode_primary(opcode: u8) -> Option<Instruction> {
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;

    let ins = match opcode {
        0x00 => Instruction::new(1, "NOP", Op::Nop),
        0x10 => Instruction::new(2, "STOP", Op::Stop),
        0x76 => Instruction::new(1, "HALT", Op::Halt),
        0xF3 => Instruction::new(1, "DI", Op::Di),
        0xFB => Instruction::new(1, "EI", Op::Ei),

        // 16-bit immediate loads and register pair arithmetic.
        op if op & 0xCF == 0x01 => {
            let rr = rp_field(op);
            Instruction::new(3, format!("LD {}, {{nn}}", rr.name()), Op::LdRrImm(rr))
        }
        op if op & 0xCF == 0x03 => {
            let rr = rp_field(op);
            Instruction::new(1, format!("INC {}", rr.name()), Op::Inc16(rr))
        }
        op if op & 0xCF == 0x0B => {
            let rr = rp_field(op);
            Instruction::new(1, format!("DEC {}", rr.name()), Op::Dec16(rr))
        }
        op if op & 0xCF == 0x09 => {
            let rr = rp_field(op);
            Instruction::new(1, format!("ADD HL, {}", rr.name()), Op::AddHl(rr))
        }

        // Accumulator indirect loads.
        0x02 => Instruction::new(1, "LD (BC), A", Op::LdIndA(Indirect::BC)),
        0x12 => Instruction::new(1, "LD (DE), A", Op::LdIndA(Indirect::DE)),
        0x22 => Instruction::new(1, "LD (HL+), A", Op::LdIndA(Indirect::HlInc)),
        0x32 => Instruction::new(1, "LD (HL-), A", Op::LdIndA(Indirect::HlDec)),
        0x0A => Instruction::new(1, "LD A, (BC)", Op::LdAInd(Indirect::BC)),
        0x1A => Instruction::new(1, "LD A, (DE)", Op::LdAInd(Indirect::DE)),
        0x2A => Instruction::new(1, "LD A, (HL+)", Op::LdAInd(Indirect::HlInc)),
        0x3A => Instruction::new(1, "LD A, (HL-)", Op::LdAInd(Indirect::HlDec)),

        // INC/DEC/LD on the r8 field in bits 3-5.
        op if op & 0xC7 == 0x04 => {
            let t = target_field(y);
            Instruction::new(1, format!("INC {}", target_name(t)), Op::Inc8(t))
        }
        op if op & 0xC7 == 0x05 => {
            let t = target_field(y);
            Instruction::new(1, format!("DEC {}", target_name(t)), Op::Dec8(t))
        }
        0x36 => Instruction::new(2, "LD (HL), {n}", Op::LdHlImm),
        op if op & 0xC7 == 0x06 => {
            let r = r8_field(y)?;
            Instruction::new(2, format!("LD {}, {{n}}", r.name()), Op::LdRImm(r))
        }

        0x07 => Instruction::new(1, "RLCA", Op::Rlca),
        0x0F => Instruction::new(1, "RRCA", Op::Rrca),
        0x17 => Instruction::new(1, "RLA", Op::Rla),
        0x1F => Instruction::new(1, "RRA", Op::Rra),
        0x27 => Instruction::new(1, "DAA", Op::Daa),
        0x2F => Instruction::new(1, "CPL", Op::Cpl),
        0x37 => Instruction::new(1, "SCF", Op::Scf),
        0x3F => Instruction::new(1, "CCF", Op::Ccf),

        0x08 => Instruction::new(3, "LD ({nn}), SP", Op::LdAbsSp),
        0x18 => Instruction::new(2, "JR {e}", Op::Jr(None)),
        op if op & 0xE7 == 0x20 => {
            let cc = cond_field(op);
            Instruction::new(2, format!("JR {}, {{e}}", cc.name()), Op::Jr(Some(cc)))
        }

        // 0x40-0x7F: LD r, r' (0x76 is HALT, matched above).
        0x40..=0x7F => match (r8_field(y), r8_field(z)) {
            (Some(dst), Some(src)) => Instruction::new(
                1,
                format!("LD {}, {}", dst.name(), src.name()),
                Op::LdRR(dst, src),
            ),
            (Some(dst), None) => {
                Instruction::new(1, format!("LD {}, (HL)", dst.name()), Op::LdRHl(dst))
            }
            (None, Some(src)) => {
                Instruction::new(1, format!("LD (HL), {}", src.name()), Op::LdHlR(src))
            }
            (None, None) => return None,
        },

        // 0x80-0xBF: ALU A, r.
        0x80..=0xBF => {
            let alu = alu_field(opcode);
            let (src, name) = match r8_field(z) {
                Some(r) => (Src8::Reg(r), r.name()),
                None => (Src8::Hl, "(HL)"),
            };
            Instruction::new(1, format!("{}{}", alu_prefix(alu), name), Op::Alu(alu, src))
        }

        op if op & 0xC7 == 0xC6 => {
            let alu = alu_field(op);
            Instruction::new(2, format!("{}{{n}}", alu_prefix(alu)), Op::Alu(alu, Src8::Imm))
        }

        op if op & 0xE7 == 0xC0 => {
            let cc = cond_field(op);
            Instruction::new(1, format!("RET {}", cc.name()), Op::Ret(Some(cc)))
        }
        op if op & 0xE7 == 0xC2 => {
            let cc = cond_field(op);
            Instruction::new(3, format!("JP {}, {{nn}}", cc.name()), Op::Jp(Some(cc)))
        }
        op if op & 0xE7 == 0xC4 => {
            let cc = cond_field(op);
            Instruction::new(3, format!("CALL {}, {{nn}}", cc.name()), Op::Call(Some(cc)))
        }
        op if op & 0xCF == 0xC1 => {
            let rr = rp2_field(op);
            Instruction::new(1, format!("POP {}", rr.name()), Op::Pop(rr))
        }
        op if op & 0xCF == 0xC5 => {
            let rr = rp2_field(op);
            Instruction::new(1, format!("PUSH {}", rr.name()), Op::Push(rr))
        }
        op if op & 0xC7 == 0xC7 => {
            let vector = y * 8;
            Instruction::new(1, format!("RST ${:02X}", vector), Op::Rst(vector))
        }

        0xC3 => Instruction::new(3, "JP {nn}", Op::Jp(None)),
        0xC9 => Instruction::new(1, "RET", Op::Ret(None)),
        0xD9 => Instruction::new(1, "RETI", Op::Reti),
        0xCD => Instruction::new(3, "CALL {nn}", Op::Call(None)),
        0xE9 => Instruction::new(1, "JP HL", Op::JpHl),

        0xE0 => Instruction::new(2, "LDH ({n}), A", Op::LdIndA(Indirect::HighImm)),
        0xF0 => Instruction::new(2, "LDH A, ({n})", Op::LdAInd(Indirect::HighImm)),
        0xE2 => Instruction::new(1, "LD (C), A", Op::LdIndA(Indirect::HighC)),
        0xF2 => Instruction::new(1, "LD A, (C)", Op::LdAInd(Indirect::HighC)),
        0xEA => Instruction::new(3, "LD ({nn}), A", Op::LdIndA(Indirect::Absolute)),
        0xFA => Instruction::new(3, "LD A, ({nn})", Op::LdAInd(Indirect::Absolute)),

        0xE8 => Instruction::new(2, "ADD SP, {e}", Op::AddSpE),
        0xF8 => Instruction::new(2, "LD HL, SP{e}", Op::LdHlSpE),
        0xF9 => Instruction::new(1, "LD SP, HL", Op::LdSpHl),

        // 0xCB is the prefix; D3 DB DD E3 E4 EB EC ED F4 FC FD are unused.
        _ => return None,
    };
    Some(ins)
}

fn decode_cb(opcode: u8) -> Instruction {
    let index = (opcode >> 3) & 0x07;
    let target = target_field(opcode);
    let operand = target_name(target);

    let (op, name) = match opcode >> 6 {
        0 => {
            let (rot, name) = match index {
                0 => (RotOp::Rlc, "RLC"),
                1 => (RotOp::Rrc, "RRC"),
                2 => (RotOp::Rl, "RL"),
                3 => (RotOp::Rr, "RR"),
                4 => (RotOp::Sla, "SLA"),
                5 => (RotOp::Sra, "SRA"),
                6 => (RotOp::Swap, "SWAP"),
                _ => (RotOp::Srl, "SRL"),
            };
            (CbOp::Rot(rot), format!("{} {}", name, operand))
        }
        1 => (CbOp::Bit(index), format!("BIT {}, {}", index, operand)),
        2 => (CbOp::Res(index), format!("RES {}, {}", index, operand)),
        _ => (CbOp::Set(index), format!("SET {}, {}", index, operand)),
    };

    Instruction::new(2, name, Op::Cb(op, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_primary_opcodes_are_absent() {
        for opcode in [
            0xCB, 0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
        ] {
            assert!(primary(opcode).is_none(), "opcode {opcode:02X}");
        }
        let populated = (0..=255u8).filter(|&op| primary(op).is_some()).count();
        assert_eq!(populated, 256 - 12);
    }

    #[test]
    fn primary_decode_samples() {
        assert_eq!(primary(0x01).map(|i| i.op), Some(Op::LdRrImm(R16::BC)));
        assert_eq!(primary(0x31).map(|i| i.op), Some(Op::LdRrImm(R16::SP)));
        assert_eq!(primary(0xF1).map(|i| i.op), Some(Op::Pop(R16::AF)));
        assert_eq!(primary(0x34).map(|i| i.op), Some(Op::Inc8(Target::Hl)));
        assert_eq!(primary(0x46).map(|i| i.op), Some(Op::LdRHl(R8::B)));
        assert_eq!(primary(0x70).map(|i| i.op), Some(Op::LdHlR(R8::B)));
        assert_eq!(primary(0x76).map(|i| i.op), Some(Op::Halt));
        assert_eq!(primary(0xBE).map(|i| i.op), Some(Op::Alu(AluOp::Cp, Src8::Hl)));
        assert_eq!(primary(0xFE).map(|i| i.op), Some(Op::Alu(AluOp::Cp, Src8::Imm)));
        assert_eq!(primary(0xD8).map(|i| i.op), Some(Op::Ret(Some(Cond::C))));
        assert_eq!(primary(0xFF).map(|i| i.op), Some(Op::Rst(0x38)));
        assert_eq!(primary(0x10).map(|i| i.length), Some(2));
    }

    #[test]
    fn extended_decode_samples() {
        assert_eq!(extended(0x00).op, Op::Cb(CbOp::Rot(RotOp::Rlc), Target::Reg(R8::B)));
        assert_eq!(extended(0x36).op, Op::Cb(CbOp::Rot(RotOp::Swap), Target::Hl));
        assert_eq!(extended(0x7E).op, Op::Cb(CbOp::Bit(7), Target::Hl));
        assert_eq!(extended(0x87).op, Op::Cb(CbOp::Res(0), Target::Reg(R8::A)));
        assert_eq!(extended(0xFF).template, "SET 7, A");
    }

    #[test]
    fn mnemonic_strips_placeholders() {
        let ld = primary(0x3E).map(|i| i.mnemonic());
        assert_eq!(ld.as_deref(), Some("LD A, n"));
        let jr = primary(0x20).map(|i| i.mnemonic());
        assert_eq!(jr.as_deref(), Some("JR NZ, e"));
    }
}
