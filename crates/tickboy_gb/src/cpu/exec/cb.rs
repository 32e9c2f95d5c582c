use crate::cpu::alu;
use crate::cpu::instructions::{CbOp, RotOp, Target};
use crate::cpu::regs::Flags;
use crate::cpu::{Bus, Cpu, CycleState};

impl Cpu {
    /// CB-prefixed instructions. Both opcode bytes were fetched already.
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B, op: CbOp, target: Target) -> CycleState {
        match target {
            Target::Reg(r) => {
                if let Some(value) = self.apply_cb(op, self.regs.read8(r)) {
                    self.regs.write8(r, value);
                }
                CycleState::Done
            }
            Target::Hl => match (op, self.micro_stage) {
                (CbOp::Bit(_), _) => {
                    let value = self.cycle_read(bus, self.regs.hl());
                    self.apply_cb(op, value);
                    CycleState::Done
                }
                (_, 0) => {
                    self.micro_imm16 = self.cycle_read(bus, self.regs.hl()) as u16;
                    CycleState::Continue
                }
                _ => {
                    let old = self.micro_imm16 as u8;
                    let value = self.apply_cb(op, old).unwrap_or(old);
                    self.cycle_write(bus, self.regs.hl(), value);
                    CycleState::Done
                }
            },
        }
    }

    /// Result to store back, or `None` for BIT which only sets flags.
    fn apply_cb(&mut self, op: CbOp, value: u8) -> Option<u8> {
        match op {
            CbOp::Rot(rot) => {
                let carry = self.regs.flag(Flags::C);
                let result = match rot {
                    RotOp::Rlc => alu::rlc(value),
                    RotOp::Rrc => alu::rrc(value),
                    RotOp::Rl => alu::rl(value, carry),
                    RotOp::Rr => alu::rr(value, carry),
                    RotOp::Sla => alu::sla(value),
                    RotOp::Sra => alu::sra(value),
                    RotOp::Swap => alu::swap(value),
                    RotOp::Srl => alu::srl(value),
                };
                self.regs.set_flags(result.flags);
                Some(result.value)
            }
            CbOp::Bit(index) => {
                self.regs
                    .update_flags(Flags::Z | Flags::N | Flags::H, alu::bit(value, index));
                None
            }
            CbOp::Res(index) => Some(value & !(1 << index)),
            CbOp::Set(index) => Some(value | (1 << index)),
        }
    }
}
