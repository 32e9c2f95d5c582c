//! Per-stage instruction execution.
//!
//! `execute` runs the stage selected by `micro_stage` for the loaded
//! instruction. Stage 0 runs right after the opcode fetch; each stage that
//! touches the bus spends exactly one M-cycle, and `Continue` asks the
//! engine to come back for the next stage.

mod alu;
mod cb;
mod control;
mod ld;
mod stack;

use super::instructions::Op;
use super::{Bus, Cpu, CycleState};

impl Cpu {
    pub(super) fn execute<B: Bus>(&mut self, op: Op, bus: &mut B) -> CycleState {
        match op {
            Op::Nop => CycleState::Done,
            Op::Halt => CycleState::Halt,
            Op::Stop => {
                // STOP is followed by a padding byte that is skipped.
                self.fetch8(bus);
                CycleState::Stop
            }
            Op::Di => {
                bus.interrupts_mut().disable();
                CycleState::Done
            }
            Op::Ei => {
                bus.interrupts_mut().schedule_enable();
                CycleState::Done
            }

            Op::LdRR(dst, src) => self.exec_ld_r_r(dst, src),
            Op::LdRImm(r) => self.exec_ld_r_imm(bus, r),
            Op::LdRHl(r) => self.exec_ld_r_hl(bus, r),
            Op::LdHlR(r) => self.exec_ld_hl_r(bus, r),
            Op::LdHlImm => self.exec_ld_hl_imm(bus),
            Op::LdAInd(ind) => self.exec_ld_a_ind(bus, ind),
            Op::LdIndA(ind) => self.exec_ld_ind_a(bus, ind),
            Op::LdRrImm(rr) => self.exec_ld_rr_imm(bus, rr),
            Op::LdAbsSp => self.exec_ld_abs_sp(bus),
            Op::LdSpHl => self.exec_ld_sp_hl(bus),
            Op::LdHlSpE => self.exec_ld_hl_sp_e(bus),

            Op::Push(rr) => self.exec_push(bus, rr),
            Op::Pop(rr) => self.exec_pop(bus, rr),

            Op::Alu(alu_op, src) => self.exec_alu(bus, alu_op, src),
            Op::Inc8(target) => self.exec_inc_dec8(bus, target, super::alu::inc8),
            Op::Dec8(target) => self.exec_inc_dec8(bus, target, super::alu::dec8),
            Op::Inc16(rr) => self.exec_step16(bus, rr, 1),
            Op::Dec16(rr) => self.exec_step16(bus, rr, 0xFFFF),
            Op::AddHl(rr) => self.exec_add_hl(bus, rr),
            Op::AddSpE => self.exec_add_sp_e(bus),
            Op::Rlca | Op::Rrca | Op::Rla | Op::Rra => self.exec_rotate_a(op),
            Op::Daa => self.exec_daa(),
            Op::Cpl => self.exec_cpl(),
            Op::Scf => self.exec_scf(),
            Op::Ccf => self.exec_ccf(),

            Op::Jp(cc) => self.exec_jp(bus, cc),
            Op::JpHl => {
                self.regs.pc = self.regs.hl();
                CycleState::Done
            }
            Op::Jr(cc) => self.exec_jr(bus, cc),
            Op::Call(cc) => self.exec_call(bus, cc),
            Op::Ret(None) => self.exec_ret(bus, false),
            Op::Ret(Some(cc)) => self.exec_ret_cc(bus, cc),
            Op::Reti => self.exec_ret(bus, true),
            Op::Rst(vector) => self.exec_rst(bus, vector),

            Op::Cb(cb_op, target) => self.exec_cb(bus, cb_op, target),
        }
    }

    /// Operand low byte into `micro_imm16`.
    #[inline]
    fn fetch_imm_lo<B: Bus>(&mut self, bus: &mut B) {
        self.micro_imm16 = self.fetch8(bus) as u16;
    }

    /// Operand high byte into `micro_imm16`.
    #[inline]
    fn fetch_imm_hi<B: Bus>(&mut self, bus: &mut B) {
        let hi = self.fetch8(bus) as u16;
        self.micro_imm16 |= hi << 8;
    }
}
