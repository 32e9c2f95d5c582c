//! Stateless arithmetic/logic helpers.
//!
//! Every function maps its operands to a result plus the flag state the
//! operation produces. Callers decide which flags the instruction actually
//! writes (INC/DEC, for instance, leave C alone).

use super::regs::Flags;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: Flags,
}

impl AluResult {
    #[inline]
    fn new(value: u8, flags: Flags) -> Self {
        Self { value, flags }
    }
}

#[inline]
fn zero(value: u8) -> Flags {
    if value == 0 {
        Flags::Z
    } else {
        Flags::empty()
    }
}

#[inline]
fn flag_if(cond: bool, flag: Flags) -> Flags {
    if cond {
        flag
    } else {
        Flags::empty()
    }
}

/// Core 8-bit ADD/ADC.
pub fn add8(a: u8, b: u8, carry_in: bool) -> AluResult {
    let c = carry_in as u8;
    let half = (a & 0x0F) + (b & 0x0F) + c;
    let full = a as u16 + b as u16 + c as u16;
    let value = full as u8;
    AluResult::new(
        value,
        zero(value) | flag_if(half > 0x0F, Flags::H) | flag_if(full > 0xFF, Flags::C),
    )
}

/// Core 8-bit SUB/SBC. Also used by CP, which discards `value`.
pub fn sub8(a: u8, b: u8, carry_in: bool) -> AluResult {
    let c = carry_in as i16;
    let half = (a & 0x0F) as i16 - (b & 0x0F) as i16 - c;
    let full = a as i16 - b as i16 - c;
    let value = full as u8;
    AluResult::new(
        value,
        zero(value) | Flags::N | flag_if(half < 0, Flags::H) | flag_if(full < 0, Flags::C),
    )
}

pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult::new(value, zero(value) | Flags::H)
}

pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult::new(value, zero(value))
}

pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult::new(value, zero(value))
}

/// INC r / INC (HL): writes Z N H.
pub fn inc8(a: u8) -> AluResult {
    let value = a.wrapping_add(1);
    AluResult::new(value, zero(value) | flag_if((a & 0x0F) == 0x0F, Flags::H))
}

/// DEC r / DEC (HL): writes Z N H.
pub fn dec8(a: u8) -> AluResult {
    let value = a.wrapping_sub(1);
    AluResult::new(
        value,
        zero(value) | Flags::N | flag_if((a & 0x0F) == 0, Flags::H),
    )
}

/// ADD HL,rr: writes N H C, Z untouched.
pub fn add16(a: u16, b: u16) -> (u16, Flags) {
    let value = a.wrapping_add(b);
    let flags = flag_if((a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF, Flags::H)
        | flag_if(a as u32 + b as u32 > 0xFFFF, Flags::C);
    (value, flags)
}

/// SP plus a signed immediate, shared by ADD SP,e and LD HL,SP+e.
///
/// Z and N are cleared; H and C come from the unsigned low-byte addition.
pub fn add_sp_signed(sp: u16, offset: u8) -> (u16, Flags) {
    let wide = offset as i8 as i16 as u16;
    let flags = flag_if((sp & 0x000F) + (wide & 0x000F) > 0x000F, Flags::H)
        | flag_if((sp & 0x00FF) + (wide & 0x00FF) > 0x00FF, Flags::C);
    (sp.wrapping_add(wide), flags)
}

/// Decimal adjust after BCD addition/subtraction. Writes Z H C, keeps N.
pub fn daa(a: u8, flags: Flags) -> AluResult {
    let mut adjust: u8 = if flags.contains(Flags::C) { 0x60 } else { 0x00 };
    if flags.contains(Flags::H) {
        adjust |= 0x06;
    }

    let value = if !flags.contains(Flags::N) {
        if (a & 0x0F) > 0x09 {
            adjust |= 0x06;
        }
        if a > 0x99 {
            adjust |= 0x60;
        }
        a.wrapping_add(adjust)
    } else {
        a.wrapping_sub(adjust)
    };

    AluResult::new(
        value,
        zero(value) | (flags & Flags::N) | flag_if(adjust >= 0x60, Flags::C),
    )
}

/// CPL: writes N H.
pub fn cpl(a: u8) -> AluResult {
    AluResult::new(!a, Flags::N | Flags::H)
}

pub fn rlc(a: u8) -> AluResult {
    let value = a.rotate_left(1);
    AluResult::new(value, zero(value) | flag_if(a & 0x80 != 0, Flags::C))
}

pub fn rrc(a: u8) -> AluResult {
    let value = a.rotate_right(1);
    AluResult::new(value, zero(value) | flag_if(a & 0x01 != 0, Flags::C))
}

pub fn rl(a: u8, carry_in: bool) -> AluResult {
    let value = (a << 1) | carry_in as u8;
    AluResult::new(value, zero(value) | flag_if(a & 0x80 != 0, Flags::C))
}

pub fn rr(a: u8, carry_in: bool) -> AluResult {
    let value = (a >> 1) | ((carry_in as u8) << 7);
    AluResult::new(value, zero(value) | flag_if(a & 0x01 != 0, Flags::C))
}

pub fn sla(a: u8) -> AluResult {
    let value = a << 1;
    AluResult::new(value, zero(value) | flag_if(a & 0x80 != 0, Flags::C))
}

pub fn sra(a: u8) -> AluResult {
    let value = (a >> 1) | (a & 0x80);
    AluResult::new(value, zero(value) | flag_if(a & 0x01 != 0, Flags::C))
}

pub fn srl(a: u8) -> AluResult {
    let value = a >> 1;
    AluResult::new(value, zero(value) | flag_if(a & 0x01 != 0, Flags::C))
}

pub fn swap(a: u8) -> AluResult {
    let value = a.rotate_left(4);
    AluResult::new(value, zero(value))
}

/// BIT b,r: writes Z N H (N cleared, H set), C untouched.
pub fn bit(a: u8, index: u8) -> Flags {
    zero(a & (1 << (index & 7))) | Flags::H
}
