//! Side-effect free disassembly for the debug views.

use super::instructions::{self, CB_PREFIX};
use super::Bus;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisassembledInstruction {
    pub address: u16,
    /// First opcode byte (`0xCB` for extended instructions).
    pub opcode: u8,
    /// Bytes after `opcode`; for extended instructions this starts with
    /// the second opcode byte.
    pub operands: Vec<u8>,
    pub mnemonic: String,
    pub length: u8,
}

/// Decode one instruction at `address` using `peek8` only.
pub fn disassemble<B: Bus + ?Sized>(bus: &B, address: u16) -> DisassembledInstruction {
    let opcode = bus.peek8(address);

    if opcode == CB_PREFIX {
        let cb = bus.peek8(address.wrapping_add(1));
        let instruction = instructions::extended(cb);
        return DisassembledInstruction {
            address,
            opcode,
            operands: vec![cb],
            mnemonic: instruction.template.clone(),
            length: instruction.length,
        };
    }

    match instructions::primary(opcode) {
        Some(instruction) => {
            let operands: Vec<u8> = (1..instruction.length as u16)
                .map(|i| bus.peek8(address.wrapping_add(i)))
                .collect();
            DisassembledInstruction {
                address,
                opcode,
                mnemonic: format_template(&instruction.template, &operands),
                operands,
                length: instruction.length,
            }
        }
        None => DisassembledInstruction {
            address,
            opcode,
            operands: Vec::new(),
            mnemonic: format!("??? ${opcode:02X}"),
            length: 1,
        },
    }
}

/// `count` consecutive instructions starting at `address`.
pub fn disassemble_range<B: Bus + ?Sized>(
    bus: &B,
    address: u16,
    count: usize,
) -> Vec<DisassembledInstruction> {
    let mut out = Vec::with_capacity(count);
    let mut pc = address;
    for _ in 0..count {
        let instruction = disassemble(bus, pc);
        pc = pc.wrapping_add(instruction.length as u16);
        out.push(instruction);
    }
    out
}

/// Fill `{n}`, `{nn}` and `{e}` placeholders from little-endian operand bytes.
pub fn format_template(template: &str, operands: &[u8]) -> String {
    let byte = |i: usize| operands.get(i).copied().unwrap_or(0);
    let word = u16::from_le_bytes([byte(0), byte(1)]);

    template
        .replace("{nn}", &format!("${word:04X}"))
        .replace("{n}", &format!("${:02X}", byte(0)))
        .replace("{e}", &format!("{:+}", byte(0) as i8))
}
