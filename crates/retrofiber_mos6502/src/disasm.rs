//! Mnemonic disassembly, built from the same decoder the core executes.

use lazy_static::lazy_static;

use crate::cpu::{decode, Instr, Mode};

lazy_static! {
    static ref TABLE: Vec<Instr> = (0..=u8::MAX).map(decode).collect();
}

pub fn mnemonic(opcode: u8) -> &'static str {
    TABLE[opcode as usize].op.name()
}

/// Opcode plus operand bytes.
pub fn instruction_len(opcode: u8) -> u16 {
    1 + TABLE[opcode as usize].mode.operand_len()
}

/// Render the instruction whose opcode is `bytes[0]`, located at `pc`.
/// Missing operand bytes read as zero.
pub fn disassemble(pc: u16, bytes: &[u8]) -> String {
    let byte = |i: usize| bytes.get(i).copied().unwrap_or(0);
    let opcode = byte(0);
    let instr = TABLE[opcode as usize];
    let name = instr.op.name();
    let zp = byte(1);
    let abs = u16::from_le_bytes([byte(1), byte(2)]);

    match instr.mode {
        Mode::Accumulator => format!("{name} A"),
        Mode::Immediate => format!("{name} #${zp:02X}"),
        Mode::ZeroPage => format!("{name} ${zp:02X}"),
        Mode::ZeroPageX => format!("{name} ${zp:02X},X"),
        Mode::ZeroPageY => format!("{name} ${zp:02X},Y"),
        Mode::Absolute | Mode::JmpAbsolute | Mode::Jsr => format!("{name} ${abs:04X}"),
        Mode::AbsoluteX => format!("{name} ${abs:04X},X"),
        Mode::AbsoluteY => format!("{name} ${abs:04X},Y"),
        Mode::IndirectX => format!("{name} (${zp:02X},X)"),
        Mode::IndirectY => format!("{name} (${zp:02X}),Y"),
        Mode::JmpIndirect => format!("{name} (${abs:04X})"),
        Mode::Relative => {
            let target = pc.wrapping_add(2).wrapping_add(zp as i8 as u16);
            format!("{name} ${target:04X}")
        }
        _ => name.to_string(),
    }
}
