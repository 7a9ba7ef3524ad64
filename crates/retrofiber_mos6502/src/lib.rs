pub mod cpu;
pub mod disasm;

pub use cpu::{Access, Instr, Mode, Mos6502, Mos6502Config, Mos6502Line, Op, Registers, Status, StatusBits};
