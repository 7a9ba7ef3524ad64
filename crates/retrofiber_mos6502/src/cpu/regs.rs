use retrofiber_common::Word;

use super::Status;

/// Architectural registers of the 6502 plus the internal address/operand
/// latches the instruction sequencer works with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    /// Stack pointer. The high byte is wired to page one; only `s.lo()`
    /// ever changes.
    pub s: Word,
    pub pc: Word,
    pub p: Status,
    /// Effective address being built by the current addressing mode.
    pub ea: Word,
    /// Operand latch filled by read-class accesses.
    pub m: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: Word::new(0x01FD),
            pc: Word::default(),
            p: Status {
                i: true,
                ..Status::default()
            },
            ea: Word::default(),
            m: 0,
        }
    }
}

impl Registers {
    #[inline]
    pub fn sp(&self) -> u8 {
        self.s.lo()
    }

    #[inline]
    pub fn set_sp(&mut self, value: u8) {
        self.s.set_lo(value);
    }
}
