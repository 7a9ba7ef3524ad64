mod dispatch;
mod ime;

use bitflags::bitflags;
use retrofiber_common::Bus;

use super::Lr35902;

bitflags! {
    /// Bits of IF and IE. Lower bits have higher priority.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InterruptFlags: u8 {
        const VBLANK = 0x01;
        const LCD_STAT = 0x02;
        const TIMER = 0x04;
        const SERIAL = 0x08;
        const JOYPAD = 0x10;
    }
}

/// Interrupt request lines of the Game Boy SoC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lr35902Line {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Lr35902Line {
    pub fn flag(self) -> InterruptFlags {
        match self {
            Lr35902Line::VBlank => InterruptFlags::VBLANK,
            Lr35902Line::LcdStat => InterruptFlags::LCD_STAT,
            Lr35902Line::Timer => InterruptFlags::TIMER,
            Lr35902Line::Serial => InterruptFlags::SERIAL,
            Lr35902Line::Joypad => InterruptFlags::JOYPAD,
        }
    }
}

impl<B: Bus> Lr35902<B> {
    /// Drive an interrupt request line. A low-to-high transition sets the
    /// matching IF bit; the bit then stays set until it is serviced or
    /// cleared through `$FF0F`.
    pub fn assert_line(&mut self, line: Lr35902Line, asserted: bool) {
        let flag = line.flag();
        if asserted && !self.lines.contains(flag) {
            self.iflag.insert(flag);
        }
        self.lines.set(flag, asserted);
    }

    pub fn line_asserted(&self, line: Lr35902Line) -> bool {
        self.lines.contains(line.flag())
    }

    /// Runs at the end of every M-cycle.
    pub(super) fn poll(&mut self) {
        self.pending = InterruptFlags::from_bits_truncate(self.ie & self.iflag.bits());
    }
}
