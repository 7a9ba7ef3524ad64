use retrofiber_common::Bus;

use super::Mos6502;

pub(super) const NMI_VECTOR: u16 = 0xFFFA;
pub(super) const RESET_VECTOR: u16 = 0xFFFC;
pub(super) const IRQ_VECTOR: u16 = 0xFFFE;

/// Interrupt inputs of a 2A03-style console.
///
/// NMI is edge triggered. The others share the level-triggered IRQ input,
/// each with its own bit so they can be released independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mos6502Line {
    Nmi,
    /// APU frame counter.
    Apu,
    Dmc,
    /// Cartridge mapper.
    Board,
}

impl Mos6502Line {
    fn irq_mask(self) -> u8 {
        match self {
            Mos6502Line::Nmi => 0,
            Mos6502Line::Apu => 0x01,
            Mos6502Line::Dmc => 0x02,
            Mos6502Line::Board => 0x04,
        }
    }
}

impl<B: Bus> Mos6502<B> {
    /// Drive an interrupt input. May be called between any two cycles.
    pub fn assert_line(&mut self, line: Mos6502Line, asserted: bool) {
        match line {
            Mos6502Line::Nmi => self.nmi.set(asserted),
            _ => self.irq.set(line.irq_mask(), asserted),
        }
    }

    pub fn line_asserted(&self, line: Mos6502Line) -> bool {
        match line {
            Mos6502Line::Nmi => self.nmi.level(),
            _ => self.irq.bits() & line.irq_mask() != 0,
        }
    }

    /// An NMI edge has been latched and not serviced yet.
    pub fn nmi_pending(&self) -> bool {
        self.nmi_detected
    }

    /// The last poll saw IRQ asserted with I clear.
    pub fn irq_pending(&self) -> bool {
        self.irq_detected
    }

    /// Sample the interrupt inputs. Runs at the end of every bus cycle
    /// unless polling is suspended.
    pub(super) fn poll(&mut self) {
        if self.nmi.sample() {
            self.nmi_detected = true;
        }
        self.irq_detected = !self.regs.p.i && self.irq.any();
        self.vector = if self.nmi_detected {
            NMI_VECTOR
        } else {
            IRQ_VECTOR
        };
    }
}
