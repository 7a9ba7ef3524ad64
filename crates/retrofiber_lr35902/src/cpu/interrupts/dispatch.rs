use retrofiber_common::Bus;

use super::super::Lr35902;
use super::InterruptFlags;

impl<B: Bus> Lr35902<B> {
    /// First of the five dispatch M-cycles. IME drops immediately; the line
    /// to service is chosen later, after the high byte of PC is pushed.
    pub(in crate::cpu) fn begin_dispatch(&mut self) {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        self.dispatching = true;
        self.vector = 0x0000;
        self.idle();
        self.stage = 1;
    }

    pub(in crate::cpu) fn step_dispatch(&mut self) {
        match self.stage {
            1 => {
                self.idle();
                self.next();
            }
            2 => {
                self.regs.sp.decrement();
                self.write(self.regs.sp.get(), self.regs.pc.hi());
                self.next();
            }
            3 => {
                // Sampled after the high push (which may have landed on IE)
                // but before the low push, which is too late to matter.
                let selected = self.select_interrupt();
                self.regs.sp.decrement();
                self.write(self.regs.sp.get(), self.regs.pc.lo());
                self.vector = match selected {
                    Some(flag) => {
                        self.iflag.remove(flag);
                        0x0040 + 8 * flag.bits().trailing_zeros() as u16
                    }
                    // Cancelled: nothing is pending any more.
                    None => 0x0000,
                };
                self.next();
            }
            _ => {
                self.idle();
                log::debug!(
                    "LR35902 interrupt: vector=0x{:04X} return=0x{:04X} SP=0x{:04X} IF=0x{:02X} IE=0x{:02X}",
                    self.vector,
                    self.regs.pc.get(),
                    self.regs.sp.get(),
                    self.iflag.bits(),
                    self.ie,
                );
                self.regs.pc.set(self.vector);
                self.dispatching = false;
                self.finish();
            }
        }
    }

    /// Highest-priority line in `IE & IF`, if any.
    fn select_interrupt(&self) -> Option<InterruptFlags> {
        let pending = self.ie & self.iflag.bits() & 0x1F;
        if pending == 0 {
            return None;
        }
        InterruptFlags::from_bits(1 << pending.trailing_zeros())
    }
}
