use retrofiber_common::Bus;

use crate::cpu::Lr35902;

impl<B: Bus> Lr35902<B> {
    /// HALT (1). With IME clear and an interrupt already pending the core
    /// does not halt; instead the next opcode fetch fails to advance PC.
    /// Right after EI the interrupt is taken at once and returns to the HALT.
    pub(in crate::cpu) fn exec_halt(&mut self) {
        if self.ime_enable_delay && !self.pending.is_empty() {
            self.regs.pc.decrement();
        } else if !self.ime && !self.pending.is_empty() {
            self.halt_bug = true;
        } else {
            self.halted = true;
        }
        self.finish();
    }

    /// STOP (2). The padding byte is fetched and skipped; the core then
    /// idles until a joypad request is latched in IF.
    pub(in crate::cpu) fn exec_stop(&mut self) {
        match self.stage {
            0 => self.next(),
            _ => {
                self.fetch();
                self.stopped = true;
                self.halted = false;
                log::debug!("LR35902 entering STOP at PC=0x{:04X}", self.regs.pc.get());
                self.finish();
            }
        }
    }
}
