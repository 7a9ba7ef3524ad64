use retrofiber_common::Bus;

use super::super::Lr35902;

impl<B: Bus> Lr35902<B> {
    /// Advance the EI pipeline; runs at every instruction boundary.
    #[inline]
    pub(in crate::cpu) fn apply_ime_delay(&mut self) {
        if self.ime_enable_delay {
            // Second boundary after EI: the instruction following EI has
            // completed.
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }

    pub(in crate::cpu) fn exec_di(&mut self) {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
    }

    pub(in crate::cpu) fn exec_ei(&mut self) {
        if !self.ime {
            self.ime_enable_pending = true;
        }
    }
}
