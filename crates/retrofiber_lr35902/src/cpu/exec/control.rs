use retrofiber_common::Bus;

use crate::cpu::Lr35902;

impl<B: Bus> Lr35902<B> {
    /// JP a16 (4) and JP cc,a16 (4 taken, 3 not taken).
    pub(in crate::cpu) fn exec_jp(&mut self, taken: bool) {
        match self.stage {
            0 => self.next(),
            1 => {
                let lo = self.fetch();
                self.imm.set_lo(lo);
                self.next();
            }
            2 => {
                let hi = self.fetch();
                self.imm.set_hi(hi);
                if taken {
                    self.next();
                } else {
                    self.finish();
                }
            }
            _ => {
                self.idle();
                self.regs.pc = self.imm;
                self.finish();
            }
        }
    }

    /// JP HL (1).
    pub(in crate::cpu) fn exec_jp_hl(&mut self) {
        self.regs.pc = self.regs.hl;
        self.finish();
    }

    /// JR r8 (3) and JR cc,r8 (3 taken, 2 not taken). The offset is relative
    /// to the address after the operand.
    pub(in crate::cpu) fn exec_jr(&mut self, taken: bool) {
        match self.stage {
            0 => self.next(),
            1 => {
                let offset = self.fetch();
                self.imm.set_lo(offset);
                if taken {
                    self.next();
                } else {
                    self.finish();
                }
            }
            _ => {
                self.idle();
                let offset = self.imm.lo() as i8 as u16;
                let target = self.regs.pc.get().wrapping_add(offset);
                self.regs.pc.set(target);
                self.finish();
            }
        }
    }
}
