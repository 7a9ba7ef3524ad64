use retrofiber_common::Bus;

use crate::cpu::Lr35902;

impl<B: Bus> Lr35902<B> {
    /// ALU A,r (1) and ALU A,(HL) (2).
    pub(in crate::cpu) fn exec_alu_r(&mut self, op: u8, src: u8) {
        match self.stage {
            0 if src == 6 => self.next(),
            0 => {
                self.alu(op, self.regs.reg8(src));
                self.finish();
            }
            _ => {
                let value = self.read(self.regs.hl.get());
                self.alu(op, value);
                self.finish();
            }
        }
    }

    /// ALU A,d8 (2).
    pub(in crate::cpu) fn exec_alu_d8(&mut self, op: u8) {
        match self.stage {
            0 => self.next(),
            _ => {
                let value = self.fetch();
                self.alu(op, value);
                self.finish();
            }
        }
    }

    /// ADD HL,rr (2).
    pub(in crate::cpu) fn exec_add_hl_rp(&mut self, p: u8) {
        match self.stage {
            0 => self.next(),
            _ => {
                self.idle();
                self.alu_add16_hl(self.regs.rp(p));
                self.finish();
            }
        }
    }

    /// ADD SP,r8 (4).
    pub(in crate::cpu) fn exec_add_sp_r8(&mut self) {
        match self.stage {
            0 => self.next(),
            1 => {
                let offset = self.fetch();
                self.imm.set_lo(offset);
                self.next();
            }
            2 => {
                self.idle();
                self.next();
            }
            _ => {
                self.idle();
                let value = self.alu_add16_signed(self.regs.sp.get(), self.imm.lo());
                self.regs.sp.set(value);
                self.finish();
            }
        }
    }
}
