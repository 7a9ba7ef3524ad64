use retrofiber_common::Bus;

use crate::cpu::Lr35902;

impl<B: Bus> Lr35902<B> {
    /// INC r / DEC r (1) and INC (HL) / DEC (HL) (3). The memory forms read
    /// then write; there is no dummy write on this core.
    pub(in crate::cpu) fn exec_inc_dec_r(&mut self, index: u8, dec: bool) {
        match self.stage {
            0 if index == 6 => self.next(),
            0 => {
                let value = self.regs.reg8(index);
                let result = self.inc_dec(value, dec);
                self.regs.set_reg8(index, result);
                self.finish();
            }
            1 => {
                let value = self.read(self.regs.hl.get());
                self.imm.set_lo(value);
                self.next();
            }
            _ => {
                let result = self.inc_dec(self.imm.lo(), dec);
                self.write(self.regs.hl.get(), result);
                self.finish();
            }
        }
    }

    /// INC rr / DEC rr (2). Flags are untouched.
    pub(in crate::cpu) fn exec_inc_dec_rp(&mut self, p: u8, dec: bool) {
        match self.stage {
            0 => self.next(),
            _ => {
                self.idle();
                let value = self.regs.rp(p);
                let value = if dec {
                    value.wrapping_sub(1)
                } else {
                    value.wrapping_add(1)
                };
                self.regs.set_rp(p, value);
                self.finish();
            }
        }
    }

    fn inc_dec(&mut self, value: u8, dec: bool) -> u8 {
        if dec {
            self.alu_dec8(value)
        } else {
            self.alu_inc8(value)
        }
    }
}
