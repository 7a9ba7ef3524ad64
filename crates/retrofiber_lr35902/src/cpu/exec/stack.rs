use retrofiber_common::Bus;

use crate::cpu::Lr35902;

impl<B: Bus> Lr35902<B> {
    /// PUSH rr (4): internal cycle, then high byte, then low byte.
    pub(in crate::cpu) fn exec_push(&mut self, p: u8) {
        match self.stage {
            0 => {
                self.imm.set(self.regs.rp2(p));
                self.next();
            }
            1 => {
                self.idle();
                self.next();
            }
            stage => self.push_stage(stage - 2),
        }
    }

    /// POP rr (3).
    pub(in crate::cpu) fn exec_pop(&mut self, p: u8) {
        match self.stage {
            0 => self.next(),
            1 => {
                let lo = self.pop();
                self.imm.set_lo(lo);
                self.next();
            }
            _ => {
                let hi = self.pop();
                self.imm.set_hi(hi);
                self.regs.set_rp2(p, self.imm.get());
                self.finish();
            }
        }
    }

    /// CALL a16 (6) and CALL cc,a16 (6 taken, 3 not taken).
    pub(in crate::cpu) fn exec_call(&mut self, taken: bool) {
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
            3 => {
                self.idle();
                self.next();
            }
            4 => {
                self.regs.sp.decrement();
                self.write(self.regs.sp.get(), self.regs.pc.hi());
                self.next();
            }
            _ => {
                self.regs.sp.decrement();
                self.write(self.regs.sp.get(), self.regs.pc.lo());
                self.regs.pc = self.imm;
                self.finish();
            }
        }
    }

    /// RET (4) and RETI (4), which also sets IME without delay.
    pub(in crate::cpu) fn exec_ret(&mut self, reti: bool) {
        match self.stage {
            0 => self.next(),
            1 => {
                let lo = self.pop();
                self.imm.set_lo(lo);
                self.next();
            }
            2 => {
                let hi = self.pop();
                self.imm.set_hi(hi);
                self.next();
            }
            _ => {
                self.idle();
                self.regs.pc = self.imm;
                if reti {
                    self.ime = true;
                }
                self.finish();
            }
        }
    }

    /// RET cc (5 taken, 2 not taken).
    pub(in crate::cpu) fn exec_ret_cc(&mut self, cond: u8) {
        match self.stage {
            0 => self.next(),
            1 => {
                self.idle();
                if self.condition(cond) {
                    self.next();
                } else {
                    self.finish();
                }
            }
            2 => {
                let lo = self.pop();
                self.imm.set_lo(lo);
                self.next();
            }
            3 => {
                let hi = self.pop();
                self.imm.set_hi(hi);
                self.next();
            }
            _ => {
                self.idle();
                self.regs.pc = self.imm;
                self.finish();
            }
        }
    }

    /// RST n (4).
    pub(in crate::cpu) fn exec_rst(&mut self, y: u8) {
        match self.stage {
            0 => {
                self.imm.set(self.regs.pc.get());
                self.next();
            }
            1 => {
                self.idle();
                self.next();
            }
            2 => self.push_stage(0),
            _ => {
                self.push_stage(1);
                self.regs.pc.set(y as u16 * 8);
            }
        }
    }

    /// Write one half of `imm` below SP: step 0 is the high byte, step 1
    /// the low byte, which also ends the instruction.
    fn push_stage(&mut self, step: u8) {
        self.regs.sp.decrement();
        if step == 0 {
            self.write(self.regs.sp.get(), self.imm.hi());
            self.next();
        } else {
            self.write(self.regs.sp.get(), self.imm.lo());
            self.finish();
        }
    }

    fn pop(&mut self) -> u8 {
        let value = self.read(self.regs.sp.get());
        self.regs.sp.increment();
        value
    }
}
