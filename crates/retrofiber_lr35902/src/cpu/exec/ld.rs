use retrofiber_common::Bus;

use crate::cpu::Lr35902;

impl<B: Bus> Lr35902<B> {
    /// LD r,r' (1), LD r,(HL) (2), LD (HL),r (2).
    pub(in crate::cpu) fn exec_ld_r_r(&mut self, dst: u8, src: u8) {
        match self.stage {
            0 if src == 6 || dst == 6 => self.next(),
            0 => {
                self.regs.set_reg8(dst, self.regs.reg8(src));
                self.finish();
            }
            _ => {
                let hl = self.regs.hl.get();
                if src == 6 {
                    let value = self.read(hl);
                    self.regs.set_reg8(dst, value);
                } else {
                    self.write(hl, self.regs.reg8(src));
                }
                self.finish();
            }
        }
    }

    /// LD r,d8 (2), LD (HL),d8 (3).
    pub(in crate::cpu) fn exec_ld_r_d8(&mut self, dst: u8) {
        match self.stage {
            0 => self.next(),
            1 => {
                let value = self.fetch();
                if dst == 6 {
                    self.imm.set_lo(value);
                    self.next();
                } else {
                    self.regs.set_reg8(dst, value);
                    self.finish();
                }
            }
            _ => {
                self.write(self.regs.hl.get(), self.imm.lo());
                self.finish();
            }
        }
    }

    /// LD rr,d16 (3).
    pub(in crate::cpu) fn exec_ld_rp_d16(&mut self, p: u8) {
        match self.stage {
            0 => self.next(),
            1 => {
                let lo = self.fetch();
                self.imm.set_lo(lo);
                self.next();
            }
            _ => {
                let hi = self.fetch();
                self.imm.set_hi(hi);
                self.regs.set_rp(p, self.imm.get());
                self.finish();
            }
        }
    }

    /// LD (BC),A / LD (DE),A / LD (HL+),A / LD (HL-),A and the loads back
    /// into A (2).
    pub(in crate::cpu) fn exec_ld_indirect_a(&mut self, p: u8, load: bool) {
        match self.stage {
            0 => self.next(),
            _ => {
                let addr = match p {
                    0 => self.regs.bc.get(),
                    1 => self.regs.de.get(),
                    _ => self.regs.hl.get(),
                };
                if load {
                    let value = self.read(addr);
                    self.regs.set_a(value);
                } else {
                    self.write(addr, self.regs.a());
                }
                match p {
                    2 => self.regs.hl.increment(),
                    3 => self.regs.hl.decrement(),
                    _ => {}
                }
                self.finish();
            }
        }
    }

    /// LD (a16),SP (5).
    pub(in crate::cpu) fn exec_ld_a16_sp(&mut self) {
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
                self.next();
            }
            3 => {
                self.write(self.imm.get(), self.regs.sp.lo());
                self.next();
            }
            _ => {
                self.write(self.imm.get().wrapping_add(1), self.regs.sp.hi());
                self.finish();
            }
        }
    }

    /// LDH (a8),A / LDH A,(a8) (3).
    pub(in crate::cpu) fn exec_ldh_a8(&mut self, load: bool) {
        match self.stage {
            0 => self.next(),
            1 => {
                let offset = self.fetch();
                self.imm.set(0xFF00 | offset as u16);
                self.next();
            }
            _ => {
                self.transfer_a(self.imm.get(), load);
                self.finish();
            }
        }
    }

    /// LD (C),A / LD A,(C) (2).
    pub(in crate::cpu) fn exec_ldh_c(&mut self, load: bool) {
        match self.stage {
            0 => self.next(),
            _ => {
                self.transfer_a(0xFF00 | self.regs.c() as u16, load);
                self.finish();
            }
        }
    }

    /// LD (a16),A / LD A,(a16) (4).
    pub(in crate::cpu) fn exec_ld_a16_a(&mut self, load: bool) {
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
                self.next();
            }
            _ => {
                self.transfer_a(self.imm.get(), load);
                self.finish();
            }
        }
    }

    /// LD HL,SP+r8 (3).
    pub(in crate::cpu) fn exec_ld_hl_sp_r8(&mut self) {
        match self.stage {
            0 => self.next(),
            1 => {
                let offset = self.fetch();
                self.imm.set_lo(offset);
                self.next();
            }
            _ => {
                self.idle();
                let value = self.alu_add16_signed(self.regs.sp.get(), self.imm.lo());
                self.regs.hl.set(value);
                self.finish();
            }
        }
    }

    /// LD SP,HL (2).
    pub(in crate::cpu) fn exec_ld_sp_hl(&mut self) {
        match self.stage {
            0 => self.next(),
            _ => {
                self.idle();
                self.regs.sp = self.regs.hl;
                self.finish();
            }
        }
    }

    fn transfer_a(&mut self, addr: u16, load: bool) {
        if load {
            let value = self.read(addr);
            self.regs.set_a(value);
        } else {
            self.write(addr, self.regs.a());
        }
    }
}
