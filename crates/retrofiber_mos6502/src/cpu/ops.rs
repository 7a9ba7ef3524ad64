use retrofiber_common::Bus;

use super::{Flag, Mos6502, Op};

impl<B: Bus> Mos6502<B> {
    /// Single-byte instructions that only touch registers.
    pub(super) fn exec_implied(&mut self, op: Op) {
        let r = &mut self.regs;
        match op {
            Op::Clc => r.p.c = false,
            Op::Sec => r.p.c = true,
            Op::Cli => r.p.i = false,
            Op::Sei => r.p.i = true,
            Op::Clv => r.p.v = false,
            Op::Cld => r.p.d = false,
            Op::Sed => r.p.d = true,
            Op::Tax => {
                r.x = r.a;
                r.p.set_nz(r.x);
            }
            Op::Tay => {
                r.y = r.a;
                r.p.set_nz(r.y);
            }
            Op::Txa => {
                r.a = r.x;
                r.p.set_nz(r.a);
            }
            Op::Tya => {
                r.a = r.y;
                r.p.set_nz(r.a);
            }
            Op::Tsx => {
                r.x = r.sp();
                r.p.set_nz(r.x);
            }
            // TXS is the only transfer that leaves the flags alone.
            Op::Txs => r.set_sp(r.x),
            Op::Inx => {
                r.x = r.x.wrapping_add(1);
                r.p.set_nz(r.x);
            }
            Op::Iny => {
                r.y = r.y.wrapping_add(1);
                r.p.set_nz(r.y);
            }
            Op::Dex => {
                r.x = r.x.wrapping_sub(1);
                r.p.set_nz(r.x);
            }
            Op::Dey => {
                r.y = r.y.wrapping_sub(1);
                r.p.set_nz(r.y);
            }
            Op::Nop => {}
            _ => unreachable!("{op:?} is not an implied operation"),
        }
    }

    /// Operations consuming the operand latch `m`.
    pub(super) fn exec_read(&mut self, op: Op) {
        let m = self.regs.m;
        match op {
            Op::Lda => {
                self.regs.a = m;
                self.regs.p.set_nz(m);
            }
            Op::Ldx => {
                self.regs.x = m;
                self.regs.p.set_nz(m);
            }
            Op::Ldy => {
                self.regs.y = m;
                self.regs.p.set_nz(m);
            }
            Op::Adc => self.adc(m),
            Op::Sbc => self.sbc(m),
            Op::And => {
                self.regs.a &= m;
                self.regs.p.set_nz(self.regs.a);
            }
            Op::Ora => {
                self.regs.a |= m;
                self.regs.p.set_nz(self.regs.a);
            }
            Op::Eor => {
                self.regs.a ^= m;
                self.regs.p.set_nz(self.regs.a);
            }
            Op::Cmp => self.compare(self.regs.a, m),
            Op::Cpx => self.compare(self.regs.x, m),
            Op::Cpy => self.compare(self.regs.y, m),
            Op::Bit => {
                self.regs.p.z = self.regs.a & m == 0;
                self.regs.p.n = m & 0x80 != 0;
                self.regs.p.v = m & 0x40 != 0;
            }
            Op::Nop => {}
            Op::Lax => {
                self.regs.a = m;
                self.regs.x = m;
                self.regs.p.set_nz(m);
            }
            Op::Las => {
                let value = m & self.regs.sp();
                self.regs.a = value;
                self.regs.x = value;
                self.regs.set_sp(value);
                self.regs.p.set_nz(value);
            }
            Op::Anc => {
                self.regs.a &= m;
                self.regs.p.set_nz(self.regs.a);
                self.regs.p.c = self.regs.p.n;
            }
            Op::Alr => {
                let value = self.regs.a & m;
                self.regs.a = self.lsr(value);
            }
            Op::Arr => self.arr(m),
            Op::Ane => {
                let magic = self.config.unstable_magic;
                self.regs.a = (self.regs.a | magic) & self.regs.x & m;
                self.regs.p.set_nz(self.regs.a);
            }
            Op::Lxa => {
                let magic = self.config.unstable_magic;
                let value = (self.regs.a | magic) & m;
                self.regs.a = value;
                self.regs.x = value;
                self.regs.p.set_nz(value);
            }
            Op::Axs => {
                let ax = self.regs.a & self.regs.x;
                self.regs.p.c = ax >= m;
                self.regs.x = ax.wrapping_sub(m);
                self.regs.p.set_nz(self.regs.x);
            }
            _ => unreachable!("{op:?} is not a read operation"),
        }
    }

    /// Read-modify-write operations. Returns the value written back.
    pub(super) fn exec_modify(&mut self, op: Op, value: u8) -> u8 {
        match op {
            Op::Asl => self.asl(value),
            Op::Lsr => self.lsr(value),
            Op::Rol => self.rol(value),
            Op::Ror => self.ror(value),
            Op::Inc => {
                let result = value.wrapping_add(1);
                self.regs.p.set_nz(result);
                result
            }
            Op::Dec => {
                let result = value.wrapping_sub(1);
                self.regs.p.set_nz(result);
                result
            }
            Op::Slo => {
                let result = self.asl(value);
                self.regs.a |= result;
                self.regs.p.set_nz(self.regs.a);
                result
            }
            Op::Rla => {
                let result = self.rol(value);
                self.regs.a &= result;
                self.regs.p.set_nz(self.regs.a);
                result
            }
            Op::Sre => {
                let result = self.lsr(value);
                self.regs.a ^= result;
                self.regs.p.set_nz(self.regs.a);
                result
            }
            Op::Rra => {
                let result = self.ror(value);
                self.adc(result);
                result
            }
            Op::Dcp => {
                let result = value.wrapping_sub(1);
                self.compare(self.regs.a, result);
                result
            }
            Op::Isc => {
                let result = value.wrapping_add(1);
                self.sbc(result);
                result
            }
            _ => unreachable!("{op:?} is not a read-modify-write operation"),
        }
    }

    /// Value driven onto the bus by a store. The SH*/AHX/TAS family also
    /// corrupts the target address when the index crossed a page.
    pub(super) fn store_value(&mut self, op: Op) -> u8 {
        let a = self.regs.a;
        let x = self.regs.x;
        let y = self.regs.y;
        let h1 = self.base_hi.wrapping_add(1);
        let unstable = |this: &mut Self, value: u8| {
            if this.page_crossed {
                this.regs.ea.set_hi(value);
            }
            value
        };
        match op {
            Op::Sta => a,
            Op::Stx => x,
            Op::Sty => y,
            Op::Sax => a & x,
            Op::Ahx => unstable(self, a & x & h1),
            Op::Shx => unstable(self, x & h1),
            Op::Shy => unstable(self, y & h1),
            Op::Tas => {
                self.regs.set_sp(a & x);
                unstable(self, a & x & h1)
            }
            _ => unreachable!("{op:?} is not a store operation"),
        }
    }

    pub(super) fn branch_taken(&self) -> bool {
        let p = &self.regs.p;
        match self.instr.op {
            Op::Branch(flag, set) => {
                let value = match flag {
                    Flag::N => p.n,
                    Flag::V => p.v,
                    Flag::C => p.c,
                    Flag::Z => p.z,
                };
                value == set
            }
            op => unreachable!("{op:?} is not a branch"),
        }
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.regs.p.c = register >= value;
        self.regs.p.set_nz(register.wrapping_sub(value));
    }

    fn asl(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.regs.p.c = value & 0x80 != 0;
        self.regs.p.set_nz(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.regs.p.c = value & 0x01 != 0;
        self.regs.p.set_nz(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.regs.p.c as u8;
        self.regs.p.c = value & 0x80 != 0;
        self.regs.p.set_nz(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | ((self.regs.p.c as u8) << 7);
        self.regs.p.c = value & 0x01 != 0;
        self.regs.p.set_nz(result);
        result
    }

    #[inline]
    fn decimal(&self) -> bool {
        self.config.decimal_mode && self.regs.p.d
    }

    pub(super) fn adc(&mut self, value: u8) {
        if self.decimal() {
            self.adc_decimal(value);
        } else {
            self.adc_binary(value);
        }
    }

    pub(super) fn sbc(&mut self, value: u8) {
        if self.decimal() {
            self.sbc_decimal(value);
        } else {
            self.adc_binary(value ^ 0xFF);
        }
    }

    fn adc_binary(&mut self, value: u8) {
        let a = self.regs.a;
        let sum = a as u16 + value as u16 + self.regs.p.c as u16;
        let result = sum as u8;
        self.regs.p.v = (result ^ a) & (result ^ value) & 0x80 != 0;
        self.regs.p.c = sum > 0xFF;
        self.regs.a = result;
        self.regs.p.set_nz(result);
    }

    /// NMOS BCD addition. N, V and Z come out of intermediate results the
    /// way the real chip computes them.
    fn adc_decimal(&mut self, value: u8) {
        let a = self.regs.a as u16;
        let m = value as u16;
        let c = self.regs.p.c as u16;

        let mut lo = (a & 0x0F) + (m & 0x0F) + c;
        if lo > 0x09 {
            lo += 0x06;
        }
        let mut sum = if lo <= 0x0F {
            (lo & 0x0F) + (a & 0xF0) + (m & 0xF0)
        } else {
            (lo & 0x0F) + (a & 0xF0) + (m & 0xF0) + 0x10
        };

        self.regs.p.z = (a + m + c) & 0xFF == 0;
        self.regs.p.n = sum & 0x80 != 0;
        self.regs.p.v = (a ^ sum) & 0x80 != 0 && (a ^ m) & 0x80 == 0;
        if sum & 0x1F0 > 0x90 {
            sum += 0x60;
        }
        self.regs.p.c = sum & 0xFF0 > 0xF0;
        self.regs.a = sum as u8;
    }

    /// NMOS BCD subtraction. Flags are those of the binary subtraction.
    fn sbc_decimal(&mut self, value: u8) {
        let a = self.regs.a as i32;
        let m = value as i32;
        let borrow = if self.regs.p.c { 0 } else { 1 };

        let binary = a - m - borrow;
        let lo = (a & 0x0F) - (m & 0x0F) - borrow;
        let mut result = if lo & 0x10 != 0 {
            ((lo - 0x06) & 0x0F) | ((a & 0xF0) - (m & 0xF0) - 0x10)
        } else {
            (lo & 0x0F) | ((a & 0xF0) - (m & 0xF0))
        };
        if result & 0x100 != 0 {
            result -= 0x60;
        }

        self.regs.p.c = binary >= 0;
        self.regs.p.v = (a ^ binary) & 0x80 != 0 && (a ^ m) & 0x80 != 0;
        self.regs.p.set_nz(binary as u8);
        self.regs.a = result as u8;
    }

    fn arr(&mut self, value: u8) {
        let t = self.regs.a & value;
        let carry_in = (self.regs.p.c as u8) << 7;
        let mut result = (t >> 1) | carry_in;
        self.regs.p.set_nz(result);

        if !self.decimal() {
            self.regs.p.c = result & 0x40 != 0;
            self.regs.p.v = ((result >> 6) ^ (result >> 5)) & 0x01 != 0;
            self.regs.a = result;
            return;
        }

        self.regs.p.v = (result ^ t) & 0x40 != 0;
        if (t & 0x0F) + (t & 0x01) > 0x05 {
            result = (result & 0xF0) | (result.wrapping_add(0x06) & 0x0F);
        }
        if (t as u16 & 0xF0) + (t as u16 & 0x10) > 0x50 {
            result = result.wrapping_add(0x60);
            self.regs.p.c = true;
        } else {
            self.regs.p.c = false;
        }
        self.regs.a = result;
    }
}
