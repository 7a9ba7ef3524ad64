use retrofiber_common::Bus;

use super::{Flag, Lr35902};

impl<B: Bus> Lr35902<B> {
    /// The eight accumulator operations by opcode `y` field:
    /// ADD, ADC, SUB, SBC, AND, XOR, OR, CP.
    pub(super) fn alu(&mut self, op: u8, value: u8) {
        match op & 0x07 {
            0 => self.alu_add(value, false),
            1 => self.alu_add(value, true),
            2 => self.alu_sub(value, false),
            3 => self.alu_sub(value, true),
            4 => self.alu_and(value),
            5 => self.alu_xor(value),
            6 => self.alu_or(value),
            _ => self.alu_cp(value),
        }
    }

    /// `use_carry` selects between ADD (false) and ADC (true).
    fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a();
        let carry_in = (use_carry && self.regs.flag(Flag::C)) as u8;

        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = a as u16 + value as u16 + carry_in as u16;
        let result = full as u8;

        self.regs.set_a(result);
        self.regs
            .set_flags(result == 0, false, half & 0x10 != 0, full > 0xFF);
    }

    /// `use_carry` selects between SUB (false) and SBC (true).
    fn alu_sub(&mut self, value: u8, use_carry: bool) {
        let result = self.subtract(value, use_carry);
        self.regs.set_a(result);
    }

    fn alu_cp(&mut self, value: u8) {
        self.subtract(value, false);
    }

    fn subtract(&mut self, value: u8, use_carry: bool) -> u8 {
        let a = self.regs.a();
        let carry_in = (use_carry && self.regs.flag(Flag::C)) as i16;

        let half = (a & 0x0F) as i16 - (value & 0x0F) as i16 - carry_in;
        let full = a as i16 - value as i16 - carry_in;
        let result = full as u8;

        self.regs.set_flags(result == 0, true, half < 0, full < 0);
        result
    }

    fn alu_and(&mut self, value: u8) {
        let result = self.regs.a() & value;
        self.regs.set_a(result);
        self.regs.set_flags(result == 0, false, true, false);
    }

    fn alu_or(&mut self, value: u8) {
        let result = self.regs.a() | value;
        self.regs.set_a(result);
        self.regs.set_flags(result == 0, false, false, false);
    }

    fn alu_xor(&mut self, value: u8) {
        let result = self.regs.a() ^ value;
        self.regs.set_a(result);
        self.regs.set_flags(result == 0, false, false, false);
    }

    /// Decimal adjust after a BCD addition or subtraction. N is kept.
    pub(super) fn alu_daa(&mut self) {
        let mut a = self.regs.a();
        let mut adjust: u8 = if self.regs.flag(Flag::C) { 0x60 } else { 0x00 };
        if self.regs.flag(Flag::H) {
            adjust |= 0x06;
        }

        if !self.regs.flag(Flag::N) {
            if a & 0x0F > 0x09 {
                adjust |= 0x06;
            }
            if a > 0x99 {
                adjust |= 0x60;
            }
            a = a.wrapping_add(adjust);
        } else {
            a = a.wrapping_sub(adjust);
        }

        self.regs.set_flag(Flag::C, adjust >= 0x60);
        self.regs.set_flag(Flag::H, false);
        self.regs.set_flag(Flag::Z, a == 0);
        self.regs.set_a(a);
    }

    /// INC r / INC (HL). C is unchanged.
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, value & 0x0F == 0x0F);
        result
    }

    /// DEC r / DEC (HL). C is unchanged.
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.set_flag(Flag::Z, result == 0);
        self.regs.set_flag(Flag::N, true);
        self.regs.set_flag(Flag::H, value & 0x0F == 0);
        result
    }

    /// ADD HL,rr. Z is unaffected; H and C come from bits 11 and 15.
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl.get();
        self.regs.set_flag(Flag::N, false);
        self.regs
            .set_flag(Flag::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.regs
            .set_flag(Flag::C, hl as u32 + value as u32 > 0xFFFF);
        self.regs.hl.set(hl.wrapping_add(value));
    }

    /// `base + r8` for ADD SP,r8 and LD HL,SP+r8. Z and N are cleared; H and
    /// C come from the unsigned low-byte addition.
    pub(super) fn alu_add16_signed(&mut self, base: u16, imm8: u8) -> u16 {
        let offset = imm8 as i8 as i16 as u16;
        let h = (base & 0x000F) + (offset & 0x000F) > 0x000F;
        let c = (base & 0x00FF) + (offset & 0x00FF) > 0x00FF;
        self.regs.set_flags(false, false, h, c);
        base.wrapping_add(offset)
    }

    /// RLCA, RRCA, RLA, RRA, DAA, CPL, SCF, CCF by opcode `y` field.
    pub(super) fn alu_accumulator(&mut self, op: u8) {
        let a = self.regs.a();
        let carry = self.regs.flag(Flag::C);
        match op & 0x07 {
            0 => {
                self.regs.set_a(a.rotate_left(1));
                self.regs.set_flags(false, false, false, a & 0x80 != 0);
            }
            1 => {
                self.regs.set_a(a.rotate_right(1));
                self.regs.set_flags(false, false, false, a & 0x01 != 0);
            }
            2 => {
                self.regs.set_a((a << 1) | carry as u8);
                self.regs.set_flags(false, false, false, a & 0x80 != 0);
            }
            3 => {
                self.regs.set_a((a >> 1) | (carry as u8) << 7);
                self.regs.set_flags(false, false, false, a & 0x01 != 0);
            }
            4 => self.alu_daa(),
            5 => {
                self.regs.set_a(!a);
                self.regs.set_flag(Flag::N, true);
                self.regs.set_flag(Flag::H, true);
            }
            6 => {
                self.regs.set_flag(Flag::N, false);
                self.regs.set_flag(Flag::H, false);
                self.regs.set_flag(Flag::C, true);
            }
            _ => {
                self.regs.set_flag(Flag::N, false);
                self.regs.set_flag(Flag::H, false);
                self.regs.set_flag(Flag::C, !carry);
            }
        }
    }
}
