use retrofiber_common::Bus;

use super::{Flag, Lr35902};

impl<B: Bus> Lr35902<B> {
    /// CB-prefixed instructions. Register forms take 2 M-cycles, BIT b,(HL)
    /// takes 3 and the other (HL) forms take 4 (read, then write).
    pub(super) fn exec_cb(&mut self) {
        match self.stage {
            0 => self.next(),
            1 => {
                let cb = self.fetch();
                self.cb_opcode = cb;
                let z = cb & 0x07;
                if z == 6 {
                    self.next();
                    return;
                }
                if let Some(result) = self.cb_apply(cb, self.regs.reg8(z)) {
                    self.regs.set_reg8(z, result);
                }
                self.finish();
            }
            2 => {
                let value = self.read(self.regs.hl.get());
                match self.cb_apply(self.cb_opcode, value) {
                    Some(result) => {
                        self.imm.set_lo(result);
                        self.next();
                    }
                    None => self.finish(),
                }
            }
            _ => {
                self.write(self.regs.hl.get(), self.imm.lo());
                self.finish();
            }
        }
    }

    /// Apply a CB operation to `value`. Returns the value to store back, or
    /// `None` for BIT, which only sets flags.
    fn cb_apply(&mut self, cb: u8, value: u8) -> Option<u8> {
        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        match x {
            0 => Some(self.rotate_shift(y, value)),
            1 => {
                // BIT b: Z from the bit, N=0, H=1, C kept.
                let carry = self.regs.flag(Flag::C);
                self.regs
                    .set_flags(value & (1 << y) == 0, false, true, carry);
                None
            }
            2 => Some(value & !(1 << y)),
            _ => Some(value | (1 << y)),
        }
    }

    /// RLC, RRC, RL, RR, SLA, SRA, SWAP, SRL.
    fn rotate_shift(&mut self, op: u8, value: u8) -> u8 {
        let carry_in = self.regs.flag(Flag::C) as u8;
        let (result, carry) = match op {
            0 => (value.rotate_left(1), value & 0x80 != 0),
            1 => (value.rotate_right(1), value & 0x01 != 0),
            2 => ((value << 1) | carry_in, value & 0x80 != 0),
            3 => ((value >> 1) | carry_in << 7, value & 0x01 != 0),
            4 => (value << 1, value & 0x80 != 0),
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            6 => (value.rotate_left(4), false),
            _ => (value >> 1, value & 0x01 != 0),
        };
        self.regs.set_flags(result == 0, false, false, carry);
        result
    }
}
