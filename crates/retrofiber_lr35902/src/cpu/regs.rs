use retrofiber_common::Word;

/// LR35902 register file.
///
/// Every pair is a single [`Word`]; the 8-bit registers are views of its
/// halves, so `set_b` is immediately visible through `bc()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub af: Word,
    pub bc: Word,
    pub de: Word,
    pub hl: Word,
    pub sp: Word,
    pub pc: Word,
}

macro_rules! byte_views {
    ($($pair:ident: $hi:ident / $set_hi:ident, $lo:ident / $set_lo:ident;)*) => {
        $(
            #[inline]
            pub fn $hi(&self) -> u8 {
                self.$pair.hi()
            }

            #[inline]
            pub fn $set_hi(&mut self, value: u8) {
                self.$pair.set_hi(value);
            }

            #[inline]
            pub fn $lo(&self) -> u8 {
                self.$pair.lo()
            }

            #[inline]
            pub fn $set_lo(&mut self, value: u8) {
                self.$pair.set_lo(value);
            }
        )*
    };
}

impl Registers {
    byte_views! {
        bc: b / set_b, c / set_c;
        de: d / set_d, e / set_e;
        hl: h / set_h, l / set_l;
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.af.hi()
    }

    #[inline]
    pub fn set_a(&mut self, value: u8) {
        self.af.set_hi(value);
    }

    #[inline]
    pub fn f(&self) -> u8 {
        self.af.lo()
    }

    /// Lower 4 bits of F are always zero.
    #[inline]
    pub fn set_f(&mut self, value: u8) {
        self.af.set_lo(value & 0xF0);
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        self.af.set(value & 0xFFF0);
    }

    /// 8-bit register by opcode index: 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 7=A.
    /// Index 6 is the `(HL)` memory operand and is handled by the caller.
    pub(super) fn reg8(&self, index: u8) -> u8 {
        match index {
            0 => self.b(),
            1 => self.c(),
            2 => self.d(),
            3 => self.e(),
            4 => self.h(),
            5 => self.l(),
            7 => self.a(),
            _ => unreachable!("(HL) is not a register"),
        }
    }

    pub(super) fn set_reg8(&mut self, index: u8, value: u8) {
        match index {
            0 => self.set_b(value),
            1 => self.set_c(value),
            2 => self.set_d(value),
            3 => self.set_e(value),
            4 => self.set_h(value),
            5 => self.set_l(value),
            7 => self.set_a(value),
            _ => unreachable!("(HL) is not a register"),
        }
    }

    /// Pair by the `rp` table: BC, DE, HL, SP.
    pub(super) fn rp(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.bc.get(),
            1 => self.de.get(),
            2 => self.hl.get(),
            _ => self.sp.get(),
        }
    }

    pub(super) fn set_rp(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            0 => self.bc.set(value),
            1 => self.de.set(value),
            2 => self.hl.set(value),
            _ => self.sp.set(value),
        }
    }

    /// Pair by the `rp2` table used by PUSH/POP: BC, DE, HL, AF.
    pub(super) fn rp2(&self, index: u8) -> u16 {
        match index & 0x03 {
            3 => self.af.get(),
            other => self.rp(other),
        }
    }

    pub(super) fn set_rp2(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            3 => self.set_af(value),
            other => self.set_rp(other, value),
        }
    }

    #[inline]
    pub fn flag(&self, flag: Flag) -> bool {
        self.f() & flag.mask() != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        let f = if value {
            self.f() | flag.mask()
        } else {
            self.f() & !flag.mask()
        };
        self.set_f(f);
    }

    /// Replace all four flags at once.
    #[inline]
    pub fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
        let f = (z as u8) << Flag::Z as u8
            | (n as u8) << Flag::N as u8
            | (h as u8) << Flag::H as u8
            | (c as u8) << Flag::C as u8;
        self.set_f(f);
    }
}

/// Flag bits in the F register.
///
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

impl Flag {
    #[inline]
    const fn mask(self) -> u8 {
        1 << self as u8
    }
}
