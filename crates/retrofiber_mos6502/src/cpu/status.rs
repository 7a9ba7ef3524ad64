use bitflags::bitflags;

bitflags! {
    /// Bit layout of the packed processor status byte.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct StatusBits: u8 {
        const NEGATIVE = 0x80;
        const OVERFLOW = 0x40;
        const UNUSED = 0x20;
        const BREAK = 0x10;
        const DECIMAL = 0x08;
        const INTERRUPT = 0x04;
        const ZERO = 0x02;
        const CARRY = 0x01;
    }
}

/// Processor status flags.
///
/// The CPU keeps the six real flags as separate bits. B and bit 5 do not
/// exist as storage; they only appear when the status is pushed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Status {
    pub n: bool,
    pub v: bool,
    pub d: bool,
    pub i: bool,
    pub z: bool,
    pub c: bool,
}

impl Status {
    fn bits(&self) -> StatusBits {
        let mut bits = StatusBits::UNUSED;
        bits.set(StatusBits::NEGATIVE, self.n);
        bits.set(StatusBits::OVERFLOW, self.v);
        bits.set(StatusBits::DECIMAL, self.d);
        bits.set(StatusBits::INTERRUPT, self.i);
        bits.set(StatusBits::ZERO, self.z);
        bits.set(StatusBits::CARRY, self.c);
        bits
    }

    /// Packed view with bit 5 set and B clear, as pushed by IRQ/NMI.
    #[inline]
    pub fn to_byte(&self) -> u8 {
        self.bits().bits()
    }

    /// Packed view with bits 5 and 4 set, as pushed by PHP and BRK.
    #[inline]
    pub fn to_byte_with_break(&self) -> u8 {
        (self.bits() | StatusBits::BREAK).bits()
    }

    /// Load flags from a packed byte; bits 5 and 4 are ignored.
    pub fn set_byte(&mut self, value: u8) {
        let bits = StatusBits::from_bits_truncate(value);
        self.n = bits.contains(StatusBits::NEGATIVE);
        self.v = bits.contains(StatusBits::OVERFLOW);
        self.d = bits.contains(StatusBits::DECIMAL);
        self.i = bits.contains(StatusBits::INTERRUPT);
        self.z = bits.contains(StatusBits::ZERO);
        self.c = bits.contains(StatusBits::CARRY);
    }

    #[inline]
    pub fn set_nz(&mut self, value: u8) {
        self.n = value & 0x80 != 0;
        self.z = value == 0;
    }
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        let mut status = Status::default();
        status.set_byte(value);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_views_differ_only_in_break() {
        let p = Status {
            n: true,
            c: true,
            ..Status::default()
        };
        assert_eq!(p.to_byte(), 0xA1);
        assert_eq!(p.to_byte_with_break(), 0xB1);
    }

    #[test]
    fn set_byte_ignores_break_and_unused() {
        let mut p = Status::default();
        p.set_byte(0xFF);
        assert_eq!(p.to_byte(), 0xEF);

        p.set_byte(0x30);
        assert_eq!(p, Status::default());
        assert_eq!(p.to_byte(), 0x20);
    }

    #[test]
    fn pushed_byte_keeps_every_real_flag() {
        for byte in 0..=u8::MAX {
            assert_eq!(Status::from(byte).to_byte_with_break(), byte | 0x30);
        }
    }
}
