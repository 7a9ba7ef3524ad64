use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Memory/IO resolver seen by a CPU core.
///
/// A core calls `read8`/`write8` exactly once per bus transaction, in
/// program order. Implementations are owned by the console and must return
/// synchronously.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Whether back-to-back reads of `addr` issued while the core is held by
    /// RDY collapse into a single access (controller ports on the NES).
    fn coalesce_stalled_reads(&self, _addr: u16) -> bool {
        false
    }

    /// Bank currently mapped at `addr`, for tracing.
    fn bank_of(&self, _addr: u16) -> Option<u8> {
        None
    }
}

impl<B: Bus + ?Sized> Bus for &mut B {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        (**self).read8(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        (**self).write8(addr, value)
    }

    fn coalesce_stalled_reads(&self, addr: u16) -> bool {
        (**self).coalesce_stalled_reads(addr)
    }

    fn bank_of(&self, addr: u16) -> Option<u8> {
        (**self).bank_of(addr)
    }
}

/// Shared bus for several cores on one scheduler. Only one core runs at a
/// time, so the borrow never overlaps.
impl<B: Bus + ?Sized> Bus for Rc<RefCell<B>> {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.borrow_mut().read8(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.borrow_mut().write8(addr, value)
    }

    fn coalesce_stalled_reads(&self, addr: u16) -> bool {
        self.borrow().coalesce_stalled_reads(addr)
    }

    fn bank_of(&self, addr: u16) -> Option<u8> {
        self.borrow().bank_of(addr)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

/// One completed bus transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub address: u16,
    pub data: u8,
    pub direction: Direction,
    pub bank: Option<u8>,
}

impl Transaction {
    pub const fn read(address: u16, data: u8) -> Self {
        Self {
            address,
            data,
            direction: Direction::Read,
            bank: None,
        }
    }

    pub const fn write(address: u16, data: u8) -> Self {
        Self {
            address,
            data,
            direction: Direction::Write,
            bank: None,
        }
    }

    pub fn is_write(&self) -> bool {
        self.direction == Direction::Write
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Read => 'R',
            Direction::Write => 'W',
        };
        match self.bank {
            Some(bank) => write!(
                f,
                "{dir} {bank:02X}:{addr:04X} {data:02X}",
                addr = self.address,
                data = self.data
            ),
            None => write!(f, "{dir} {:04X} {:02X}", self.address, self.data),
        }
    }
}
