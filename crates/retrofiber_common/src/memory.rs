use anyhow::ensure;

use crate::bus::Bus;

const MEMORY_SIZE: usize = 0x10000;

/// Flat 64 KiB RAM with no side effects, used by the CLI and tests.
#[derive(Clone)]
pub struct FlatMemory {
    bytes: Box<[u8]>,
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }
}

impl FlatMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `data` into memory starting at `addr`.
    pub fn load(&mut self, addr: u16, data: &[u8]) -> anyhow::Result<()> {
        let start = addr as usize;
        ensure!(
            start + data.len() <= MEMORY_SIZE,
            "{} bytes do not fit at ${:04X}",
            data.len(),
            addr
        );
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Store a little-endian word, e.g. a reset vector.
    pub fn set_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.poke(addr, lo);
        self.poke(addr.wrapping_add(1), hi);
    }

    #[inline]
    pub fn peek(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    #[inline]
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Bus for FlatMemory {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.peek(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.poke(addr, value);
    }
}

impl std::fmt::Debug for FlatMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatMemory").finish_non_exhaustive()
    }
}
