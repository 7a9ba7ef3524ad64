use crate::bus::{Bus, Transaction};

/// Bus wrapper that records every transaction passing through it.
#[derive(Debug, Default)]
pub struct TraceBus<B> {
    inner: B,
    log: Vec<Transaction>,
    recording: bool,
}

impl<B: Bus> TraceBus<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            log: Vec::new(),
            recording: true,
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Hand over everything recorded so far and start a fresh log.
    pub fn take(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.log)
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    fn record(&mut self, mut transaction: Transaction) {
        if self.recording {
            transaction.bank = self.inner.bank_of(transaction.address);
            self.log.push(transaction);
        }
    }
}

impl<B: Bus> Bus for TraceBus<B> {
    fn read8(&mut self, addr: u16) -> u8 {
        let value = self.inner.read8(addr);
        self.record(Transaction::read(addr, value));
        value
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.inner.write8(addr, value);
        self.record(Transaction::write(addr, value));
    }

    fn coalesce_stalled_reads(&self, addr: u16) -> bool {
        self.inner.coalesce_stalled_reads(addr)
    }

    fn bank_of(&self, addr: u16) -> Option<u8> {
        self.inner.bank_of(addr)
    }
}
