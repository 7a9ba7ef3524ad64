mod addressing;
mod decode;
mod init;
mod interrupts;
mod ops;
mod regs;
mod status;

#[cfg(test)]
mod tests;

use std::any::Any;

use retrofiber_common::{Bus, Clock, EdgeLine, LevelLines, Processor, RunState};
use typed_builder::TypedBuilder;

pub use decode::{decode, Access, Flag, Instr, Mode, Op};
pub use interrupts::Mos6502Line;
pub use regs::Registers;
pub use status::{Status, StatusBits};

/// Variant switches for the 6502 family.
#[derive(Clone, Debug, TypedBuilder)]
pub struct Mos6502Config {
    /// Honour the D flag in ADC/SBC/ARR. The Ricoh 2A03 has the BCD
    /// circuitry cut, so this is off by default.
    #[builder(default = false)]
    pub decimal_mode: bool,
    /// Chip-dependent constant ORed into A by the unstable ANE and LXA
    /// opcodes.
    #[builder(default = 0xFF)]
    pub unstable_magic: u8,
}

impl Default for Mos6502Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Cycle-exact NMOS 6502 core.
///
/// Each call to [`Processor::cycle`] performs one bus transaction. The
/// position inside the current instruction is kept in `instr`/`stage`, so
/// the core can be suspended after any transaction and resumed later.
#[derive(Clone, Debug)]
pub struct Mos6502<B: Bus> {
    pub regs: Registers,
    pub bus: B,

    config: Mos6502Config,
    clock: Clock,
    state: RunState,

    opcode: u8,
    instr: Instr,
    /// Index of the next transaction within `instr`; 0 is the opcode fetch.
    stage: u8,
    /// Zero-page pointer for the indirect modes.
    ptr: u8,
    /// High byte of an indexed base address before the index was added.
    base_hi: u8,
    page_crossed: bool,

    // Interrupt controller.
    nmi: EdgeLine,
    irq: LevelLines,
    nmi_detected: bool,
    irq_detected: bool,
    vector: u16,
    suspended: bool,
    /// The next fetch slot runs the interrupt sequence instead of an opcode.
    interrupting: bool,

    /// Pending RDY stall, applied to the next read.
    stall: u32,
}

impl<B: Bus> Mos6502<B> {
    #[inline]
    pub fn config(&self) -> &Mos6502Config {
        &self.config
    }

    #[inline]
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    #[inline]
    pub fn instr(&self) -> Instr {
        self.instr
    }

    /// True when the next cycle fetches an opcode (or starts an interrupt).
    #[inline]
    pub fn at_instruction_boundary(&self) -> bool {
        self.stage == 0
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Hold RDY low: the next read occupies `cycles` clock units in total.
    pub fn stall(&mut self, cycles: u32) {
        self.stall += cycles;
    }

    /// One bus read: RDY accounting, the resolver, one clock unit, then the
    /// interrupt poll.
    pub(crate) fn read(&mut self, addr: u16) -> u8 {
        if self.stall > 0 {
            self.stall_read(addr);
        }
        let value = self.bus.read8(addr);
        self.end_cycle();
        value
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        if self.stall > 0 {
            self.stall -= 1;
        }
        self.bus.write8(addr, value);
        self.end_cycle();
    }

    fn stall_read(&mut self, addr: u16) {
        let cycles = std::mem::take(&mut self.stall);
        let coalesce = self.bus.coalesce_stalled_reads(addr);
        for n in 1..cycles {
            if n == 1 || !coalesce {
                self.bus.read8(addr);
            }
            self.end_cycle();
        }
    }

    #[inline]
    fn end_cycle(&mut self) {
        self.clock.tick();
        if !self.suspended {
            self.poll();
        }
    }

    /// Read at PC and advance it.
    #[inline]
    pub(crate) fn fetch(&mut self) -> u8 {
        let value = self.read(self.regs.pc.get());
        self.regs.pc.increment();
        value
    }

    #[inline]
    pub(crate) fn push(&mut self, value: u8) {
        self.write(self.regs.s.get(), value);
        self.regs.set_sp(self.regs.sp().wrapping_sub(1));
    }

    /// Read the current stack slot without moving S.
    #[inline]
    pub(crate) fn read_stack(&mut self) -> u8 {
        self.read(self.regs.s.get())
    }

    #[inline]
    pub(crate) fn bump_stack(&mut self) {
        self.regs.set_sp(self.regs.sp().wrapping_add(1));
    }

    /// Move to the next transaction of the current instruction.
    #[inline]
    pub(crate) fn next(&mut self) {
        self.stage += 1;
    }

    /// Close the current instruction and decide whether the next fetch slot
    /// is taken by an interrupt.
    pub(crate) fn finish(&mut self) {
        self.stage = 0;
        self.interrupting = match self.instr.mode {
            Mode::Brk | Mode::Interrupt => false,
            _ => self.nmi_detected || self.irq_detected,
        };
    }

    fn begin_instruction(&mut self) {
        if self.interrupting {
            self.interrupting = false;
            self.instr = Instr::INTERRUPT;
            // The opcode fetch is replaced by a dummy read and PC stays put.
            self.read(self.regs.pc.get());
            self.stage = 1;
            return;
        }

        let pc = self.regs.pc.get();
        let opcode = self.fetch();
        self.opcode = opcode;
        self.instr = decode(opcode);
        self.stage = 1;

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "{:04X}  {:02X}  {:<4} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
                pc,
                opcode,
                self.instr.op.name(),
                self.regs.a,
                self.regs.x,
                self.regs.y,
                self.regs.p.to_byte(),
                self.regs.sp(),
            );
        }

        if self.instr.mode == Mode::Jam {
            self.jam(pc);
        }
    }

    fn jam(&mut self, opcode_addr: u16) {
        log::error!(
            "6502 jammed: opcode 0x{opcode:02X} at PC=0x{pc:04X} (A=0x{a:02X} X=0x{x:02X} Y=0x{y:02X} P=0x{p:02X} S=0x{s:02X})",
            opcode = self.opcode,
            pc = opcode_addr,
            a = self.regs.a,
            x = self.regs.x,
            y = self.regs.y,
            p = self.regs.p.to_byte(),
            s = self.regs.sp(),
        );
        self.state = RunState::Jammed;
        self.stage = 0;
    }
}

impl<B: Bus + 'static> Processor for Mos6502<B> {
    fn name(&self) -> &'static str {
        "mos6502"
    }

    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn cycle(&mut self) {
        if self.state == RunState::Jammed {
            // The bus is stuck; time still passes.
            self.clock.tick();
            return;
        }
        if self.stage == 0 {
            self.begin_instruction();
        } else {
            self.step();
        }
    }

    fn run_state(&self) -> RunState {
        self.state
    }

    fn hard_reset(&mut self) {
        Mos6502::hard_reset(self);
    }

    fn soft_reset(&mut self) {
        Mos6502::soft_reset(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
