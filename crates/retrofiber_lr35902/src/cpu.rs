mod alu;
mod cb;
mod exec;
mod init;
mod interrupts;
mod regs;


use std::any::Any;

use retrofiber_common::{Bus, Clock, Processor, RunState, Word};
use typed_builder::TypedBuilder;

pub use interrupts::{InterruptFlags, Lr35902Line};
pub use regs::{Flag, Registers};

/// Interrupt flag register, mapped inside the core.
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register, mapped inside the core.
pub const IE_ADDR: u16 = 0xFFFF;

#[derive(Clone, Debug, TypedBuilder)]
pub struct Lr35902Config {
    /// Start from the register values the DMG boot ROM leaves behind
    /// (PC=0x0100) instead of the raw power-on state (PC=0x0000).
    #[builder(default = false)]
    pub post_boot_state: bool,
}

impl Default for Lr35902Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Sharp LR35902 core stepped one M-cycle at a time.
///
/// Each [`Processor::cycle`] call is one M-cycle: a bus read, a bus write or
/// an internal cycle. The opcode being executed and the index of the next
/// M-cycle (`stage`) are kept on the core, so execution can stop after any
/// M-cycle and pick up again on the next call.
#[derive(Clone, Debug)]
pub struct Lr35902<B: Bus> {
    pub regs: Registers,
    pub bus: B,

    config: Lr35902Config,
    clock: Clock,
    state: RunState,

    opcode: u8,
    /// Second byte of a CB-prefixed instruction.
    cb_opcode: u8,
    /// Index of the next M-cycle within the current instruction. 0 is the
    /// opcode fetch.
    stage: u8,
    /// Operand scratch: immediates, popped words, the `(HL)` operand.
    imm: Word,

    ime: bool,
    ime_enable_pending: bool,
    ime_enable_delay: bool,
    ie: u8,
    iflag: InterruptFlags,
    /// Line levels, used to latch IF on rising edges.
    lines: InterruptFlags,
    /// `IE & IF` as seen by the last poll.
    pending: InterruptFlags,
    dispatching: bool,
    vector: u16,

    halted: bool,
    halt_bug: bool,
    stopped: bool,
}

impl<B: Bus> Lr35902<B> {
    #[inline]
    pub fn config(&self) -> &Lr35902Config {
        &self.config
    }

    #[inline]
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    #[inline]
    pub fn ime(&self) -> bool {
        self.ime
    }

    #[inline]
    pub fn halted(&self) -> bool {
        self.halted
    }

    #[inline]
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    #[inline]
    pub fn interrupt_enable(&self) -> u8 {
        self.ie
    }

    #[inline]
    pub fn interrupt_flags(&self) -> InterruptFlags {
        self.iflag
    }

    /// True when the next M-cycle starts a new instruction (or an interrupt
    /// dispatch).
    #[inline]
    pub fn at_instruction_boundary(&self) -> bool {
        self.stage == 0
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    /// One read M-cycle. IF and IE are answered by the core; the bus still
    /// sees the access.
    pub(crate) fn read(&mut self, addr: u16) -> u8 {
        let value = self.bus.read8(addr);
        let value = match addr {
            IF_ADDR => self.iflag.bits() | 0xE0,
            IE_ADDR => self.ie,
            _ => value,
        };
        self.end_cycle();
        value
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        self.bus.write8(addr, value);
        match addr {
            IF_ADDR => self.iflag = InterruptFlags::from_bits_truncate(value),
            IE_ADDR => self.ie = value,
            _ => {}
        }
        self.end_cycle();
    }

    /// Internal M-cycle with no bus activity.
    #[inline]
    pub(crate) fn idle(&mut self) {
        self.end_cycle();
    }

    #[inline]
    fn end_cycle(&mut self) {
        self.clock.tick();
        self.poll();
    }

    /// Read at PC and advance it.
    #[inline]
    pub(crate) fn fetch(&mut self) -> u8 {
        let value = self.read(self.regs.pc.get());
        self.regs.pc.increment();
        value
    }

    fn fetch_opcode(&mut self) -> u8 {
        let value = self.read(self.regs.pc.get());
        if self.halt_bug {
            // The fetch after a bugged HALT does not advance PC.
            self.halt_bug = false;
        } else {
            self.regs.pc.increment();
        }
        value
    }

    #[inline]
    pub(crate) fn next(&mut self) {
        self.stage += 1;
    }

    #[inline]
    pub(crate) fn finish(&mut self) {
        self.stage = 0;
    }

    /// Condition code by index: NZ, Z, NC, C.
    pub(crate) fn condition(&self, index: u8) -> bool {
        match index & 0x03 {
            0 => !self.regs.flag(Flag::Z),
            1 => self.regs.flag(Flag::Z),
            2 => !self.regs.flag(Flag::C),
            _ => self.regs.flag(Flag::C),
        }
    }

    fn begin_instruction(&mut self) {
        self.apply_ime_delay();

        if self.stopped {
            if !self.iflag.contains(InterruptFlags::JOYPAD) {
                self.idle();
                return;
            }
            self.stopped = false;
            log::debug!("LR35902 leaving STOP");
        }

        if self.halted {
            if self.pending.is_empty() {
                self.idle();
                return;
            }
            self.halted = false;
        }

        if self.ime && !self.pending.is_empty() {
            self.begin_dispatch();
            return;
        }

        let pc = self.regs.pc.get();
        let opcode = self.fetch_opcode();
        self.opcode = opcode;
        self.dispatching = false;

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "{:04X}  {:02X}  AF:{:04X} BC:{:04X} DE:{:04X} HL:{:04X} SP:{:04X} IME:{}",
                pc,
                opcode,
                self.regs.af.get(),
                self.regs.bc.get(),
                self.regs.de.get(),
                self.regs.hl.get(),
                self.regs.sp.get(),
                self.ime as u8,
            );
        }

        if is_hole(opcode) {
            self.lock(pc);
            return;
        }
        self.execute();
    }

    /// The eleven unused opcodes hang the real chip.
    fn lock(&mut self, opcode_addr: u16) {
        log::error!(
            "LR35902 locked: invalid opcode 0x{opcode:02X} at PC=0x{pc:04X} (AF=0x{af:04X} BC=0x{bc:04X} DE=0x{de:04X} HL=0x{hl:04X} SP=0x{sp:04X})",
            opcode = self.opcode,
            pc = opcode_addr,
            af = self.regs.af.get(),
            bc = self.regs.bc.get(),
            de = self.regs.de.get(),
            hl = self.regs.hl.get(),
            sp = self.regs.sp.get(),
        );
        self.state = RunState::Jammed;
        self.stage = 0;
    }
}

pub(crate) fn is_hole(opcode: u8) -> bool {
    matches!(
        opcode,
        0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD
    )
}

impl<B: Bus + 'static> Processor for Lr35902<B> {
    fn name(&self) -> &'static str {
        "lr35902"
    }

    fn clock(&self) -> &Clock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn cycle(&mut self) {
        if self.state == RunState::Jammed {
            self.clock.tick();
            return;
        }
        if self.stage == 0 {
            self.begin_instruction();
        } else if self.dispatching {
            self.step_dispatch();
        } else {
            self.execute();
        }
    }

    fn run_state(&self) -> RunState {
        self.state
    }

    fn hard_reset(&mut self) {
        Lr35902::hard_reset(self);
    }

    fn soft_reset(&mut self) {
        Lr35902::soft_reset(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
