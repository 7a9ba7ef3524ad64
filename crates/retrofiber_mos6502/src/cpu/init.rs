use retrofiber_common::{Bus, Clock, EdgeLine, LevelLines, RunState};

use super::interrupts::{IRQ_VECTOR, RESET_VECTOR};
use super::{Instr, Mos6502, Mos6502Config, Registers};

impl<B: Bus> Mos6502<B> {
    /// Create a core in power-on state and load PC from the reset vector.
    pub fn new(bus: B, config: Mos6502Config) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            bus,
            config,
            clock: Clock::new(),
            state: RunState::Running,
            opcode: 0,
            instr: Instr::INTERRUPT,
            stage: 0,
            ptr: 0,
            base_hi: 0,
            page_crossed: false,
            nmi: EdgeLine::default(),
            irq: LevelLines::default(),
            nmi_detected: false,
            irq_detected: false,
            vector: IRQ_VECTOR,
            suspended: false,
            interrupting: false,
            stall: 0,
        };
        cpu.hard_reset();
        cpu
    }

    /// Power-on reset: A=X=Y=0, S=$FD, only I set, PC from $FFFC. All
    /// interrupt inputs are released.
    pub fn hard_reset(&mut self) {
        self.regs = Registers::default();
        self.nmi = EdgeLine::default();
        self.irq.clear();
        self.clear_sequencer();
        self.load_reset_vector();
        log::info!("6502 hard reset, PC=0x{:04X}", self.regs.pc.get());
    }

    /// Reset button: S moves down three, I is set, PC reloads from $FFFC.
    /// Everything else is kept.
    pub fn soft_reset(&mut self) {
        let s = self.regs.sp().wrapping_sub(3);
        self.regs.set_sp(s);
        self.regs.p.i = true;
        self.clear_sequencer();
        self.load_reset_vector();
        log::info!("6502 soft reset, PC=0x{:04X}", self.regs.pc.get());
    }

    fn clear_sequencer(&mut self) {
        self.state = RunState::Running;
        self.instr = Instr::INTERRUPT;
        self.stage = 0;
        self.page_crossed = false;
        self.nmi_detected = false;
        self.irq_detected = false;
        self.vector = IRQ_VECTOR;
        self.suspended = false;
        self.interrupting = false;
        self.stall = 0;
    }

    /// The vector goes through the resolver like any read but is not charged
    /// to the cycle budget.
    fn load_reset_vector(&mut self) {
        let lo = self.bus.read8(RESET_VECTOR);
        let hi = self.bus.read8(RESET_VECTOR.wrapping_add(1));
        self.regs.pc.set_lo(lo);
        self.regs.pc.set_hi(hi);
    }
}
