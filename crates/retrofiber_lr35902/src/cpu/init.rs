use retrofiber_common::{Bus, Clock, RunState, Word};

use super::{InterruptFlags, Lr35902, Lr35902Config, Registers};

impl<B: Bus> Lr35902<B> {
    pub fn new(bus: B, config: Lr35902Config) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            bus,
            config,
            clock: Clock::new(),
            state: RunState::Running,
            opcode: 0,
            cb_opcode: 0,
            stage: 0,
            imm: Word::default(),
            ime: false,
            ime_enable_pending: false,
            ime_enable_delay: false,
            ie: 0,
            iflag: InterruptFlags::empty(),
            lines: InterruptFlags::empty(),
            pending: InterruptFlags::empty(),
            dispatching: false,
            vector: 0,
            halted: false,
            halt_bug: false,
            stopped: false,
        };
        cpu.hard_reset();
        cpu
    }

    /// Power-on state. IE, IF and the interrupt inputs are cleared.
    pub fn hard_reset(&mut self) {
        self.regs = Registers::default();
        if self.config.post_boot_state {
            self.apply_boot_state();
        }
        self.ie = 0;
        self.iflag = InterruptFlags::empty();
        self.lines = InterruptFlags::empty();
        self.clear_sequencer();
        log::info!("LR35902 hard reset, PC=0x{:04X}", self.regs.pc.get());
    }

    /// Restart execution without touching the register file: PC goes back
    /// to its reset value, IME and the low-power states are cleared.
    pub fn soft_reset(&mut self) {
        let pc = if self.config.post_boot_state {
            0x0100
        } else {
            0x0000
        };
        self.regs.pc.set(pc);
        self.clear_sequencer();
        log::info!("LR35902 soft reset, PC=0x{:04X}", pc);
    }

    fn clear_sequencer(&mut self) {
        self.state = RunState::Running;
        self.stage = 0;
        self.imm = Word::default();
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        self.dispatching = false;
        self.vector = 0;
        self.halted = false;
        self.halt_bug = false;
        self.stopped = false;
        self.poll();
    }

    /// Registers as the DMG boot ROM leaves them when it jumps to the
    /// cartridge at 0x0100.
    fn apply_boot_state(&mut self) {
        self.regs.set_af(0x01B0);
        self.regs.bc.set(0x0013);
        self.regs.de.set(0x00D8);
        self.regs.hl.set(0x014D);
        self.regs.sp.set(0xFFFE);
        self.regs.pc.set(0x0100);
    }
}
