use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retrofiber_common::{resume, Exit, Processor, Scheduler, SchedulerConfig, Transaction};

use super::*;

const ORIGIN: u16 = 0x8000;
const NMI_HANDLER: u16 = 0xA000;
const IRQ_HANDLER: u16 = 0x9000;

#[derive(Clone)]
struct TestBus {
    memory: [u8; 0x10000],
    log: Vec<Transaction>,
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
            log: Vec::new(),
        }
    }
}

impl TestBus {
    fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn set_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.memory[addr as usize] = lo;
        self.memory[addr as usize + 1] = hi;
    }

    fn reads_of(&self, addr: u16) -> usize {
        self.log
            .iter()
            .filter(|t| !t.is_write() && t.address == addr)
            .count()
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> u8 {
        let value = self.memory[addr as usize];
        self.log.push(Transaction::read(addr, value));
        value
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
        self.log.push(Transaction::write(addr, value));
    }

    fn coalesce_stalled_reads(&self, addr: u16) -> bool {
        addr == 0x4016 || addr == 0x4017
    }
}

fn bus_with(origin: u16, program: &[u8]) -> TestBus {
    let mut bus = TestBus::default();
    bus.load(origin, program);
    bus.set_word(0xFFFA, NMI_HANDLER);
    bus.set_word(0xFFFC, origin);
    bus.set_word(0xFFFE, IRQ_HANDLER);
    bus
}

fn cpu_at(origin: u16, program: &[u8], config: Mos6502Config) -> Mos6502<TestBus> {
    let mut cpu = Mos6502::new(bus_with(origin, program), config);
    cpu.bus.log.clear();
    cpu
}

fn cpu_with(program: &[u8]) -> Mos6502<TestBus> {
    cpu_at(ORIGIN, program, Mos6502Config::default())
}

/// Run cycles until the next instruction boundary; returns the cycle count.
fn step(cpu: &mut Mos6502<TestBus>) -> u32 {
    let mut cycles = 0;
    loop {
        cpu.cycle();
        cycles += 1;
        if cpu.at_instruction_boundary() || cpu.run_state() == RunState::Jammed {
            return cycles;
        }
        assert!(cycles < 16, "instruction never finished");
    }
}

fn run_instructions(cpu: &mut Mos6502<TestBus>, count: usize) {
    for _ in 0..count {
        step(cpu);
    }
}

#[test]
fn power_on_state_and_uncharged_reset_vector() {
    let cpu = Mos6502::new(bus_with(ORIGIN, &[]), Mos6502Config::default());

    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.regs.x, 0);
    assert_eq!(cpu.regs.y, 0);
    assert_eq!(cpu.regs.s.get(), 0x01FD);
    assert_eq!(cpu.regs.p.to_byte(), 0x24);
    assert_eq!(cpu.regs.pc.get(), ORIGIN);

    // The vector fetch reaches the bus but costs no budget.
    assert_eq!(
        cpu.bus.log,
        vec![Transaction::read(0xFFFC, 0x00), Transaction::read(0xFFFD, 0x80)]
    );
    assert_eq!(cpu.clock().elapsed(), 0);
}

#[test]
fn lda_immediate_then_sta_zero_page() {
    // 0x8000: LDA #$05
    // 0x8002: STA $10
    let mut cpu = cpu_with(&[0xA9, 0x05, 0x85, 0x10]);

    assert_eq!(step(&mut cpu), 2);
    assert_eq!(step(&mut cpu), 3);

    assert_eq!(cpu.regs.a, 5);
    assert!(!cpu.regs.p.z);
    assert!(!cpu.regs.p.n);
    assert_eq!(cpu.bus.memory[0x0010], 5);

    // Four reads, then the store.
    assert_eq!(
        cpu.bus.log,
        vec![
            Transaction::read(0x8000, 0xA9),
            Transaction::read(0x8001, 0x05),
            Transaction::read(0x8002, 0x85),
            Transaction::read(0x8003, 0x10),
            Transaction::write(0x0010, 0x05),
        ]
    );
    assert_eq!(cpu.clock().elapsed(), 5);
}

#[test]
fn documented_cycle_counts_without_page_crossing() {
    // (program, cycles) with X = Y = 0 and zeroed memory.
    let table: &[(&[u8], u32)] = &[
        (&[0xEA], 2),             // NOP
        (&[0x0A], 2),             // ASL A
        (&[0xA9, 0x00], 2),       // LDA #
        (&[0xA5, 0x10], 3),       // LDA zp
        (&[0xB5, 0x10], 4),       // LDA zp,X
        (&[0xAD, 0x00, 0x02], 4), // LDA abs
        (&[0xBD, 0x00, 0x02], 4), // LDA abs,X
        (&[0x9D, 0x00, 0x02], 5), // STA abs,X
        (&[0xA1, 0x10], 6),       // LDA (zp,X)
        (&[0xB1, 0x10], 5),       // LDA (zp),Y
        (&[0x91, 0x10], 6),       // STA (zp),Y
        (&[0xE6, 0x10], 5),       // INC zp
        (&[0xF6, 0x10], 6),       // INC zp,X
        (&[0xEE, 0x00, 0x02], 6), // INC abs
        (&[0xFE, 0x00, 0x02], 7), // INC abs,X
        (&[0x48], 3),             // PHA
        (&[0x08], 3),             // PHP
        (&[0x68], 4),             // PLA
        (&[0x28], 4),             // PLP
        (&[0x20, 0x00, 0x90], 6), // JSR
        (&[0x60], 6),             // RTS
        (&[0x40], 6),             // RTI
        (&[0x00, 0x00], 7),       // BRK
        (&[0x4C, 0x00, 0x90], 3), // JMP abs
        (&[0x6C, 0x00, 0x02], 5), // JMP (ind)
        (&[0x03, 0x10], 8),       // SLO (zp,X)
        (&[0x13, 0x10], 8),       // SLO (zp),Y
        (&[0x1F, 0x00, 0x02], 7), // SLO abs,X
        (&[0xB3, 0x10], 5),       // LAX (zp),Y
        (&[0x04, 0x10], 3),       // NOP zp
        (&[0x14, 0x10], 4),       // NOP zp,X
        (&[0x0C, 0x00, 0x02], 4), // NOP abs
        (&[0x1C, 0x00, 0x02], 4), // NOP abs,X
        (&[0x80, 0x00], 2),       // NOP #
        (&[0x9C, 0x00, 0x02], 5), // SHY abs,X
    ];

    for (program, cycles) in table {
        let mut cpu = cpu_with(program);
        assert_eq!(
            step(&mut cpu),
            *cycles,
            "opcode {:02X} took the wrong number of cycles",
            program[0]
        );
    }
}

#[test]
fn indexed_reads_pay_exactly_one_cycle_for_a_page_cross() {
    let mut rng = StdRng::seed_from_u64(0x6502);
    for _ in 0..500 {
        let base: u16 = rng.gen_range(0x0200..0x7F00);
        let index: u8 = rng.gen();
        let crosses = (base & 0x00FF) + index as u16 > 0xFF;

        // LDX #index; LDA base,X
        let [lo, hi] = base.to_le_bytes();
        let mut cpu = cpu_with(&[0xA2, index, 0xBD, lo, hi]);
        step(&mut cpu);
        cpu.bus.log.clear();

        let cycles = step(&mut cpu);
        assert_eq!(cycles, 4 + crosses as u32, "base={base:04X} x={index:02X}");

        let target = base.wrapping_add(index as u16);
        if crosses {
            // First access lands on the uncarried address in the old page.
            let wrong = (base & 0xFF00) | (target & 0x00FF);
            assert_eq!(cpu.bus.log[3].address, wrong);
            assert_eq!(cpu.bus.log[4].address, target);
        } else {
            assert_eq!(cpu.bus.log[3].address, target);
        }
    }
}

#[test]
fn indirect_y_reads_pay_for_crossing_and_writes_never_shortcut() {
    let mut rng = StdRng::seed_from_u64(0x91);
    for _ in 0..500 {
        let base: u16 = rng.gen_range(0x0200..0x7F00);
        let index: u8 = rng.gen();
        let crosses = (base & 0x00FF) + index as u16 > 0xFF;

        for (opcode, expected) in [
            (0xB1, 5 + crosses as u32), // LDA (zp),Y
            (0x91, 6),                  // STA (zp),Y
            (0x13, 8),                  // SLO (zp),Y
        ] {
            // LDY #index; op ($40),Y
            let mut cpu = cpu_with(&[0xA0, index, opcode, 0x40]);
            cpu.bus.set_word(0x0040, base);
            step(&mut cpu);
            assert_eq!(
                step(&mut cpu),
                expected,
                "op={opcode:02X} base={base:04X} y={index:02X}"
            );
        }
    }
}

#[test]
fn absolute_indexed_writes_and_rmw_take_the_worst_case() {
    for x in [0x00u8, 0x01, 0xFF] {
        // LDX #x; STA $02F0,X
        let mut cpu = cpu_with(&[0xA2, x, 0x9D, 0xF0, 0x02]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 5);

        // LDX #x; INC $02F0,X
        let mut cpu = cpu_with(&[0xA2, x, 0xFE, 0xF0, 0x02]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 7);
    }
}

#[test]
fn read_modify_write_writes_old_value_then_new_value() {
    // 0x8000: INC $10
    let mut cpu = cpu_with(&[0xE6, 0x10]);
    cpu.bus.memory[0x0010] = 0x41;

    assert_eq!(step(&mut cpu), 5);
    assert_eq!(
        cpu.bus.log,
        vec![
            Transaction::read(0x8000, 0xE6),
            Transaction::read(0x8001, 0x10),
            Transaction::read(0x0010, 0x41),
            Transaction::write(0x0010, 0x41),
            Transaction::write(0x0010, 0x42),
        ]
    );
}

#[test]
fn zero_page_indexing_wraps_inside_page_zero() {
    // 0x8000: LDX #$20
    // 0x8002: LDA $F0,X   -> $0010, not $0110
    let mut cpu = cpu_with(&[0xA2, 0x20, 0xB5, 0xF0]);
    cpu.bus.memory[0x0010] = 0x77;
    cpu.bus.memory[0x0110] = 0x11;

    run_instructions(&mut cpu, 2);
    assert_eq!(cpu.regs.a, 0x77);
    // Dummy read at the unindexed address.
    assert_eq!(cpu.bus.log[4], Transaction::read(0x00F0, 0x00));
}

#[test]
fn indirect_x_pointer_wraps_inside_page_zero() {
    // 0x8000: LDX #$01
    // 0x8002: LDA ($FE,X)  -> pointer at $FF/$00
    let mut cpu = cpu_with(&[0xA2, 0x01, 0xA1, 0xFE]);
    cpu.bus.memory[0x00FF] = 0x34;
    cpu.bus.memory[0x0000] = 0x12;
    cpu.bus.memory[0x1234] = 0x99;

    run_instructions(&mut cpu, 2);
    assert_eq!(cpu.regs.a, 0x99);
}

#[test]
fn jmp_indirect_does_not_carry_into_the_pointer_page() {
    // 0x8000: JMP ($10FF)
    let mut cpu = cpu_with(&[0x6C, 0xFF, 0x10]);
    cpu.bus.memory[0x10FF] = 0x34;
    cpu.bus.memory[0x1000] = 0x12;
    cpu.bus.memory[0x1100] = 0x56;

    assert_eq!(step(&mut cpu), 5);
    assert_eq!(cpu.regs.pc.get(), 0x1234);
}

#[test]
fn jsr_and_rts_bus_order() {
    // 0x8000: JSR $9000
    // 0x9000: RTS
    let mut cpu = cpu_with(&[0x20, 0x00, 0x90]);
    cpu.bus.load(0x9000, &[0x60]);

    assert_eq!(step(&mut cpu), 6);
    assert_eq!(
        cpu.bus.log,
        vec![
            Transaction::read(0x8000, 0x20),
            Transaction::read(0x8001, 0x00),
            Transaction::read(0x01FD, 0x00),
            Transaction::write(0x01FD, 0x80),
            Transaction::write(0x01FC, 0x02),
            Transaction::read(0x8002, 0x90),
        ]
    );
    assert_eq!(cpu.regs.pc.get(), 0x9000);
    assert_eq!(cpu.regs.sp(), 0xFB);

    assert_eq!(step(&mut cpu), 6);
    assert_eq!(cpu.regs.pc.get(), 0x8003);
    assert_eq!(cpu.regs.sp(), 0xFD);
}

#[test]
fn php_plp_round_trip_restores_flags() {
    // 0x8000: SEC
    // 0x8001: SED
    // 0x8002: LDA #$80
    // 0x8004: PHP
    // 0x8005: CLC
    // 0x8006: CLD
    // 0x8007: LDA #$01
    // 0x8009: PLP
    let mut cpu = cpu_with(&[
        0x38, 0xF8, 0xA9, 0x80, 0x08, 0x18, 0xD8, 0xA9, 0x01, 0x28,
    ]);

    run_instructions(&mut cpu, 4);
    let before = cpu.regs.p;
    // N, B, bit 5, D, I, C.
    assert_eq!(cpu.bus.memory[0x01FD], 0xBD);

    run_instructions(&mut cpu, 4);
    assert_eq!(cpu.regs.p, before);
    assert_eq!(cpu.regs.p.to_byte(), 0xAD);
    assert_eq!(cpu.regs.sp(), 0xFD);
}

#[test]
fn every_opcode_finishes_or_jams() {
    let jams = [
        0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
    ];
    for opcode in 0..=u8::MAX {
        let mut cpu = cpu_with(&[opcode, 0x00, 0x00]);
        let cycles = step(&mut cpu);
        if jams.contains(&opcode) {
            assert_eq!(cpu.run_state(), RunState::Jammed, "{opcode:02X}");
            assert_eq!(cycles, 1);
        } else {
            assert_eq!(cpu.run_state(), RunState::Running, "{opcode:02X}");
            assert!((2..=8).contains(&cycles), "{opcode:02X} took {cycles}");
        }
    }
}

#[test]
fn jammed_core_burns_its_budget_until_reset() {
    let mut cpu = cpu_with(&[0x02]);
    cpu.clock_mut().grant(10);

    assert_eq!(resume(&mut cpu), Exit::Jammed);
    assert_eq!(cpu.run_state(), RunState::Jammed);
    assert_eq!(cpu.clock().elapsed(), 10);
    // Only the opcode fetch reached the bus.
    assert_eq!(cpu.bus.log.len(), 1);

    cpu.hard_reset();
    assert_eq!(cpu.run_state(), RunState::Running);
    assert_eq!(cpu.regs.pc.get(), ORIGIN);
}

#[test]
fn branch_timing_depends_on_taken_and_page_cross() {
    // BEQ +5 with Z clear: not taken.
    let mut cpu = cpu_with(&[0xF0, 0x05]);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.regs.pc.get(), 0x8002);

    // BNE +5: taken, same page.
    let mut cpu = cpu_with(&[0xD0, 0x05]);
    assert_eq!(step(&mut cpu), 3);
    assert_eq!(cpu.regs.pc.get(), 0x8007);

    // BNE +$20 from $80F0: lands on $8112.
    let mut cpu = cpu_at(0x80F0, &[0xD0, 0x20], Mos6502Config::default());
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.regs.pc.get(), 0x8112);
    assert_eq!(cpu.bus.log[3].address, 0x8012);

    // BNE backwards across a page.
    let mut cpu = cpu_at(0x8100, &[0xD0, 0xFC], Mos6502Config::default());
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.regs.pc.get(), 0x80FE);
}

#[test]
fn interrupt_raised_during_a_taken_branch_waits_one_instruction() {
    // 0x8000: CLI
    // 0x8001: BNE +0
    // 0x8003: NOP
    // 0x8004: NOP
    let mut cpu = cpu_with(&[0x58, 0xD0, 0x00, 0xEA, 0xEA]);
    step(&mut cpu);

    cpu.cycle(); // opcode
    cpu.cycle(); // operand
    cpu.assert_line(Mos6502Line::Apu, true);
    cpu.cycle(); // dummy read, not polled
    assert!(cpu.at_instruction_boundary());

    // The NOP after the branch still runs.
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.opcode(), 0xEA);
    assert_eq!(cpu.regs.pc.get(), 0x8004);

    assert_eq!(step(&mut cpu), 7);
    assert_eq!(cpu.regs.pc.get(), IRQ_HANDLER);
    assert_eq!(cpu.bus.memory[0x01FD], 0x80);
    assert_eq!(cpu.bus.memory[0x01FC], 0x04);
    // IRQ pushes B clear.
    assert_eq!(cpu.bus.memory[0x01FB] & 0x30, 0x20);
    assert!(cpu.regs.p.i);
}

#[test]
fn interrupt_seen_before_the_branch_completes_follows_it_immediately() {
    // 0x8000: BNE +0
    // 0x8002: NOP
    let mut cpu = cpu_with(&[0xD0, 0x00, 0xEA]);

    cpu.cycle(); // opcode
    cpu.assert_line(Mos6502Line::Nmi, true);
    cpu.cycle(); // operand, poll latches the edge
    assert!(cpu.nmi_pending());
    cpu.cycle(); // branch completes
    assert!(cpu.at_instruction_boundary());
    assert_eq!(cpu.regs.pc.get(), 0x8002);

    // No opcode fetch: the next slot is the interrupt sequence.
    cpu.bus.log.clear();
    assert_eq!(step(&mut cpu), 7);
    assert_eq!(cpu.bus.log[0], Transaction::read(0x8002, 0xEA));
    assert_eq!(cpu.regs.pc.get(), NMI_HANDLER);
    assert!(!cpu.nmi_pending());
}

#[test]
fn cli_lets_one_instruction_run_before_a_pending_irq() {
    // 0x8000: CLI
    // 0x8001: NOP
    // 0x8002: NOP
    let mut cpu = cpu_with(&[0x58, 0xEA, 0xEA]);
    cpu.assert_line(Mos6502Line::Board, true);

    assert_eq!(step(&mut cpu), 2);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(cpu.regs.pc.get(), 0x8002);
    assert_eq!(step(&mut cpu), 7);
    assert_eq!(cpu.regs.pc.get(), IRQ_HANDLER);
}

#[test]
fn masked_irq_is_ignored_and_released_lines_stop_requesting() {
    let mut cpu = cpu_with(&[0xEA, 0x58, 0xEA, 0xEA]);
    cpu.assert_line(Mos6502Line::Dmc, true);
    assert!(cpu.line_asserted(Mos6502Line::Dmc));
    step(&mut cpu);
    assert!(!cpu.irq_pending());
    assert_eq!(cpu.regs.pc.get(), 0x8001);

    cpu.assert_line(Mos6502Line::Dmc, false);
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.pc.get(), 0x8004);
}

#[test]
fn nmi_held_high_fires_once_per_rising_edge() {
    let mut cpu = cpu_with(&[0xEA; 8]);
    cpu.bus.load(NMI_HANDLER, &[0xEA; 8]);

    cpu.assert_line(Mos6502Line::Nmi, true);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(step(&mut cpu), 7);
    assert_eq!(cpu.regs.pc.get(), NMI_HANDLER);

    // Still high: the handler runs undisturbed.
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.pc.get(), NMI_HANDLER + 3);

    cpu.assert_line(Mos6502Line::Nmi, false);
    step(&mut cpu);
    cpu.assert_line(Mos6502Line::Nmi, true);
    assert_eq!(step(&mut cpu), 2);
    assert_eq!(step(&mut cpu), 7);
    assert_eq!(cpu.regs.pc.get(), NMI_HANDLER);
}

#[test]
fn nmi_toggled_within_one_cycle_is_serviced_once() {
    let mut cpu = cpu_with(&[0xEA; 8]);
    cpu.bus.load(NMI_HANDLER, &[0xEA; 8]);

    cpu.cycle(); // NOP opcode
    cpu.assert_line(Mos6502Line::Nmi, true);
    cpu.assert_line(Mos6502Line::Nmi, false);
    cpu.assert_line(Mos6502Line::Nmi, true);
    cpu.cycle(); // NOP dummy read, edge latched
    assert!(cpu.at_instruction_boundary());
    assert!(cpu.nmi_pending());

    assert_eq!(step(&mut cpu), 7);
    assert_eq!(cpu.regs.pc.get(), NMI_HANDLER);
    assert!(!cpu.nmi_pending());

    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.pc.get(), NMI_HANDLER + 3);
}

#[test]
fn hard_reset_releases_interrupt_lines() {
    // 0x8000: CLI
    // 0x8001: NOP
    // 0x8002: NOP
    let mut cpu = cpu_with(&[0x58, 0xEA, 0xEA]);
    cpu.assert_line(Mos6502Line::Apu, true);
    cpu.assert_line(Mos6502Line::Nmi, true);

    cpu.hard_reset();
    assert!(!cpu.line_asserted(Mos6502Line::Apu));
    assert!(!cpu.line_asserted(Mos6502Line::Nmi));

    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.pc.get(), 0x8003);
    assert!(!cpu.irq_pending());
    assert!(!cpu.nmi_pending());
}

#[test]
fn brk_pushes_break_flag_and_sets_i() {
    // 0x8000: BRK #$00
    let mut cpu = cpu_with(&[0x00, 0x00]);
    assert_eq!(step(&mut cpu), 7);

    assert_eq!(cpu.regs.pc.get(), IRQ_HANDLER);
    assert_eq!(cpu.bus.memory[0x01FD], 0x80);
    assert_eq!(cpu.bus.memory[0x01FC], 0x02);
    assert_eq!(cpu.bus.memory[0x01FB], 0x34);
    assert!(cpu.regs.p.i);
    assert_eq!(cpu.regs.sp(), 0xFA);
}

#[test]
fn nmi_during_brk_pushes_hijacks_the_vector() {
    let mut cpu = cpu_with(&[0x00, 0x00]);

    cpu.cycle(); // opcode
    cpu.cycle(); // padding
    cpu.cycle(); // push PCH
    cpu.assert_line(Mos6502Line::Nmi, true);
    cpu.cycle(); // push PCL, edge latched
    cpu.cycle(); // push P
    cpu.cycle(); // vector low
    cpu.cycle(); // vector high
    assert!(cpu.at_instruction_boundary());

    assert_eq!(cpu.regs.pc.get(), NMI_HANDLER);
    // Still a BRK frame.
    assert_eq!(cpu.bus.memory[0x01FB] & 0x10, 0x10);
    assert!(!cpu.nmi_pending());
}

#[test]
fn rti_returns_from_brk() {
    // 0x8000: BRK #$00
    // 0x8002: NOP
    // 0x9000: RTI
    let mut cpu = cpu_with(&[0x00, 0x00, 0xEA]);
    cpu.bus.load(IRQ_HANDLER, &[0x40]);
    cpu.regs.p.c = true;

    step(&mut cpu);
    assert_eq!(step(&mut cpu), 6);
    assert_eq!(cpu.regs.pc.get(), 0x8002);
    assert!(cpu.regs.p.c);
    assert_eq!(cpu.regs.sp(), 0xFD);
}

#[test]
fn soft_reset_keeps_registers_and_moves_stack() {
    let mut cpu = cpu_with(&[0xA9, 0x42, 0x58]);
    run_instructions(&mut cpu, 2);
    assert!(!cpu.regs.p.i);

    cpu.soft_reset();
    assert_eq!(cpu.regs.a, 0x42);
    assert_eq!(cpu.regs.sp(), 0xFA);
    assert!(cpu.regs.p.i);
    assert_eq!(cpu.regs.pc.get(), ORIGIN);
    assert!(cpu.at_instruction_boundary());
}

#[test]
fn rdy_stall_repeats_the_next_read() {
    // 0x8000: LDA $0200
    let mut cpu = cpu_with(&[0xAD, 0x00, 0x02]);
    cpu.cycle();
    cpu.cycle();
    cpu.cycle();

    cpu.stall(3);
    let before = cpu.clock().elapsed();
    cpu.cycle();
    assert!(cpu.at_instruction_boundary());
    assert_eq!(cpu.clock().elapsed() - before, 3);
    assert_eq!(cpu.bus.reads_of(0x0200), 3);
}

#[test]
fn rdy_stall_on_controller_port_reads_it_twice() {
    // 0x8000: LDA $4016
    let mut cpu = cpu_with(&[0xAD, 0x16, 0x40]);
    cpu.cycle();
    cpu.cycle();
    cpu.cycle();

    cpu.stall(4);
    let before = cpu.clock().elapsed();
    cpu.cycle();
    assert_eq!(cpu.clock().elapsed() - before, 4);
    assert_eq!(cpu.bus.reads_of(0x4016), 2);
}

#[test]
fn writes_use_up_pending_stall_cycles() {
    // 0x8000: STA $10
    // 0x8002: LDA $10
    let mut cpu = cpu_with(&[0x85, 0x10, 0xA5, 0x10]);
    cpu.cycle();
    cpu.cycle();
    cpu.stall(2);
    cpu.cycle(); // the write eats one stall cycle

    let before = cpu.clock().elapsed();
    step(&mut cpu);
    assert_eq!(cpu.clock().elapsed() - before, 3);
}

#[test]
fn binary_adc_and_sbc_set_overflow_and_carry() {
    // LDA #$50; ADC #$50
    let mut cpu = cpu_with(&[0xA9, 0x50, 0x69, 0x50]);
    run_instructions(&mut cpu, 2);
    assert_eq!(cpu.regs.a, 0xA0);
    assert!(cpu.regs.p.v);
    assert!(cpu.regs.p.n);
    assert!(!cpu.regs.p.c);

    // SEC; LDA #$50; SBC #$F0
    let mut cpu = cpu_with(&[0x38, 0xA9, 0x50, 0xE9, 0xF0]);
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.a, 0x60);
    assert!(!cpu.regs.p.v);
    assert!(!cpu.regs.p.c);

    // SEC; LDA #$05; SBC #$05 -> zero, no borrow
    let mut cpu = cpu_with(&[0x38, 0xA9, 0x05, 0xE9, 0x05]);
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.a, 0);
    assert!(cpu.regs.p.z);
    assert!(cpu.regs.p.c);
}

#[test]
fn decimal_flag_only_matters_when_enabled() {
    // SED; CLC; LDA #$15; ADC #$27
    let program = [0xF8, 0x18, 0xA9, 0x15, 0x69, 0x27];

    let mut nes = cpu_with(&program);
    run_instructions(&mut nes, 4);
    assert_eq!(nes.regs.a, 0x3C);

    let config = Mos6502Config::builder().decimal_mode(true).build();
    let mut nmos = cpu_at(ORIGIN, &program, config.clone());
    run_instructions(&mut nmos, 4);
    assert_eq!(nmos.regs.a, 0x42);
    assert!(!nmos.regs.p.c);

    // SED; CLC; LDA #$99; ADC #$01 -> 00 with carry
    let mut nmos = cpu_at(ORIGIN, &[0xF8, 0x18, 0xA9, 0x99, 0x69, 0x01], config.clone());
    run_instructions(&mut nmos, 4);
    assert_eq!(nmos.regs.a, 0x00);
    assert!(nmos.regs.p.c);

    // SED; SEC; LDA #$42; SBC #$15
    let mut nmos = cpu_at(ORIGIN, &[0xF8, 0x38, 0xA9, 0x42, 0xE9, 0x15], config);
    run_instructions(&mut nmos, 4);
    assert_eq!(nmos.regs.a, 0x27);
    assert!(nmos.regs.p.c);
}

#[test]
fn combined_illegal_opcodes() {
    // LDA #$0F; STA $10; SEC; ISC $10 -> mem 0x10, A = 0x0F - 0x10
    let mut cpu = cpu_with(&[0xA9, 0x0F, 0x85, 0x10, 0x38, 0xE7, 0x10]);
    run_instructions(&mut cpu, 4);
    assert_eq!(cpu.bus.memory[0x0010], 0x10);
    assert_eq!(cpu.regs.a, 0xFF);
    assert!(!cpu.regs.p.c);

    // LAX $10
    let mut cpu = cpu_with(&[0xA7, 0x10]);
    cpu.bus.memory[0x0010] = 0x80;
    step(&mut cpu);
    assert_eq!((cpu.regs.a, cpu.regs.x), (0x80, 0x80));
    assert!(cpu.regs.p.n);

    // LDA #$F0; LDX #$3C; SAX $10
    let mut cpu = cpu_with(&[0xA9, 0xF0, 0xA2, 0x3C, 0x87, 0x10]);
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.bus.memory[0x0010], 0x30);

    // LDA #$FF; LDX #$0F; AXS #$01 -> X = 0x0E, C set
    let mut cpu = cpu_with(&[0xA9, 0xFF, 0xA2, 0x0F, 0xCB, 0x01]);
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.x, 0x0E);
    assert!(cpu.regs.p.c);

    // DCP $10 with A = 0x41, mem = 0x42 -> mem 0x41, Z and C set
    let mut cpu = cpu_with(&[0xA9, 0x41, 0xC7, 0x10]);
    cpu.bus.memory[0x0010] = 0x42;
    run_instructions(&mut cpu, 2);
    assert_eq!(cpu.bus.memory[0x0010], 0x41);
    assert!(cpu.regs.p.z);
    assert!(cpu.regs.p.c);
}

#[test]
fn immediate_illegal_opcodes() {
    // LDA #$FF; ANC #$80 -> N and C set
    let mut cpu = cpu_with(&[0xA9, 0xFF, 0x0B, 0x80]);
    run_instructions(&mut cpu, 2);
    assert_eq!(cpu.regs.a, 0x80);
    assert!(cpu.regs.p.c && cpu.regs.p.n);

    // LDA #$FF; ALR #$03 -> A = 1, C set
    let mut cpu = cpu_with(&[0xA9, 0xFF, 0x4B, 0x03]);
    run_instructions(&mut cpu, 2);
    assert_eq!(cpu.regs.a, 0x01);
    assert!(cpu.regs.p.c);

    // SEC; LDA #$FF; ARR #$FF -> A = 0xFF, C and bit 6 set, V clear
    let mut cpu = cpu_with(&[0x38, 0xA9, 0xFF, 0x6B, 0xFF]);
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.a, 0xFF);
    assert!(cpu.regs.p.c);
    assert!(!cpu.regs.p.v);

    // LXA #$5A with the default constant loads A and X with the operand.
    let mut cpu = cpu_with(&[0xAB, 0x5A]);
    step(&mut cpu);
    assert_eq!((cpu.regs.a, cpu.regs.x), (0x5A, 0x5A));

    // LDX #$0F; ANE #$FF -> A = X & M
    let mut cpu = cpu_with(&[0xA2, 0x0F, 0x8B, 0xFF]);
    run_instructions(&mut cpu, 2);
    assert_eq!(cpu.regs.a, 0x0F);

    // A different chip constant.
    let config = Mos6502Config::builder().unstable_magic(0xEE).build();
    let mut cpu = cpu_at(ORIGIN, &[0xAB, 0xFF], config);
    step(&mut cpu);
    assert_eq!(cpu.regs.a, 0xEE);
}

#[test]
fn shx_corrupts_the_high_byte_on_page_cross() {
    // LDX #$01; LDY #$20; SHX $02F0,Y -> value 0x01 & 0x03, stored at $0110
    let mut cpu = cpu_with(&[0xA2, 0x01, 0xA0, 0x20, 0x9E, 0xF0, 0x02]);
    run_instructions(&mut cpu, 2);
    assert_eq!(step(&mut cpu), 5);
    assert_eq!(cpu.bus.memory[0x0110], 0x01);
    assert_eq!(cpu.bus.memory[0x0310], 0x00);

    // No page cross: plain store of X & (H + 1).
    let mut cpu = cpu_with(&[0xA2, 0x07, 0xA0, 0x10, 0x9E, 0x00, 0x02]);
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.bus.memory[0x0210], 0x03);
}

#[test]
fn tas_and_las_go_through_the_stack_pointer() {
    // LDA #$F3; LDX #$3F; TAS $0200,Y -> S = 0x33, stores 0x33 & 0x03
    let mut cpu = cpu_with(&[0xA9, 0xF3, 0xA2, 0x3F, 0x9B, 0x00, 0x02]);
    run_instructions(&mut cpu, 3);
    assert_eq!(cpu.regs.sp(), 0x33);
    assert_eq!(cpu.bus.memory[0x0200], 0x03);

    // LAS $0200,Y with S = 0xFD and mem = 0x0F
    let mut cpu = cpu_with(&[0xBB, 0x00, 0x02]);
    cpu.bus.memory[0x0200] = 0x0F;
    step(&mut cpu);
    assert_eq!(cpu.regs.a, 0x0D);
    assert_eq!(cpu.regs.x, 0x0D);
    assert_eq!(cpu.regs.sp(), 0x0D);
}

#[test]
fn budget_suspension_mid_instruction_changes_nothing() {
    // 0x8000: LDA ($40),Y
    // 0x8002: INC $0200,X
    // 0x8005: JSR $9000
    // 0x9000: BRK
    let program = [0xB1, 0x40, 0xFE, 0x00, 0x02, 0x20, 0x00, 0x90];
    let make = || {
        let mut cpu = cpu_with(&program);
        cpu.bus.set_word(0x0040, 0x02F0);
        cpu.regs.y = 0x20;
        cpu
    };

    let mut whole = make();
    whole.clock_mut().grant(30);
    assert_eq!(resume(&mut whole), Exit::BudgetSpent);

    let mut sliced = make();
    for _ in 0..30 {
        sliced.clock_mut().grant(1);
        assert_eq!(resume(&mut sliced), Exit::BudgetSpent);
    }

    assert_eq!(whole.bus.log, sliced.bus.log);
    assert_eq!(whole.regs, sliced.regs);
    assert_eq!(whole.clock().elapsed(), 30);
}

#[test]
fn scheduler_runs_two_cores_at_their_own_rates() {
    // 0x8000: INX
    // 0x8001: JMP $8000
    let program = [0xE8, 0x4C, 0x00, 0x80];
    let mut sched = Scheduler::new(SchedulerConfig::builder().quantum(64).build());
    let fast = sched.add(Box::new(cpu_with(&program)), 1).unwrap();
    let slow = sched.add(Box::new(cpu_with(&program)), 3).unwrap();

    sched.run(300);

    let fast = sched.core::<Mos6502<TestBus>>(fast).unwrap();
    let slow = sched.core::<Mos6502<TestBus>>(slow).unwrap();
    assert_eq!(fast.clock().elapsed(), 300);
    assert_eq!(slow.clock().elapsed(), 100);
    assert_eq!(fast.regs.x, 60);
    assert_eq!(slow.regs.x, 20);
}

#[test]
fn scheduler_lines_reach_a_suspended_core() {
    // 0x8000: CLI
    // 0x8001: JMP $8001
    let mut sched = Scheduler::default();
    let id = sched
        .add(Box::new(cpu_with(&[0x58, 0x4C, 0x01, 0x80])), 1)
        .unwrap();
    sched.grant(id, 20).unwrap();
    sched.resume(id).unwrap();

    sched
        .core_mut::<Mos6502<TestBus>>(id)
        .unwrap()
        .assert_line(Mos6502Line::Apu, true);
    sched.grant(id, 20).unwrap();
    sched.resume(id).unwrap();

    let cpu = sched.core::<Mos6502<TestBus>>(id).unwrap();
    assert!(cpu.regs.pc.get() >= IRQ_HANDLER);
    assert!(cpu.regs.p.i);
}
