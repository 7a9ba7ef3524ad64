use std::str::FromStr;

use anyhow::{bail, Context, Result};
use retrofiber_common::{Exit, FlatMemory, Processor, Scheduler};
use retrofiber_lr35902::{Lr35902, Lr35902Config};
use retrofiber_mos6502::{disasm, Mos6502, Mos6502Config};
use typed_builder::TypedBuilder;

const RESET_VECTOR: u16 = 0xFFFC;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreType {
    Mos6502,
    Lr35902,
}

impl CoreType {
    /// Where a program is placed when no load address is given.
    pub fn default_load_address(self) -> u16 {
        match self {
            CoreType::Mos6502 => 0x0200,
            CoreType::Lr35902 => 0x0100,
        }
    }
}

impl FromStr for CoreType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mos6502" | "6502" | "2a03" | "nes" => Ok(CoreType::Mos6502),
            "lr35902" | "sm83" | "gb" | "gameboy" => Ok(CoreType::Lr35902),
            other => bail!("unknown core '{other}'. Supported: mos6502, lr35902"),
        }
    }
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct RunInfo {
    pub core: CoreType,
    /// Defaults to [`CoreType::default_load_address`].
    #[builder(default, setter(strip_option))]
    pub load_address: Option<u16>,
    #[builder(default = 100_000)]
    pub cycles: u64,
}

/// What the run left behind.
#[derive(Clone, Debug)]
pub struct Report {
    pub exit: Exit,
    pub cycles: u64,
    pub registers: String,
    /// Disassembly of the instruction the core stopped on, where available.
    pub next_instruction: Option<String>,
}

/// Parse `1234`, `0x1234` or `$1234` as a hex address.
pub fn parse_address(text: &str) -> Result<u16> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix('$'))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).with_context(|| format!("invalid load address '{text}'"))
}

pub fn run(info: RunInfo, program: &[u8]) -> Result<Report> {
    let load_address = info
        .load_address
        .unwrap_or_else(|| info.core.default_load_address());
    let mut memory = FlatMemory::new();
    memory
        .load(load_address, program)
        .context("failed to load program")?;
    log::info!(
        "Loaded {} bytes at ${:04X} for {:?}",
        program.len(),
        load_address,
        info.core
    );

    match info.core {
        CoreType::Mos6502 => run_mos6502(memory, load_address, info.cycles),
        CoreType::Lr35902 => run_lr35902(memory, load_address, info.cycles),
    }
}

fn run_mos6502(mut memory: FlatMemory, load_address: u16, cycles: u64) -> Result<Report> {
    memory.set_word(RESET_VECTOR, load_address);
    let cpu = Mos6502::new(memory, Mos6502Config::default());

    let mut scheduler = Scheduler::default();
    let id = scheduler.add(Box::new(cpu), 1)?;
    scheduler.grant(id, i64::try_from(cycles).context("cycle count too large")?)?;
    let exit = scheduler.resume(id)?;

    let cpu = scheduler
        .core::<Mos6502<FlatMemory>>(id)
        .context("6502 core went missing")?;
    let regs = &cpu.regs;
    let pc = regs.pc.get();
    // A jammed core has already stepped past its opcode.
    let at = if exit == Exit::Jammed {
        pc.wrapping_sub(1)
    } else {
        pc
    };
    let bytes = &cpu.bus.as_slice()[at as usize..];
    Ok(Report {
        exit,
        cycles: cpu.clock().elapsed(),
        registers: format!(
            "A={:02X} X={:02X} Y={:02X} S={:02X} P={:02X} PC={:04X}",
            regs.a,
            regs.x,
            regs.y,
            regs.sp(),
            regs.p.to_byte(),
            pc
        ),
        next_instruction: Some(disasm::disassemble(at, bytes)),
    })
}

fn run_lr35902(memory: FlatMemory, load_address: u16, cycles: u64) -> Result<Report> {
    let mut cpu = Lr35902::new(memory, Lr35902Config::default());
    cpu.regs.pc.set(load_address);
    cpu.regs.sp.set(0xFFFE);

    let mut scheduler = Scheduler::default();
    let id = scheduler.add(Box::new(cpu), 1)?;
    scheduler.grant(id, i64::try_from(cycles).context("cycle count too large")?)?;
    let exit = scheduler.resume(id)?;

    let cpu = scheduler
        .core::<Lr35902<FlatMemory>>(id)
        .context("LR35902 core went missing")?;
    let regs = &cpu.regs;
    Ok(Report {
        exit,
        cycles: cpu.clock().elapsed(),
        registers: format!(
            "AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X} IME={}",
            regs.af.get(),
            regs.bc.get(),
            regs.de.get(),
            regs.hl.get(),
            regs.sp.get(),
            regs.pc.get(),
            cpu.ime() as u8
        ),
        next_instruction: None,
    })
}
