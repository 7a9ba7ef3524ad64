/// Bus sequence used to reach the operand (or the bespoke sequence of a
/// control-flow instruction).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    IndirectX,
    IndirectY,
    Relative,
    JmpAbsolute,
    JmpIndirect,
    Jsr,
    Rts,
    Rti,
    Brk,
    Push,
    Pull,
    /// Hardware IRQ/NMI entry. Never produced by `decode`.
    Interrupt,
    Jam,
}

impl Mode {
    /// Operand bytes following the opcode.
    pub fn operand_len(self) -> u16 {
        match self {
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::IndirectX
            | Mode::IndirectY
            | Mode::Relative => 1,
            Mode::Absolute
            | Mode::AbsoluteX
            | Mode::AbsoluteY
            | Mode::JmpAbsolute
            | Mode::JmpIndirect
            | Mode::Jsr => 2,
            _ => 0,
        }
    }
}

/// What the access phase does once the effective address is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    /// Read, write the old value back, write the result.
    Modify,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    N,
    V,
    C,
    Z,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    // Loads, stores, transfers.
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Txa,
    Tya,
    Tsx,
    Txs,
    // Arithmetic and logic.
    Adc,
    Sbc,
    And,
    Ora,
    Eor,
    Cmp,
    Cpx,
    Cpy,
    Bit,
    Inc,
    Dec,
    Inx,
    Iny,
    Dex,
    Dey,
    Asl,
    Lsr,
    Rol,
    Ror,
    // Flags.
    Clc,
    Sec,
    Cli,
    Sei,
    Clv,
    Cld,
    Sed,
    // Stack and control flow.
    Pha,
    Php,
    Pla,
    Plp,
    Jmp,
    Jsr,
    Rts,
    Rti,
    Brk,
    Branch(Flag, bool),
    Nop,
    // Undocumented.
    Slo,
    Rla,
    Sre,
    Rra,
    Sax,
    Lax,
    Dcp,
    Isc,
    Anc,
    Alr,
    Arr,
    Ane,
    Lxa,
    Axs,
    Ahx,
    Shx,
    Shy,
    Tas,
    Las,
    Jam,
    /// Hardware interrupt entry.
    Interrupt,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Lda => "LDA",
            Op::Ldx => "LDX",
            Op::Ldy => "LDY",
            Op::Sta => "STA",
            Op::Stx => "STX",
            Op::Sty => "STY",
            Op::Tax => "TAX",
            Op::Tay => "TAY",
            Op::Txa => "TXA",
            Op::Tya => "TYA",
            Op::Tsx => "TSX",
            Op::Txs => "TXS",
            Op::Adc => "ADC",
            Op::Sbc => "SBC",
            Op::And => "AND",
            Op::Ora => "ORA",
            Op::Eor => "EOR",
            Op::Cmp => "CMP",
            Op::Cpx => "CPX",
            Op::Cpy => "CPY",
            Op::Bit => "BIT",
            Op::Inc => "INC",
            Op::Dec => "DEC",
            Op::Inx => "INX",
            Op::Iny => "INY",
            Op::Dex => "DEX",
            Op::Dey => "DEY",
            Op::Asl => "ASL",
            Op::Lsr => "LSR",
            Op::Rol => "ROL",
            Op::Ror => "ROR",
            Op::Clc => "CLC",
            Op::Sec => "SEC",
            Op::Cli => "CLI",
            Op::Sei => "SEI",
            Op::Clv => "CLV",
            Op::Cld => "CLD",
            Op::Sed => "SED",
            Op::Pha => "PHA",
            Op::Php => "PHP",
            Op::Pla => "PLA",
            Op::Plp => "PLP",
            Op::Jmp => "JMP",
            Op::Jsr => "JSR",
            Op::Rts => "RTS",
            Op::Rti => "RTI",
            Op::Brk => "BRK",
            Op::Branch(Flag::N, false) => "BPL",
            Op::Branch(Flag::N, true) => "BMI",
            Op::Branch(Flag::V, false) => "BVC",
            Op::Branch(Flag::V, true) => "BVS",
            Op::Branch(Flag::C, false) => "BCC",
            Op::Branch(Flag::C, true) => "BCS",
            Op::Branch(Flag::Z, false) => "BNE",
            Op::Branch(Flag::Z, true) => "BEQ",
            Op::Nop => "NOP",
            Op::Slo => "SLO",
            Op::Rla => "RLA",
            Op::Sre => "SRE",
            Op::Rra => "RRA",
            Op::Sax => "SAX",
            Op::Lax => "LAX",
            Op::Dcp => "DCP",
            Op::Isc => "ISC",
            Op::Anc => "ANC",
            Op::Alr => "ALR",
            Op::Arr => "ARR",
            Op::Ane => "ANE",
            Op::Lxa => "LXA",
            Op::Axs => "AXS",
            Op::Ahx => "AHX",
            Op::Shx => "SHX",
            Op::Shy => "SHY",
            Op::Tas => "TAS",
            Op::Las => "LAS",
            Op::Jam => "JAM",
            Op::Interrupt => "INT",
        }
    }
}

/// A decoded instruction: which bus sequence to run and what to do with
/// the operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instr {
    pub mode: Mode,
    pub access: Access,
    pub op: Op,
}

impl Instr {
    pub const INTERRUPT: Instr = Instr::new(Mode::Interrupt, Access::Write, Op::Interrupt);

    pub const fn new(mode: Mode, access: Access, op: Op) -> Self {
        Self { mode, access, op }
    }

    const fn read(mode: Mode, op: Op) -> Self {
        Self::new(mode, Access::Read, op)
    }

    const fn write(mode: Mode, op: Op) -> Self {
        Self::new(mode, Access::Write, op)
    }

    const fn modify(mode: Mode, op: Op) -> Self {
        Self::new(mode, Access::Modify, op)
    }

    const fn implied(op: Op) -> Self {
        Self::new(Mode::Implied, Access::Read, op)
    }

    const fn jam() -> Self {
        Self::new(Mode::Jam, Access::Read, Op::Jam)
    }
}

/// Decode an opcode by its `aaabbbcc` bit fields.
///
/// `cc` picks the instruction group, `bbb` mostly the addressing mode and
/// `aaa` the operation. Every one of the 256 values resolves to something,
/// undocumented opcodes included.
pub fn decode(opcode: u8) -> Instr {
    let aaa = opcode >> 5;
    let bbb = (opcode >> 2) & 0x07;
    match opcode & 0x03 {
        0 => decode_control(aaa, bbb),
        1 => decode_alu(aaa, bbb),
        2 => decode_rmw(aaa, bbb),
        _ => decode_combined(aaa, bbb),
    }
}

/// `cc = 00`: control flow, Y/X compares and loads, flag ops, and the
/// skip-byte NOPs.
fn decode_control(aaa: u8, bbb: u8) -> Instr {
    use Mode::*;
    match bbb {
        0 => match aaa {
            0 => Instr::new(Brk, Access::Write, Op::Brk),
            1 => Instr::new(Jsr, Access::Read, Op::Jsr),
            2 => Instr::new(Rti, Access::Read, Op::Rti),
            3 => Instr::new(Rts, Access::Read, Op::Rts),
            4 => Instr::read(Immediate, Op::Nop),
            5 => Instr::read(Immediate, Op::Ldy),
            6 => Instr::read(Immediate, Op::Cpy),
            _ => Instr::read(Immediate, Op::Cpx),
        },
        1 => match aaa {
            1 => Instr::read(ZeroPage, Op::Bit),
            4 => Instr::write(ZeroPage, Op::Sty),
            5 => Instr::read(ZeroPage, Op::Ldy),
            6 => Instr::read(ZeroPage, Op::Cpy),
            7 => Instr::read(ZeroPage, Op::Cpx),
            _ => Instr::read(ZeroPage, Op::Nop),
        },
        2 => match aaa {
            0 => Instr::new(Push, Access::Write, Op::Php),
            1 => Instr::new(Pull, Access::Read, Op::Plp),
            2 => Instr::new(Push, Access::Write, Op::Pha),
            3 => Instr::new(Pull, Access::Read, Op::Pla),
            4 => Instr::implied(Op::Dey),
            5 => Instr::implied(Op::Tay),
            6 => Instr::implied(Op::Iny),
            _ => Instr::implied(Op::Inx),
        },
        3 => match aaa {
            0 => Instr::read(Absolute, Op::Nop),
            1 => Instr::read(Absolute, Op::Bit),
            2 => Instr::read(JmpAbsolute, Op::Jmp),
            3 => Instr::read(JmpIndirect, Op::Jmp),
            4 => Instr::write(Absolute, Op::Sty),
            5 => Instr::read(Absolute, Op::Ldy),
            6 => Instr::read(Absolute, Op::Cpy),
            _ => Instr::read(Absolute, Op::Cpx),
        },
        4 => {
            let flag = match aaa >> 1 {
                0 => Flag::N,
                1 => Flag::V,
                2 => Flag::C,
                _ => Flag::Z,
            };
            Instr::read(Relative, Op::Branch(flag, aaa & 1 != 0))
        }
        5 => match aaa {
            4 => Instr::write(ZeroPageX, Op::Sty),
            5 => Instr::read(ZeroPageX, Op::Ldy),
            _ => Instr::read(ZeroPageX, Op::Nop),
        },
        6 => Instr::implied(match aaa {
            0 => Op::Clc,
            1 => Op::Sec,
            2 => Op::Cli,
            3 => Op::Sei,
            4 => Op::Tya,
            5 => Op::Clv,
            6 => Op::Cld,
            _ => Op::Sed,
        }),
        _ => match aaa {
            4 => Instr::write(AbsoluteX, Op::Shy),
            5 => Instr::read(AbsoluteX, Op::Ldy),
            _ => Instr::read(AbsoluteX, Op::Nop),
        },
    }
}

/// `cc = 01`: the regular accumulator group.
fn decode_alu(aaa: u8, bbb: u8) -> Instr {
    let op = match aaa {
        0 => Op::Ora,
        1 => Op::And,
        2 => Op::Eor,
        3 => Op::Adc,
        4 => Op::Sta,
        5 => Op::Lda,
        6 => Op::Cmp,
        _ => Op::Sbc,
    };
    let mode = match bbb {
        0 => Mode::IndirectX,
        1 => Mode::ZeroPage,
        2 => Mode::Immediate,
        3 => Mode::Absolute,
        4 => Mode::IndirectY,
        5 => Mode::ZeroPageX,
        6 => Mode::AbsoluteY,
        _ => Mode::AbsoluteX,
    };
    match (op, mode) {
        // STA #imm does not exist; the slot is a two-byte NOP.
        (Op::Sta, Mode::Immediate) => Instr::read(Mode::Immediate, Op::Nop),
        (Op::Sta, _) => Instr::write(mode, op),
        _ => Instr::read(mode, op),
    }
}

/// `cc = 10`: shifts, X loads/stores, X transfers and the jam slots.
fn decode_rmw(aaa: u8, bbb: u8) -> Instr {
    use Mode::*;
    let rmw = |mode| {
        let op = match aaa {
            0 => Op::Asl,
            1 => Op::Rol,
            2 => Op::Lsr,
            3 => Op::Ror,
            6 => Op::Dec,
            _ => Op::Inc,
        };
        Instr::modify(mode, op)
    };
    match bbb {
        0 => match aaa {
            0..=3 => Instr::jam(),
            5 => Instr::read(Immediate, Op::Ldx),
            _ => Instr::read(Immediate, Op::Nop),
        },
        1 | 3 => {
            let mode = if bbb == 1 { ZeroPage } else { Absolute };
            match aaa {
                4 => Instr::write(mode, Op::Stx),
                5 => Instr::read(mode, Op::Ldx),
                _ => rmw(mode),
            }
        }
        2 => match aaa {
            0 => Instr::read(Accumulator, Op::Asl),
            1 => Instr::read(Accumulator, Op::Rol),
            2 => Instr::read(Accumulator, Op::Lsr),
            3 => Instr::read(Accumulator, Op::Ror),
            4 => Instr::implied(Op::Txa),
            5 => Instr::implied(Op::Tax),
            6 => Instr::implied(Op::Dex),
            _ => Instr::implied(Op::Nop),
        },
        4 => Instr::jam(),
        5 => match aaa {
            4 => Instr::write(ZeroPageY, Op::Stx),
            5 => Instr::read(ZeroPageY, Op::Ldx),
            _ => rmw(ZeroPageX),
        },
        6 => match aaa {
            4 => Instr::implied(Op::Txs),
            5 => Instr::implied(Op::Tsx),
            _ => Instr::implied(Op::Nop),
        },
        _ => match aaa {
            4 => Instr::write(AbsoluteY, Op::Shx),
            5 => Instr::read(AbsoluteY, Op::Ldx),
            _ => rmw(AbsoluteX),
        },
    }
}

/// `cc = 11`: undocumented opcodes combining a group 1 and group 2
/// operation.
fn decode_combined(aaa: u8, bbb: u8) -> Instr {
    use Mode::*;
    let op = match aaa {
        0 => Op::Slo,
        1 => Op::Rla,
        2 => Op::Sre,
        3 => Op::Rra,
        4 => Op::Sax,
        5 => Op::Lax,
        6 => Op::Dcp,
        _ => Op::Isc,
    };
    let access = match aaa {
        4 => Access::Write,
        5 => Access::Read,
        _ => Access::Modify,
    };
    match bbb {
        0 => Instr::new(IndirectX, access, op),
        1 => Instr::new(ZeroPage, access, op),
        2 => Instr::read(
            Immediate,
            match aaa {
                0 | 1 => Op::Anc,
                2 => Op::Alr,
                3 => Op::Arr,
                4 => Op::Ane,
                5 => Op::Lxa,
                6 => Op::Axs,
                _ => Op::Sbc,
            },
        ),
        3 => Instr::new(Absolute, access, op),
        4 => match aaa {
            4 => Instr::write(IndirectY, Op::Ahx),
            _ => Instr::new(IndirectY, access, op),
        },
        5 => match aaa {
            4 => Instr::write(ZeroPageY, Op::Sax),
            5 => Instr::read(ZeroPageY, Op::Lax),
            _ => Instr::new(ZeroPageX, access, op),
        },
        6 => match aaa {
            4 => Instr::write(AbsoluteY, Op::Tas),
            5 => Instr::read(AbsoluteY, Op::Las),
            _ => Instr::new(AbsoluteY, access, op),
        },
        _ => match aaa {
            4 => Instr::write(AbsoluteY, Op::Ahx),
            5 => Instr::read(AbsoluteY, Op::Lax),
            _ => Instr::new(AbsoluteX, access, op),
        },
    }
}
