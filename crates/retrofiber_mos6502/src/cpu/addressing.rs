use retrofiber_common::Bus;

use super::interrupts::NMI_VECTOR;
use super::{Access, Mode, Mos6502, Op};

impl<B: Bus> Mos6502<B> {
    /// Run the next bus transaction of the current instruction.
    ///
    /// Stage 0 (the opcode fetch) is handled by `begin_instruction`; every
    /// arm below performs exactly one read or write and then either moves to
    /// the next stage or finishes the instruction.
    pub(super) fn step(&mut self) {
        let stage = self.stage;
        match self.instr.mode {
            Mode::Implied => {
                self.read(self.regs.pc.get());
                self.exec_implied(self.instr.op);
                self.finish();
            }
            Mode::Accumulator => {
                self.read(self.regs.pc.get());
                self.regs.a = self.exec_modify(self.instr.op, self.regs.a);
                self.finish();
            }
            Mode::Immediate => {
                self.regs.m = self.fetch();
                self.exec_read(self.instr.op);
                self.finish();
            }
            Mode::ZeroPage => match stage {
                1 => {
                    let addr = self.fetch();
                    self.regs.ea.set(addr as u16);
                    self.next();
                }
                _ => self.access(2),
            },
            Mode::ZeroPageX | Mode::ZeroPageY => match stage {
                1 => {
                    let addr = self.fetch();
                    self.regs.ea.set(addr as u16);
                    self.next();
                }
                2 => {
                    // Dummy read at the unindexed address; the sum wraps in
                    // page zero.
                    self.read(self.regs.ea.get());
                    let index = self.index();
                    let lo = self.regs.ea.lo().wrapping_add(index);
                    self.regs.ea.set_lo(lo);
                    self.next();
                }
                _ => self.access(3),
            },
            Mode::Absolute => match stage {
                1 => {
                    let lo = self.fetch();
                    self.regs.ea.set_lo(lo);
                    self.next();
                }
                2 => {
                    let hi = self.fetch();
                    self.regs.ea.set_hi(hi);
                    self.next();
                }
                _ => self.access(3),
            },
            Mode::AbsoluteX | Mode::AbsoluteY => match stage {
                1 => {
                    let lo = self.fetch();
                    self.regs.ea.set_lo(lo);
                    self.next();
                }
                2 => {
                    let hi = self.fetch();
                    self.regs.ea.set_hi(hi);
                    self.add_index();
                    self.next();
                }
                3 => self.fix_page(),
                _ => self.access(4),
            },
            Mode::IndirectX => match stage {
                1 => {
                    self.ptr = self.fetch();
                    self.next();
                }
                2 => {
                    self.read(self.ptr as u16);
                    self.ptr = self.ptr.wrapping_add(self.regs.x);
                    self.next();
                }
                3 => {
                    let lo = self.read(self.ptr as u16);
                    self.regs.ea.set_lo(lo);
                    self.next();
                }
                4 => {
                    let hi = self.read(self.ptr.wrapping_add(1) as u16);
                    self.regs.ea.set_hi(hi);
                    self.next();
                }
                _ => self.access(5),
            },
            Mode::IndirectY => match stage {
                1 => {
                    self.ptr = self.fetch();
                    self.next();
                }
                2 => {
                    let lo = self.read(self.ptr as u16);
                    self.regs.ea.set_lo(lo);
                    self.next();
                }
                3 => {
                    let hi = self.read(self.ptr.wrapping_add(1) as u16);
                    self.regs.ea.set_hi(hi);
                    self.add_index();
                    self.next();
                }
                4 => self.fix_page(),
                _ => self.access(5),
            },
            Mode::Relative => self.step_branch(stage),
            Mode::JmpAbsolute => match stage {
                1 => {
                    let lo = self.fetch();
                    self.regs.ea.set_lo(lo);
                    self.next();
                }
                _ => {
                    let hi = self.read(self.regs.pc.get());
                    self.regs.pc.set_lo(self.regs.ea.lo());
                    self.regs.pc.set_hi(hi);
                    self.finish();
                }
            },
            Mode::JmpIndirect => match stage {
                1 => {
                    let lo = self.fetch();
                    self.regs.ea.set_lo(lo);
                    self.next();
                }
                2 => {
                    let hi = self.fetch();
                    self.regs.ea.set_hi(hi);
                    self.next();
                }
                3 => {
                    self.regs.m = self.read(self.regs.ea.get());
                    self.next();
                }
                _ => {
                    // The pointer's high byte is fetched without carrying
                    // into the page: JMP ($10FF) reads $10FF and $1000.
                    let mut ptr = self.regs.ea;
                    ptr.set_lo(ptr.lo().wrapping_add(1));
                    let hi = self.read(ptr.get());
                    self.regs.pc.set_lo(self.regs.m);
                    self.regs.pc.set_hi(hi);
                    self.finish();
                }
            },
            Mode::Jsr => match stage {
                1 => {
                    let lo = self.fetch();
                    self.regs.ea.set_lo(lo);
                    self.next();
                }
                2 => {
                    self.read_stack();
                    self.next();
                }
                3 => {
                    self.push(self.regs.pc.hi());
                    self.next();
                }
                4 => {
                    self.push(self.regs.pc.lo());
                    self.next();
                }
                _ => {
                    let hi = self.read(self.regs.pc.get());
                    self.regs.pc.set_lo(self.regs.ea.lo());
                    self.regs.pc.set_hi(hi);
                    self.finish();
                }
            },
            Mode::Rts => match stage {
                1 => {
                    self.read(self.regs.pc.get());
                    self.next();
                }
                2 => {
                    self.read_stack();
                    self.bump_stack();
                    self.next();
                }
                3 => {
                    let lo = self.read_stack();
                    self.regs.pc.set_lo(lo);
                    self.bump_stack();
                    self.next();
                }
                4 => {
                    let hi = self.read_stack();
                    self.regs.pc.set_hi(hi);
                    self.next();
                }
                _ => {
                    self.read(self.regs.pc.get());
                    self.regs.pc.increment();
                    self.finish();
                }
            },
            Mode::Rti => match stage {
                1 => {
                    self.read(self.regs.pc.get());
                    self.next();
                }
                2 => {
                    self.read_stack();
                    self.bump_stack();
                    self.next();
                }
                3 => {
                    let p = self.read_stack();
                    self.regs.p.set_byte(p);
                    self.bump_stack();
                    self.next();
                }
                4 => {
                    let lo = self.read_stack();
                    self.regs.pc.set_lo(lo);
                    self.bump_stack();
                    self.next();
                }
                _ => {
                    let hi = self.read_stack();
                    self.regs.pc.set_hi(hi);
                    self.finish();
                }
            },
            Mode::Push => match stage {
                1 => {
                    self.read(self.regs.pc.get());
                    self.next();
                }
                _ => {
                    let value = match self.instr.op {
                        Op::Php => self.regs.p.to_byte_with_break(),
                        _ => self.regs.a,
                    };
                    self.push(value);
                    self.finish();
                }
            },
            Mode::Pull => match stage {
                1 => {
                    self.read(self.regs.pc.get());
                    self.next();
                }
                2 => {
                    self.read_stack();
                    self.bump_stack();
                    self.next();
                }
                _ => {
                    let value = self.read_stack();
                    match self.instr.op {
                        Op::Plp => self.regs.p.set_byte(value),
                        _ => {
                            self.regs.a = value;
                            self.regs.p.set_nz(value);
                        }
                    }
                    self.finish();
                }
            },
            Mode::Brk => match stage {
                1 => {
                    // Padding byte: read and skipped.
                    self.fetch();
                    self.next();
                }
                _ => self.step_vectored(stage, self.regs.p.to_byte_with_break()),
            },
            Mode::Interrupt => match stage {
                1 => {
                    self.read(self.regs.pc.get());
                    self.next();
                }
                _ => self.step_vectored(stage, self.regs.p.to_byte()),
            },
            Mode::Jam => unreachable!("jammed core must not be stepped"),
        }
    }

    #[inline]
    fn index(&self) -> u8 {
        match self.instr.mode {
            Mode::ZeroPageY | Mode::AbsoluteY | Mode::IndirectY => self.regs.y,
            _ => self.regs.x,
        }
    }

    /// Add the index to the low byte only, remembering the carry and the
    /// untouched high byte.
    fn add_index(&mut self) {
        let (lo, carry) = self.regs.ea.lo().overflowing_add(self.index());
        self.base_hi = self.regs.ea.hi();
        self.page_crossed = carry;
        self.regs.ea.set_lo(lo);
    }

    /// Transaction at the tentative (uncarried) indexed address.
    ///
    /// Reads that did not cross a page use it as the real access and finish
    /// early. Everything else treats it as a dummy read and fixes the high
    /// byte before the access phase.
    fn fix_page(&mut self) {
        let addr = self.regs.ea.get();
        if self.instr.access == Access::Read && !self.page_crossed {
            self.regs.m = self.read(addr);
            self.exec_read(self.instr.op);
            self.finish();
            return;
        }
        self.read(addr);
        if self.page_crossed {
            let hi = self.regs.ea.hi().wrapping_add(1);
            self.regs.ea.set_hi(hi);
        }
        self.next();
    }

    /// Access phase shared by every memory operand mode. `start` is the
    /// stage at which the effective address became final.
    fn access(&mut self, start: u8) {
        let addr = self.regs.ea.get();
        match (self.instr.access, self.stage - start) {
            (Access::Read, _) => {
                self.regs.m = self.read(addr);
                self.exec_read(self.instr.op);
                self.finish();
            }
            (Access::Write, _) => {
                let value = self.store_value(self.instr.op);
                self.write(self.regs.ea.get(), value);
                self.finish();
            }
            (Access::Modify, 0) => {
                self.regs.m = self.read(addr);
                self.next();
            }
            (Access::Modify, 1) => {
                // The unmodified value goes out first.
                self.write(addr, self.regs.m);
                self.regs.m = self.exec_modify(self.instr.op, self.regs.m);
                self.next();
            }
            (Access::Modify, _) => {
                self.write(addr, self.regs.m);
                self.finish();
            }
        }
    }

    fn step_branch(&mut self, stage: u8) {
        match stage {
            1 => {
                self.regs.m = self.fetch();
                if self.branch_taken() {
                    self.next();
                } else {
                    self.finish();
                }
            }
            2 => {
                // A taken branch does not poll on this cycle, which delays
                // an interrupt arriving here by one instruction.
                self.suspended = true;
                self.read(self.regs.pc.get());
                self.suspended = false;

                let pc = self.regs.pc.get();
                let target = pc.wrapping_add(self.regs.m as i8 as u16);
                self.regs.pc.set_lo(target as u8);
                if target & 0xFF00 == pc & 0xFF00 {
                    self.finish();
                } else {
                    self.regs.ea.set(target);
                    self.next();
                }
            }
            _ => {
                // Read from the wrong page before the high byte is fixed.
                self.read(self.regs.pc.get());
                self.regs.pc = self.regs.ea;
                self.finish();
            }
        }
    }

    /// The push-three-bytes-then-vector tail shared by BRK and hardware
    /// interrupts, from stage 2 onwards.
    fn step_vectored(&mut self, stage: u8, status: u8) {
        match stage {
            2 => {
                self.push(self.regs.pc.hi());
                self.next();
            }
            3 => {
                self.push(self.regs.pc.lo());
                self.next();
            }
            4 => {
                self.push(status);
                self.next();
            }
            5 => {
                // Latch the vector chosen by the last poll; an NMI arriving
                // up to here hijacks a BRK or IRQ.
                self.suspended = true;
                self.regs.ea.set(self.vector);
                if self.vector == NMI_VECTOR {
                    self.nmi_detected = false;
                }
                let lo = self.read(self.regs.ea.get());
                self.regs.p.i = true;
                self.regs.pc.set_lo(lo);
                self.next();
            }
            _ => {
                let hi = self.read(self.regs.ea.get().wrapping_add(1));
                self.regs.pc.set_hi(hi);
                self.suspended = false;
                self.finish();
            }
        }
    }
}
