mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use retrofiber_common::Bus;

use super::Lr35902;

impl<B: Bus> Lr35902<B> {
    /// Run the current M-cycle of the current opcode.
    ///
    /// Called once with `stage == 0` right after the opcode fetch, with no
    /// bus access of its own, so single M-cycle instructions finish there.
    /// Every later stage performs exactly one read, write or idle cycle.
    ///
    /// Opcodes are split as `xx yyy zzz`, with `p = y >> 1` and `q = y & 1`.
    pub(super) fn execute(&mut self) {
        let op = self.opcode;
        let x = op >> 6;
        let y = (op >> 3) & 0x07;
        let z = op & 0x07;
        let p = y >> 1;
        let q = y & 0x01;

        match x {
            0 => match z {
                0 => match y {
                    0 => self.finish(),
                    1 => self.exec_ld_a16_sp(),
                    2 => self.exec_stop(),
                    3 => self.exec_jr(true),
                    _ => self.exec_jr(self.condition(y - 4)),
                },
                1 if q == 0 => self.exec_ld_rp_d16(p),
                1 => self.exec_add_hl_rp(p),
                2 => self.exec_ld_indirect_a(p, q == 1),
                3 => self.exec_inc_dec_rp(p, q == 1),
                4 => self.exec_inc_dec_r(y, false),
                5 => self.exec_inc_dec_r(y, true),
                6 => self.exec_ld_r_d8(y),
                _ => {
                    self.alu_accumulator(y);
                    self.finish();
                }
            },
            1 if op == 0x76 => self.exec_halt(),
            1 => self.exec_ld_r_r(y, z),
            2 => self.exec_alu_r(y, z),
            _ => match z {
                0 => match y {
                    0..=3 => self.exec_ret_cc(y),
                    4 => self.exec_ldh_a8(false),
                    5 => self.exec_add_sp_r8(),
                    6 => self.exec_ldh_a8(true),
                    _ => self.exec_ld_hl_sp_r8(),
                },
                1 if q == 0 => self.exec_pop(p),
                1 => match p {
                    0 => self.exec_ret(false),
                    1 => self.exec_ret(true),
                    2 => self.exec_jp_hl(),
                    _ => self.exec_ld_sp_hl(),
                },
                2 => match y {
                    0..=3 => self.exec_jp(self.condition(y)),
                    4 => self.exec_ldh_c(false),
                    5 => self.exec_ld_a16_a(false),
                    6 => self.exec_ldh_c(true),
                    _ => self.exec_ld_a16_a(true),
                },
                3 => match y {
                    0 => self.exec_jp(true),
                    1 => self.exec_cb(),
                    6 => {
                        self.exec_di();
                        self.finish();
                    }
                    7 => {
                        self.exec_ei();
                        self.finish();
                    }
                    _ => unreachable!("opcode hole 0x{op:02X} reached execute"),
                },
                4 if y < 4 => self.exec_call(self.condition(y)),
                5 if q == 0 => self.exec_push(p),
                5 if p == 0 => self.exec_call(true),
                6 => self.exec_alu_d8(y),
                7 => self.exec_rst(y),
                _ => unreachable!("opcode hole 0x{op:02X} reached execute"),
            },
        }
    }
}
