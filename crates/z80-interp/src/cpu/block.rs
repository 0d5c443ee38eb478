//! Block transfer, search and I/O instructions.

use crate::bus::Z80Bus;
use crate::cycles::CycleTable;
use crate::flags::{
    BREG_TMP2, CF, DREP_TMP1, HF, IREP_TMP1, NF, PF, SF, VF, XF, YF, ZF, tables,
};

use super::Z80;

/// Progress of a repeating block instruction (LDIR, CPDR, INIR, OTDR...).
///
/// When the budget runs out between iterations, PC is left on the
/// instruction and the next `execute` call picks it up again. Any other
/// instruction, or an interrupt, returns this to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockRepeat {
    #[default]
    Idle,
    /// Suspended mid-run. `remaining` is BC for LD/CP forms and B for I/O.
    Repeating { opcode: u8, remaining: u16 },
}

impl<B: Z80Bus> Z80<B> {
    /// One iteration of LDI/LDD/CPI/CPD/INI/IND/OUTI/OUTD.
    ///
    /// Returns whether the repeating form would go round again.
    pub(super) fn block_step(&mut self, op: u8) -> bool {
        let decrement = op & 0x08 != 0;
        match op & 3 {
            0 => self.block_ld(decrement),
            1 => self.block_cp(decrement),
            2 => self.block_in(decrement),
            _ => self.block_out(decrement),
        }
    }

    /// LDIR/LDDR/CPIR/CPDR/INIR/INDR/OTIR/OTDR.
    ///
    /// Each further iteration is charged the instruction's base cost plus
    /// its extra cost, the same as when it is fetched fresh. The last
    /// iteration refunds the extra cost.
    pub(super) fn block_run(&mut self, op: u8) {
        self.charge(CycleTable::Ex, op);
        self.regs.pc = self.regs.pc.wrapping_sub(2);

        loop {
            if !self.block_step(op) {
                self.regs.pc = self.regs.pc.wrapping_add(2);
                self.icount += self.cost(CycleTable::Ex, op);
                return;
            }
            if self.icount <= 0 {
                let remaining = self.block_remaining(op);
                log::trace!(
                    "block op ED {op:02X} at {:04X} suspended, {remaining} left",
                    self.regs.pc
                );
                self.repeat = BlockRepeat::Repeating { opcode: op, remaining };
                return;
            }
            self.add_r(2);
            self.charge(CycleTable::Ed, op);
            self.charge(CycleTable::Ex, op);
        }
    }

    fn block_remaining(&self, op: u8) -> u16 {
        if op & 2 == 0 {
            self.regs.bc.word()
        } else {
            u16::from(self.regs.bc.hi())
        }
    }

    fn step_hl(&mut self, decrement: bool) {
        let hl = self.regs.hl.word();
        self.regs
            .hl
            .set_word(if decrement { hl.wrapping_sub(1) } else { hl.wrapping_add(1) });
    }

    /// LDI/LDD.
    fn block_ld(&mut self, decrement: bool) -> bool {
        let io = self.read(self.regs.hl.word());
        self.write(self.regs.de.word(), io);

        let mut f = self.regs.f() & (SF | ZF | CF);
        let n = self.regs.a().wrapping_add(io);
        if n & 0x02 != 0 {
            f |= YF;
        }
        if n & 0x08 != 0 {
            f |= XF;
        }

        self.step_hl(decrement);
        let de = self.regs.de.word();
        self.regs
            .de
            .set_word(if decrement { de.wrapping_sub(1) } else { de.wrapping_add(1) });
        let bc = self.regs.bc.word().wrapping_sub(1);
        self.regs.bc.set_word(bc);
        if bc != 0 {
            f |= VF;
        }
        self.regs.set_f(f);
        bc != 0
    }

    /// CPI/CPD. X and Y come from `A - (HL) - H`.
    fn block_cp(&mut self, decrement: bool) -> bool {
        let val = self.read(self.regs.hl.word());
        let a = self.regs.a();
        let mut res = a.wrapping_sub(val);

        self.step_hl(decrement);
        let bc = self.regs.bc.word().wrapping_sub(1);
        self.regs.bc.set_word(bc);

        let mut f = (self.regs.f() & CF)
            | (tables().sz[res as usize] & !(YF | XF))
            | ((a ^ val ^ res) & HF)
            | NF;
        if f & HF != 0 {
            res = res.wrapping_sub(1);
        }
        if res & 0x02 != 0 {
            f |= YF;
        }
        if res & 0x08 != 0 {
            f |= XF;
        }
        if bc != 0 {
            f |= VF;
        }
        self.regs.set_f(f);
        bc != 0 && f & ZF == 0
    }

    /// INI/IND. The port is read with the undecremented B.
    fn block_in(&mut self, decrement: bool) -> bool {
        let io = self.bus.io_read(self.regs.bc.word());
        let b = self.regs.bc.hi().wrapping_sub(1);
        self.regs.bc.set_hi(b);
        self.write(self.regs.hl.word(), io);
        self.step_hl(decrement);
        self.block_io_flags(io, decrement);
        b != 0
    }

    /// OUTI/OUTD. The port is written with the decremented B.
    fn block_out(&mut self, decrement: bool) -> bool {
        let io = self.read(self.regs.hl.word());
        let b = self.regs.bc.hi().wrapping_sub(1);
        self.regs.bc.set_hi(b);
        self.bus.io_write(self.regs.bc.word(), io);
        self.step_hl(decrement);
        self.block_io_flags(io, decrement);
        b != 0
    }

    fn block_io_flags(&mut self, io: u8, decrement: bool) {
        let b = self.regs.bc.hi();
        let c = self.regs.bc.lo();

        let mut f = tables().sz[b as usize];
        if io & SF != 0 {
            f |= NF;
        }

        let adjusted = if decrement {
            i32::from(c) + i32::from(io) - 1
        } else {
            i32::from(c) + i32::from(io) + 1
        };
        if adjusted & 0x100 != 0 {
            f |= HF | CF;
        }

        let tmp1 = if decrement { DREP_TMP1 } else { IREP_TMP1 };
        let parity =
            tmp1[(c & 3) as usize][(io & 3) as usize] ^ BREG_TMP2[b as usize] ^ (c >> 2) ^ (io >> 2);
        if parity & 1 != 0 {
            f |= PF;
        }
        self.regs.set_f(f);
    }
}
