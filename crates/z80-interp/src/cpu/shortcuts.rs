//! Idle-loop fast-forwarding.
//!
//! Games spin in a handful of tight loops while waiting for an interrupt or
//! a delay count. When one is recognised, the remaining budget is consumed
//! in whole iterations at once instead of re-dispatching every instruction.
//! Registers, R and cycle totals come out the same as stepping through.

use crate::bus::Z80Bus;
use crate::cycles::CycleTable;

use super::Z80;

/// Counter decremented by a recognised `DEC rr` delay loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LoopCounter {
    Bc,
    De,
    Hl,
}

impl LoopCounter {
    fn dec_opcode(self) -> u8 {
        match self {
            Self::Bc => 0x0B,
            Self::De => 0x1B,
            Self::Hl => 0x2B,
        }
    }

    /// `LD A,hi / OR lo` and `LD A,lo / OR hi` encodings for this pair.
    fn zero_tests(self) -> [(u8, u8); 2] {
        match self {
            Self::Bc => [(0x78, 0xB1), (0x79, 0xB0)],
            Self::De => [(0x7A, 0xB3), (0x7B, 0xB2)],
            Self::Hl => [(0x7C, 0xB5), (0x7D, 0xB4)],
        }
    }
}

impl<B: Z80Bus> Z80<B> {
    /// After an unconditional JP/JR from `oldpc`, recognise:
    ///
    /// - `JP $` / `JR $`
    /// - `NOP` or `EI` followed by `JP $-1` / `JR $-1`
    /// - `LD SP,nn` followed by `JP $-3` / `JR $-3`
    pub(super) fn check_branch_loop(&mut self, oldpc: u16, opcode: u8) {
        if !self.shortcuts.enabled() || self.after_ei {
            return;
        }

        let pc = self.regs.pc;
        let branch = self.cost(CycleTable::Op, opcode);
        if pc == oldpc {
            self.burn_odd(self.icount, 1, branch);
            return;
        }

        let op = self.bus.read_op(pc);
        if oldpc.checked_sub(1) == Some(pc) {
            if op == 0x00 || op == 0xFB {
                let lead = self.cost(CycleTable::Op, 0x00);
                self.burn_odd(self.icount - lead, 2, lead + branch);
            }
        } else if oldpc.checked_sub(3) == Some(pc) && op == 0x31 {
            let lead = self.cost(CycleTable::Op, 0x31);
            self.burn_odd(self.icount - lead, 2, lead + branch);
        }
    }

    /// After `DEC rr`, recognise the delay loop
    ///
    /// ```text
    ///     DEC rr
    ///     LD  A,hi    ; or LD A,lo
    ///     OR  lo      ; or OR hi
    ///     JR  NZ,loop ; or JP NZ,loop
    /// ```
    ///
    /// and run whole iterations while both the counter and the budget last.
    /// Every iteration costs all four instructions, including the taken
    /// branch, so the result matches stepping.
    pub(super) fn check_counter_loop(&mut self, counter: LoopCounter) {
        if !self.shortcuts.enabled() {
            return;
        }

        let pc = self.regs.pc;
        if self.counter(counter) <= 1 || pc >= 0xFFFC {
            return;
        }

        let op1 = self.bus.read_op(pc);
        let op2 = self.bus.read_op(pc.wrapping_add(1));
        if !counter.zero_tests().contains(&(op1, op2)) {
            return;
        }

        let op3 = self.bus.read_op(pc.wrapping_add(2));
        let op4 = self.bus.read_op(pc.wrapping_add(3));
        // Taken JR cc pays its extra cost; JP cc never does
        let branch = match op3 {
            // JR NZ,$-5
            0x20 if op4 == 0xFB => {
                self.cost(CycleTable::Op, op3) + self.cost(CycleTable::Ex, op3)
            }
            // JP NZ,loop
            0xC2 => {
                let lo = self.bus.read_arg(pc.wrapping_add(3));
                let hi = self.bus.read_arg(pc.wrapping_add(4));
                if u16::from_le_bytes([lo, hi]) != pc.wrapping_sub(1) {
                    return;
                }
                self.cost(CycleTable::Op, op3)
            }
            _ => return,
        };

        let iteration = self.cost(CycleTable::Op, counter.dec_opcode())
            + self.cost(CycleTable::Op, op1)
            + self.cost(CycleTable::Op, op2)
            + branch;

        let start = self.counter(counter);
        while self.counter(counter) > 0 && self.icount > iteration {
            self.burn_odd(iteration, 4, iteration);
            self.set_counter(counter, self.counter(counter) - 1);
        }
        if self.counter(counter) != start {
            log::trace!(
                "delay loop at {:04X}: skipped {} iterations",
                self.regs.prev_pc,
                start - self.counter(counter)
            );
        }
    }

    /// Consume whole multiples of `sum` from `cycles`, advancing R by
    /// `opcodes` per multiple.
    fn burn_odd(&mut self, cycles: i32, opcodes: i32, sum: i32) {
        if cycles > 0 && sum > 0 {
            let n = cycles / sum;
            self.add_r(n * opcodes);
            self.icount -= n * sum;
        }
    }

    fn counter(&self, counter: LoopCounter) -> u16 {
        match counter {
            LoopCounter::Bc => self.regs.bc.word(),
            LoopCounter::De => self.regs.de.word(),
            LoopCounter::Hl => self.regs.hl.word(),
        }
    }

    fn set_counter(&mut self, counter: LoopCounter, value: u16) {
        match counter {
            LoopCounter::Bc => self.regs.bc.set_word(value),
            LoopCounter::De => self.regs.de.set_word(value),
            LoopCounter::Hl => self.regs.hl.set_word(value),
        }
    }
}
