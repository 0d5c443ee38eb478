//! Unprefixed and CB-prefixed instructions.

use crate::alu;
use crate::bus::Z80Bus;
use crate::cycles::CycleTable;
use crate::flags::{CF, PF, SF, ZF};

use super::Z80;
use super::indexed::Index;
use super::shortcuts::LoopCounter;

impl<B: Z80Bus> Z80<B> {
    // =========================================================================
    // Unprefixed instructions
    // =========================================================================

    /// Execute an unprefixed opcode whose fetch and base cost are done.
    pub(crate) fn execute_unprefixed(&mut self, op: u8) {
        match op {
            // NOP
            0x00 => {}

            // LD rr, nn (01=BC, 11=DE, 21=HL, 31=SP)
            0x01 | 0x11 | 0x21 | 0x31 => {
                let value = self.fetch_arg16();
                self.set_reg16((op >> 4) & 3, value);
            }

            // LD (BC), A
            0x02 => self.write(self.regs.bc.word(), self.regs.a()),

            // LD (DE), A
            0x12 => self.write(self.regs.de.word(), self.regs.a()),

            // INC rr (03=BC, 13=DE, 23=HL, 33=SP)
            0x03 | 0x13 | 0x23 | 0x33 => {
                let rp = (op >> 4) & 3;
                self.set_reg16(rp, self.reg16(rp).wrapping_add(1));
            }

            // DEC BC / DEC DE / DEC HL, with the counted-wait check
            0x0B => {
                self.regs.bc.set_word(self.regs.bc.word().wrapping_sub(1));
                self.check_counter_loop(LoopCounter::Bc);
            }
            0x1B => {
                self.regs.de.set_word(self.regs.de.word().wrapping_sub(1));
                self.check_counter_loop(LoopCounter::De);
            }
            0x2B => {
                self.regs.hl.set_word(self.regs.hl.word().wrapping_sub(1));
                self.check_counter_loop(LoopCounter::Hl);
            }

            // DEC SP
            0x3B => self.regs.sp = self.regs.sp.wrapping_sub(1),

            // INC r (04=B, 0C=C, 14=D, 1C=E, 24=H, 2C=L, 34=(HL), 3C=A)
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                let r = (op >> 3) & 7;
                let result = alu::inc8(self.get_reg8(r), self.regs.f());
                self.regs.set_f(result.flags);
                self.set_reg8(r, result.value);
            }

            // DEC r (05=B, 0D=C, 15=D, 1D=E, 25=H, 2D=L, 35=(HL), 3D=A)
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                let r = (op >> 3) & 7;
                let result = alu::dec8(self.get_reg8(r), self.regs.f());
                self.regs.set_f(result.flags);
                self.set_reg8(r, result.value);
            }

            // LD r, n (06=B, 0E=C, 16=D, 1E=E, 26=H, 2E=L, 36=(HL), 3E=A)
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let value = self.fetch_arg();
                self.set_reg8((op >> 3) & 7, value);
            }

            // RLCA / RRCA / RLA / RRA / DAA / CPL
            0x07 | 0x0F | 0x17 | 0x1F | 0x27 | 0x2F => {
                let (a, f) = (self.regs.a(), self.regs.f());
                let result = match op {
                    0x07 => alu::rlca(a, f),
                    0x0F => alu::rrca(a, f),
                    0x17 => alu::rla(a, f),
                    0x1F => alu::rra(a, f),
                    0x27 => alu::daa(a, f),
                    _ => alu::cpl(a, f),
                };
                self.regs.set_a(result.value);
                self.regs.set_f(result.flags);
            }

            // SCF
            0x37 => self.regs.set_f(alu::scf(self.regs.a(), self.regs.f())),

            // CCF
            0x3F => self.regs.set_f(alu::ccf(self.regs.a(), self.regs.f())),

            // EX AF, AF'
            0x08 => self.regs.exchange_af(),

            // ADD HL, rr (09=BC, 19=DE, 29=HL, 39=SP)
            0x09 | 0x19 | 0x29 | 0x39 => {
                let src = self.reg16((op >> 4) & 3);
                let result = alu::add16(self.regs.hl.word(), src, self.regs.f());
                self.regs.hl.set_word(result.value);
                self.regs.set_f(result.flags);
            }

            // LD A, (BC)
            0x0A => {
                let value = self.read(self.regs.bc.word());
                self.regs.set_a(value);
            }

            // LD A, (DE)
            0x1A => {
                let value = self.read(self.regs.de.word());
                self.regs.set_a(value);
            }

            // DJNZ e
            0x10 => {
                let b = self.regs.bc.hi().wrapping_sub(1);
                self.regs.bc.set_hi(b);
                self.jr_cond(b != 0, op);
            }

            // JR e
            0x18 => self.jr(),

            // JR cc, e (20=NZ, 28=Z, 30=NC, 38=C)
            0x20 | 0x28 | 0x30 | 0x38 => {
                let cond = self.condition((op >> 3) & 3);
                self.jr_cond(cond, op);
            }

            // LD (nn), HL
            0x22 => {
                let addr = self.fetch_arg16();
                self.write16(addr, self.regs.hl.word());
            }

            // LD HL, (nn)
            0x2A => {
                let addr = self.fetch_arg16();
                let value = self.read16(addr);
                self.regs.hl.set_word(value);
            }

            // LD (nn), A
            0x32 => {
                let addr = self.fetch_arg16();
                self.write(addr, self.regs.a());
            }

            // LD A, (nn)
            0x3A => {
                let addr = self.fetch_arg16();
                let value = self.read(addr);
                self.regs.set_a(value);
            }

            // HALT
            0x76 => {
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                self.regs.halted = true;
                if !self.after_ei {
                    self.burn(self.icount);
                }
            }

            // LD r, r'
            0x40..=0x7F => {
                let value = self.get_reg8(op & 7);
                self.set_reg8((op >> 3) & 7, value);
            }

            // ALU A, r
            0x80..=0xBF => {
                let value = self.get_reg8(op & 7);
                self.alu_a(op, value);
            }

            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                if self.condition((op >> 3) & 7) {
                    let pc = self.pop();
                    self.jump(pc);
                    self.charge(CycleTable::Ex, op);
                }
            }

            // POP rr (C1=BC, D1=DE, E1=HL, F1=AF)
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let value = self.pop();
                self.set_reg16_af((op >> 4) & 3, value);
            }

            // JP cc, nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                if self.condition((op >> 3) & 7) {
                    let target = self.fetch_arg16();
                    self.jump(target);
                } else {
                    self.regs.pc = self.regs.pc.wrapping_add(2);
                }
            }

            // JP nn
            0xC3 => self.jp(),

            // CALL cc, nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                if self.condition((op >> 3) & 7) {
                    let target = self.fetch_arg16();
                    self.push(self.regs.pc);
                    self.jump(target);
                    self.charge(CycleTable::Ex, op);
                } else {
                    self.regs.pc = self.regs.pc.wrapping_add(2);
                }
            }

            // PUSH rr (C5=BC, D5=DE, E5=HL, F5=AF)
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let value = self.reg16_af((op >> 4) & 3);
                self.push(value);
            }

            // ALU A, n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let value = self.fetch_arg();
                self.alu_a(op, value);
            }

            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.push(self.regs.pc);
                self.jump(u16::from(op & 0x38));
            }

            // RET
            0xC9 => {
                let pc = self.pop();
                self.jump(pc);
            }

            // CB prefix
            0xCB => self.execute_cb(),

            // CALL nn
            0xCD => {
                let target = self.fetch_arg16();
                self.push(self.regs.pc);
                self.jump(target);
            }

            // OUT (n), A
            0xD3 => {
                let n = self.fetch_arg();
                let a = self.regs.a();
                self.bus.io_write(u16::from_le_bytes([n, a]), a);
            }

            // IN A, (n)
            0xDB => {
                let n = self.fetch_arg();
                let value = self.bus.io_read(u16::from_le_bytes([n, self.regs.a()]));
                self.regs.set_a(value);
            }

            // EXX
            0xD9 => self.regs.exchange_main(),

            // DD / FD prefix
            0xDD => self.execute_indexed(Index::Ix),
            0xFD => self.execute_indexed(Index::Iy),

            // EX (SP), HL
            0xE3 => {
                let old = self.read16(self.regs.sp);
                self.write16(self.regs.sp, self.regs.hl.word());
                self.regs.hl.set_word(old);
            }

            // JP (HL)
            0xE9 => self.jump(self.regs.hl.word()),

            // EX DE, HL
            0xEB => std::mem::swap(&mut self.regs.de, &mut self.regs.hl),

            // ED prefix
            0xED => self.execute_ed(),

            // DI
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }

            // LD SP, HL
            0xF9 => self.regs.sp = self.regs.hl.word(),

            // EI
            0xFB => self.ei(),
        }
    }

    /// ADD/ADC/SUB/SBC/AND/XOR/OR/CP selected by bits 3-5 of `op`.
    pub(super) fn alu_a(&mut self, op: u8, value: u8) {
        let a = self.regs.a();
        let carry = self.regs.f() & CF != 0;
        let result = match (op >> 3) & 7 {
            0 => alu::add8(a, value, false),
            1 => alu::add8(a, value, carry),
            2 => alu::sub8(a, value, false),
            3 => alu::sub8(a, value, carry),
            4 => alu::and8(a, value),
            5 => alu::xor8(a, value),
            6 => alu::or8(a, value),
            _ => {
                self.regs.set_f(alu::cp8(a, value));
                return;
            }
        };
        self.regs.set_a(result.value);
        self.regs.set_f(result.flags);
    }

    /// Condition code: NZ, Z, NC, C, PO, PE, P, M.
    pub(super) fn condition(&self, cc: u8) -> bool {
        let f = self.regs.f();
        match cc & 7 {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            _ => f & SF != 0,
        }
    }

    fn jp(&mut self) {
        let oldpc = self.regs.pc.wrapping_sub(1);
        let target = self.fetch_arg16();
        self.jump(target);
        self.check_branch_loop(oldpc, 0xC3);
    }

    fn jr(&mut self) {
        let oldpc = self.regs.pc.wrapping_sub(1);
        let target = self.fetch_relative();
        self.jump(target);
        self.check_branch_loop(oldpc, 0x18);
    }

    /// Taken relative branches pay the extra cost of `opcode`.
    pub(super) fn jr_cond(&mut self, cond: bool, opcode: u8) {
        if cond {
            let target = self.fetch_relative();
            self.charge(CycleTable::Ex, opcode);
            self.jump(target);
        } else {
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }

    /// EI.
    ///
    /// Interrupts stay blocked for one more instruction. A run of EIs is
    /// consumed here so the shield applies after the last one; if an
    /// interrupt is already waiting it is taken right after the shielded
    /// instruction.
    fn ei(&mut self) {
        if self.regs.iff1 {
            self.regs.iff2 = true;
            return;
        }

        self.regs.iff1 = true;
        self.regs.iff2 = true;
        self.regs.prev_pc = self.regs.pc;
        self.inc_r();
        // Memory full of EI would otherwise never end
        let mut run = 0;
        while run < 0xFFFF && self.bus.read_op(self.regs.pc) == 0xFB {
            run += 1;
            self.charge(CycleTable::Op, 0xFB);
            self.regs.prev_pc = self.regs.pc;
            self.regs.pc = self.regs.pc.wrapping_add(1);
            self.inc_r();
        }

        if self.irq_pending() {
            self.after_ei = true;
            self.execute_one();
            self.after_ei = false;
            self.take_interrupt();
        } else {
            self.execute_one();
        }
    }

    // =========================================================================
    // CB-prefixed instructions
    // =========================================================================

    fn execute_cb(&mut self) {
        self.inc_r();
        let op = self.fetch_op();
        self.charge(CycleTable::Cb, op);

        let r = op & 7;
        let n = (op >> 3) & 7;
        let value = self.get_reg8(r);
        match op >> 6 {
            // Rotates and shifts
            0 => {
                let result = alu::shift(n, value, self.regs.f());
                self.regs.set_f(result.flags);
                self.set_reg8(r, result.value);
            }
            // BIT n, r
            1 => self.regs.set_f(alu::bit(n, value, self.regs.f())),
            // RES n, r
            2 => self.set_reg8(r, value & !(1 << n)),
            // SET n, r
            _ => self.set_reg8(r, value | (1 << n)),
        }
    }

    // =========================================================================
    // Register decoding
    // =========================================================================

    /// 8-bit operand by encoding: B, C, D, E, H, L, (HL), A.
    pub(super) fn get_reg8(&mut self, r: u8) -> u8 {
        match r & 7 {
            0 => self.regs.bc.hi(),
            1 => self.regs.bc.lo(),
            2 => self.regs.de.hi(),
            3 => self.regs.de.lo(),
            4 => self.regs.hl.hi(),
            5 => self.regs.hl.lo(),
            6 => self.read(self.regs.hl.word()),
            _ => self.regs.a(),
        }
    }

    pub(super) fn set_reg8(&mut self, r: u8, value: u8) {
        match r & 7 {
            0 => self.regs.bc.set_hi(value),
            1 => self.regs.bc.set_lo(value),
            2 => self.regs.de.set_hi(value),
            3 => self.regs.de.set_lo(value),
            4 => self.regs.hl.set_hi(value),
            5 => self.regs.hl.set_lo(value),
            6 => self.write(self.regs.hl.word(), value),
            _ => self.regs.set_a(value),
        }
    }

    /// 16-bit pair by encoding: BC, DE, HL, SP.
    pub(super) fn reg16(&self, rp: u8) -> u16 {
        match rp & 3 {
            0 => self.regs.bc.word(),
            1 => self.regs.de.word(),
            2 => self.regs.hl.word(),
            _ => self.regs.sp,
        }
    }

    pub(super) fn set_reg16(&mut self, rp: u8, value: u16) {
        match rp & 3 {
            0 => self.regs.bc.set_word(value),
            1 => self.regs.de.set_word(value),
            2 => self.regs.hl.set_word(value),
            _ => self.regs.sp = value,
        }
    }

    /// PUSH/POP encoding: BC, DE, HL, AF.
    fn reg16_af(&self, rp: u8) -> u16 {
        if rp & 3 == 3 {
            self.regs.af.word()
        } else {
            self.reg16(rp)
        }
    }

    fn set_reg16_af(&mut self, rp: u8, value: u16) {
        if rp & 3 == 3 {
            self.regs.af.set_word(value);
        } else {
            self.set_reg16(rp, value);
        }
    }
}
