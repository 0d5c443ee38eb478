//! DD/FD-prefixed instructions and the DDCB/FDCB bit group.
//!
//! IX and IY share one decoder. Opcodes with no indexed meaning run as the
//! unprefixed instruction; the prefix has then only cost its fetch.

use crate::alu;
use crate::bus::Z80Bus;
use crate::cycles::CycleTable;
use crate::registers::Pair;

use super::Z80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Index {
    Ix,
    Iy,
}

impl<B: Z80Bus> Z80<B> {
    /// Entered after a DD or FD byte. Further DD/FD bytes each cost a fetch
    /// and retarget the prefix; the last one wins.
    pub(super) fn execute_indexed(&mut self, mut index: Index) {
        loop {
            self.inc_r();
            let op = self.fetch_op();
            self.charge(CycleTable::Xy, op);
            match op {
                0xDD => index = Index::Ix,
                0xFD => index = Index::Iy,
                _ => {
                    self.execute_xy(index, op);
                    return;
                }
            }
        }
    }

    fn execute_xy(&mut self, index: Index, op: u8) {
        match op {
            // ADD IX, rr (09=BC, 19=DE, 29=IX, 39=SP)
            0x09 | 0x19 | 0x29 | 0x39 => {
                self.inc_r();
                let rp = (op >> 4) & 3;
                let src = if rp == 2 {
                    self.index_reg(index).word()
                } else {
                    self.reg16(rp)
                };
                let result = alu::add16(self.index_reg(index).word(), src, self.regs.f());
                self.index_reg_mut(index).set_word(result.value);
                self.regs.set_f(result.flags);
            }

            // LD IX, nn
            0x21 => {
                self.inc_r();
                let value = self.fetch_arg16();
                self.index_reg_mut(index).set_word(value);
            }

            // LD (nn), IX
            0x22 => {
                self.inc_r();
                let addr = self.fetch_arg16();
                let value = self.index_reg(index).word();
                self.write16(addr, value);
            }

            // LD IX, (nn)
            0x2A => {
                self.inc_r();
                let addr = self.fetch_arg16();
                let value = self.read16(addr);
                self.index_reg_mut(index).set_word(value);
            }

            // INC IX / DEC IX
            0x23 | 0x2B => {
                self.inc_r();
                let ix = self.index_reg(index).word();
                let value = if op == 0x23 {
                    ix.wrapping_add(1)
                } else {
                    ix.wrapping_sub(1)
                };
                self.index_reg_mut(index).set_word(value);
            }

            // INC HX / INC LX
            0x24 | 0x2C => {
                self.inc_r();
                let r = (op >> 3) & 7;
                let result = alu::inc8(self.index_half(index, r), self.regs.f());
                self.regs.set_f(result.flags);
                self.set_index_half(index, r, result.value);
            }

            // DEC HX / DEC LX
            0x25 | 0x2D => {
                self.inc_r();
                let r = (op >> 3) & 7;
                let result = alu::dec8(self.index_half(index, r), self.regs.f());
                self.regs.set_f(result.flags);
                self.set_index_half(index, r, result.value);
            }

            // LD HX, n / LD LX, n
            0x26 | 0x2E => {
                self.inc_r();
                let value = self.fetch_arg();
                self.set_index_half(index, (op >> 3) & 7, value);
            }

            // INC (IX+d) / DEC (IX+d)
            0x34 | 0x35 => {
                self.inc_r();
                let ea = self.effective_address(index);
                let value = self.read(ea);
                let result = if op == 0x34 {
                    alu::inc8(value, self.regs.f())
                } else {
                    alu::dec8(value, self.regs.f())
                };
                self.regs.set_f(result.flags);
                self.write(ea, result.value);
            }

            // LD (IX+d), n
            0x36 => {
                self.inc_r();
                let ea = self.effective_address(index);
                let value = self.fetch_arg();
                self.write(ea, value);
            }

            // LD HX, HX / LD LX, LX
            0x64 | 0x6D => {}

            // LD r, r' touching HX/LX or (IX+d)
            0x40..=0x7F if op != 0x76 && uses_index(op) => {
                self.inc_r();
                let dst = (op >> 3) & 7;
                let src = op & 7;
                if src == 6 {
                    // LD r, (IX+d) loads the real H/L
                    let ea = self.effective_address(index);
                    let value = self.read(ea);
                    self.set_reg8(dst, value);
                } else if dst == 6 {
                    // LD (IX+d), r stores the real H/L
                    let ea = self.effective_address(index);
                    let value = self.get_reg8(src);
                    self.write(ea, value);
                } else {
                    let value = self.index_operand(index, src);
                    self.set_index_operand(index, dst, value);
                }
            }

            // ALU A, HX / LX / (IX+d)
            0x80..=0xBF if uses_index(op) => {
                self.inc_r();
                let src = op & 7;
                let value = if src == 6 {
                    let ea = self.effective_address(index);
                    self.read(ea)
                } else {
                    self.index_half(index, src)
                };
                self.alu_a(op, value);
            }

            // DDCB / FDCB
            0xCB => {
                self.inc_r();
                let ea = self.effective_address(index);
                let cb_op = self.fetch_arg();
                self.charge(CycleTable::XyCb, cb_op);
                self.execute_xycb(cb_op, ea);
            }

            // POP IX
            0xE1 => {
                self.inc_r();
                let value = self.pop();
                self.index_reg_mut(index).set_word(value);
            }

            // EX (SP), IX
            0xE3 => {
                self.inc_r();
                let old = self.read16(self.regs.sp);
                let value = self.index_reg(index).word();
                self.write16(self.regs.sp, value);
                self.index_reg_mut(index).set_word(old);
            }

            // PUSH IX
            0xE5 => {
                self.inc_r();
                let value = self.index_reg(index).word();
                self.push(value);
            }

            // JP (IX)
            0xE9 => {
                self.inc_r();
                let target = self.index_reg(index).word();
                self.jump(target);
            }

            // LD SP, IX
            0xF9 => {
                self.inc_r();
                self.regs.sp = self.index_reg(index).word();
            }

            // No indexed form: run the plain instruction
            _ => self.execute_unprefixed(op),
        }
    }

    /// Bit group addressed through (IX+d). Shift/RES/SET also copy the
    /// result into the register named by the low three bits unless that
    /// field is 6.
    fn execute_xycb(&mut self, op: u8, ea: u16) {
        let r = op & 7;
        let n = (op >> 3) & 7;
        let value = self.read(ea);

        let result = match op >> 6 {
            0 => {
                let result = alu::shift(n, value, self.regs.f());
                self.regs.set_f(result.flags);
                result.value
            }
            1 => {
                self.regs
                    .set_f(alu::bit_indexed(n, value, self.regs.f(), ea));
                return;
            }
            2 => value & !(1 << n),
            _ => value | (1 << n),
        };

        if r != 6 {
            self.set_reg8(r, result);
        }
        self.write(ea, result);
    }

    fn index_reg(&self, index: Index) -> Pair {
        match index {
            Index::Ix => self.regs.ix,
            Index::Iy => self.regs.iy,
        }
    }

    fn index_reg_mut(&mut self, index: Index) -> &mut Pair {
        match index {
            Index::Ix => &mut self.regs.ix,
            Index::Iy => &mut self.regs.iy,
        }
    }

    /// IX+d with d read as an operand byte.
    fn effective_address(&mut self, index: Index) -> u16 {
        let disp = self.fetch_arg() as i8;
        self.index_reg(index).word().wrapping_add(disp as u16)
    }

    /// HX for encoding 4, LX for 5.
    fn index_half(&self, index: Index, r: u8) -> u8 {
        let pair = self.index_reg(index);
        if r == 4 { pair.hi() } else { pair.lo() }
    }

    fn set_index_half(&mut self, index: Index, r: u8, value: u8) {
        let pair = self.index_reg_mut(index);
        if r == 4 {
            pair.set_hi(value);
        } else {
            pair.set_lo(value);
        }
    }

    /// Register operand with H/L replaced by HX/LX. Never (HL).
    fn index_operand(&mut self, index: Index, r: u8) -> u8 {
        match r {
            4 | 5 => self.index_half(index, r),
            _ => self.get_reg8(r),
        }
    }

    fn set_index_operand(&mut self, index: Index, r: u8, value: u8) {
        match r {
            4 | 5 => self.set_index_half(index, r, value),
            _ => self.set_reg8(r, value),
        }
    }
}

/// True when an LD r,r' or ALU opcode names H, L or (HL) and so has an
/// indexed form.
fn uses_index(op: u8) -> bool {
    let src = op & 7;
    let dst = (op >> 3) & 7;
    let src_indexed = matches!(src, 4..=6);
    if op >= 0x80 {
        src_indexed
    } else {
        src_indexed || matches!(dst, 4..=6)
    }
}
