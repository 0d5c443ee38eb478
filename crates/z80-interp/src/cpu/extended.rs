//! ED-prefixed instructions.

use crate::alu;
use crate::bus::Z80Bus;
use crate::cycles::CycleTable;
use crate::flags::{CF, PF, tables};

use super::Z80;

impl<B: Z80Bus> Z80<B> {
    pub(super) fn execute_ed(&mut self) {
        self.inc_r();
        let op = self.fetch_op();
        self.charge(CycleTable::Ed, op);

        match op {
            // IN r, (C) (40=B ... 78=A; 70 sets flags only)
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => {
                let value = self.bus.io_read(self.regs.bc.word());
                self.regs
                    .set_f((self.regs.f() & CF) | tables().szp[value as usize]);
                let r = (op >> 3) & 7;
                if r != 6 {
                    self.set_reg8(r, value);
                }
            }

            // OUT (C), r (41=B ... 79=A; 71 writes zero)
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => {
                let r = (op >> 3) & 7;
                let value = if r == 6 { 0 } else { self.get_reg8(r) };
                self.bus.io_write(self.regs.bc.word(), value);
            }

            // SBC HL, rr
            0x42 | 0x52 | 0x62 | 0x72 => {
                let src = self.reg16((op >> 4) & 3);
                let result = alu::sbc16(self.regs.hl.word(), src, self.regs.f());
                self.regs.hl.set_word(result.value);
                self.regs.set_f(result.flags);
            }

            // ADC HL, rr
            0x4A | 0x5A | 0x6A | 0x7A => {
                let src = self.reg16((op >> 4) & 3);
                let result = alu::adc16(self.regs.hl.word(), src, self.regs.f());
                self.regs.hl.set_word(result.value);
                self.regs.set_f(result.flags);
            }

            // LD (nn), rr
            0x43 | 0x53 | 0x63 | 0x73 => {
                let addr = self.fetch_arg16();
                let value = self.reg16((op >> 4) & 3);
                self.write16(addr, value);
            }

            // LD rr, (nn)
            0x4B | 0x5B | 0x6B | 0x7B => {
                let addr = self.fetch_arg16();
                let value = self.read16(addr);
                self.set_reg16((op >> 4) & 3, value);
            }

            // NEG (documented at 44, mirrored across the column)
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => {
                let result = alu::sub8(0, self.regs.a(), false);
                self.regs.set_a(result.value);
                self.regs.set_f(result.flags);
            }

            // RETN
            0x45 | 0x55 | 0x65 | 0x75 => self.retn(),

            // RETI
            0x4D | 0x5D | 0x6D | 0x7D => self.reti(),

            // IM 0 / IM 1 / IM 2
            0x46 | 0x4E | 0x66 | 0x6E => self.regs.im = 0,
            0x56 | 0x76 => self.regs.im = 1,
            0x5E | 0x7E => self.regs.im = 2,

            // LD I, A
            0x47 => self.regs.i = self.regs.a(),

            // LD R, A
            0x4F => self.regs.set_refresh(self.regs.a()),

            // LD A, I / LD A, R. P/V reports IFF2.
            0x57 | 0x5F => {
                let value = if op == 0x57 {
                    self.regs.i
                } else {
                    self.regs.refresh()
                };
                self.regs.set_a(value);
                let iff2 = if self.regs.iff2 { PF } else { 0 };
                self.regs
                    .set_f((self.regs.f() & CF) | tables().sz[value as usize] | iff2);
            }

            // RRD
            0x67 => {
                let hl = self.regs.hl.word();
                let n = self.read(hl);
                let a = self.regs.a();
                self.write(hl, (n >> 4) | (a << 4));
                self.set_digit_result((a & 0xF0) | (n & 0x0F));
            }

            // RLD
            0x6F => {
                let hl = self.regs.hl.word();
                let n = self.read(hl);
                let a = self.regs.a();
                self.write(hl, (n << 4) | (a & 0x0F));
                self.set_digit_result((a & 0xF0) | (n >> 4));
            }

            // LDI/CPI/INI/OUTI, LDD/CPD/IND/OUTD
            0xA0..=0xA3 | 0xA8..=0xAB => {
                self.block_step(op);
            }

            // LDIR/CPIR/INIR/OTIR, LDDR/CPDR/INDR/OTDR
            0xB0..=0xB3 | 0xB8..=0xBB => self.block_run(op),

            // Undefined ED opcodes do nothing
            _ => {}
        }
    }

    fn set_digit_result(&mut self, a: u8) {
        self.regs.set_a(a);
        self.regs
            .set_f((self.regs.f() & CF) | tables().szp[a as usize]);
    }
}
