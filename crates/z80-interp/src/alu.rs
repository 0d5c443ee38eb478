//! ALU operations for the Z80.
//!
//! Pure functions over operand values and the incoming flags. Flag results
//! come from the shared tables in [`crate::flags`].

use crate::flags::{CF, HF, NF, PF, SF, VF, XF, YF, ZF, tables};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Result of a 16-bit ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult16 {
    pub value: u16,
    pub flags: u8,
}

// ---------------------------------------------------------------------------
// 8-bit arithmetic and logic
// ---------------------------------------------------------------------------

/// ADD/ADC. `carry` is the incoming carry for ADC, false for ADD.
#[must_use]
pub fn add8(a: u8, value: u8, carry: bool) -> AluResult {
    let res = a.wrapping_add(value).wrapping_add(u8::from(carry));
    AluResult {
        value: res,
        flags: tables().add(a, res, carry),
    }
}

/// SUB/SBC. `carry` is the incoming borrow for SBC, false for SUB.
#[must_use]
pub fn sub8(a: u8, value: u8, carry: bool) -> AluResult {
    let res = a.wrapping_sub(value).wrapping_sub(u8::from(carry));
    AluResult {
        value: res,
        flags: tables().sub(a, res, carry),
    }
}

/// CP: flags of `a - value`; the accumulator is unchanged.
#[must_use]
pub fn cp8(a: u8, value: u8) -> u8 {
    sub8(a, value, false).flags
}

#[must_use]
pub fn and8(a: u8, value: u8) -> AluResult {
    let res = a & value;
    AluResult {
        value: res,
        flags: tables().szp[res as usize] | HF,
    }
}

#[must_use]
pub fn or8(a: u8, value: u8) -> AluResult {
    let res = a | value;
    AluResult {
        value: res,
        flags: tables().szp[res as usize],
    }
}

#[must_use]
pub fn xor8(a: u8, value: u8) -> AluResult {
    let res = a ^ value;
    AluResult {
        value: res,
        flags: tables().szp[res as usize],
    }
}

/// INC r. Carry is preserved from `f`.
#[must_use]
pub fn inc8(value: u8, f: u8) -> AluResult {
    let res = value.wrapping_add(1);
    AluResult {
        value: res,
        flags: (f & CF) | tables().szhv_inc[res as usize],
    }
}

/// DEC r. Carry is preserved from `f`.
#[must_use]
pub fn dec8(value: u8, f: u8) -> AluResult {
    let res = value.wrapping_sub(1);
    AluResult {
        value: res,
        flags: (f & CF) | tables().szhv_dec[res as usize],
    }
}

/// Decimal adjust after BCD add/subtract.
///
/// The correction and the outgoing C/H flags are chosen from the nibbles of
/// the unadjusted accumulator.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let cf = f & CF != 0;
    let nf = f & NF != 0;
    let hf = f & HF != 0;
    let lo = a & 0x0F;
    let hi = a >> 4;

    let diff = if cf {
        if lo <= 9 && !hf { 0x60 } else { 0x66 }
    } else if lo >= 10 {
        if hi <= 8 { 0x06 } else { 0x66 }
    } else if hi >= 10 {
        if hf { 0x66 } else { 0x60 }
    } else if hf {
        0x06
    } else {
        0x00
    };

    let res = if nf { a.wrapping_sub(diff) } else { a.wrapping_add(diff) };

    let mut flags = tables().szp[res as usize] | (f & NF);
    let carry_out = cf || if lo <= 9 { hi >= 10 } else { hi >= 9 };
    if carry_out {
        flags |= CF;
    }
    let half_out = if nf { hf && lo <= 5 } else { lo >= 10 };
    if half_out {
        flags |= HF;
    }
    AluResult { value: res, flags }
}

// ---------------------------------------------------------------------------
// Accumulator rotates and flag operations
// ---------------------------------------------------------------------------

#[must_use]
pub fn rlca(a: u8, f: u8) -> AluResult {
    let res = a.rotate_left(1);
    AluResult {
        value: res,
        flags: (f & (SF | ZF | PF)) | (res & (YF | XF | CF)),
    }
}

#[must_use]
pub fn rrca(a: u8, f: u8) -> AluResult {
    let res = a.rotate_right(1);
    AluResult {
        value: res,
        flags: (f & (SF | ZF | PF)) | (a & CF) | (res & (YF | XF)),
    }
}

#[must_use]
pub fn rla(a: u8, f: u8) -> AluResult {
    let res = (a << 1) | (f & CF);
    let c = if a & 0x80 != 0 { CF } else { 0 };
    AluResult {
        value: res,
        flags: (f & (SF | ZF | PF)) | c | (res & (YF | XF)),
    }
}

#[must_use]
pub fn rra(a: u8, f: u8) -> AluResult {
    let res = (a >> 1) | (f << 7);
    let c = if a & 0x01 != 0 { CF } else { 0 };
    AluResult {
        value: res,
        flags: (f & (SF | ZF | PF)) | c | (res & (YF | XF)),
    }
}

#[must_use]
pub fn cpl(a: u8, f: u8) -> AluResult {
    let res = !a;
    AluResult {
        value: res,
        flags: (f & (SF | ZF | PF | CF)) | HF | NF | (res & (YF | XF)),
    }
}

/// SCF flags.
#[must_use]
pub fn scf(a: u8, f: u8) -> u8 {
    (f & (SF | ZF | PF)) | CF | (a & (YF | XF))
}

/// CCF flags. H receives the old carry.
#[must_use]
pub fn ccf(a: u8, f: u8) -> u8 {
    ((f & (SF | ZF | PF | CF)) | ((f & CF) << 4) | (a & (YF | XF))) ^ CF
}

// ---------------------------------------------------------------------------
// CB-prefix shifts and rotates
// ---------------------------------------------------------------------------

/// Shift/rotate selected by bits 3-5 of a CB opcode.
#[must_use]
pub fn shift(kind: u8, value: u8, f: u8) -> AluResult {
    let (res, c) = match kind & 7 {
        // RLC
        0 => (value.rotate_left(1), value >> 7),
        // RRC
        1 => (value.rotate_right(1), value & 1),
        // RL
        2 => ((value << 1) | (f & CF), value >> 7),
        // RR
        3 => ((value >> 1) | (f << 7), value & 1),
        // SLA
        4 => (value << 1, value >> 7),
        // SRA
        5 => ((value >> 1) | (value & 0x80), value & 1),
        // SLL (undocumented, shifts in a 1)
        6 => ((value << 1) | 1, value >> 7),
        // SRL
        _ => (value >> 1, value & 1),
    };
    AluResult {
        value: res,
        flags: tables().szp[res as usize] | c,
    }
}

/// BIT n,v flags.
#[must_use]
pub fn bit(n: u8, value: u8, f: u8) -> u8 {
    (f & CF) | HF | tables().sz_bit[(value & (1 << n)) as usize]
}

/// BIT n,(IX/IY+d) flags. X/Y come from the high byte of the address.
#[must_use]
pub fn bit_indexed(n: u8, value: u8, f: u8, ea: u16) -> u8 {
    (f & CF)
        | HF
        | (tables().sz_bit[(value & (1 << n)) as usize] & !(YF | XF))
        | ((ea >> 8) as u8 & (YF | XF))
}

// ---------------------------------------------------------------------------
// 16-bit arithmetic
// ---------------------------------------------------------------------------

/// ADD HL/IX/IY,rr. S, Z and P/V are preserved.
#[must_use]
pub fn add16(dst: u16, src: u16, f: u8) -> AluResult16 {
    let (d, s) = (u32::from(dst), u32::from(src));
    let res = d + s;
    AluResult16 {
        value: res as u16,
        flags: (f & (SF | ZF | VF)) | (((d ^ res ^ s) >> 8) as u8 & HF) | ((res >> 16) as u8 & CF),
    }
}

#[must_use]
pub fn adc16(hl: u16, src: u16, f: u8) -> AluResult16 {
    let (h, s) = (u32::from(hl), u32::from(src));
    let res = h + s + u32::from(f & CF);
    let flags = (((h ^ res ^ s) >> 8) as u8 & HF)
        | ((res >> 16) as u8 & CF)
        | ((res >> 8) as u8 & SF)
        | (if res & 0xFFFF == 0 { ZF } else { 0 })
        | (((s ^ h ^ 0x8000) & (s ^ res) & 0x8000) >> 13) as u8;
    AluResult16 {
        value: res as u16,
        flags,
    }
}

#[must_use]
pub fn sbc16(hl: u16, src: u16, f: u8) -> AluResult16 {
    let (h, s) = (u32::from(hl), u32::from(src));
    let res = h.wrapping_sub(s).wrapping_sub(u32::from(f & CF));
    let flags = (((h ^ res ^ s) >> 8) as u8 & HF)
        | NF
        | ((res >> 16) as u8 & CF)
        | ((res >> 8) as u8 & SF)
        | (if res & 0xFFFF == 0 { ZF } else { 0 })
        | (((s ^ h) & (h ^ res) & 0x8000) >> 13) as u8;
    AluResult16 {
        value: res as u16,
        flags,
    }
}
