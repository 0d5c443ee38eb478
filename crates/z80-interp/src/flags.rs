//! Z80 flag register bits and precomputed flag tables.
//!
//! Every arithmetic and logical primitive looks its flags up in one of
//! these tables. The tables are built once per process, on first use, and
//! shared read-only by every CPU instance.

use std::sync::OnceLock;

/// Carry flag (bit 0) - carry out of bit 7.
pub const CF: u8 = 0b0000_0001;

/// Add/Subtract flag (bit 1) - set if last operation was subtraction.
pub const NF: u8 = 0b0000_0010;

/// Parity/Overflow flag (bit 2) - parity or overflow depending on instruction.
pub const PF: u8 = 0b0000_0100;

/// Overflow alias of [`PF`].
pub const VF: u8 = PF;

/// Undocumented flag (bit 3) - copy of bit 3 of result.
pub const XF: u8 = 0b0000_1000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 5) - copy of bit 5 of result.
pub const YF: u8 = 0b0010_0000;

/// Zero flag (bit 6) - set if result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Sign flag (bit 7) - set if result is negative.
pub const SF: u8 = 0b1000_0000;

/// Size of one carry half of the add/sub tables.
const PAIR_SPACE: usize = 256 * 256;

/// Parity helper for INI/IND/OUTI/OUTD keyed by `[C & 3][value & 3]`.
pub(crate) const IREP_TMP1: [[u8; 4]; 4] = [[0, 0, 1, 0], [0, 1, 0, 1], [1, 0, 1, 1], [0, 1, 1, 0]];

/// Decrementing counterpart of [`IREP_TMP1`].
pub(crate) const DREP_TMP1: [[u8; 4]; 4] = [[0, 1, 0, 0], [1, 0, 0, 1], [0, 0, 1, 0], [0, 1, 0, 1]];

/// Per-B contribution to the block I/O parity flag.
#[rustfmt::skip]
pub(crate) const BREG_TMP2: [u8; 256] = [
    0,0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,
    0,1,0,0,1,0,1,1,0,0,1,1,0,1,0,0,
    1,1,0,0,1,0,1,1,0,0,1,1,0,1,0,0,
    1,0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,
    0,1,0,0,1,0,1,1,0,0,1,1,0,1,0,0,
    1,0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,
    0,0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,
    0,1,0,0,1,0,1,1,0,0,1,1,0,1,0,0,
    1,1,0,0,1,0,1,1,0,0,1,1,0,1,0,0,
    1,0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,
    0,0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,
    0,1,0,0,1,0,1,1,0,0,1,1,0,1,0,0,
    1,0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,
    0,1,0,0,1,0,1,1,0,0,1,1,0,1,0,0,
    1,1,0,0,1,0,1,1,0,0,1,1,0,1,0,0,
    1,0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,
];

/// Lookup tables for every flag-producing primitive.
pub struct FlagTables {
    /// Sign, zero and the two undocumented bits.
    pub sz: [u8; 256],
    /// As `sz`, with P/V also set on zero (BIT n).
    pub sz_bit: [u8; 256],
    /// As `sz`, with P/V set on even parity.
    pub szp: [u8; 256],
    /// Flags after an 8-bit increment, indexed by the result.
    pub szhv_inc: [u8; 256],
    /// Flags after an 8-bit decrement, indexed by the result.
    pub szhv_dec: [u8; 256],
    add: Box<[u8]>,
    sub: Box<[u8]>,
}

impl FlagTables {
    /// Flags for ADD/ADC producing `result` from `old`.
    #[inline]
    #[must_use]
    pub fn add(&self, old: u8, result: u8, carry: bool) -> u8 {
        self.add[index(old, result, carry)]
    }

    /// Flags for SUB/SBC/CP producing `result` from `old`.
    #[inline]
    #[must_use]
    pub fn sub(&self, old: u8, result: u8, carry: bool) -> u8 {
        self.sub[index(old, result, carry)]
    }

    fn build() -> Self {
        let mut sz = [0u8; 256];
        let mut sz_bit = [0u8; 256];
        let mut szp = [0u8; 256];
        let mut szhv_inc = [0u8; 256];
        let mut szhv_dec = [0u8; 256];

        for i in 0..256usize {
            let v = i as u8;
            let undoc = v & (YF | XF);
            sz[i] = (if v == 0 { ZF } else { v & SF }) | undoc;
            sz_bit[i] = (if v == 0 { ZF | PF } else { v & SF }) | undoc;
            szp[i] = sz[i] | if v.count_ones() % 2 == 0 { PF } else { 0 };

            szhv_inc[i] = sz[i];
            if v == 0x80 {
                szhv_inc[i] |= VF;
            }
            if v & 0x0F == 0x00 {
                szhv_inc[i] |= HF;
            }

            szhv_dec[i] = sz[i] | NF;
            if v == 0x7F {
                szhv_dec[i] |= VF;
            }
            if v & 0x0F == 0x0F {
                szhv_dec[i] |= HF;
            }
        }

        let mut add = vec![0u8; 2 * PAIR_SPACE].into_boxed_slice();
        let mut sub = vec![0u8; 2 * PAIR_SPACE].into_boxed_slice();

        for old in 0..256i32 {
            for new in 0..256i32 {
                let at = ((old << 8) | new) as usize;
                let base = (if new == 0 { ZF } else { (new as u8) & SF }) | ((new as u8) & (YF | XF));

                // ADD, or ADC with carry clear
                let val = new - old;
                let mut f = base;
                if (new & 0x0F) < (old & 0x0F) {
                    f |= HF;
                }
                if new < old {
                    f |= CF;
                }
                if (val ^ old ^ 0x80) & (val ^ new) & 0x80 != 0 {
                    f |= VF;
                }
                add[at] = f;

                // ADC with carry set
                let val = new - old - 1;
                let mut f = base;
                if (new & 0x0F) <= (old & 0x0F) {
                    f |= HF;
                }
                if new <= old {
                    f |= CF;
                }
                if (val ^ old ^ 0x80) & (val ^ new) & 0x80 != 0 {
                    f |= VF;
                }
                add[PAIR_SPACE + at] = f;

                // SUB/CP, or SBC with carry clear
                let val = old - new;
                let mut f = NF | base;
                if (new & 0x0F) > (old & 0x0F) {
                    f |= HF;
                }
                if new > old {
                    f |= CF;
                }
                if (val ^ old) & (old ^ new) & 0x80 != 0 {
                    f |= VF;
                }
                sub[at] = f;

                // SBC with carry set
                let val = old - new - 1;
                let mut f = NF | base;
                if (new & 0x0F) >= (old & 0x0F) {
                    f |= HF;
                }
                if new >= old {
                    f |= CF;
                }
                if (val ^ old) & (old ^ new) & 0x80 != 0 {
                    f |= VF;
                }
                sub[PAIR_SPACE + at] = f;
            }
        }

        Self {
            sz,
            sz_bit,
            szp,
            szhv_inc,
            szhv_dec,
            add,
            sub,
        }
    }
}

#[inline]
fn index(old: u8, result: u8, carry: bool) -> usize {
    (usize::from(carry) << 16) | (usize::from(old) << 8) | usize::from(result)
}

/// Shared flag tables, built on first call.
pub fn tables() -> &'static FlagTables {
    static TABLES: OnceLock<FlagTables> = OnceLock::new();
    TABLES.get_or_init(FlagTables::build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sz_tables_cover_zero_and_sign() {
        let t = tables();
        assert_eq!(t.sz[0x00], ZF);
        assert_eq!(t.sz[0x80], SF);
        assert_eq!(t.sz[0x28], YF | XF);
        assert_eq!(t.sz_bit[0x00], ZF | PF);
        assert_eq!(t.szp[0x03], PF);
        assert_eq!(t.szp[0x01], 0);
    }

    #[test]
    fn increment_and_decrement_edges() {
        let t = tables();
        assert_eq!(t.szhv_inc[0x80], SF | VF | HF);
        assert_eq!(t.szhv_inc[0x00], ZF | HF);
        assert_eq!(t.szhv_dec[0x7F], NF | VF | HF | YF | XF);
        assert_eq!(t.szhv_dec[0xFF], SF | NF | HF | YF | XF);
    }

    #[test]
    fn add_table_reports_carry_and_overflow() {
        let t = tables();
        // 0x7F + 0x01 = 0x80
        assert_eq!(t.add(0x7F, 0x80, false), SF | HF | VF);
        // 0xFF + 0x01 = 0x00
        assert_eq!(t.add(0xFF, 0x00, false), ZF | HF | CF);
        // 0x00 + 0xFF + 1 = 0x00
        assert_eq!(t.add(0x00, 0x00, true), ZF | HF | CF);
    }

    #[test]
    fn sub_table_reports_borrow() {
        let t = tables();
        // 0x00 - 0x01 = 0xFF
        assert_eq!(t.sub(0x00, 0xFF, false), SF | NF | HF | CF | YF | XF);
        // 0x80 - 0x01 = 0x7F
        assert_eq!(t.sub(0x80, 0x7F, false), NF | HF | VF | YF | XF);
    }

    #[test]
    fn tables_are_shared() {
        assert!(std::ptr::eq(tables(), tables()));
    }
}
