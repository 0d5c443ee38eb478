//! Base and extra T-state costs.
//!
//! Each opcode is charged one entry from the table for its prefix family
//! when it is dispatched. Conditional control flow, block repeats and
//! interrupt acknowledge add an entry from the extra table on top.
//! Hosts emulating a variant part may replace any table wholesale.

/// Selector for one of the six cycle tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTable {
    Op = 0,
    Cb = 1,
    Ed = 2,
    Xy = 3,
    XyCb = 4,
    Ex = 5,
}

impl CycleTable {
    pub const ALL: [Self; 6] = [Self::Op, Self::Cb, Self::Ed, Self::Xy, Self::XyCb, Self::Ex];

    /// Map a host table index to a selector. `None` when out of range.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Op),
            1 => Some(Self::Cb),
            2 => Some(Self::Ed),
            3 => Some(Self::Xy),
            4 => Some(Self::XyCb),
            5 => Some(Self::Ex),
            _ => None,
        }
    }
}

/// The six timing tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTables {
    tables: [[u8; 256]; 6],
}

impl Default for CycleTables {
    fn default() -> Self {
        Self {
            tables: [OP, CB, ED, XY, XYCB, EX],
        }
    }
}

impl CycleTables {
    #[inline]
    #[must_use]
    pub fn table(&self, which: CycleTable) -> &[u8; 256] {
        &self.tables[which as usize]
    }

    pub fn set_table(&mut self, which: CycleTable, table: &[u8; 256]) {
        self.tables[which as usize] = *table;
    }

    /// Cost of `opcode` in `which`, widened for budget arithmetic.
    #[inline]
    #[must_use]
    pub fn cost(&self, which: CycleTable, opcode: u8) -> i32 {
        i32::from(self.tables[which as usize][opcode as usize])
    }
}

/// Unprefixed opcodes. The CB/DD/ED/FD prefix bytes cost nothing here.
#[rustfmt::skip]
const OP: [u8; 256] = [
     4, 10,  7,  6,  4,  4,  7,  4,  4, 11,  7,  6,  4,  4,  7,  4,
     8, 10,  7,  6,  4,  4,  7,  4, 12, 11,  7,  6,  4,  4,  7,  4,
     7, 10, 16,  6,  4,  4,  7,  4,  7, 11, 16,  6,  4,  4,  7,  4,
     7, 10, 13,  6, 11, 11, 10,  4,  7, 11, 13,  6,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     7,  7,  7,  7,  7,  7,  4,  7,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     5, 10, 10, 10, 10, 11,  7, 11,  5, 10, 10,  0, 10, 17,  7, 11,
     5, 10, 10, 11, 10, 11,  7, 11,  5,  4, 10, 11, 10,  0,  7, 11,
     5, 10, 10, 19, 10, 11,  7, 11,  5,  4, 10,  4, 10,  0,  7, 11,
     5, 10, 10,  4, 10, 11,  7, 11,  5,  6, 10,  4, 10,  0,  7, 11,
];

/// `CB`-prefixed opcodes, prefix included.
#[rustfmt::skip]
const CB: [u8; 256] = [
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 12,  8,  8,  8,  8,  8,  8,  8, 12,  8,
     8,  8,  8,  8,  8,  8, 12,  8,  8,  8,  8,  8,  8,  8, 12,  8,
     8,  8,  8,  8,  8,  8, 12,  8,  8,  8,  8,  8,  8,  8, 12,  8,
     8,  8,  8,  8,  8,  8, 12,  8,  8,  8,  8,  8,  8,  8, 12,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
     8,  8,  8,  8,  8,  8, 15,  8,  8,  8,  8,  8,  8,  8, 15,  8,
];

/// `ED`-prefixed opcodes, prefix included.
#[rustfmt::skip]
const ED: [u8; 256] = [
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
    12, 12, 15, 20,  8,  8,  8,  9, 12, 12, 15, 20,  8,  8,  8,  9,
    12, 12, 15, 20,  8,  8,  8,  9, 12, 12, 15, 20,  8,  8,  8,  9,
    12, 12, 15, 20,  8,  8,  8, 18, 12, 12, 15, 20,  8,  8,  8, 18,
    12, 12, 15, 20,  8,  8,  8,  8, 12, 12, 15, 20,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
    16, 16, 16, 16,  8,  8,  8,  8, 16, 16, 16, 16,  8,  8,  8,  8,
    16, 16, 16, 16,  8,  8,  8,  8, 16, 16, 16, 16,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,
];

/// `DD`/`FD`-prefixed opcodes, prefix included.
#[rustfmt::skip]
const XY: [u8; 256] = [
     4,  4,  4,  4,  4,  4,  4,  4,  4, 15,  4,  4,  4,  4,  4,  4,
     4,  4,  4,  4,  4,  4,  4,  4,  4, 15,  4,  4,  4,  4,  4,  4,
     4, 14, 20, 10,  9,  9,  9,  4,  4, 15, 20, 10,  9,  9,  9,  4,
     4,  4,  4,  4, 23, 23, 19,  4,  4, 15,  4,  4,  4,  4,  4,  4,
     4,  4,  4,  4,  9,  9, 19,  4,  4,  4,  4,  4,  9,  9, 19,  4,
     4,  4,  4,  4,  9,  9, 19,  4,  4,  4,  4,  4,  9,  9, 19,  4,
     9,  9,  9,  9,  9,  9, 19,  9,  9,  9,  9,  9,  9,  9, 19,  9,
    19, 19, 19, 19, 19, 19,  4, 19,  4,  4,  4,  4,  9,  9, 19,  4,
     4,  4,  4,  4,  9,  9, 19,  4,  4,  4,  4,  4,  9,  9, 19,  4,
     4,  4,  4,  4,  9,  9, 19,  4,  4,  4,  4,  4,  9,  9, 19,  4,
     4,  4,  4,  4,  9,  9, 19,  4,  4,  4,  4,  4,  9,  9, 19,  4,
     4,  4,  4,  4,  9,  9, 19,  4,  4,  4,  4,  4,  9,  9, 19,  4,
     4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  0,  4,  4,  4,  4,
     4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,
     4, 14,  4, 23,  4, 15,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,
     4,  4,  4,  4,  4,  4,  4,  4,  4, 10,  4,  4,  4,  4,  4,  4,
];

/// `DD CB d op` / `FD CB d op`, all four bytes included.
#[rustfmt::skip]
const XYCB: [u8; 256] = [
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20,
    20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20,
    20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20,
    20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20, 20,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
    23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23, 23,
];

/// Extra cost of a taken branch, call or return, of each block repeat,
/// and of interrupt acknowledge on the RST slots.
#[rustfmt::skip]
const EX: [u8; 256] = [
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     5,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     5,  0,  0,  0,  0,  0,  0,  0,  5,  0,  0,  0,  0,  0,  0,  0,
     5,  0,  0,  0,  0,  0,  0,  0,  5,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     5,  5,  5,  5,  0,  0,  0,  0,  5,  5,  5,  5,  0,  0,  0,  0,
     6,  0,  0,  0,  7,  0,  0,  2,  6,  0,  0,  0,  7,  0,  0,  2,
     6,  0,  0,  0,  7,  0,  0,  2,  6,  0,  0,  0,  7,  0,  0,  2,
     6,  0,  0,  0,  7,  0,  0,  2,  6,  0,  0,  0,  7,  0,  0,  2,
     6,  0,  0,  0,  7,  0,  0,  2,  6,  0,  0,  0,  7,  0,  0,  2,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_bytes_are_free_in_main_table() {
        let t = CycleTables::default();
        for prefix in [0xCB, 0xDD, 0xED, 0xFD] {
            assert_eq!(t.cost(CycleTable::Op, prefix), 0);
        }
        assert_eq!(t.cost(CycleTable::Xy, 0xCB), 0);
    }

    #[test]
    fn reference_timings() {
        let t = CycleTables::default();
        assert_eq!(t.cost(CycleTable::Op, 0xCD), 17);
        assert_eq!(t.cost(CycleTable::Cb, 0x46), 12);
        assert_eq!(t.cost(CycleTable::Ed, 0xB0), 16);
        assert_eq!(t.cost(CycleTable::Xy, 0x34), 23);
        assert_eq!(t.cost(CycleTable::XyCb, 0x46), 20);
        assert_eq!(t.cost(CycleTable::Ex, 0xFF), 2);
    }

    #[test]
    fn out_of_range_selector_is_none() {
        assert_eq!(CycleTable::from_index(5), Some(CycleTable::Ex));
        assert_eq!(CycleTable::from_index(6), None);
    }
}
