//! Z80 register set.

/// A 16-bit register pair with byte views.
///
/// The word is the only storage; the byte accessors shift and mask it, so
/// a write through either view is always visible through the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pair(u16);

impl Pair {
    #[must_use]
    pub const fn new(word: u16) -> Self {
        Self(word)
    }

    #[inline]
    #[must_use]
    pub const fn word(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    #[must_use]
    pub const fn lo(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub fn set_word(&mut self, value: u16) {
        self.0 = value;
    }

    #[inline]
    pub fn set_hi(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | (u16::from(value) << 8);
    }

    #[inline]
    pub fn set_lo(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(value);
    }
}

/// Z80 register file.
///
/// Also the snapshot returned by `Cpu::registers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    /// Address of the instruction being executed. 0xFFFF after an
    /// interrupt, when there is no meaningful previous instruction.
    pub prev_pc: u16,
    pub pc: u16,
    pub sp: u16,
    pub af: Pair,
    pub bc: Pair,
    pub de: Pair,
    pub hl: Pair,
    pub ix: Pair,
    pub iy: Pair,

    // Alternate set
    pub af2: Pair,
    pub bc2: Pair,
    pub de2: Pair,
    pub hl2: Pair,

    /// Refresh counter. Only the low seven bits are visible.
    pub r: u8,
    /// Bit 7 of the refresh register as last loaded by `LD R,A`.
    pub r2: u8,
    pub i: u8,
    pub im: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub halted: bool,
}

impl Registers {
    #[inline]
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.af.hi()
    }

    #[inline]
    #[must_use]
    pub const fn f(&self) -> u8 {
        self.af.lo()
    }

    #[inline]
    pub fn set_a(&mut self, value: u8) {
        self.af.set_hi(value);
    }

    #[inline]
    pub fn set_f(&mut self, value: u8) {
        self.af.set_lo(value);
    }

    /// Refresh register as the hardware exposes it.
    #[must_use]
    pub const fn refresh(&self) -> u8 {
        (self.r & 0x7F) | (self.r2 & 0x80)
    }

    /// Load the refresh register, as `LD R,A` does.
    pub fn set_refresh(&mut self, value: u8) {
        self.r = value;
        self.r2 = value & 0x80;
    }

    /// `EX AF,AF'`
    pub fn exchange_af(&mut self) {
        std::mem::swap(&mut self.af, &mut self.af2);
    }

    /// `EXX`
    pub fn exchange_main(&mut self) {
        std::mem::swap(&mut self.bc, &mut self.bc2);
        std::mem::swap(&mut self.de, &mut self.de2);
        std::mem::swap(&mut self.hl, &mut self.hl2);
    }
}
