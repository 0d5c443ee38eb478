//! Register access by id, whole-context save/restore and persisted state.

use emu_core::{LineState, Observable, Value};
use log::debug;
use thiserror::Error;

use crate::bus::Z80Bus;
use crate::cpu::{BlockRepeat, Z80};
use crate::flags::{CF, HF, NF, PF, SF, ZF};
use crate::interrupt::MAX_DAISY;
use crate::registers::{Pair, Registers};

/// Magic bytes for context blob identification.
const CONTEXT_MAGIC: &[u8; 4] = b"Z80C";

/// Current context blob version.
const CONTEXT_VERSION: u8 = 1;

/// Header plus payload.
const CONTEXT_LEN: usize = 5 + 13 * 2 + 4 + 4 + 2 + 2 + MAX_DAISY + 4 + 3;

/// Errors decoding a context blob or applying persisted state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context blob too short: {0} bytes")]
    TooShort(usize),
    #[error("invalid context magic")]
    BadMagic,
    #[error("unsupported context version {0}")]
    UnsupportedVersion(u8),
    #[error("invalid value for {0}")]
    InvalidField(&'static str),
}

// =============================================================================
// Register ids
// =============================================================================

/// A register addressable through [`Z80::get_reg`] / [`Z80::set_reg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterId {
    Pc,
    Sp,
    Af,
    Bc,
    De,
    Hl,
    Ix,
    Iy,
    R,
    I,
    Af2,
    Bc2,
    De2,
    Hl2,
    Im,
    Iff1,
    Iff2,
    Halt,
    NmiState,
    IrqState,
    Dc0,
    Dc1,
    Dc2,
    Dc3,
    /// Address of the instruction being executed. Read-only.
    PreviousPc,
    /// Word `n` above SP.
    SpContents(u32),
}

impl RegisterId {
    const NAMED: [Self; 24] = [
        Self::Pc,
        Self::Sp,
        Self::Af,
        Self::Bc,
        Self::De,
        Self::Hl,
        Self::Ix,
        Self::Iy,
        Self::R,
        Self::I,
        Self::Af2,
        Self::Bc2,
        Self::De2,
        Self::Hl2,
        Self::Im,
        Self::Iff1,
        Self::Iff2,
        Self::Halt,
        Self::NmiState,
        Self::IrqState,
        Self::Dc0,
        Self::Dc1,
        Self::Dc2,
        Self::Dc3,
    ];

    /// Decode a host register number: 1.. for the named registers in
    /// declaration order, -1 for the previous PC and -2, -3, ... for
    /// successive stack words.
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            -1 => Some(Self::PreviousPc),
            i32::MIN..=-2 => Some(Self::SpContents((-2 - i64::from(raw)) as u32)),
            1.. => Self::NAMED.get((raw - 1) as usize).copied(),
            0 => None,
        }
    }
}

/// Address of stack word `n`, if it lies wholly below FFFF.
fn stack_slot(sp: u16, n: u32) -> Option<u16> {
    let offset = u64::from(sp) + 2 * u64::from(n);
    (offset < 0xFFFF).then_some(offset as u16)
}

impl<B: Z80Bus> Z80<B> {
    /// Read one register. Stack slots beyond the address space read 0.
    pub fn get_reg(&mut self, id: RegisterId) -> u16 {
        let regs = &self.regs;
        match id {
            RegisterId::Pc => regs.pc,
            RegisterId::Sp => regs.sp,
            RegisterId::Af => regs.af.word(),
            RegisterId::Bc => regs.bc.word(),
            RegisterId::De => regs.de.word(),
            RegisterId::Hl => regs.hl.word(),
            RegisterId::Ix => regs.ix.word(),
            RegisterId::Iy => regs.iy.word(),
            RegisterId::R => u16::from(regs.refresh()),
            RegisterId::I => u16::from(regs.i),
            RegisterId::Af2 => regs.af2.word(),
            RegisterId::Bc2 => regs.bc2.word(),
            RegisterId::De2 => regs.de2.word(),
            RegisterId::Hl2 => regs.hl2.word(),
            RegisterId::Im => u16::from(regs.im),
            RegisterId::Iff1 => u16::from(regs.iff1),
            RegisterId::Iff2 => u16::from(regs.iff2),
            RegisterId::Halt => u16::from(regs.halted),
            RegisterId::NmiState => u16::from(self.nmi_state.is_asserted()),
            RegisterId::IrqState => u16::from(self.irq_state.is_asserted()),
            RegisterId::Dc0 => u16::from(self.daisy.int_state[0]),
            RegisterId::Dc1 => u16::from(self.daisy.int_state[1]),
            RegisterId::Dc2 => u16::from(self.daisy.int_state[2]),
            RegisterId::Dc3 => u16::from(self.daisy.int_state[3]),
            RegisterId::PreviousPc => regs.prev_pc,
            RegisterId::SpContents(n) => match stack_slot(regs.sp, n) {
                Some(addr) => self.read16(addr),
                None => 0,
            },
        }
    }

    /// Write one register.
    ///
    /// PC writes here do not notify the bus; line states go through the
    /// normal line handlers. Values are truncated to the register width.
    pub fn set_reg(&mut self, id: RegisterId, value: u16) {
        let regs = &mut self.regs;
        match id {
            RegisterId::Pc => regs.pc = value,
            RegisterId::Sp => regs.sp = value,
            RegisterId::Af => regs.af.set_word(value),
            RegisterId::Bc => regs.bc.set_word(value),
            RegisterId::De => regs.de.set_word(value),
            RegisterId::Hl => regs.hl.set_word(value),
            RegisterId::Ix => regs.ix.set_word(value),
            RegisterId::Iy => regs.iy.set_word(value),
            RegisterId::R => regs.set_refresh(value as u8),
            RegisterId::I => regs.i = value as u8,
            RegisterId::Af2 => regs.af2.set_word(value),
            RegisterId::Bc2 => regs.bc2.set_word(value),
            RegisterId::De2 => regs.de2.set_word(value),
            RegisterId::Hl2 => regs.hl2.set_word(value),
            RegisterId::Im => regs.im = value as u8,
            RegisterId::Iff1 => regs.iff1 = value != 0,
            RegisterId::Iff2 => regs.iff2 = value != 0,
            RegisterId::Halt => regs.halted = value != 0,
            RegisterId::NmiState => self.set_nmi_line(LineState::from(value != 0)),
            RegisterId::IrqState => self.set_irq_line(0, LineState::from(value != 0)),
            RegisterId::Dc0 => self.daisy.int_state[0] = value as u8,
            RegisterId::Dc1 => self.daisy.int_state[1] = value as u8,
            RegisterId::Dc2 => self.daisy.int_state[2] = value as u8,
            RegisterId::Dc3 => self.daisy.int_state[3] = value as u8,
            RegisterId::PreviousPc => {}
            RegisterId::SpContents(n) => {
                if let Some(addr) = stack_slot(regs.sp, n) {
                    self.write16(addr, value);
                }
            }
        }
    }

    /// Capture the whole register and interrupt block.
    #[must_use]
    pub fn get_context(&self) -> Z80Context {
        Z80Context {
            regs: self.regs,
            after_ei: self.after_ei,
            nmi_state: self.nmi_state,
            irq_state: self.irq_state,
            request_irq: self.daisy.request,
            service_irq: self.daisy.service,
            int_state: self.daisy.int_state,
            extra_cycles: self.extra_cycles,
            block_repeat: self.repeat,
        }
    }

    /// Restore a block captured by [`Z80::get_context`]. Daisy indices past
    /// the end of this CPU's chain are dropped.
    pub fn set_context(&mut self, context: &Z80Context) {
        let len = self.daisy.len();
        self.regs = context.regs;
        self.after_ei = context.after_ei;
        self.nmi_state = context.nmi_state;
        self.irq_state = context.irq_state;
        self.daisy.request = context.request_irq.filter(|&d| d < len);
        self.daisy.service = context.service_irq.filter(|&d| d < len);
        self.daisy.int_state = context.int_state;
        self.extra_cycles = context.extra_cycles;
        self.repeat = context.block_repeat;
        self.bus.pc_changed(self.regs.pc);
    }

    /// Collect the persisted fields.
    #[must_use]
    pub fn save_state(&self) -> Z80State {
        let regs = &self.regs;
        Z80State {
            af: regs.af.word(),
            bc: regs.bc.word(),
            de: regs.de.word(),
            hl: regs.hl.word(),
            ix: regs.ix.word(),
            iy: regs.iy.word(),
            pc: regs.pc,
            sp: regs.sp,
            af2: regs.af2.word(),
            bc2: regs.bc2.word(),
            de2: regs.de2.word(),
            hl2: regs.hl2.word(),
            r: regs.r,
            r2: regs.r2,
            iff1: regs.iff1,
            iff2: regs.iff2,
            halt: regs.halted,
            im: regs.im,
            i: regs.i,
            irq_max: self.daisy.len() as u8,
            request_irq: index_to_raw(self.daisy.request),
            service_irq: index_to_raw(self.daisy.service),
            int_state: self.daisy.int_state,
            nmi_state: self.nmi_state.is_asserted(),
            irq_state: self.irq_state.is_asserted(),
        }
    }

    /// Apply persisted fields. The daisy devices themselves are host
    /// bindings and are not restored; `irq_max` must match the chain this
    /// CPU was built with.
    pub fn load_state(&mut self, state: &Z80State) -> Result<(), ContextError> {
        let len = self.daisy.len();
        if usize::from(state.irq_max) != len {
            return Err(ContextError::InvalidField("irq_max"));
        }
        if state.im > 2 {
            return Err(ContextError::InvalidField("IM"));
        }
        let request = index_from_raw(state.request_irq, len)
            .ok_or(ContextError::InvalidField("request_irq"))?;
        let service = index_from_raw(state.service_irq, len)
            .ok_or(ContextError::InvalidField("service_irq"))?;

        let regs = &mut self.regs;
        regs.af = Pair::new(state.af);
        regs.bc = Pair::new(state.bc);
        regs.de = Pair::new(state.de);
        regs.hl = Pair::new(state.hl);
        regs.ix = Pair::new(state.ix);
        regs.iy = Pair::new(state.iy);
        regs.pc = state.pc;
        regs.sp = state.sp;
        regs.af2 = Pair::new(state.af2);
        regs.bc2 = Pair::new(state.bc2);
        regs.de2 = Pair::new(state.de2);
        regs.hl2 = Pair::new(state.hl2);
        regs.r = state.r;
        regs.r2 = state.r2;
        regs.iff1 = state.iff1;
        regs.iff2 = state.iff2;
        regs.halted = state.halt;
        regs.im = state.im;
        regs.i = state.i;

        self.daisy.request = request;
        self.daisy.service = service;
        self.daisy.int_state = state.int_state;
        self.nmi_state = LineState::from(state.nmi_state);
        self.irq_state = LineState::from(state.irq_state);
        self.repeat = BlockRepeat::Idle;

        debug!("state loaded, PC {:04X}", state.pc);
        self.bus.pc_changed(state.pc);
        Ok(())
    }
}

fn index_to_raw(index: Option<usize>) -> i8 {
    index.map_or(-1, |d| d as i8)
}

/// `Some(None)` for -1, `Some(Some(d))` for an index inside the chain,
/// `None` when the value is invalid.
fn index_from_raw(raw: i8, len: usize) -> Option<Option<usize>> {
    match raw {
        -1 => Some(None),
        0.. if (raw as usize) < len => Some(Some(raw as usize)),
        _ => None,
    }
}

// =============================================================================
// Context blob
// =============================================================================

/// Everything the CPU needs to resume exactly where it was, apart from the
/// bus and the daisy device bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Z80Context {
    pub regs: Registers,
    pub after_ei: bool,
    pub nmi_state: LineState,
    pub irq_state: LineState,
    pub request_irq: Option<usize>,
    pub service_irq: Option<usize>,
    pub int_state: [u8; MAX_DAISY],
    /// Interrupt acknowledge cost not yet charged.
    pub extra_cycles: i32,
    pub block_repeat: BlockRepeat,
}

impl Z80Context {
    /// Serialize to a fixed-size little-endian blob.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(CONTEXT_LEN);

        // Header
        data.extend_from_slice(CONTEXT_MAGIC);
        data.push(CONTEXT_VERSION);

        // Register pairs (26 bytes)
        let regs = &self.regs;
        for word in [
            regs.prev_pc,
            regs.pc,
            regs.sp,
            regs.af.word(),
            regs.bc.word(),
            regs.de.word(),
            regs.hl.word(),
            regs.ix.word(),
            regs.iy.word(),
            regs.af2.word(),
            regs.bc2.word(),
            regs.de2.word(),
            regs.hl2.word(),
        ] {
            data.extend_from_slice(&word.to_le_bytes());
        }

        // Single-byte registers
        data.extend_from_slice(&[regs.r, regs.r2, regs.i, regs.im]);

        // Latches
        data.push(u8::from(regs.iff1));
        data.push(u8::from(regs.iff2));
        data.push(u8::from(regs.halted));
        data.push(u8::from(self.after_ei));
        data.push(u8::from(self.nmi_state.is_asserted()));
        data.push(u8::from(self.irq_state.is_asserted()));

        // Daisy chain
        data.push(index_to_raw(self.request_irq) as u8);
        data.push(index_to_raw(self.service_irq) as u8);
        data.extend_from_slice(&self.int_state);

        data.extend_from_slice(&self.extra_cycles.to_le_bytes());

        // Suspended block instruction (opcode 0 when idle)
        let (opcode, remaining) = match self.block_repeat {
            BlockRepeat::Idle => (0, 0),
            BlockRepeat::Repeating { opcode, remaining } => (opcode, remaining),
        };
        data.push(opcode);
        data.extend_from_slice(&remaining.to_le_bytes());

        data
    }

    /// Decode a blob produced by [`Z80Context::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, ContextError> {
        if data.len() < 5 {
            return Err(ContextError::TooShort(data.len()));
        }
        if &data[0..4] != CONTEXT_MAGIC {
            return Err(ContextError::BadMagic);
        }
        if data[4] != CONTEXT_VERSION {
            return Err(ContextError::UnsupportedVersion(data[4]));
        }
        if data.len() < CONTEXT_LEN {
            return Err(ContextError::TooShort(data.len()));
        }

        let word = |pos: usize| u16::from_le_bytes([data[pos], data[pos + 1]]);
        let flag = |pos: usize, name: &'static str| match data[pos] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ContextError::InvalidField(name)),
        };
        let index = |pos: usize, name: &'static str| match data[pos] as i8 {
            -1 => Ok(None),
            d @ 0.. if (d as usize) < MAX_DAISY => Ok(Some(d as usize)),
            _ => Err(ContextError::InvalidField(name)),
        };

        let mut pos = 5;
        let regs = Registers {
            prev_pc: word(pos),
            pc: word(pos + 2),
            sp: word(pos + 4),
            af: Pair::new(word(pos + 6)),
            bc: Pair::new(word(pos + 8)),
            de: Pair::new(word(pos + 10)),
            hl: Pair::new(word(pos + 12)),
            ix: Pair::new(word(pos + 14)),
            iy: Pair::new(word(pos + 16)),
            af2: Pair::new(word(pos + 18)),
            bc2: Pair::new(word(pos + 20)),
            de2: Pair::new(word(pos + 22)),
            hl2: Pair::new(word(pos + 24)),
            r: data[pos + 26],
            r2: data[pos + 27],
            i: data[pos + 28],
            im: data[pos + 29],
            iff1: flag(pos + 30, "iff1")?,
            iff2: flag(pos + 31, "iff2")?,
            halted: flag(pos + 32, "halted")?,
        };
        if regs.im > 2 {
            return Err(ContextError::InvalidField("im"));
        }
        pos += 33;

        let after_ei = flag(pos, "after_ei")?;
        let nmi_state = LineState::from(flag(pos + 1, "nmi_state")?);
        let irq_state = LineState::from(flag(pos + 2, "irq_state")?);
        let request_irq = index(pos + 3, "request_irq")?;
        let service_irq = index(pos + 4, "service_irq")?;
        pos += 5;

        let mut int_state = [0u8; MAX_DAISY];
        int_state.copy_from_slice(&data[pos..pos + MAX_DAISY]);
        pos += MAX_DAISY;

        let extra_cycles =
            i32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        pos += 4;

        let block_repeat = match data[pos] {
            0 => BlockRepeat::Idle,
            opcode @ (0xB0..=0xB3 | 0xB8..=0xBB) => BlockRepeat::Repeating {
                opcode,
                remaining: word(pos + 1),
            },
            _ => return Err(ContextError::InvalidField("block_repeat")),
        };

        Ok(Self {
            regs,
            after_ei,
            nmi_state,
            irq_state,
            request_irq,
            service_irq,
            int_state,
            extra_cycles,
            block_repeat,
        })
    }
}

// =============================================================================
// Persisted state
// =============================================================================

/// The persisted field set, one field per saved item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Z80State {
    #[cfg_attr(feature = "serde", serde(rename = "AF"))]
    pub af: u16,
    #[cfg_attr(feature = "serde", serde(rename = "BC"))]
    pub bc: u16,
    #[cfg_attr(feature = "serde", serde(rename = "DE"))]
    pub de: u16,
    #[cfg_attr(feature = "serde", serde(rename = "HL"))]
    pub hl: u16,
    #[cfg_attr(feature = "serde", serde(rename = "IX"))]
    pub ix: u16,
    #[cfg_attr(feature = "serde", serde(rename = "IY"))]
    pub iy: u16,
    #[cfg_attr(feature = "serde", serde(rename = "PC"))]
    pub pc: u16,
    #[cfg_attr(feature = "serde", serde(rename = "SP"))]
    pub sp: u16,
    #[cfg_attr(feature = "serde", serde(rename = "AF2"))]
    pub af2: u16,
    #[cfg_attr(feature = "serde", serde(rename = "BC2"))]
    pub bc2: u16,
    #[cfg_attr(feature = "serde", serde(rename = "DE2"))]
    pub de2: u16,
    #[cfg_attr(feature = "serde", serde(rename = "HL2"))]
    pub hl2: u16,
    #[cfg_attr(feature = "serde", serde(rename = "R"))]
    pub r: u8,
    #[cfg_attr(feature = "serde", serde(rename = "R2"))]
    pub r2: u8,
    #[cfg_attr(feature = "serde", serde(rename = "IFF1"))]
    pub iff1: bool,
    #[cfg_attr(feature = "serde", serde(rename = "IFF2"))]
    pub iff2: bool,
    #[cfg_attr(feature = "serde", serde(rename = "HALT"))]
    pub halt: bool,
    #[cfg_attr(feature = "serde", serde(rename = "IM"))]
    pub im: u8,
    #[cfg_attr(feature = "serde", serde(rename = "I"))]
    pub i: u8,
    pub irq_max: u8,
    /// Requesting device, -1 for none.
    pub request_irq: i8,
    /// Device under service, -1 for none.
    pub service_irq: i8,
    pub int_state: [u8; MAX_DAISY],
    pub nmi_state: bool,
    pub irq_state: bool,
}

impl Z80State {
    /// Saved names, in save order.
    pub const FIELDS: [&'static str; 25] = [
        "AF",
        "BC",
        "DE",
        "HL",
        "IX",
        "IY",
        "PC",
        "SP",
        "AF2",
        "BC2",
        "DE2",
        "HL2",
        "R",
        "R2",
        "IFF1",
        "IFF2",
        "HALT",
        "IM",
        "I",
        "irq_max",
        "request_irq",
        "service_irq",
        "int_state",
        "nmi_state",
        "irq_state",
    ];
}

// =============================================================================
// Observability
// =============================================================================

const QUERY_PATHS: &[&str] = &[
    "cpu.pc",
    "cpu.prev_pc",
    "cpu.sp",
    "cpu.a",
    "cpu.f",
    "cpu.af",
    "cpu.bc",
    "cpu.de",
    "cpu.hl",
    "cpu.ix",
    "cpu.iy",
    "cpu.i",
    "cpu.r",
    "cpu.im",
    "cpu.iff1",
    "cpu.iff2",
    "cpu.halted",
    "irq.request",
    "irq.service",
    "irq.int_state",
    "flags.s",
    "flags.z",
    "flags.h",
    "flags.pv",
    "flags.n",
    "flags.c",
];

impl<B: Z80Bus> Observable for Z80<B> {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        let f = regs.f();
        let value: Value = match path {
            "cpu.pc" => regs.pc.into(),
            "cpu.prev_pc" => regs.prev_pc.into(),
            "cpu.sp" => regs.sp.into(),
            "cpu.a" => regs.a().into(),
            "cpu.f" => f.into(),
            "cpu.af" => regs.af.word().into(),
            "cpu.bc" => regs.bc.word().into(),
            "cpu.de" => regs.de.word().into(),
            "cpu.hl" => regs.hl.word().into(),
            "cpu.ix" => regs.ix.word().into(),
            "cpu.iy" => regs.iy.word().into(),
            "cpu.i" => regs.i.into(),
            "cpu.r" => regs.refresh().into(),
            "cpu.im" => regs.im.into(),
            "cpu.iff1" => regs.iff1.into(),
            "cpu.iff2" => regs.iff2.into(),
            "cpu.halted" => regs.halted.into(),
            "irq.request" => index_to_raw(self.daisy.request).into(),
            "irq.service" => index_to_raw(self.daisy.service).into(),
            "irq.int_state" => Value::Array(
                self.daisy.int_state[..self.daisy.len()]
                    .iter()
                    .map(|&s| Value::U8(s))
                    .collect(),
            ),
            "flags.s" => (f & SF != 0).into(),
            "flags.z" => (f & ZF != 0).into(),
            "flags.h" => (f & HF != 0).into(),
            "flags.pv" => (f & PF != 0).into(),
            "flags.n" => (f & NF != 0).into(),
            "flags.c" => (f & CF != 0).into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ids_follow_declaration_order() {
        assert_eq!(RegisterId::from_raw(1), Some(RegisterId::Pc));
        assert_eq!(RegisterId::from_raw(9), Some(RegisterId::R));
        assert_eq!(RegisterId::from_raw(24), Some(RegisterId::Dc3));
        assert_eq!(RegisterId::from_raw(25), None);
        assert_eq!(RegisterId::from_raw(0), None);
        assert_eq!(RegisterId::from_raw(-1), Some(RegisterId::PreviousPc));
        assert_eq!(RegisterId::from_raw(-2), Some(RegisterId::SpContents(0)));
        assert_eq!(RegisterId::from_raw(-5), Some(RegisterId::SpContents(3)));
    }

    #[test]
    fn stack_slot_stops_below_ffff() {
        assert_eq!(stack_slot(0xFFF0, 0), Some(0xFFF0));
        assert_eq!(stack_slot(0xFFFC, 1), Some(0xFFFE));
        assert_eq!(stack_slot(0xFFFE, 1), None);
        assert_eq!(stack_slot(0xFFFF, 0), None);
    }

    #[test]
    fn blob_has_fixed_length() {
        let blob = Z80Context::default().to_bytes();
        assert_eq!(blob.len(), CONTEXT_LEN);
        assert_eq!(&blob[0..4], CONTEXT_MAGIC);
    }

    #[test]
    fn blob_rejects_garbage() {
        assert_eq!(Z80Context::from_bytes(&[1, 2]), Err(ContextError::TooShort(2)));
        assert_eq!(
            Z80Context::from_bytes(b"NOPE\x01"),
            Err(ContextError::BadMagic)
        );
        assert_eq!(
            Z80Context::from_bytes(b"Z80C\x07"),
            Err(ContextError::UnsupportedVersion(7))
        );

        let mut blob = Z80Context::default().to_bytes();
        blob.truncate(CONTEXT_LEN - 1);
        assert_eq!(
            Z80Context::from_bytes(&blob),
            Err(ContextError::TooShort(CONTEXT_LEN - 1))
        );

        let mut blob = Z80Context::default().to_bytes();
        // iff1 byte
        blob[5 + 26 + 4] = 7;
        assert_eq!(
            Z80Context::from_bytes(&blob),
            Err(ContextError::InvalidField("iff1"))
        );
    }

    #[test]
    fn raw_index_round_trip() {
        assert_eq!(index_to_raw(None), -1);
        assert_eq!(index_from_raw(-1, 2), Some(None));
        assert_eq!(index_from_raw(1, 2), Some(Some(1)));
        assert_eq!(index_from_raw(2, 2), None);
        assert_eq!(index_from_raw(-3, 2), None);
    }
}
