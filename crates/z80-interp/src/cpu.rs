//! Z80 CPU state and the budgeted execution loop.

mod block;
mod execute;
mod extended;
mod indexed;
mod shortcuts;

use emu_core::{Cpu, LineState};

use crate::bus::Z80Bus;
use crate::config::{Shortcuts, Z80Config};
use crate::cycles::{CycleTable, CycleTables};
use crate::flags::{self, ZF};
use crate::interrupt::{DaisyChain, DaisyChainEntry};
use crate::registers::Registers;

pub use block::BlockRepeat;

/// The Z80 CPU.
///
/// Owns its bus. Hosts reach memory and peripherals between calls through
/// [`Z80::bus`] and [`Z80::bus_mut`].
pub struct Z80<B: Z80Bus> {
    pub(crate) regs: Registers,
    pub(crate) bus: B,
    pub(crate) cycles: CycleTables,
    pub(crate) shortcuts: Shortcuts,
    /// Budget left in the current `execute` call.
    pub(crate) icount: i32,
    /// Interrupt acknowledge cost, charged on the next `execute`.
    pub(crate) extra_cycles: i32,
    /// Set while the instruction after EI runs with an interrupt pending.
    pub(crate) after_ei: bool,
    pub(crate) nmi_state: LineState,
    pub(crate) irq_state: LineState,
    pub(crate) daisy: DaisyChain,
    pub(crate) repeat: BlockRepeat,
}

impl<B: Z80Bus> Z80<B> {
    /// Create a CPU with default timings and shortcuts enabled, already reset.
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, Z80Config::default())
    }

    pub fn with_config(bus: B, config: Z80Config) -> Self {
        Self::with_daisy_chain(bus, config, Vec::new())
    }

    /// Create a CPU whose maskable interrupts are arbitrated by `chain`.
    ///
    /// Entries past [`crate::MAX_DAISY`] are dropped.
    pub fn with_daisy_chain(bus: B, config: Z80Config, chain: Vec<DaisyChainEntry>) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            bus,
            cycles: config.cycles,
            shortcuts: config.shortcuts,
            icount: 0,
            extra_cycles: 0,
            after_ei: false,
            nmi_state: LineState::Clear,
            irq_state: LineState::Clear,
            daisy: DaisyChain::new(chain),
            repeat: BlockRepeat::Idle,
        };
        cpu.reset();
        cpu
    }

    #[must_use]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Power-on reset.
    ///
    /// IX and IY come up as FFFF, F as ZF, everything else zero. Daisy
    /// devices are reset and the host is told PC moved.
    pub fn reset(&mut self) {
        // Build the lookup tables before the first instruction needs them.
        let _ = flags::tables();

        self.regs = Registers::default();
        self.regs.ix.set_word(0xFFFF);
        self.regs.iy.set_word(0xFFFF);
        self.regs.set_f(ZF);
        self.icount = 0;
        self.extra_cycles = 0;
        self.after_ei = false;
        self.nmi_state = LineState::Clear;
        self.irq_state = LineState::Clear;
        self.repeat = BlockRepeat::Idle;
        self.daisy.reset();
        self.bus.pc_changed(self.regs.pc);
    }

    /// Run whole instructions until `cycles` is spent.
    ///
    /// At least one instruction always runs. Pending interrupt acknowledge
    /// cost is charged up front. Returns the cycles consumed, which exceeds
    /// `cycles` by the tail of the last instruction, saturating at
    /// `i32::MAX`.
    pub fn execute(&mut self, cycles: i32) -> i32 {
        self.icount = cycles.saturating_sub(self.extra_cycles);
        self.extra_cycles = 0;

        loop {
            self.step();
            if self.icount <= 0 {
                break;
            }
        }

        self.icount = self.icount.saturating_sub(self.extra_cycles);
        self.extra_cycles = 0;
        cycles.saturating_sub(self.icount)
    }

    /// Consume `cycles` rounded up to whole NOPs, advancing R once per NOP.
    pub fn burn(&mut self, cycles: i32) {
        if cycles > 0 {
            let n = cycles / 4 + i32::from(cycles % 4 != 0);
            self.add_r(n);
            let left = i64::from(self.icount) - 4 * i64::from(n);
            self.icount = i32::try_from(left).unwrap_or(i32::MIN);
        }
    }

    /// Budget left in the current (or last) `execute` call.
    #[must_use]
    pub fn remaining_cycles(&self) -> i32 {
        self.icount
    }

    #[must_use]
    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    /// Direct register access. Writing PC this way does not notify the bus;
    /// use [`Z80::set_pc`] for that.
    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.jump(pc);
    }

    #[must_use]
    pub fn sp(&self) -> u16 {
        self.regs.sp
    }

    pub fn set_sp(&mut self, sp: u16) {
        self.regs.sp = sp;
    }

    #[must_use]
    pub fn shortcuts(&self) -> Shortcuts {
        self.shortcuts
    }

    pub fn set_shortcuts(&mut self, shortcuts: Shortcuts) {
        self.shortcuts = shortcuts;
    }

    #[must_use]
    pub fn cycle_table(&self, which: CycleTable) -> &[u8; 256] {
        self.cycles.table(which)
    }

    /// Replace one timing table. Takes effect from the next instruction.
    pub fn set_cycle_table(&mut self, which: CycleTable, table: &[u8; 256]) {
        self.cycles.set_table(which, table);
    }

    /// Timing table by raw index (0 = Op .. 5 = Ex).
    #[must_use]
    pub fn cycle_table_by_index(&self, index: usize) -> Option<&[u8; 256]> {
        CycleTable::from_index(index).map(|which| self.cycles.table(which))
    }

    /// Replace a timing table by raw index. Unknown indices are ignored.
    pub fn set_cycle_table_by_index(&mut self, index: usize, table: &[u8; 256]) {
        if let Some(which) = CycleTable::from_index(index) {
            self.cycles.set_table(which, table);
        }
    }

    /// Progress of a block instruction that ran out of budget mid-run.
    #[must_use]
    pub fn block_repeat(&self) -> BlockRepeat {
        self.repeat
    }

    /// Number of daisy chain entries in use.
    #[must_use]
    pub fn daisy_len(&self) -> usize {
        self.daisy.len()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn step(&mut self) {
        // A suspended block op re-records itself if it runs out again.
        self.repeat = BlockRepeat::Idle;
        self.regs.prev_pc = self.regs.pc;
        self.inc_r();
        let op = self.fetch_op();
        self.charge(CycleTable::Op, op);
        self.execute_unprefixed(op);
    }

    /// Fetch and run one instruction without the outer bookkeeping. Used by
    /// EI for the instruction it shields.
    pub(crate) fn execute_one(&mut self) {
        let op = self.fetch_op();
        self.charge(CycleTable::Op, op);
        self.execute_unprefixed(op);
    }

    // =========================================================================
    // Bus helpers
    // =========================================================================

    #[inline]
    pub(crate) fn inc_r(&mut self) {
        self.regs.r = self.regs.r.wrapping_add(1);
    }

    /// R only keeps the low 8 bits, so the count wraps.
    #[inline]
    pub(crate) fn add_r(&mut self, n: i32) {
        self.regs.r = self.regs.r.wrapping_add(n as u8);
    }

    #[inline]
    pub(crate) fn charge(&mut self, table: CycleTable, op: u8) {
        self.icount -= self.cycles.cost(table, op);
    }

    #[inline]
    pub(crate) fn cost(&self, table: CycleTable, op: u8) -> i32 {
        self.cycles.cost(table, op)
    }

    pub(crate) fn fetch_op(&mut self) -> u8 {
        let op = self.bus.read_op(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        op
    }

    pub(crate) fn fetch_arg(&mut self) -> u8 {
        let value = self.bus.read_arg(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    pub(crate) fn fetch_arg16(&mut self) -> u16 {
        let lo = self.fetch_arg();
        let hi = self.fetch_arg();
        u16::from_le_bytes([lo, hi])
    }

    /// Signed displacement applied to the current PC.
    pub(crate) fn fetch_relative(&mut self) -> u16 {
        let disp = self.fetch_arg() as i8;
        self.regs.pc.wrapping_add(disp as u16)
    }

    #[inline]
    pub(crate) fn read(&mut self, address: u16) -> u8 {
        self.bus.read(address)
    }

    #[inline]
    pub(crate) fn write(&mut self, address: u16, value: u8) {
        self.bus.write(address, value);
    }

    pub(crate) fn read16(&mut self, address: u16) -> u16 {
        let lo = self.read(address);
        let hi = self.read(address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn write16(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(address, lo);
        self.write(address.wrapping_add(1), hi);
    }

    pub(crate) fn push(&mut self, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        self.write16(self.regs.sp, value);
    }

    pub(crate) fn pop(&mut self) -> u16 {
        let value = self.read16(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    /// Load PC and tell the bus.
    pub(crate) fn jump(&mut self, pc: u16) {
        self.regs.pc = pc;
        self.bus.pc_changed(pc);
    }

    pub(crate) fn leave_halt(&mut self) {
        if self.regs.halted {
            self.regs.halted = false;
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }
}

impl<B: Z80Bus> Cpu for Z80<B> {
    type Registers = Registers;

    fn execute(&mut self, cycles: i32) -> i32 {
        Z80::execute(self, cycles)
    }

    fn burn(&mut self, cycles: i32) {
        Z80::burn(self, cycles);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn set_pc(&mut self, pc: u16) {
        Z80::set_pc(self, pc);
    }

    fn sp(&self) -> u16 {
        self.regs.sp
    }

    fn set_sp(&mut self, sp: u16) {
        self.regs.sp = sp;
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn set_irq_line(&mut self, line: u8, state: LineState) {
        Z80::set_irq_line(self, line, state);
    }

    fn set_nmi_line(&mut self, state: LineState) {
        Z80::set_nmi_line(self, state);
    }

    fn reset(&mut self) {
        Z80::reset(self);
    }
}
