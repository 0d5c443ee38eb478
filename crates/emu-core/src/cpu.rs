//! CPU core trait.

/// Level of an interrupt input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    /// Line released.
    #[default]
    Clear,
    /// Line held active.
    Assert,
}

impl LineState {
    /// True when the line is held active.
    #[must_use]
    pub const fn is_asserted(self) -> bool {
        matches!(self, Self::Assert)
    }
}

impl From<bool> for LineState {
    fn from(asserted: bool) -> Self {
        if asserted { Self::Assert } else { Self::Clear }
    }
}

/// A CPU core driven by a host scheduler.
///
/// The scheduler grants a budget of cycles per call. The core runs whole
/// instructions until the budget is used up and returns the cycles it
/// actually consumed, which may overshoot by the tail of the last
/// instruction.
///
/// Line changes and register pokes happen between calls, never during one.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Run for at least `cycles` cycles. Returns the cycles consumed.
    fn execute(&mut self, cycles: i32) -> i32;

    /// Consume `cycles` without executing instructions.
    fn burn(&mut self, cycles: i32);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Load the program counter.
    fn set_pc(&mut self, pc: u16);

    /// Returns the current stack pointer.
    fn sp(&self) -> u16;

    /// Load the stack pointer.
    fn set_sp(&mut self, sp: u16);

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Drive the maskable interrupt line.
    fn set_irq_line(&mut self, line: u8, state: LineState);

    /// Drive the non-maskable interrupt line.
    fn set_nmi_line(&mut self, state: LineState);

    /// Reset the CPU to its initial state.
    fn reset(&mut self);
}
