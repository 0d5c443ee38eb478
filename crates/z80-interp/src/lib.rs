//! Instruction-level Z80 interpreter.
//!
//! The CPU runs against a cycle budget: [`Z80::execute`] dispatches whole
//! instructions until the budget is spent and reports how many T-states were
//! actually used. Memory and I/O go through a host-supplied [`Z80Bus`].
//!
//! Maskable interrupts are either delivered directly (the bus supplies the
//! vector on acknowledge) or arbitrated by a daisy chain of up to
//! [`MAX_DAISY`] peripherals.

mod alu;
mod bus;
mod config;
mod context;
mod cpu;
mod cycles;
mod flags;
mod interrupt;
mod registers;

pub use bus::Z80Bus;
pub use config::{Shortcuts, Z80Config};
pub use context::{ContextError, RegisterId, Z80Context, Z80State};
pub use cpu::{BlockRepeat, Z80};
pub use cycles::{CycleTable, CycleTables};
pub use flags::{CF, HF, NF, PF, SF, VF, XF, YF, ZF};
pub use interrupt::{DaisyChainEntry, DaisyDevice, INT_IEO, INT_REQ, MAX_DAISY};
pub use registers::{Pair, Registers};

pub use emu_core::{Bus, Cpu, LineState, Observable, Value};
