//! Core traits shared by the interpreter cores.
//!
//! A host scheduler hands each CPU a cycle budget, the CPU runs whole
//! instructions until the budget is spent and reports what it used. Memory
//! and ports sit behind the [`Bus`] trait.

mod bus;
mod cpu;
mod observable;

pub use bus::Bus;
pub use cpu::{Cpu, LineState};
pub use observable::{Observable, Value};
