//! Observability trait for inspecting component state.
//!
//! Debuggers and tests read CPU state through string paths. Queries never
//! affect emulation state.

use std::fmt;

/// A dynamically-typed value for state queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Single flag or latch.
    Bool(bool),
    /// 8-bit register.
    U8(u8),
    /// 16-bit register or pair.
    U16(u16),
    /// Signed index where a negative value means "none".
    I8(i8),
    /// Fixed group of values, e.g. per-device state bytes.
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::I8(v)
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a specific property by path.
    ///
    /// Paths are hierarchical, separated by dots:
    /// - `cpu.pc` - Program counter
    /// - `cpu.a` - Accumulator
    /// - `flags.z` - Zero flag
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// List all available query paths.
    fn query_paths(&self) -> &'static [&'static str];
}
