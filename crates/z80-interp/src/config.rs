//! CPU configuration.

use crate::cycles::CycleTables;

/// Whether idle-loop idioms are fast-forwarded.
///
/// With shortcuts enabled, `JP $`, `DEC BC / LD A,B / OR C / JR NZ` style
/// waits are collapsed into a single budget deduction. The resulting
/// registers, refresh counter and cycle count are the same as running every
/// iteration; only host-visible bus traffic for the skipped iterations is
/// lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shortcuts {
    #[default]
    Enabled,
    Disabled,
}

impl Shortcuts {
    #[must_use]
    pub const fn enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Configuration for creating a [`crate::Z80`].
#[derive(Debug, Clone, Default)]
pub struct Z80Config {
    pub shortcuts: Shortcuts,
    /// Timing tables. Defaults to the NMOS Z80.
    pub cycles: CycleTables,
}
