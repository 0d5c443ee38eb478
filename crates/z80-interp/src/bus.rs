//! Z80 side of the host bus.

use emu_core::Bus;

/// Bus hooks the Z80 needs beyond plain memory and I/O.
///
/// Every method has a default, so a flat-memory host only implements
/// [`Bus`] and writes `impl Z80Bus for MyBus {}`.
pub trait Z80Bus: Bus {
    /// Read an opcode byte. Hosts with decrypted or banked opcode space
    /// override this.
    fn read_op(&mut self, address: u16) -> u8 {
        self.read(address)
    }

    /// Read an operand byte (immediates, displacements, addresses).
    fn read_arg(&mut self, address: u16) -> u8 {
        self.read_op(address)
    }

    /// Called whenever the program counter is loaded with a new value.
    fn pc_changed(&mut self, pc: u16) {
        let _ = pc;
    }

    /// Interrupt acknowledge.
    ///
    /// Without a daisy chain this returns the vector placed on the data bus
    /// (the default `0xFF` is RST 38h). With a daisy chain it returns
    /// `(device << 8) | int_state` for the device that moved the line.
    fn irq_acknowledge(&mut self, line: u8) -> u32 {
        let _ = line;
        0xFF
    }
}
