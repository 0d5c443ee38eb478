//! Host side of a CPU's memory and port accesses.

/// Flat 16-bit data space plus a 16-bit I/O space.
///
/// The host owns address decoding. Only the data-space accessors are
/// required; a machine without ports keeps the I/O defaults.
pub trait Bus {
    /// Read a byte from data space.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to data space.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte from I/O space.
    ///
    /// The full 16-bit port address is supplied; hosts decode as many bits
    /// as their hardware does. Unmapped ports float high.
    fn io_read(&mut self, port: u16) -> u8 {
        let _ = port;
        0xFF
    }

    /// Write a byte to I/O space.
    fn io_write(&mut self, port: u16, value: u8) {
        let _ = (port, value);
    }
}
