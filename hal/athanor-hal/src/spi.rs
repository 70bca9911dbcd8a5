//! SPI bus abstractions

/// SPI bus master
///
/// Chip select is handled by the device driver, not the bus.
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Read data (clocks out zeros)
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write data, discarding what is clocked in
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}
