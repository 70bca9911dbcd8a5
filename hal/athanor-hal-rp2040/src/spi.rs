//! SPI bus wrapper
//!
//! Adapts any `embedded-hal` 1.0 blocking bus (such as
//! `embassy_rp::spi::Spi` in blocking mode) to [`athanor_hal::SpiBus`].

use embedded_hal::spi::SpiBus as EhSpiBus;

/// Blocking SPI bus implementing [`athanor_hal::SpiBus`]
pub struct RpSpi<B> {
    bus: B,
}

impl<B: EhSpiBus<u8>> RpSpi<B> {
    /// Wrap a configured bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: EhSpiBus<u8>> athanor_hal::SpiBus for RpSpi<B> {
    type Error = B::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.read(buf)?;
        self.bus.flush()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.write(data)?;
        self.bus.flush()
    }
}
