//! MAX31855 thermocouple-to-digital converter
//!
//! The MAX31855 is read-only: pulling CS low and clocking 32 bits out
//! returns one conversion.
//!
//! # Frame layout
//!
//! | Bits  | Content                                            |
//! |-------|----------------------------------------------------|
//! | 31:18 | Thermocouple temperature, signed 14-bit, 0.25 °C   |
//! | 17    | Reserved, always 0                                 |
//! | 16    | Fault flag (any of bits 2:0)                       |
//! | 15:4  | Internal junction, signed 12-bit, 0.0625 °C        |
//! | 3     | Reserved, always 0                                 |
//! | 2     | SCV: thermocouple shorted to VCC                   |
//! | 1     | SCG: thermocouple shorted to GND                   |
//! | 0     | OC: thermocouple open                              |

use athanor_core::traits::{
    RawReading, SensorError, ThermocoupleSensor, FAULT_OPEN_CIRCUIT, FAULT_SHORT_TO_GROUND,
    FAULT_SHORT_TO_VCC,
};
use athanor_hal::{OutputPin, SpiBus};

const RESERVED_MASK: u32 = (1 << 17) | (1 << 3);
const FAULT_FLAG: u32 = 1 << 16;

const BIT_OC: u32 = 1 << 0;
const BIT_SCG: u32 = 1 << 1;
const BIT_SCV: u32 = 1 << 2;

/// MAX31855 on a dedicated chip select
pub struct Max31855<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI: SpiBus, CS: OutputPin> Max31855<SPI, CS> {
    /// Create a new driver; CS is deasserted immediately
    pub fn new(spi: SPI, mut cs: CS) -> Self {
        cs.set_high();
        Self { spi, cs }
    }

    /// Read the raw 32-bit frame
    pub fn read_frame(&mut self) -> Result<u32, SensorError> {
        let mut buf = [0u8; 4];

        self.cs.set_low();
        let result = self.spi.read(&mut buf);
        self.cs.set_high();

        result.map_err(|_| SensorError::Bus)?;
        Ok(u32::from_be_bytes(buf))
    }
}

impl<SPI: SpiBus, CS: OutputPin> ThermocoupleSensor for Max31855<SPI, CS> {
    fn read(&mut self) -> Result<RawReading, SensorError> {
        let frame = self.read_frame()?;
        decode(frame)
    }
}

/// Decode one conversion frame
pub fn decode(frame: u32) -> Result<RawReading, SensorError> {
    // A floating MISO reads all ones and trips the reserved bits
    if frame & RESERVED_MASK != 0 {
        return Err(SensorError::InvalidFrame);
    }

    let thermocouple = ((frame as i32) >> 18) as f32 * 0.25;
    let internal = (((frame << 16) as i32) >> 20) as f32 * 0.0625;

    let mut fault_bits = 0;
    if frame & FAULT_FLAG != 0 {
        if frame & BIT_OC != 0 {
            fault_bits |= FAULT_OPEN_CIRCUIT;
        }
        if frame & BIT_SCG != 0 {
            fault_bits |= FAULT_SHORT_TO_GROUND;
        }
        if frame & BIT_SCV != 0 {
            fault_bits |= FAULT_SHORT_TO_VCC;
        }
    }

    Ok(RawReading {
        celsius: thermocouple,
        internal_celsius: internal,
        fault_bits,
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    struct MockSpi {
        frames: Vec<[u8; 4]>,
        fail: bool,
    }

    impl SpiBus for MockSpi {
        type Error = ();

        fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(());
            }
            let frame = self.frames.remove(0);
            buf.copy_from_slice(&frame);
            Ok(())
        }

        fn write(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct MockCs {
        high: bool,
        selects: u32,
    }

    impl OutputPin for MockCs {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.selects += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    fn sensor(frames: &[u32]) -> Max31855<MockSpi, MockCs> {
        Max31855::new(
            MockSpi {
                frames: frames.iter().map(|f| f.to_be_bytes()).collect(),
                fail: false,
            },
            MockCs {
                high: false,
                selects: 0,
            },
        )
    }

    #[test]
    fn test_decode_datasheet_values() {
        // +1600.00°C thermocouple, +127.0000°C junction
        let frame = (0x1900 << 18) | (0x7F0 << 4);
        let reading = decode(frame).unwrap();
        assert_eq!(reading.celsius, 1600.0);
        assert_eq!(reading.internal_celsius, 127.0);
        assert_eq!(reading.fault_bits, 0);

        // +25.00°C thermocouple, +25.0000°C junction
        let frame = (0x0064 << 18) | (0x190 << 4);
        let reading = decode(frame).unwrap();
        assert_eq!(reading.celsius, 25.0);
        assert_eq!(reading.internal_celsius, 25.0);
    }

    #[test]
    fn test_decode_negative() {
        // -0.25°C thermocouple, -0.0625°C junction
        let frame = (0x3FFF << 18) | (0xFFF << 4);
        let reading = decode(frame).unwrap();
        assert_eq!(reading.celsius, -0.25);
        assert_eq!(reading.internal_celsius, -0.0625);

        // -250.00°C thermocouple
        let frame = 0x3C18u32 << 18;
        assert_eq!(decode(frame).unwrap().celsius, -250.0);
    }

    #[test]
    fn test_decode_faults() {
        let junction = 0x190 << 4;

        let open = decode(FAULT_FLAG | BIT_OC | junction).unwrap();
        assert_eq!(open.fault_bits, FAULT_OPEN_CIRCUIT);
        assert_eq!(open.internal_celsius, 25.0);

        let shorted = decode(FAULT_FLAG | BIT_SCG | BIT_SCV).unwrap();
        assert_eq!(shorted.fault_bits, FAULT_SHORT_TO_GROUND | FAULT_SHORT_TO_VCC);

        // Fault bits without the summary flag are not reported
        assert_eq!(decode(BIT_OC).unwrap().fault_bits, 0);
    }

    #[test]
    fn test_floating_bus_rejected() {
        assert_eq!(decode(0xFFFF_FFFF), Err(SensorError::InvalidFrame));
    }

    #[test]
    fn test_read_toggles_chip_select() {
        let mut tc = sensor(&[(0x0064 << 18) | (0x190 << 4)]);
        assert!(tc.cs.is_set_high());

        let reading = tc.read().unwrap();
        assert_eq!(reading.celsius, 25.0);
        assert_eq!(tc.cs.selects, 1);
        assert!(tc.cs.is_set_high());
    }

    #[test]
    fn test_bus_error() {
        let mut tc = sensor(&[]);
        tc.spi.fail = true;

        assert_eq!(tc.read(), Err(SensorError::Bus));
        // CS released even on failure
        assert!(tc.cs.is_set_high());
    }
}
