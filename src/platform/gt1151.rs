use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use glam::UVec2;

use crate::error::SensorError;
use crate::wake::TouchSensor;

const ADDRESS: u8 = 0x14;
const REG_PRODUCT_ID: u16 = 0x8140;
const REG_STATUS: u16 = 0x814E;
const REG_POINTS: u16 = 0x814F;
/// Status bit: a fresh report is waiting.
const STATUS_READY: u8 = 0x80;
const STATUS_COUNT_MASK: u8 = 0x0F;
/// Bytes per touch point record.
const POINT_BYTES: usize = 8;

/// Goodix GT1151 capacitive touch controller, as fitted to the Waveshare
/// 2.13" Touch e-Paper HAT.
pub struct Gt1151<I2C, INT, RST, DELAY> {
    i2c: I2C,
    int: INT,
    rst: RST,
    delay: DELAY,
    last: UVec2,
}

fn bus<E: core::fmt::Debug>(e: E) -> SensorError {
    SensorError::Bus(format!("{e:?}"))
}

impl<I2C, INT, RST, DELAY> Gt1151<I2C, INT, RST, DELAY>
where
    I2C: I2c,
    INT: InputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(i2c: I2C, int: INT, rst: RST, delay: DELAY) -> Self {
        Self {
            i2c,
            int,
            rst,
            delay,
            last: UVec2::ZERO,
        }
    }

    fn read(&mut self, reg: u16, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c.write_read(ADDRESS, &reg.to_be_bytes(), buf).map_err(bus)
    }

    fn write(&mut self, reg: u16, value: u8) -> Result<(), SensorError> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c.write(ADDRESS, &[hi, lo, value]).map_err(bus)
    }
}

impl<I2C, INT, RST, DELAY> TouchSensor for Gt1151<I2C, INT, RST, DELAY>
where
    I2C: I2c + Send,
    INT: InputPin + Send,
    RST: OutputPin + Send,
    DELAY: DelayNs + Send,
{
    fn initialize(&mut self) -> Result<(), SensorError> {
        self.rst.set_high().map_err(bus)?;
        self.delay.delay_ms(100);
        self.rst.set_low().map_err(bus)?;
        self.delay.delay_ms(100);
        self.rst.set_high().map_err(bus)?;
        self.delay.delay_ms(100);

        let mut id = [0u8; 4];
        self.read(REG_PRODUCT_ID, &mut id)?;
        if id == [0x00; 4] || id == [0xFF; 4] {
            return Err(SensorError::UnknownDevice(id));
        }
        log::info!("Touch controller id {:?}", String::from_utf8_lossy(&id));
        Ok(())
    }

    /// INT is pulled low while a report is pending.
    fn is_asserted(&mut self) -> Result<bool, SensorError> {
        self.int.is_low().map_err(bus)
    }

    /// First touch point of the pending report (or the previous point if
    /// none is ready). Always acknowledges the report.
    fn read_point(&mut self) -> Result<UVec2, SensorError> {
        let mut status = [0u8; 1];
        self.read(REG_STATUS, &mut status)?;
        let count = status[0] & STATUS_COUNT_MASK;
        if status[0] & STATUS_READY != 0 && count > 0 {
            let mut p = [0u8; POINT_BYTES];
            self.read(REG_POINTS, &mut p)?;
            self.last = UVec2::new(
                u16::from_le_bytes([p[1], p[2]]) as u32,
                u16::from_le_bytes([p[3], p[4]]) as u32,
            );
        }
        self.write(REG_STATUS, 0)?;
        Ok(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::convert::Infallible;

    use embedded_hal::i2c::Operation;

    /// Register file behind a 16-bit auto-incrementing pointer.
    #[derive(Default)]
    struct FakeI2c {
        regs: HashMap<u16, u8>,
        pointer: u16,
    }

    impl embedded_hal::i2c::ErrorType for FakeI2c {
        type Error = Infallible;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Infallible> {
            assert_eq!(address, ADDRESS);
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        self.pointer = u16::from_be_bytes([bytes[0], bytes[1]]);
                        for (i, b) in bytes[2..].iter().enumerate() {
                            self.regs.insert(self.pointer + i as u16, *b);
                        }
                    }
                    Operation::Read(buf) => {
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = self.regs.get(&(self.pointer + i as u16)).copied().unwrap_or(0);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct Line(bool);

    impl embedded_hal::digital::ErrorType for Line {
        type Error = Infallible;
    }

    impl InputPin for Line {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    impl OutputPin for Line {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0 = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0 = true;
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn controller(regs: &[(u16, u8)], int_high: bool) -> Gt1151<FakeI2c, Line, Line, NoDelay> {
        let i2c = FakeI2c {
            regs: regs.iter().copied().collect(),
            pointer: 0,
        };
        Gt1151::new(i2c, Line(int_high), Line(false), NoDelay)
    }

    #[test]
    fn initialize_reads_product_id() {
        let id = [(0x8140, b'1'), (0x8141, b'1'), (0x8142, b'5'), (0x8143, b'8')];
        let mut gt = controller(&id, true);
        gt.initialize().unwrap();
        assert!(gt.rst.0);
    }

    #[test]
    fn initialize_rejects_absent_controller() {
        let mut gt = controller(&[], true);
        assert!(matches!(gt.initialize(), Err(SensorError::UnknownDevice([0, 0, 0, 0]))));
    }

    #[test]
    fn int_low_means_asserted() {
        assert!(controller(&[], false).is_asserted().unwrap());
        assert!(!controller(&[], true).is_asserted().unwrap());
    }

    #[test]
    fn read_point_decodes_and_acknowledges() {
        // One point at (300, 70); x = 0x012C, y = 0x0046.
        let regs = [
            (REG_STATUS, STATUS_READY | 1),
            (REG_POINTS + 1, 0x2C),
            (REG_POINTS + 2, 0x01),
            (REG_POINTS + 3, 0x46),
            (REG_POINTS + 4, 0x00),
        ];
        let mut gt = controller(&regs, false);
        assert_eq!(gt.read_point().unwrap(), UVec2::new(300, 70));
        assert_eq!(gt.i2c.regs[&REG_STATUS], 0);

        // Nothing new: previous point, still acknowledged.
        assert_eq!(gt.read_point().unwrap(), UVec2::new(300, 70));
    }
}
