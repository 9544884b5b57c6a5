//! # Humidity sensor
//!
//! Driver for the Sensirion SHT4x family.
//!
//! A measurement is a single command byte written to the sensor followed, after the conversion
//! time, by a six byte read:
//!
//! ```txt
//! | T msb | T lsb | T crc | RH msb | RH lsb | RH crc |
//! ```
//!
//! Each 16 bit word is followed by a CRC-8 of that word. Both CRCs have to match for the
//! response to be accepted, even though only the humidity is used.
//!
//! ## Conversion
//!
//! The datasheet gives `RH = -6 + 125 * raw / 65535` in percent. This is evaluated in hundredths
//! of a percent using integer arithmetic, clamped to the physical range and rounded to the
//! nearest whole percent.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Read, Write};
use thiserror_no_std::Error;

use crate::config::{CONVERSION_DELAY_MS, MEASURE_HIGH_PRECISION};

const CRC_POLYNOMIAL: u8 = 0x31;
const CRC_INIT: u8 = 0xFF;

/// Sensirion CRC-8: polynomial 0x31, initial value 0xFF, MSB first, no final XOR
pub const fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC_INIT;
    let mut i = 0;

    while i < data.len() {
        crc ^= data[i];

        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }

        i += 1;
    }

    crc
}

/// Relative humidity in whole percent (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Humidity(u8);

impl Humidity {
    pub const MIN: Humidity = Humidity(0);
    pub const MAX: Humidity = Humidity(100);

    pub const fn new(percent: u8) -> Option<Self> {
        if percent <= 100 {
            Some(Self(percent))
        } else {
            None
        }
    }

    /// Convert a raw sensor count into a humidity
    pub const fn from_raw(raw: u16) -> Self {
        let hundredths = (12500 * raw as i32) / 65535 - 600;

        let clamped = if hundredths < 0 {
            0
        } else if hundredths > 10000 {
            10000
        } else {
            hundredths
        };

        Self(((clamped + 50) / 100) as u8)
    }

    pub const fn percent(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The I2C write or read failed
    #[error("sensor bus transfer failed")]
    Comm,
    /// One of the response words failed its checksum
    #[error("sensor response failed CRC check")]
    Crc,
}

/// A source of humidity readings
pub trait HumiditySensor {
    fn read_humidity(&mut self) -> Result<Humidity, SensorError>;
}

/// Validate a measurement response and extract the raw humidity count
fn parse_response(response: &[u8; 6]) -> Result<u16, SensorError> {
    let [t_msb, t_lsb, t_crc, rh_msb, rh_lsb, rh_crc] = *response;

    if crc8(&[t_msb, t_lsb]) != t_crc || crc8(&[rh_msb, rh_lsb]) != rh_crc {
        return Err(SensorError::Crc);
    }

    Ok(u16::from_be_bytes([rh_msb, rh_lsb]))
}

/// SHT4x on an I2C bus
pub struct Sht4x<I2C, D> {
    i2c: I2C,
    address: u8,
    delay: D,
}

impl<I2C, D> Sht4x<I2C, D>
where
    I2C: Write + Read,
    D: DelayMs<u32>,
{
    pub fn new(i2c: I2C, address: u8, delay: D) -> Self {
        Self {
            i2c,
            address,
            delay,
        }
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Run a high precision measurement and return the raw humidity count
    pub fn measure_raw(&mut self) -> Result<u16, SensorError> {
        self.i2c
            .write(self.address, &[MEASURE_HIGH_PRECISION])
            .map_err(|_| {
                warn!("sensor: measure command not acknowledged");
                SensorError::Comm
            })?;

        self.delay.delay_ms(CONVERSION_DELAY_MS);

        let mut response = [0; 6];
        self.i2c.read(self.address, &mut response).map_err(|_| {
            warn!("sensor: reading measurement failed");
            SensorError::Comm
        })?;

        parse_response(&response)
    }
}

impl<I2C, D> HumiditySensor for Sht4x<I2C, D>
where
    I2C: Write + Read,
    D: DelayMs<u32>,
{
    fn read_humidity(&mut self) -> Result<Humidity, SensorError> {
        let raw = self.measure_raw()?;
        trace!("sensor: raw humidity {=u16}", raw);

        Ok(Humidity::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embedded_hal_mock::eh0::delay::NoopDelay;
    use embedded_hal_mock::eh0::i2c::{Mock as I2cMock, Transaction};
    use embedded_hal_mock::eh0::MockError;
    use std::io::ErrorKind;

    const ADDR: u8 = 0x44;

    /// A well formed response carrying the given raw words
    fn response(temperature: u16, humidity: u16) -> Vec<u8> {
        let [t_msb, t_lsb] = temperature.to_be_bytes();
        let [rh_msb, rh_lsb] = humidity.to_be_bytes();

        vec![
            t_msb,
            t_lsb,
            crc8(&[t_msb, t_lsb]),
            rh_msb,
            rh_lsb,
            crc8(&[rh_msb, rh_lsb]),
        ]
    }

    fn sensor(expectations: &[Transaction]) -> Sht4x<I2cMock, NoopDelay> {
        Sht4x::new(I2cMock::new(expectations), ADDR, NoopDelay::new())
    }

    #[test]
    fn crc_reference_vectors() {
        // From the datasheet
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
        assert_eq!(crc8(&[0x00, 0x00]), 0x81);
        assert_eq!(crc8(&[]), 0xFF);
    }

    #[test]
    fn conversion_limits() {
        assert_eq!(Humidity::from_raw(0), Humidity::MIN);
        assert_eq!(Humidity::from_raw(u16::MAX), Humidity::MAX);
    }

    #[test]
    fn conversion_thresholds() {
        // 12500 * 3145 / 65535 = 599, just below 0 %
        assert_eq!(Humidity::from_raw(3145).percent(), 0);
        // 12500 * 3146 / 65535 = 600, exactly 0 %
        assert_eq!(Humidity::from_raw(3146).percent(), 0);
        // 12500 * 55574 / 65535 = 10600, exactly 100 %
        assert_eq!(Humidity::from_raw(55574).percent(), 100);
        // 99.99 % rounds up without exceeding 100
        assert_eq!(Humidity::from_raw(55573).percent(), 100);
        assert_eq!(Humidity::from_raw(55575).percent(), 100);
    }

    #[test]
    fn conversion_midpoint_rounds_to_nearest() {
        // -6 + 125 * 0.5 = 56.5
        assert_eq!(Humidity::from_raw(0x8000).percent(), 57);
        // 12500 * 10000 / 65535 - 600 = 1307, 13.07 %
        assert_eq!(Humidity::from_raw(10000).percent(), 13);
    }

    #[test]
    fn conversion_stays_in_range() {
        for raw in (0..=u16::MAX).step_by(7) {
            assert!(Humidity::from_raw(raw).percent() <= 100);
        }
    }

    #[test]
    fn humidity_new_rejects_over_100() {
        assert_eq!(Humidity::new(100), Some(Humidity::MAX));
        assert_eq!(Humidity::new(101), None);
    }

    #[test]
    fn measure() {
        let expectations = [
            Transaction::write(ADDR, vec![MEASURE_HIGH_PRECISION]),
            Transaction::read(ADDR, response(0x6666, 0x8000)),
        ];

        let mut sht = sensor(&expectations);
        assert_eq!(sht.read_humidity(), Ok(Humidity::new(57).unwrap()));

        let (mut i2c, _) = sht.release();
        i2c.done();
    }

    #[test]
    fn write_error_is_comm_error() {
        let expectations = [Transaction::write(ADDR, vec![MEASURE_HIGH_PRECISION])
            .with_error(MockError::Io(ErrorKind::Other))];

        let mut sht = sensor(&expectations);
        assert_eq!(sht.read_humidity(), Err(SensorError::Comm));

        let (mut i2c, _) = sht.release();
        i2c.done();
    }

    #[test]
    fn read_error_is_comm_error() {
        let expectations = [
            Transaction::write(ADDR, vec![MEASURE_HIGH_PRECISION]),
            Transaction::read(ADDR, vec![0; 6]).with_error(MockError::Io(ErrorKind::Other)),
        ];

        let mut sht = sensor(&expectations);
        assert_eq!(sht.read_humidity(), Err(SensorError::Comm));

        let (mut i2c, _) = sht.release();
        i2c.done();
    }

    #[test]
    fn humidity_crc_mismatch() {
        let mut bytes = response(0x6666, 0x8000);
        bytes[5] ^= 0x01;

        let expectations = [
            Transaction::write(ADDR, vec![MEASURE_HIGH_PRECISION]),
            Transaction::read(ADDR, bytes),
        ];

        let mut sht = sensor(&expectations);
        assert_eq!(sht.read_humidity(), Err(SensorError::Crc));

        let (mut i2c, _) = sht.release();
        i2c.done();
    }

    #[test]
    fn temperature_crc_mismatch_rejects_whole_response() {
        // Humidity word is fine, but a partially valid response is never accepted
        let mut bytes = response(0x6666, 0x8000);
        bytes[2] ^= 0xFF;

        let expectations = [
            Transaction::write(ADDR, vec![MEASURE_HIGH_PRECISION]),
            Transaction::read(ADDR, bytes),
        ];

        let mut sht = sensor(&expectations);
        assert_eq!(sht.read_humidity(), Err(SensorError::Crc));

        let (mut i2c, _) = sht.release();
        i2c.done();
    }

    #[test]
    fn parse_reference_response() {
        assert_eq!(parse_response(&[0xBE, 0xEF, 0x92, 0x00, 0x00, 0x81]), Ok(0x0000));
        assert_eq!(
            parse_response(&[0x00, 0x00, 0x81, 0xBE, 0xEF, 0x92]),
            Ok(0xBEEF)
        );
    }
}
