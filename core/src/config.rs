//! Compiled in configuration

use crate::schedule::ActiveWindow;

/// Sample every 2 minutes between 07:00 and 18:00, otherwise wake once a day at 07:00
pub const ACTIVE_WINDOW: ActiveWindow = ActiveWindow::new(7, 18, 2);

/// I2C address of the SHT4x-Axxx parts
pub const SENSOR_ADDRESS: u8 = 0x44;

/// Measure temperature and humidity with high repeatability
pub const MEASURE_HIGH_PRECISION: u8 = 0xFD;

/// Worst case high precision conversion time is 8.2 ms
pub const CONVERSION_DELAY_MS: u32 = 10;

/// How long to wait before trying again when the RTC can't be read or armed
pub const FALLBACK_DELAY_MS: u32 = 2000;

/// The RTC only stores the last two digits of the year
pub const RTC_BASE_YEAR: u16 = 2000;
