//! # Time source
//!
//! The real time clock as seen by the control loop: it can report the current calendar time and
//! arm a one-shot alarm for a future one.

use thiserror_no_std::Error;

use crate::calendar::CalendarTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeReadError {
    #[error("calendar has not been initialised")]
    NotInitialised,
    #[error("calendar registers hold an invalid date or time")]
    InvalidCalendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmProgramError {
    #[error("alarm registers did not become writable")]
    WriteTimeout,
    #[error("alarm registers did not latch the requested time")]
    Readback,
    #[error("alarm time was reached before the alarm was armed")]
    Passed,
}

pub trait TimeSource {
    /// Read the current calendar time
    fn now(&mut self) -> Result<CalendarTime, TimeReadError>;

    /// Arm a one-shot alarm for `target`.
    ///
    /// The alarm matches the day of the month, hour, minute and second of `target`; sub-seconds
    /// and the weekday are ignored. Any existing alarm is disabled and any pending alarm flag is
    /// cleared first, so an alarm that fired earlier can't cause an immediate wake up.
    fn program_alarm(&mut self, target: CalendarTime) -> Result<(), AlarmProgramError>;

    /// Disable the alarm
    fn clear_alarm(&mut self);
}

/// Check that an alarm armed for `target` can still fire, given the time read back once it was
/// enabled. A clock which can't be read counts as passed.
pub fn ensure_ahead(
    target: CalendarTime,
    now: Result<CalendarTime, TimeReadError>,
) -> Result<(), AlarmProgramError> {
    match now {
        Ok(now) if now < target => Ok(()),
        _ => Err(AlarmProgramError::Passed),
    }
}

/// Binary coded decimal to binary
const fn from_bcd(tens: u32, units: u32) -> u8 {
    (tens * 10 + units) as u8
}

/// Binary to binary coded decimal
const fn to_bcd(value: u8) -> u32 {
    ((value / 10) as u32) << 4 | (value % 10) as u32
}

/// Decode the RTC time (`TR`) and date (`DR`) registers.
///
/// The RTC uses 24 hour notation and stores the year as two BCD digits counted from
/// `base_year`. Returns `None` if the registers don't hold a valid calendar time.
///
/// ```txt
/// TR:  22 PM  21:20 HT  19:16 HU  14:12 MNT  11:8 MNU  6:4 ST  3:0 SU
/// DR:  23:20 YT  19:16 YU  15:13 WDU  12 MT  11:8 MU  5:4 DT  3:0 DU
/// ```
pub const fn decode_calendar(tr: u32, dr: u32, base_year: u16) -> Option<CalendarTime> {
    let hour = from_bcd(tr >> 20 & 0x3, tr >> 16 & 0xF);
    let minute = from_bcd(tr >> 12 & 0x7, tr >> 8 & 0xF);
    let second = from_bcd(tr >> 4 & 0x7, tr & 0xF);

    let year = from_bcd(dr >> 20 & 0xF, dr >> 16 & 0xF);
    let month = from_bcd(dr >> 12 & 0x1, dr >> 8 & 0xF);
    let day = from_bcd(dr >> 4 & 0x3, dr & 0xF);

    CalendarTime::new(base_year + year as u16, month, day, hour, minute, second)
}

/// Build the alarm A register (`ALRMAR`) value for `target`.
///
/// ```txt
///  31  30  29:28  27:24  23  22  21:20  19:16  15  14:12  11:8  7  6:4  3:0
/// MSK4 WDSEL DT    DU   MSK3 PM   HT     HU   MSK2  MNT   MNU MSK1 ST   SU
/// ```
///
/// All the masks are cleared (every field must match) and WDSEL is cleared so DT/DU hold the day
/// of the month.
pub const fn alarm_register(target: &CalendarTime) -> u32 {
    to_bcd(target.day()) << 24
        | to_bcd(target.hour()) << 16
        | to_bcd(target.minute()) << 8
        | to_bcd(target.second())
}
