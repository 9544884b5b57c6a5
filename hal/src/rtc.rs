//! # Real time clock (RTC)
//!
//! The real time clock uses the low frequency external oscillator in order to measure wall time,
//! so it keeps counting while the MCU is in STOP.
//!
//! Bringing the RTC up (LSE, clock selection, prescalers) is left to `stm32l0xx-hal`. The
//! [`Calendar`] takes ownership of the HAL's [`Rtc`] so nothing else can touch the peripheral and
//! then works on the registers directly, as the HAL has no alarm support.
//!
//! Note that the RTC uses 24 hour notation and stores the year as two BCD digits.
//!
//! ## Alarms
//!
//! Alarm A is used as a one-shot wake up. It is set to match the date (day of the month), hours,
//! minutes and seconds; the sub-seconds are masked out. When it fires the `ALRAF` flag is raised
//! and, through EXTI line 17, the `RTC` interrupt.

use hygrometer_core::config::RTC_BASE_YEAR;
use hygrometer_core::time::{alarm_register, decode_calendar, ensure_ahead};
use hygrometer_core::{AlarmProgramError, CalendarTime, TimeReadError, TimeSource};
use stm32l0xx_hal::pac::{self, rtc::RegisterBlock};
use stm32l0xx_hal::rtc::Rtc;

// ISR bits
const ISR_ALRAWF: u32 = 1 << 0;
const ISR_INITS: u32 = 1 << 4;
const ISR_ALRAF: u32 = 1 << 8;

/// The `rc_w0` flags of ISR: RSF and ALRAF through TAMP3F
const ISR_RC_W0: u32 = 1 << 5 | 0xFF << 8;

/// Polls of `ALRAWF` before giving up. The flag is set within 2 RTCCLK cycles (~61 μs) which is
/// a handful of cycles at the system clock.
const ALRAWF_POLLS: u32 = 1_000;

fn regs() -> &'static RegisterBlock {
    // The `Calendar` owns the RTC, so it is the only one accessing these registers. The exception
    // is `acknowledge_alarm` which only ever writes a single flag.
    unsafe { &*pac::RTC::ptr() }
}

/// Acknowledge a fired alarm, returning whether alarm A was the interrupt source.
///
/// This is meant to be called from the `RTC` interrupt handler. It only writes zero to `ALRAF`
/// (writing one to the other `rc_w0` flags has no effect) so it can't race the control loop.
pub fn acknowledge_alarm() -> bool {
    let rtc = regs();

    if rtc.isr.read().bits() & ISR_ALRAF == 0 {
        return false;
    }

    clear_alarm_flag(rtc);
    true
}

/// Clear `ALRAF` without a read-modify-write of `ISR`.
///
/// The other flags are written as one which leaves them untouched, and `INIT` as zero which
/// keeps the RTC in run mode.
fn clear_alarm_flag(rtc: &RegisterBlock) {
    rtc.isr
        .write(|w| unsafe { w.bits(ISR_RC_W0 & !ISR_ALRAF) });
}

/// Calendar and alarm access to the RTC
pub struct Calendar {
    _rtc: Rtc,
}

impl Calendar {
    /// Take over the RTC after `stm32l0xx-hal` has brought it up
    pub fn new(rtc: Rtc) -> Self {
        let mut calendar = Self { _rtc: rtc };

        calendar.unlocked(|rtc| {
            // Bypass the shadow registers. This is required due to the low APB1 clock speed
            rtc.cr.modify(|_, w| w.bypshad().set_bit());
        });

        calendar
    }

    /// Execute closure with the RTC registers write enabled
    fn unlocked<R>(&mut self, f: impl FnOnce(&RegisterBlock) -> R) -> R {
        let rtc = regs();

        rtc.wpr.write(|w| w.key().bits(0xCA));
        rtc.wpr.write(|w| w.key().bits(0x53));

        let result = f(rtc);

        // Any wrong key locks the registers again
        rtc.wpr.write(|w| w.key().bits(0xFF));

        result
    }

    /// Read the time and date registers.
    ///
    /// As the shadow registers are bypassed, a clock tick can occur in between reading TR and DR.
    /// If the time register changed across the reads the pair is read again; a third read will
    /// definitely give a consistent result.
    fn read_registers(&self) -> (u32, u32) {
        let rtc = regs();

        let first = rtc.tr.read().bits();
        let date = rtc.dr.read().bits();
        let second = rtc.tr.read().bits();

        if first == second {
            return (second, date);
        }

        (rtc.tr.read().bits(), rtc.dr.read().bits())
    }
}

impl TimeSource for Calendar {
    fn now(&mut self) -> Result<CalendarTime, TimeReadError> {
        if regs().isr.read().bits() & ISR_INITS == 0 {
            return Err(TimeReadError::NotInitialised);
        }

        let (tr, dr) = self.read_registers();

        decode_calendar(tr, dr, RTC_BASE_YEAR).ok_or(TimeReadError::InvalidCalendar)
    }

    fn program_alarm(&mut self, target: CalendarTime) -> Result<(), AlarmProgramError> {
        let alarm = alarm_register(&target);

        self.unlocked(|rtc| {
            // Disable alarm A and wait for its registers to become writable
            rtc.cr
                .modify(|_, w| w.alrae().clear_bit().alraie().clear_bit());

            let mut polls = 0;
            while rtc.isr.read().bits() & ISR_ALRAWF == 0 {
                polls += 1;
                if polls == ALRAWF_POLLS {
                    return Err(AlarmProgramError::WriteTimeout);
                }
            }

            rtc.alrmar.write(|w| unsafe { w.bits(alarm) });
            // MASKSS = 0, sub-seconds aren't compared
            rtc.alrmassr.write(|w| unsafe { w.bits(0) });

            if rtc.alrmar.read().bits() != alarm {
                return Err(AlarmProgramError::Readback);
            }

            // An alarm which already fired must not wake us straight away
            clear_alarm_flag(rtc);

            rtc.cr.modify(|_, w| w.alraie().set_bit().alrae().set_bit());

            Ok(())
        })?;

        // The clock may have reached the target while the alarm was being armed, in which case it
        // would only match again next month
        let now = self.now();
        ensure_ahead(target, now).map_err(|e| {
            self.clear_alarm();
            e
        })
    }

    fn clear_alarm(&mut self) {
        self.unlocked(|rtc| {
            rtc.cr
                .modify(|_, w| w.alrae().clear_bit().alraie().clear_bit());
            clear_alarm_flag(rtc);
        });
    }
}
