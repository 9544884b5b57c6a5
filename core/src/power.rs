//! # Power control
//!
//! Between samples the MCU sits in STOP mode. The RTC alarm interrupt is the only thing which
//! should bring it back to the control loop, but any enabled interrupt will end STOP, so the
//! sleep is a loop: go back to STOP until the alarm interrupt has been seen.
//!
//! The interrupt handler and the control loop share a single [`AlarmFlag`]. The handler only ever
//! sets it, the control loop clears it right before arming the next sleep.

use core::sync::atomic::{AtomicBool, Ordering};

/// Set by the RTC alarm interrupt, consumed by the control loop
pub struct AlarmFlag(AtomicBool);

impl AlarmFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Mark the alarm as fired. Called from the interrupt handler.
    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for AlarmFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// The low power state of the MCU
pub trait LowPower {
    /// Stop any periodic tick so it can't wake the core
    fn suspend_tick(&mut self);

    /// Enter the deepest low power state that retains RAM, returning once any wake up source
    /// has fired
    fn enter_stop(&mut self);

    /// Restore the clock configuration and the tick after a wake up
    fn resume(&mut self);
}

/// Sleep until the alarm flag is set.
///
/// Wake ups which didn't set the flag put the core straight back to sleep. Returns the number of
/// times the core was woken, including the alarm itself.
pub fn sleep_until_alarm<P: LowPower>(power: &mut P, alarm: &AlarmFlag) -> u32 {
    let mut wakes = 0;

    while !alarm.is_set() {
        power.suspend_tick();
        power.enter_stop();
        power.resume();

        wakes += 1;

        if !alarm.is_set() {
            trace!("power: spurious wake up");
        }
    }

    wakes
}
