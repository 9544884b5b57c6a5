//! # Control loop
//!
//! ```txt
//!            +---------+
//!            | Startup |
//!            +---------+
//!                 |
//!                 v
//!        +----------------+  time read failed   +---------------+
//!   +--> | SampleOrReuse  | ------------------> | FallbackDelay |
//!   |    +----------------+                     +---------------+
//!   |             |                              ^           |
//!   |             v        alarm program failed  |           |
//!   |    +----------------+ --------------------+            |
//!   |    |    Schedule    |                                  |
//!   |    +----------------+                                  |
//!   |             |                                          |
//!   |             v                                          |
//!   |    +----------------+                                  |
//!   +--- |    Sleeping    |                                  |
//!   |    +----------------+                                  |
//!   +--------------------------------------------------------+
//! ```
//!
//! There is no final state. When the RTC can't be read or armed the loop falls back to polling
//! with a short busy delay, giving up the power savings but never stopping.

use embedded_hal::blocking::delay::DelayMs;

use crate::calendar::CalendarTime;
use crate::config::FALLBACK_DELAY_MS;
use crate::display::Display;
use crate::power::{self, AlarmFlag, LowPower};
use crate::schedule::{self, ActiveWindow};
use crate::sensor::{Humidity, HumiditySensor};
use crate::time::TimeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Take the first sample unconditionally
    Startup,
    /// Read the time, then either sample or show the last reading again
    SampleOrReuse,
    /// Arm the alarm for the wake up following `now`
    Schedule(CalendarTime),
    /// Wait in STOP mode for the alarm
    Sleeping,
    /// The RTC failed; wait a little and try again without sleeping
    FallbackDelay,
}

pub struct Orchestrator<'a, T, H, S, P, D> {
    clock: T,
    sensor: H,
    display: S,
    power: P,
    delay: D,
    alarm: &'a AlarmFlag,
    window: ActiveWindow,
    last_humidity: Option<Humidity>,
    state: State,
}

impl<'a, T, H, S, P, D> Orchestrator<'a, T, H, S, P, D>
where
    T: TimeSource,
    H: HumiditySensor,
    S: Display,
    P: LowPower,
    D: DelayMs<u32>,
{
    pub fn new(
        clock: T,
        sensor: H,
        display: S,
        power: P,
        delay: D,
        alarm: &'a AlarmFlag,
        window: ActiveWindow,
    ) -> Self {
        Self {
            clock,
            sensor,
            display,
            power,
            delay,
            alarm,
            window,
            last_humidity: None,
            state: State::Startup,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The most recent successful reading, if there has been one
    pub fn last_humidity(&self) -> Option<Humidity> {
        self.last_humidity
    }

    /// Run the control loop forever
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// Perform the work of the current state and move to the next one
    pub fn step(&mut self) -> State {
        let next = match self.state {
            State::Startup => self.startup(),
            State::SampleOrReuse => self.sample_or_reuse(),
            State::Schedule(now) => self.schedule(now),
            State::Sleeping => self.sleep(),
            State::FallbackDelay => self.fallback(),
        };

        self.state = next;
        next
    }

    fn startup(&mut self) -> State {
        match self.sensor.read_humidity() {
            Ok(humidity) => {
                info!("startup: humidity {}", humidity);
                self.last_humidity = Some(humidity);
                self.display.show_humidity(humidity);
            }
            // Leave the display blank rather than showing an error straight away
            Err(e) => warn!("startup: first sample failed: {}", e),
        }

        State::SampleOrReuse
    }

    fn sample_or_reuse(&mut self) -> State {
        let now = match self.clock.now() {
            Ok(now) => now,
            Err(e) => {
                error!("rtc: read failed: {}", e);
                return State::FallbackDelay;
            }
        };

        if self.window.contains(&now) {
            match self.sensor.read_humidity() {
                Ok(humidity) => {
                    debug!("sample: humidity {}", humidity);
                    self.last_humidity = Some(humidity);
                    self.display.show_humidity(humidity);
                }
                Err(e) => {
                    warn!("sample: failed: {}", e);
                    self.display.show_error();
                }
            }
        } else if let Some(humidity) = self.last_humidity {
            // Outside the active window the bus is left alone
            self.display.show_humidity(humidity);
        }

        State::Schedule(now)
    }

    fn schedule(&mut self, now: CalendarTime) -> State {
        let next = schedule::next_wake(now, &self.window);

        // Cleared before arming so that an alarm firing straight after isn't lost
        self.alarm.clear();

        match self.clock.program_alarm(next) {
            Ok(()) => {
                info!("schedule: sleeping until {}", next);
                State::Sleeping
            }
            Err(e) => {
                error!("rtc: arming alarm failed: {}", e);
                State::FallbackDelay
            }
        }
    }

    fn sleep(&mut self) -> State {
        let wakes = power::sleep_until_alarm(&mut self.power, self.alarm);
        debug!("sleep: alarm after {=u32} wake ups", wakes);

        State::SampleOrReuse
    }

    fn fallback(&mut self) -> State {
        warn!("fallback: retrying in {=u32} ms", FALLBACK_DELAY_MS);

        // An alarm left armed would match a month later, in the middle of some other cycle
        self.clock.clear_alarm();
        self.delay.delay_ms(FALLBACK_DELAY_MS);

        State::SampleOrReuse
    }
}
