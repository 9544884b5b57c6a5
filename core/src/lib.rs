//! # Hygrometer core
//!
//! The hardware independent half of the hygrometer firmware.
//!
//! ---
//!
//! The device reads an SHT4x humidity sensor, shows the value on the LCD and spends the rest of
//! its life in STOP mode. Rather than waking on a fixed tick, the RTC alarm is reprogrammed on
//! every cycle so that the device
//!
//! - wakes every few minutes during the active hours of the day, taking a fresh sample each time
//! - wakes exactly once outside of them, at the start of the next active window
//!
//! Everything with logic in it lives here so that it can be tested on the host: the calendar
//! arithmetic ([`calendar`]), the wake policy ([`schedule`]), the sensor protocol ([`sensor`]),
//! the sleep loop ([`power`]) and the control loop tying them together ([`app`]). The hardware
//! is reached through the [`TimeSource`], [`Display`] and [`LowPower`] traits plus the
//! `embedded-hal` I2C and delay traits.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod app;
pub mod calendar;
pub mod config;
pub mod display;
pub mod power;
pub mod schedule;
pub mod sensor;
pub mod time;

pub use app::{Orchestrator, State};
pub use calendar::CalendarTime;
pub use display::Display;
pub use power::{AlarmFlag, LowPower};
pub use schedule::{next_wake, ActiveWindow};
pub use sensor::{Humidity, HumiditySensor, SensorError, Sht4x};
pub use time::{AlarmProgramError, TimeReadError, TimeSource};
