//! # Hygrometer HAL
//!
//! A hardware abstraction library for my stm32l0x3 based hygrometer.
//!
//! ---
//!
//! This library implements the hardware side of the traits in `hygrometer-core` on top of
//! `stm32l0xx-hal`, dropping down to the registers where the HAL doesn't reach (the RTC alarm
//! and the LCD). The primary goal is to ensure as low power consumption as possible.
//!
//! - The MCU spends nearly all of its time in STOP with the regulator in low power mode and the
//!   internal reference switched off (ultra low power)
//! - The system clock runs off the multispeed internal oscillator (MSI) which is set to 65.536
//!   kHz
//! - The LCD and RTC are clocked by the external 32.768 kHz crystal (LSE) so they can continue
//!   running when the MSI is stopped

#![no_std]

pub mod lcd;
pub mod rtc;
pub mod system;

pub use lcd::Lcd;
pub use rtc::Calendar;
pub use system::{Board, CycleDelay, I2C_FREQUENCY_HZ, SYSCLK_HZ};

pub use stm32l0xx_hal::pac;
