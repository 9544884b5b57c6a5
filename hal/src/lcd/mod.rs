//! # Liquid crystal display (LCD)
//!
//! The glass is driven by the MCU's LCD controller, clocked from the LSE through the RTC clock
//! selection, so it keeps its picture while the core is in STOP. The segment RAM is only written
//! when there's something new to show.

pub mod digit;
pub mod segment;

use self::segment::{Segments, BLANK};
use hygrometer_core::{Display, Humidity};
use stm32l0xx_hal::pac::{self, GPIOA, GPIOB, LCD, SYSCFG};

/// APB1ENR/APB1SMENR LCD bit
const RCC_LCDEN: u32 = 1 << 9;

/// COM0-2 and the segment lines in use on port A
const PORTA_PINS: [u8; 7] = [3, 6, 7, 8, 9, 10, 15];

/// Segment lines in use on port B
const PORTB_PINS: [u8; 12] = [0, 1, 3, 4, 5, 8, 10, 11, 12, 13, 14, 15];

/// MODER value and mask which switch `pins` to their alternate function
const fn alternate_mode(pins: &[u8]) -> (u32, u32) {
    let mut mask = 0;
    let mut value = 0;
    let mut i = 0;

    while i < pins.len() {
        mask |= 0b11 << (pins[i] * 2);
        value |= 0b10 << (pins[i] * 2);
        i += 1;
    }

    (mask, value)
}

/// Liquid crystal display
pub struct Lcd(LCD);

impl Lcd {
    /// Configure the LCD.
    ///
    /// This needs to happen before the GPIO ports are split by the HAL, as the pins used by the
    /// glass are never handed out.
    pub fn configure(
        lcd: LCD,
        syscfg: &mut SYSCFG,
        gpioa: &mut GPIOA,
        gpiob: &mut GPIOB,
    ) -> Self {
        // RCC belongs to the HAL. These bits aren't managed by it.
        let rcc = unsafe { &*pac::RCC::ptr() };

        rcc.iopenr
            .modify(|_, w| w.iopaen().enabled().iopben().enabled());
        rcc.apb2enr.modify(|_, w| w.syscfgen().enabled());

        rcc.apb1enr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_LCDEN) });

        // Keep the LCD clocked during sleep
        rcc.apb1smenr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_LCDEN) });

        let (mask, value) = alternate_mode(&PORTA_PINS);
        gpioa
            .moder
            .modify(|r, w| unsafe { w.bits(r.bits() & !mask | value) });

        let (mask, value) = alternate_mode(&PORTB_PINS);
        gpiob
            .moder
            .modify(|r, w| unsafe { w.bits(r.bits() & !mask | value) });

        // Configure comm pins
        gpioa
            .afrh
            .modify(|_, w| w.afsel8().af1().afsel9().af1().afsel10().af1());

        // Configure segment pins
        gpioa
            .afrl
            .modify(|_, w| w.afsel3().af1().afsel6().af1().afsel7().af1());

        gpioa.afrh.modify(|_, w| w.afsel15().af1());

        gpiob.afrl.modify(|_, w| {
            w.afsel0()
                .af1()
                .afsel1()
                .af1()
                .afsel3()
                .af1()
                .afsel4()
                .af1()
                .afsel5()
                .af1()
        });

        gpiob.afrh.modify(|_, w| {
            w.afsel8()
                .af1()
                .afsel10()
                .af1()
                .afsel11()
                .af1()
                .afsel12()
                .af1()
                .afsel13()
                .af1()
                .afsel14()
                .af1()
                .afsel15()
                .af1()
        });

        // Enable VLCD2 decouple capacitor on PB2
        syscfg
            .cfgr2
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0x1F << 1)) | (1 << 1)) });

        // Configure the LCD frame control register
        //
        // * Set the frame rate to 31.03 Hz
        // * Set the LCD voltage to 3.12v
        lcd.fcr
            .write(|w| unsafe { w.ps().bits(4).div().bits(6).cc().bits(4).pon().bits(1) });

        // Configure the LCD control register
        //
        // * Set bias to 1/2
        // * Set duty to 1/3
        // * Use internal voltage source
        // * Enable LCD module
        lcd.cr.write(|w| unsafe {
            w.bias()
                .bits(0b001)
                .duty()
                .bits(0b010)
                .vsel()
                .clear_bit()
                .lcden()
                .set_bit()
        });

        let mut lcd = Self(lcd);
        lcd.clear();
        lcd
    }

    /// Write segments to the LCD
    pub fn write(&mut self, seg: Segments) {
        const MASK: u128 = u32::MAX as u128;

        // The previous update request must have completed before the RAM is touched
        while self.0.sr.read().udr().bit_is_set() {}

        // This is safe assuming that Segments has been correctly created
        unsafe {
            self.0.ram_com0.as_ptr().write((seg & MASK) as u32);
            self.0.ram_com1.as_ptr().write((seg >> 32 & MASK) as u32);
            self.0.ram_com2.as_ptr().write((seg >> 64 & MASK) as u32);
        }

        // Trigger a display update
        self.0.sr.modify(|_, w| w.udr().set_bit());
    }

    /// Turn off every segment
    pub fn clear(&mut self) {
        self.write(BLANK);
    }
}

impl Display for Lcd {
    fn show_humidity(&mut self, humidity: Humidity) {
        defmt::debug!("lcd: {}%", humidity.percent());
        self.write(digit::percent(humidity.percent()));
    }

    fn show_error(&mut self) {
        defmt::debug!("lcd: error");
        self.write(digit::ERROR);
    }
}
