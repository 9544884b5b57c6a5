use cortex_m::peripheral::{SCB, SYST};
use embedded_hal::blocking::delay::DelayMs;
use hygrometer_core::LowPower;
use stm32l0xx_hal::pac;
use stm32l0xx_hal::pwr::{PowerMode, StopModeConfig, PWR};
use stm32l0xx_hal::rcc::Rcc;

/// The system clock frequency (Hz)
pub const SYSCLK_HZ: u32 = 65_536;

/// The I2C bus clock (Hz). The I2C peripheral needs at least 4 kernel clocks per bus clock.
pub const I2C_FREQUENCY_HZ: u32 = SYSCLK_HZ / 8;

/// # System management
///
/// The general clock and power configuration is such that to provide ultra low power operation
///
/// * The system clock (MSI) is set to range 0 (~65.536 kHz)
/// * The voltage regulator switches to low power mode in STOP
/// * The internal voltage reference is turned off in STOP (ULP), and the MCU doesn't wait for it
///   to come back up when waking (FWU)
///
/// Note that the LPRUN mode isn't used as it would require a full reset after each wakeup from
/// stop. As the device is designed to constantly be entering and exiting stop mode, using
/// LPRUN isn't feasible.
pub struct Board {
    pwr: PWR,
    scb: SCB,
    rcc: Rcc,
    syst: SYST,
    tick_running: bool,
}

impl Board {
    pub fn configure(pwr: PWR, scb: SCB, rcc: Rcc, syst: SYST) -> Self {
        // The HAL owns PWR but doesn't expose the fast wakeup bit. Only FWU is modified.
        let regs = unsafe { &*pac::PWR::ptr() };
        regs.cr.modify(|_, w| w.fwu().set_bit());

        Self {
            pwr,
            scb,
            rcc,
            syst,
            tick_running: false,
        }
    }

    /// Put the system clock back on MSI range 0.
    ///
    /// Waking from STOP always lands on either MSI (at the range it was left at) or HSI16,
    /// depending on `STOPWUCK`.
    fn restore_clocks(&mut self) {
        // RCC belongs to the HAL's `Rcc`, which is held by `self`
        let rcc = unsafe { &*pac::RCC::ptr() };

        rcc.icscr.modify(|_, w| w.msirange().range0());
        rcc.cfgr.modify(|_, w| w.sw().msi());

        while !rcc.cfgr.read().sws().is_msi() {}
    }
}

impl LowPower for Board {
    fn suspend_tick(&mut self) {
        self.tick_running = self.syst.is_counter_enabled();

        self.syst.disable_interrupt();
        self.syst.disable_counter();
    }

    fn enter_stop(&mut self) {
        self.pwr
            .stop_mode(
                &mut self.scb,
                &mut self.rcc,
                StopModeConfig {
                    ultra_low_power: true,
                },
            )
            .enter();
    }

    fn resume(&mut self) {
        self.restore_clocks();

        if self.tick_running {
            self.syst.clear_current();
            self.syst.enable_counter();
            self.syst.enable_interrupt();
        }
    }
}

/// Blocking delay counting core cycles.
///
/// SysTick is left alone so that it is never running when the core goes into STOP.
#[derive(Clone, Copy)]
pub struct CycleDelay {
    cycles_per_ms: u32,
}

impl CycleDelay {
    pub const fn new(sysclk_hz: u32) -> Self {
        Self {
            cycles_per_ms: sysclk_hz / 1000,
        }
    }
}

impl DelayMs<u32> for CycleDelay {
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            cortex_m::asm::delay(self.cycles_per_ms);
        }
    }
}
