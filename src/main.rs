#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _; // panic handler

use hygrometer_core::AlarmFlag;

/// Raised by the RTC alarm interrupt, consumed by the control loop
static ALARM: AlarmFlag = AlarmFlag::new();

#[rtic::app(
    device = stm32l0xx_hal::pac,
    dispatchers = []
)]
mod app {
    use embedded_time::rate::Hertz;
    use hygrometer_core::config::{ACTIVE_WINDOW, SENSOR_ADDRESS};
    use hygrometer_core::{Orchestrator, Sht4x};
    use hygrometer_hal::{Board, Calendar, CycleDelay, Lcd, I2C_FREQUENCY_HZ, SYSCLK_HZ};
    use stm32l0xx_hal::exti::{ConfigurableLine, Exti, TriggerEdge};
    use stm32l0xx_hal::gpio::gpiob::{PB6, PB7};
    use stm32l0xx_hal::gpio::{OpenDrain, Output};
    use stm32l0xx_hal::i2c::I2c;
    use stm32l0xx_hal::pac::I2C1;
    use stm32l0xx_hal::prelude::*;
    use stm32l0xx_hal::{pwr, rcc, rtc};

    type Bus = I2c<I2C1, PB7<Output<OpenDrain>>, PB6<Output<OpenDrain>>>;
    type Hygrometer = Orchestrator<'static, Calendar, Sht4x<Bus, CycleDelay>, Lcd, Board, CycleDelay>;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        hygrometer: Hygrometer,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        defmt::info!("init");

        let mut dp = cx.device;
        let cp = cx.core;

        // Set clock to MSI range 0 (low power consumption)
        let mut rcc = dp.RCC.freeze(rcc::Config::msi(rcc::MSIRange::Range0));

        let pwr = pwr::PWR::new(dp.PWR, &mut rcc);
        let mut exti = Exti::new(dp.EXTI);

        // Brings up the LSE and selects it for the RTC (and so the LCD)
        let rtc = rtc::Rtc::new(dp.RTC, &mut rcc, &pwr, None).unwrap();
        let calendar = Calendar::new(rtc);

        exti.listen_configurable(ConfigurableLine::RtcAlarm, TriggerEdge::Rising);

        let lcd = Lcd::configure(dp.LCD, &mut dp.SYSCFG, &mut dp.GPIOA, &mut dp.GPIOB);

        let gpiob = dp.GPIOB.split(&mut rcc);
        let scl = gpiob.pb6.into_open_drain_output();
        let sda = gpiob.pb7.into_open_drain_output();

        let i2c = dp.I2C1.i2c(sda, scl, Hertz(I2C_FREQUENCY_HZ), &mut rcc);
        let sensor = Sht4x::new(i2c, SENSOR_ADDRESS, CycleDelay::new(SYSCLK_HZ));

        let board = Board::configure(pwr, cp.SCB, rcc, cp.SYST);

        let hygrometer = Orchestrator::new(
            calendar,
            sensor,
            lcd,
            board,
            CycleDelay::new(SYSCLK_HZ),
            &super::ALARM,
            ACTIVE_WINDOW,
        );

        (Shared {}, Local { hygrometer })
    }

    #[idle(local = [hygrometer])]
    fn idle(cx: idle::Context) -> ! {
        defmt::info!("idle");

        cx.local.hygrometer.run()
    }

    #[task(binds = RTC)]
    fn rtc_alarm(_cx: rtc_alarm::Context) {
        if hygrometer_hal::rtc::acknowledge_alarm() {
            super::ALARM.signal();
        }

        Exti::unpend(ConfigurableLine::RtcAlarm);
    }
}
