#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(target_os = "none")]
extern crate panic_halt;

#[cfg(target_os = "none")]
mod board;
#[cfg(target_os = "none")]
mod led;
#[cfg(target_os = "none")]
mod util;

#[cfg(target_os = "none")]
mod app {
    use cortex_m::peripheral::syst::SystClkSource;
    use cortex_m::peripheral::Peripherals;
    use cortex_m_rt::entry;
    use rtboot::hal::imxrt1064::system_clock;

    use crate::led;
    use crate::led::reg::gpio1::Gpio1;
    use crate::util;

    #[entry]
    fn main() -> ! {
        let core_clock = system_clock::system_core_clock_update();

        let mut peripherals = Peripherals::take().unwrap();
        peripherals.SYST.set_clock_source(SystClkSource::Core);
        peripherals.SYST.set_reload(core_clock / 1000 - 1);
        peripherals.SYST.clear_current();
        peripherals.SYST.enable_counter();

        let gpio = unsafe { Gpio1::iomem() };
        real_main(gpio, &mut peripherals)
    }

    fn real_main(gpio: &Gpio1, peripherals: &mut Peripherals) -> ! {
        loop {
            led::set(gpio, true);
            util::systick_wait(&mut peripherals.SYST, 500);
            led::set(gpio, false);
            util::systick_wait(&mut peripherals.SYST, 500);
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
