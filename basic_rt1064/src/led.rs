//! EVK user LED (D18) on GPIO_AD_B0_09, active low.

use self::reg::gpio1::Gpio1;
use self::reg::user_led_pad::{mux_ctl, UserLedPad};

const LED_PIN: u32 = 9;

/// Route the pad to GPIO1_IO09 and make it an output, LED off.
pub fn configure(pad: &UserLedPad, gpio: &Gpio1) {
    pad.mux_ctl.write()
        .set_mux_mode(mux_ctl::MuxMode::Gpio1Io09);
    pad.pad_ctl.write()
        .set_dse(6)
        .set_speed(2)
        .set_pke(true);
    gpio.dr_set.write()
        .set_value(1 << LED_PIN);
    let outputs = gpio.gdir.get().value();
    gpio.gdir.write()
        .set_value(outputs | (1 << LED_PIN));
}

#[inline(always)]
pub fn set(gpio: &Gpio1, on: bool) {
    if on {
        gpio.dr_clear.write()
            .set_value(1 << LED_PIN);
    } else {
        gpio.dr_set.write()
            .set_value(1 << LED_PIN);
    }
}

pub mod reg {
    use ioreg_proc::ioregs;

    ioregs!(USER_LED_PAD @ 0x401F_80E0 = {
        0x0 => reg32 mux_ctl {
            0..3 => mux_mode {
                0 => Gpt2Capture1,
                1 => FlexCan2Rx,
                3 => Lpuart1Rx,
                5 => Gpio1Io09,
            },
            4    => sion,
        },
        0x1f0 => reg32 pad_ctl {
            0      => sre,
            3..5   => dse,
            6..7   => speed,
            11     => ode,
            12     => pke,
            13     => pue,
            14..15 => pus,
            16     => hys,
        },
    });

    ioregs!(GPIO1 @ 0x401B_8000 = {
        0x0  => reg32 dr {
            0..31 => value,
        },
        0x4  => reg32 gdir {
            0..31 => value,
        },
        0x8  => reg32 psr {
            0..31 => value: ro,
        },
        0x84 => reg32 dr_set {
            0..31 => value: wo,
        },
        0x88 => reg32 dr_clear {
            0..31 => value: wo,
        },
        0x8c => reg32 dr_toggle {
            0..31 => value: wo,
        },
    });
}
