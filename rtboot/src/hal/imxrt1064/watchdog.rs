//! WDOG1/WDOG2 and RTWDOG shutdown.
//!
//! All three watchdogs can be running when the ROM hands over. WDOG1 and
//! WDOG2 also start a 16 s power-down counter at reset that asserts
//! `WDOG_B` unless `WMCR.PDE` is cleared.

use self::reg::rtwdog::Rtwdog;
use self::reg::wdog::Wdog;

/// Unlock key for a 32-bit `CNT` write (`CS.CMD32EN` set).
pub const RTWDOG_UPDATE_KEY: u32 = 0xD928_C520;
/// First half of the unlock key when `CNT` is written 16 bits at a time.
pub const RTWDOG_UPDATE_KEY_LOW: u32 = 0xC520;
/// Second half of the 16-bit unlock sequence.
pub const RTWDOG_UPDATE_KEY_HIGH: u32 = 0xD928;
/// Longest timeout `TOVAL` can hold.
pub const RTWDOG_MAX_TIMEOUT: u32 = 0xFFFF;

/// Stop the power-down counter. `PDE` is write-once, so this sticks.
#[inline(always)]
pub fn disable_power_down(wdog: &Wdog) {
    wdog.wmcr.update()
        .set_pde(false);
}

/// Clear `WCR.WDE` if it is set. `WDE` is write-once after reset; a
/// watchdog that never ran is left untouched.
#[inline(always)]
pub fn disable(wdog: &Wdog) {
    if wdog.wcr.get().wde() {
        wdog.wcr.update()
            .set_wde(false);
    }
}

/// Unlock the RTWDOG, stretch its timeout to the maximum and turn it off.
///
/// The unlock opens a short window for reconfiguration, so the three
/// stores below must follow each other directly.
#[cfg_attr(target_os = "none", link_section = ".init_text")]
pub fn disable_rtwdog(rtwdog: &Rtwdog) {
    if rtwdog.cs.get().cmd32en() {
        rtwdog.cnt.write()
            .set_value(RTWDOG_UPDATE_KEY);
    } else {
        rtwdog.cnt.write()
            .set_value(RTWDOG_UPDATE_KEY_LOW);
        rtwdog.cnt.write()
            .set_value(RTWDOG_UPDATE_KEY_HIGH);
    }
    rtwdog.toval.write()
        .set_value(RTWDOG_MAX_TIMEOUT);
    rtwdog.cs.update()
        .set_en(false)
        .set_update(true);
}

pub mod reg {
    use ioreg_proc::ioregs;

    ioregs!(WDOG = {
        0x0 => reg16 wcr {
            0     => wdzst,
            1     => wdbg,
            2     => wde,
            3     => wdt,
            4     => srs,
            5     => wda,
            6     => sre,
            7     => wdw,
            8..15 => wt,
        },
        0x2 => reg16 wsr {
            0..15 => wsr,
        },
        0x4 => reg16 wrsr {
            0 => sftw: ro,
            1 => tout: ro,
            4 => por: ro,
        },
        0x6 => reg16 wicr {
            0..7 => wict,
            14   => wtis: set_to_clear,
            15   => wie,
        },
        0x8 => reg16 wmcr {
            0 => pde,
        },
    });

    pub const WDOG1_BASE: usize = 0x400B_8000;
    pub const WDOG2_BASE: usize = 0x400D_0000;

    /// Unsafe: see `iomem()` on the blocks with a fixed location.
    #[inline(always)]
    pub unsafe fn wdog1() -> &'static wdog::Wdog {
        &*(WDOG1_BASE as *const wdog::Wdog)
    }

    #[inline(always)]
    pub unsafe fn wdog2() -> &'static wdog::Wdog {
        &*(WDOG2_BASE as *const wdog::Wdog)
    }

    ioregs!(RTWDOG @ 0x400B_C000 = {
        0x0 => reg32 cs {
            0     => stop,
            1     => wait,
            2     => dbg,
            3..4  => tst,
            5     => update,
            6     => int,
            7     => en,
            8..9  => clk {
                0 => BusClock,
                1 => LpoClock,
                2 => InternalClock,
                3 => ExternalClock,
            },
            10    => rcs: ro,
            11    => ulk: ro,
            12    => pres,
            13    => cmd32en,
            14    => flg: set_to_clear,
            15    => win,
        },
        0x4 => reg32 cnt {
            0..31 => value,
        },
        0x8 => reg32 toval {
            0..31 => value,
        },
        0xc => reg32 win {
            0..31 => value,
        },
    });
}
