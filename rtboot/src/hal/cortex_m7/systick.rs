use self::reg::syst::Syst;

/// Stop the counter if an earlier boot stage left it running.
///
/// Returns whether it was running.
#[inline(always)]
pub fn disable_if_enabled(syst: &Syst) -> bool {
    let enabled = syst.csr.get().enable();
    if enabled {
        syst.csr.update()
            .set_enable(false);
    }
    enabled
}

pub mod reg {
    use ioreg_proc::ioregs;
    ioregs!(SYST @ 0xE000_E010 = {
        0x0 => reg32 csr {
            0  => enable,
            1  => tickint,
            2  => clksource {
                0 => External,
                1 => Core,
            },
            16 => countflag: ro,
        },
        0x4 => reg32 rvr {
            0..23 => reload,
        },
        0x8 => reg32 cvr {
            0..23 => current,
        },
        0xc => reg32 calib {
            0..23 => tenms: ro,
            30    => skew: ro,
            31    => noref: ro,
        },
    });
}
