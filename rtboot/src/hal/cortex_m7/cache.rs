//! L1 cache enable sequences.

use self::reg::cache::Cache;
use super::scb::reg::scb::{csselr, Scb};
use super::{dsb, isb};

/// Invalidate the whole I-cache, then turn it on.
#[cfg_attr(target_os = "none", link_section = ".init_text")]
pub fn enable_icache(scb: &Scb, cache: &Cache) {
    dsb();
    isb();
    cache.iciallu.write()
        .set_value(0);
    dsb();
    isb();
    scb.ccr.update()
        .set_ic(true);
    dsb();
    isb();
}

/// Invalidate every set/way of the L1 D-cache, then turn it on.
#[cfg_attr(target_os = "none", link_section = ".init_text")]
pub fn enable_dcache(scb: &Scb, cache: &Cache) {
    scb.csselr.write()
        .set_ind(csselr::Ind::Data)
        .set_level(0);
    dsb();

    let ccsidr = scb.ccsidr.get();
    let ways = ccsidr.associativity();
    let mut set = ccsidr.num_sets();
    loop {
        let mut way = ways;
        loop {
            cache.dcisw.write()
                .set_set(set as u16)
                .set_way(way as u8);
            if way == 0 {
                break;
            }
            way -= 1;
        }
        if set == 0 {
            break;
        }
        set -= 1;
    }
    dsb();

    scb.ccr.update()
        .set_dc(true);
    dsb();
    isb();
}

pub mod reg {
    use ioreg_proc::ioregs;
    ioregs!(CACHE @ 0xE000_EF50 = {
        0x00 => reg32 iciallu {
            0..31 => value: wo,
        },
        0x10 => reg32 dcisw {
            5..13  => set: wo,
            30..31 => way: wo,
        },
    });
}
