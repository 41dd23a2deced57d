//! System control block: vector table base, coprocessor access, cache
//! control bits.

use self::reg::scb::{cpacr, Scb};
use super::{dsb, isb};

/// Point VTOR at `table`. The table must be aligned to its size rounded up
/// to a power of two (1 KiB for the 256-entry RT1064 table).
#[inline(always)]
pub fn set_vector_offset(scb: &Scb, table: *const u32) {
    scb.vtor.write()
        .set_tbloff(table as usize as u32);
    dsb();
}

/// Grant full access to CP10 and CP11 (the FPU), leaving every other
/// coprocessor field as it was.
#[inline(always)]
pub fn enable_fpu(scb: &Scb) {
    scb.cpacr.update()
        .set_cp10(cpacr::Cp10::Full)
        .set_cp11(cpacr::Cp11::Full);
    dsb();
    isb();
}

#[inline(always)]
pub fn icache_enabled(scb: &Scb) -> bool {
    scb.ccr.get().ic()
}

#[inline(always)]
pub fn dcache_enabled(scb: &Scb) -> bool {
    scb.ccr.get().dc()
}

pub mod reg {
    use ioreg_proc::ioregs;
    ioregs!(SCB @ 0xE000_ED00 = {
        0x0 => reg32 cpuid {
            0..3   => revision: ro,
            4..15  => partno: ro,
            16..19 => architecture: ro,
            20..23 => variant: ro,
            24..31 => implementer: ro,
        },
        0x4 => reg32 icsr {
            0..31 => value,
        },
        0x8 => reg32 vtor {
            0..31 => tbloff,
        },
        0x14 => reg32 ccr {
            0  => nonbasethrdena,
            1  => usersetmpend,
            3  => unalign_trp,
            4  => div_0_trp,
            8  => bfhfnmign,
            9  => stkalign,
            16 => dc,
            17 => ic,
            18 => bp,
        },
        0x80 => reg32 ccsidr {
            0..2   => line_size: ro,
            3..12  => associativity: ro,
            13..27 => num_sets: ro,
        },
        0x84 => reg32 csselr {
            0    => ind {
                0 => Data,
                1 => Instruction,
            },
            1..3 => level,
        },
        0x88 => reg32 cpacr {
            20..21 => cp10 {
                0 => Denied,
                1 => Privileged,
                3 => Full,
            },
            22..23 => cp11 {
                0 => Denied,
                1 => Privileged,
                3 => Full,
            },
        },
    });
}
