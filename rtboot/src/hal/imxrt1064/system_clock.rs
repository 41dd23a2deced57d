//! Core clock resolution.
//!
//! The ARM core runs off `AHB_CLK_ROOT`, which sits behind one glitchless
//! mux (`CBCDR.PERIPH_CLK_SEL`) choosing between two paths:
//!
//! * `periph_clk2`: PLL3 (USB1), the oscillator or PLL2 in bypass, divided
//!   by `PERIPH_CLK2_PODF + 1`;
//! * `pre_periph_clk`: PLL2 (system), one of its PFDs, or PLL1 (ARM) divided
//!   by `ARM_PODF + 1`.
//!
//! Either result is then divided by `AHB_PODF + 1`. [`ClockTree`] walks that
//! tree from the register contents; nothing here touches the hardware
//! configuration.
//!
//! Arithmetic is 32-bit and wraps on out-of-range register settings. Only
//! a zero divisor on the selected path faults.

use core::sync::atomic::{AtomicU32, Ordering};
use log::{debug, trace};

use self::reg::ccm::{cbcdr, cbcmr, Ccm};
use self::reg::ccm_analog::CcmAnalog;

/// Core clock assumed until the clock tree is first resolved.
pub const DEFAULT_SYSTEM_CLOCK: u32 = 600_000_000;

/// 24 MHz crystal on XTALI/XTALO.
pub const CPU_XTAL_CLK_HZ: u32 = 24_000_000;

/// Alternate PLL bypass input (CLK1_P/N). Not fitted on the RT1064 EVK.
pub const CPU_CLK1_HZ: u32 = 0;

/// Frequency of the core clock in Hz, as last resolved.
///
/// Starts at [`DEFAULT_SYSTEM_CLOCK`] and is only rewritten by
/// [`system_core_clock_update`]. Reprogramming the clock tree leaves it
/// stale until the next update.
#[export_name = "SystemCoreClock"]
pub static SYSTEM_CORE_CLOCK: AtomicU32 = AtomicU32::new(DEFAULT_SYSTEM_CLOCK);

/// Clock inputs that are not described by any register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Oscillators {
    pub xtal_hz: u32,
    pub clk1_hz: u32,
}

impl Oscillators {
    pub const DEFAULT: Oscillators = Oscillators {
        xtal_hz: CPU_XTAL_CLK_HZ,
        clk1_hz: CPU_CLK1_HZ,
    };
}

impl Default for Oscillators {
    fn default() -> Oscillators {
        Oscillators::DEFAULT
    }
}

/// Which side of the core clock mux is selected, and which source feeds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreClockPath {
    /// `periph_clk2`; `Err` carries a reserved selector value.
    PeriphClk2(Result<cbcmr::PeriphClk2Sel, u32>),
    PrePeriph(cbcmr::PrePeriphClkSel),
}

/// Read-only view of the registers that determine the core clock.
pub struct ClockTree<'a> {
    pub ccm: &'a Ccm,
    pub analog: &'a CcmAnalog,
    pub oscillators: Oscillators,
}

impl<'a> ClockTree<'a> {
    pub fn new(ccm: &'a Ccm, analog: &'a CcmAnalog, oscillators: Oscillators) -> ClockTree<'a> {
        ClockTree {
            ccm,
            analog,
            oscillators,
        }
    }

    #[inline(always)]
    fn xtal(&self) -> u32 {
        self.oscillators.xtal_hz
    }

    /// Frequency a bypassed PLL passes through for `BYPASS_CLK_SRC`.
    #[inline(always)]
    fn bypass_freq(&self, bypass_clk_src: u32) -> u32 {
        if bypass_clk_src == 0 {
            self.oscillators.xtal_hz
        } else {
            self.oscillators.clk1_hz
        }
    }

    /// PLL1 (ARM PLL) output.
    pub fn pll1_main_freq(&self) -> u32 {
        let pll = self.analog.pll_arm.get();
        if pll.bypass() {
            self.bypass_freq(pll.bypass_clk_src())
        } else {
            self.xtal().wrapping_mul(pll.div_select()) >> 1
        }
    }

    /// PLL2 (system PLL) output without the fractional part.
    fn pll2_integer_freq(&self) -> u32 {
        let pll = self.analog.pll_sys.get();
        if pll.bypass() {
            self.bypass_freq(pll.bypass_clk_src())
        } else {
            self.xtal().wrapping_mul(if pll.div_select() { 22 } else { 20 })
        }
    }

    /// PLL2 (system PLL) output.
    ///
    /// # Panics
    ///
    /// If the PLL is active and `PLL_SYS_DENOM` is zero.
    pub fn pll2_main_freq(&self) -> u32 {
        let integer = self.pll2_integer_freq();
        if self.analog.pll_sys.get().bypass() {
            return integer;
        }
        let num = self.analog.pll_sys_num.get().a() as u64;
        let denom = self.analog.pll_sys_denom.get().b() as u64;
        integer.wrapping_add((self.xtal() as u64 * num / denom) as u32)
    }

    /// PLL3 (USB1 PLL) main output, `pll3_sw_clk` when not switched away.
    pub fn pll3_sw_freq(&self) -> u32 {
        let pll = self.analog.pll_usb1.get();
        if pll.bypass() {
            self.bypass_freq(pll.bypass_clk_src())
        } else {
            self.xtal().wrapping_mul(if pll.div_select() { 22 } else { 20 })
        }
    }

    /// `periph_clk2_clk_root`.
    pub fn periph_clk2_freq(&self) -> u32 {
        let source = match self.ccm.cbcmr.get().periph_clk2_sel() {
            Ok(cbcmr::PeriphClk2Sel::Pll3Sw) => self.pll3_sw_freq(),
            Ok(cbcmr::PeriphClk2Sel::Osc) => self.xtal(),
            Ok(cbcmr::PeriphClk2Sel::Pll2Bypass) => self.pll2_integer_freq(),
            Err(_) => 0,
        };
        source / (self.ccm.cbcdr.get().periph_clk2_podf() + 1)
    }

    /// `pre_periph_clk`.
    ///
    /// # Panics
    ///
    /// If the selected PFD has a zero fraction, or PLL2 is selected with a
    /// zero `PLL_SYS_DENOM`.
    pub fn pre_periph_freq(&self) -> u32 {
        match self.ccm.cbcmr.get().pre_periph_clk_sel() {
            cbcmr::PrePeriphClkSel::Pll2 => self.pll2_main_freq(),
            cbcmr::PrePeriphClkSel::Pll2Pfd2 => {
                (self.pll2_main_freq() / self.analog.pfd_528.get().pfd2_frac()).wrapping_mul(18)
            }
            cbcmr::PrePeriphClkSel::Pll2Pfd0 => {
                (self.pll2_main_freq() / self.analog.pfd_528.get().pfd0_frac()).wrapping_mul(18)
            }
            cbcmr::PrePeriphClkSel::Pll1Divided => {
                self.pll1_main_freq() / (self.ccm.cacrr.get().arm_podf() + 1)
            }
        }
    }

    /// Source selected by the core clock mux.
    pub fn core_clock_path(&self) -> CoreClockPath {
        match self.ccm.cbcdr.get().periph_clk_sel() {
            cbcdr::PeriphClkSel::PeriphClk2 => {
                CoreClockPath::PeriphClk2(self.ccm.cbcmr.get().periph_clk2_sel())
            }
            cbcdr::PeriphClkSel::PrePeriphClk => {
                CoreClockPath::PrePeriph(self.ccm.cbcmr.get().pre_periph_clk_sel())
            }
        }
    }

    /// `periph_clk`, before the AHB divider.
    pub fn periph_freq(&self) -> u32 {
        match self.ccm.cbcdr.get().periph_clk_sel() {
            cbcdr::PeriphClkSel::PeriphClk2 => self.periph_clk2_freq(),
            cbcdr::PeriphClkSel::PrePeriphClk => self.pre_periph_freq(),
        }
    }

    /// Core clock in Hz. Zero means the tree selects a reserved source.
    pub fn core_clock_freq(&self) -> u32 {
        self.periph_freq() / (self.ccm.cbcdr.get().ahb_podf() + 1)
    }
}

impl ClockTree<'static> {
    /// The tree at its fixed bus addresses with the board oscillators.
    ///
    /// Unsafe for the same reason as `iomem()` on the blocks.
    pub unsafe fn iomem() -> ClockTree<'static> {
        ClockTree::new(Ccm::iomem(), CcmAnalog::iomem(), Oscillators::DEFAULT)
    }
}

/// Resolve the core clock from `tree` into `store` and return it.
pub fn update_core_clock(tree: &ClockTree, store: &AtomicU32) -> u32 {
    let path = tree.core_clock_path();
    trace!("core clock path {:?}", path);
    let freq = tree.core_clock_freq();
    if freq == 0 {
        debug!("core clock resolved to 0 Hz, reserved source selected");
    } else {
        debug!("core clock resolved to {} Hz", freq);
    }
    store.store(freq, Ordering::Relaxed);
    freq
}

/// Refresh [`SYSTEM_CORE_CLOCK`] from the live clock tree.
pub fn system_core_clock_update() -> u32 {
    let tree = unsafe { ClockTree::iomem() };
    update_core_clock(&tree, &SYSTEM_CORE_CLOCK)
}

/// Last resolved core clock in Hz.
#[inline(always)]
pub fn system_core_clock() -> u32 {
    SYSTEM_CORE_CLOCK.load(Ordering::Relaxed)
}

pub mod reg {
    use ioreg_proc::ioregs;

    ioregs!(CCM @ 0x400F_C000 = {
        0x0 => reg32 ccr {
            0..6   => oscnt,
            12     => cosc_en,
            21..26 => reg_bypass_count,
            27     => rbc_en,
        },
        0x8 => reg32 csr {
            0 => ref_en_b: ro,
            5 => camp2_ready: ro,
            8 => cosc_ready: ro,
        },
        0x10 => reg32 cacrr {
            0..2 => arm_podf,
        },
        0x14 => reg32 cbcdr {
            6      => semc_clk_sel,
            7      => semc_alt_clk_sel,
            8..9   => ipg_podf,
            10..12 => ahb_podf,
            16..18 => semc_podf,
            25     => periph_clk_sel {
                0 => PrePeriphClk,
                1 => PeriphClk2,
            },
            27..29 => periph_clk2_podf,
        },
        0x18 => reg32 cbcmr {
            4..5   => lpspi_clk_sel,
            12..13 => periph_clk2_sel {
                0 => Pll3Sw,
                1 => Osc,
                2 => Pll2Bypass,
            },
            14..15 => trace_clk_sel,
            18..19 => pre_periph_clk_sel {
                0 => Pll2,
                1 => Pll2Pfd2,
                2 => Pll2Pfd0,
                3 => Pll1Divided,
            },
            23..25 => lcdif_podf,
            26..28 => lpspi_podf,
        },
    });

    ioregs!(CCM_ANALOG @ 0x400D_8000 = {
        0x0 => reg32 pll_arm {
            0..6   => div_select,
            12     => powerdown,
            13     => enable,
            14..15 => bypass_clk_src,
            16     => bypass,
            19     => pllsel,
            31     => lock: ro,
        },
        0x10 => reg32 pll_usb1 {
            1      => div_select,
            6      => en_usb_clks,
            12     => power,
            13     => enable,
            14..15 => bypass_clk_src,
            16     => bypass,
            31     => lock: ro,
        },
        0x30 => reg32 pll_sys {
            0      => div_select,
            12     => powerdown,
            13     => enable,
            14..15 => bypass_clk_src,
            16     => bypass,
            18     => pfd_offset_en,
            31     => lock: ro,
        },
        0x40 => reg32 pll_sys_ss {
            0..14  => step,
            15     => enable,
            16..31 => stop,
        },
        0x50 => reg32 pll_sys_num {
            0..29 => a,
        },
        0x60 => reg32 pll_sys_denom {
            0..29 => b,
        },
        0x100 => reg32 pfd_528 {
            0..5   => pfd0_frac,
            6      => pfd0_stable: ro,
            7      => pfd0_clkgate,
            8..13  => pfd1_frac,
            14     => pfd1_stable: ro,
            15     => pfd1_clkgate,
            16..21 => pfd2_frac,
            22     => pfd2_stable: ro,
            23     => pfd2_clkgate,
            24..29 => pfd3_frac,
            30     => pfd3_stable: ro,
            31     => pfd3_clkgate,
        },
    });
}
