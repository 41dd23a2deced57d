#[macro_use]
extern crate expectest;

use expectest::prelude::*;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};

use rtboot::hal::imxrt1064::system_clock::reg::ccm::{cbcdr, cbcmr, Ccm};
use rtboot::hal::imxrt1064::system_clock::reg::ccm_analog::CcmAnalog;
use rtboot::hal::imxrt1064::system_clock::{
    system_core_clock, update_core_clock, ClockTree, CoreClockPath, Oscillators,
    DEFAULT_SYSTEM_CLOCK,
};

struct Fixture {
    ccm: Ccm,
    analog: CcmAnalog,
}

impl Fixture {
    /// PLL1 at 1.2 GHz, PLL2 at 528 MHz, PLL3 at 480 MHz, PFD0 = 27,
    /// PFD2 = 24, ARM_PODF = 1. Muxes and other dividers at zero.
    fn new() -> Fixture {
        let f: Fixture = unsafe { mem::zeroed() };
        f.analog.pll_arm.update().set_div_select(100);
        f.analog.pll_sys.update().set_div_select(true);
        f.analog.pll_sys_denom.update().set_b(1);
        f.analog.pfd_528.update()
            .set_pfd0_frac(27)
            .set_pfd2_frac(24);
        f.ccm.cacrr.update().set_arm_podf(1);
        f
    }

    fn tree(&self) -> ClockTree {
        ClockTree::new(&self.ccm, &self.analog, Oscillators::DEFAULT)
    }

    fn bypass_all(&self) {
        self.analog.pll_arm.update().set_bypass(true);
        self.analog.pll_sys.update().set_bypass(true);
        self.analog.pll_usb1.update().set_bypass(true);
    }

    fn select_periph_clk2(&self, sel: u32) {
        self.ccm.cbcdr.update().set_periph_clk_sel(cbcdr::PeriphClkSel::PeriphClk2);
        self.poke_cbcmr(12, sel);
    }

    fn select_pre_periph(&self, sel: cbcmr::PrePeriphClkSel) {
        self.ccm.cbcdr.update().set_periph_clk_sel(cbcdr::PeriphClkSel::PrePeriphClk);
        self.ccm.cbcmr.update().set_pre_periph_clk_sel(sel);
    }

    // Reserved selector encodings have no variant to set them through.
    fn poke_cbcmr(&self, shift: u32, value: u32) {
        let addr = self.ccm.cbcmr.address() as *mut u32;
        unsafe {
            let current = ptr::read_volatile(addr);
            ptr::write_volatile(addr, (current & !(0x3 << shift)) | (value << shift));
        }
    }
}

struct Case {
    name: &'static str,
    path: fn(&Fixture),
    bypass: bool,
    expected: u32,
}

#[test]
fn every_source_matches_hand_evaluated_frequency() {
    use cbcmr::PrePeriphClkSel::*;
    let cases = [
        Case { name: "pll2", path: |f| f.select_pre_periph(Pll2), bypass: false, expected: 528_000_000 },
        Case { name: "pll2 bypassed", path: |f| f.select_pre_periph(Pll2), bypass: true, expected: 24_000_000 },
        Case { name: "pfd2", path: |f| f.select_pre_periph(Pll2Pfd2), bypass: false, expected: 396_000_000 },
        Case { name: "pfd2 bypassed", path: |f| f.select_pre_periph(Pll2Pfd2), bypass: true, expected: 18_000_000 },
        Case { name: "pfd0", path: |f| f.select_pre_periph(Pll2Pfd0), bypass: false, expected: 351_999_990 },
        Case { name: "pfd0 bypassed", path: |f| f.select_pre_periph(Pll2Pfd0), bypass: true, expected: 15_999_984 },
        Case { name: "pll1", path: |f| f.select_pre_periph(Pll1Divided), bypass: false, expected: 600_000_000 },
        Case { name: "pll1 bypassed", path: |f| f.select_pre_periph(Pll1Divided), bypass: true, expected: 12_000_000 },
        Case { name: "pll3", path: |f| f.select_periph_clk2(0), bypass: false, expected: 480_000_000 },
        Case { name: "pll3 bypassed", path: |f| f.select_periph_clk2(0), bypass: true, expected: 24_000_000 },
        Case { name: "osc", path: |f| f.select_periph_clk2(1), bypass: false, expected: 24_000_000 },
        Case { name: "osc bypassed", path: |f| f.select_periph_clk2(1), bypass: true, expected: 24_000_000 },
        Case { name: "pll2 via clk2", path: |f| f.select_periph_clk2(2), bypass: false, expected: 528_000_000 },
        Case { name: "pll2 via clk2 bypassed", path: |f| f.select_periph_clk2(2), bypass: true, expected: 24_000_000 },
        Case { name: "reserved", path: |f| f.select_periph_clk2(3), bypass: false, expected: 0 },
        Case { name: "reserved bypassed", path: |f| f.select_periph_clk2(3), bypass: true, expected: 0 },
    ];
    for case in cases.iter() {
        let f = Fixture::new();
        (case.path)(&f);
        if case.bypass {
            f.bypass_all();
        }
        assert_eq!(f.tree().core_clock_freq(), case.expected, "{}", case.name);
    }
}

#[test]
fn pll1_divided_by_arm_podf() {
    let f = Fixture::new();
    f.ccm.cacrr.update().set_arm_podf(0);
    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll1Divided);
    expect!(f.tree().core_clock_freq()).to(be_equal_to(1_200_000_000));
}

#[test]
fn osc_through_periph_clk2_divider() {
    let f = Fixture::new();
    f.select_periph_clk2(1);
    f.ccm.cbcdr.update().set_periph_clk2_podf(1);
    expect!(f.tree().core_clock_freq()).to(be_equal_to(12_000_000));
}

#[test]
fn ahb_divider_applies_to_both_paths() {
    let f = Fixture::new();
    f.ccm.cbcdr.update().set_ahb_podf(1);
    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll1Divided);
    expect!(f.tree().core_clock_freq()).to(be_equal_to(300_000_000));
    f.select_periph_clk2(0);
    expect!(f.tree().core_clock_freq()).to(be_equal_to(240_000_000));
}

#[test]
fn pll2_integer_multiplier() {
    let f = Fixture::new();
    f.analog.pll_sys.update().set_div_select(false);
    expect!(f.tree().pll2_main_freq()).to(be_equal_to(480_000_000));
}

#[test]
fn pll2_fractional_term() {
    let f = Fixture::new();
    f.analog.pll_sys.update().set_div_select(false);
    f.analog.pll_sys_num.update().set_a(5_000_000);
    f.analog.pll_sys_denom.update().set_b(10_000_000);
    expect!(f.tree().pll2_main_freq()).to(be_equal_to(492_000_000));

    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll2);
    expect!(f.tree().core_clock_freq()).to(be_equal_to(492_000_000));
}

#[test]
fn periph_clk2_pll2_ignores_fraction() {
    let f = Fixture::new();
    f.analog.pll_sys_num.update().set_a(5_000_000);
    f.analog.pll_sys_denom.update().set_b(10_000_000);
    f.select_periph_clk2(2);
    expect!(f.tree().periph_clk2_freq()).to(be_equal_to(528_000_000));
}

#[test]
fn bypassed_pll2_ignores_fraction() {
    let f = Fixture::new();
    f.analog.pll_sys_num.update().set_a(5_000_000);
    f.analog.pll_sys_denom.update().set_b(0);
    f.analog.pll_sys.update().set_bypass(true);
    expect!(f.tree().pll2_main_freq()).to(be_equal_to(24_000_000));
}

#[test]
fn bypass_source_selects_clk1() {
    let f = Fixture::new();
    let oscillators = Oscillators {
        xtal_hz: 24_000_000,
        clk1_hz: 25_000_000,
    };
    f.analog.pll_usb1.update()
        .set_bypass(true)
        .set_bypass_clk_src(1);
    f.analog.pll_arm.update()
        .set_bypass(true)
        .set_bypass_clk_src(2);
    let tree = ClockTree::new(&f.ccm, &f.analog, oscillators);
    expect!(tree.pll3_sw_freq()).to(be_equal_to(25_000_000));
    expect!(tree.pll1_main_freq()).to(be_equal_to(25_000_000));
}

#[test]
fn pll2_bypass_source_selects_clk1_on_both_paths() {
    let f = Fixture::new();
    let oscillators = Oscillators {
        xtal_hz: 24_000_000,
        clk1_hz: 25_000_000,
    };
    f.analog.pll_sys.update()
        .set_bypass(true)
        .set_bypass_clk_src(1);
    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll2);
    expect!(ClockTree::new(&f.ccm, &f.analog, oscillators).core_clock_freq())
        .to(be_equal_to(25_000_000));
    f.select_periph_clk2(2);
    expect!(ClockTree::new(&f.ccm, &f.analog, oscillators).core_clock_freq())
        .to(be_equal_to(25_000_000));
}

#[test]
fn default_clk1_is_absent() {
    let f = Fixture::new();
    f.analog.pll_usb1.update()
        .set_bypass(true)
        .set_bypass_clk_src(1);
    f.select_periph_clk2(0);
    expect!(f.tree().core_clock_freq()).to(be_equal_to(0));
}

#[test]
fn pfd_multiplier_wraps_at_32_bits() {
    let f = Fixture::new();
    f.analog.pfd_528.update().set_pfd2_frac(1);
    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll2Pfd2);
    // 528 MHz * 18 modulo 2^32
    expect!(f.tree().core_clock_freq()).to(be_equal_to(914_065_408));
}

#[test]
fn fractional_term_wraps_at_32_bits() {
    let f = Fixture::new();
    f.analog.pll_sys_num.update().set_a(0x3FFF_FFFF);
    f.analog.pll_sys_denom.update().set_b(1);
    // (528 MHz + 24 MHz * 0x3FFF_FFFF) modulo 2^32
    expect!(f.tree().pll2_main_freq()).to(be_equal_to(504_000_000));
}

#[test]
#[should_panic]
fn zero_denominator_faults() {
    let f = Fixture::new();
    f.analog.pll_sys_denom.update().set_b(0);
    f.tree().pll2_main_freq();
}

#[test]
#[should_panic]
fn zero_pfd_fraction_faults() {
    let f = Fixture::new();
    f.analog.pfd_528.update().set_pfd2_frac(0);
    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll2Pfd2);
    f.tree().core_clock_freq();
}

#[test]
fn unselected_zero_divisors_are_harmless() {
    let f = Fixture::new();
    f.analog.pfd_528.update()
        .set_pfd0_frac(0)
        .set_pfd2_frac(0);
    f.analog.pll_sys_denom.update().set_b(0);
    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll1Divided);
    expect!(f.tree().core_clock_freq()).to(be_equal_to(600_000_000));
}

#[test]
fn path_reports_mux_selection() {
    let f = Fixture::new();
    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll2Pfd2);
    expect!(f.tree().core_clock_path())
        .to(be_equal_to(CoreClockPath::PrePeriph(cbcmr::PrePeriphClkSel::Pll2Pfd2)));
    f.select_periph_clk2(1);
    expect!(f.tree().core_clock_path())
        .to(be_equal_to(CoreClockPath::PeriphClk2(Ok(cbcmr::PeriphClk2Sel::Osc))));
    f.select_periph_clk2(3);
    expect!(f.tree().core_clock_path()).to(be_equal_to(CoreClockPath::PeriphClk2(Err(3))));
}

#[test]
fn reserved_source_stores_zero() {
    let f = Fixture::new();
    f.select_periph_clk2(3);
    let store = AtomicU32::new(DEFAULT_SYSTEM_CLOCK);
    expect!(update_core_clock(&f.tree(), &store)).to(be_equal_to(0));
    expect!(store.load(Ordering::Relaxed)).to(be_equal_to(0));
}

#[test]
fn update_is_idempotent() {
    let f = Fixture::new();
    f.select_pre_periph(cbcmr::PrePeriphClkSel::Pll1Divided);
    let store = AtomicU32::new(0);
    let first = update_core_clock(&f.tree(), &store);
    let second = update_core_clock(&f.tree(), &store);
    expect!(first).to(be_equal_to(600_000_000));
    expect!(second).to(be_equal_to(first));
    expect!(store.load(Ordering::Relaxed)).to(be_equal_to(first));
}

#[test]
fn exposed_clock_starts_at_default() {
    expect!(system_core_clock()).to(be_equal_to(600_000_000));
    expect!(DEFAULT_SYSTEM_CLOCK).to(be_equal_to(600_000_000));
}
