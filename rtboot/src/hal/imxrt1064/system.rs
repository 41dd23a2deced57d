//! Reset-time bring-up (`SystemInit`).
//!
//! [`boot`] takes the core from reset to a state where `main` can run:
//! FPU access, vector table in RAM, watchdogs quiet, SysTick stopped,
//! caches on, then the board hook. Nothing in here may rely on `.data` or
//! `.bss`; when installed through `#[system_init]` it runs before
//! `cortex-m-rt` initializes them.

use crate::hal::cortex_m7::cache::{self, reg::cache::Cache};
use crate::hal::cortex_m7::scb::{self, reg::scb::Scb};
use crate::hal::cortex_m7::systick::{self, reg::syst::Syst};
use crate::hal::mem_init::Relocate;
use super::watchdog::{self, reg::rtwdog::Rtwdog, reg::wdog::Wdog};

/// What the boot sequence does, besides the unconditional steps.
#[derive(Clone, Copy)]
pub struct BootConfig {
    pub fpu: bool,
    pub disable_watchdogs: bool,
    pub icache: bool,
    pub dcache: bool,
    /// Runs last. Must return promptly.
    pub hook: Option<fn()>,
}

impl BootConfig {
    /// Configuration selected by the crate's Cargo features, no hook.
    pub const fn from_features() -> BootConfig {
        BootConfig {
            fpu: cfg!(feature = "fpu"),
            disable_watchdogs: cfg!(feature = "disable-wdog"),
            icache: cfg!(feature = "icache"),
            dcache: cfg!(feature = "dcache"),
            hook: None,
        }
    }

    pub const fn with_hook(self, hook: Option<fn()>) -> BootConfig {
        BootConfig {
            hook,
            ..self
        }
    }
}

impl Default for BootConfig {
    fn default() -> BootConfig {
        BootConfig::from_features()
    }
}

/// Every register block the boot sequence touches.
pub struct SystemRegs<'a> {
    pub scb: &'a Scb,
    pub cache: &'a Cache,
    pub syst: &'a Syst,
    pub wdog1: &'a Wdog,
    pub wdog2: &'a Wdog,
    pub rtwdog: &'a Rtwdog,
}

impl SystemRegs<'static> {
    /// The blocks at their fixed bus addresses.
    pub unsafe fn iomem() -> SystemRegs<'static> {
        SystemRegs {
            scb: Scb::iomem(),
            cache: Cache::iomem(),
            syst: Syst::iomem(),
            wdog1: watchdog::reg::wdog1(),
            wdog2: watchdog::reg::wdog2(),
            rtwdog: Rtwdog::iomem(),
        }
    }
}

/// Run the boot sequence once.
///
/// Unsafe: must run before anything relies on the vector table, the
/// watchdogs or the caches, and the relocation source and destination
/// must be valid.
#[cfg_attr(target_os = "none", link_section = ".init_text")]
pub unsafe fn boot<R: Relocate>(regs: &SystemRegs, relocation: &R, config: &BootConfig) {
    if config.fpu {
        scb::enable_fpu(regs.scb);
    }

    relocation.relocate(regs.scb);

    watchdog::disable_power_down(regs.wdog1);
    watchdog::disable_power_down(regs.wdog2);

    if config.disable_watchdogs {
        watchdog::disable(regs.wdog1);
        watchdog::disable(regs.wdog2);
        watchdog::disable_rtwdog(regs.rtwdog);
    }

    systick::disable_if_enabled(regs.syst);

    if config.icache && !scb::icache_enabled(regs.scb) {
        cache::enable_icache(regs.scb, regs.cache);
    }
    if config.dcache && !scb::dcache_enabled(regs.scb) {
        cache::enable_dcache(regs.scb, regs.cache);
    }

    if let Some(hook) = config.hook {
        hook();
    }
}

/// `SystemInit`: boot against the real hardware with the feature-selected
/// configuration and relocation strategy.
#[cfg(target_os = "none")]
#[link_section = ".init_text"]
pub unsafe fn system_init(hook: Option<fn()>) {
    use crate::hal::mem_init::DefaultRelocation;

    let regs = SystemRegs::iomem();
    let relocation = DefaultRelocation::from_linker();
    boot(&regs, &relocation, &BootConfig::from_features().with_hook(hook));
}
