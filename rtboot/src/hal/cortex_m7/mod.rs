//! Cortex-M7 core peripherals used during bring-up.

pub mod cache;
pub mod scb;
pub mod systick;

/// Data synchronization barrier.
#[inline(always)]
pub fn dsb() {
    #[cfg(target_arch = "arm")]
    cortex_m::asm::dsb();
    #[cfg(not(target_arch = "arm"))]
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

/// Instruction synchronization barrier.
#[inline(always)]
pub fn isb() {
    #[cfg(target_arch = "arm")]
    cortex_m::asm::isb();
    #[cfg(not(target_arch = "arm"))]
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}
