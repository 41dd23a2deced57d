//! Reset-time bring-up for Cortex-M7 i.MX RT parts: vector table
//! relocation, watchdog and SysTick shutdown, cache enable, and resolution
//! of the core clock from the clock tree registers.

#![cfg_attr(not(test), no_std)]

extern crate ioreg_proc;
extern crate volatile_cell;

pub mod hal;
#[macro_use]
pub mod util;
