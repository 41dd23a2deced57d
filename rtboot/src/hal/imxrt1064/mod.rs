//! NXP i.MX RT1064.

pub mod system;
pub mod system_clock;
pub mod watchdog;
