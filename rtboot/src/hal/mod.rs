#[cfg(feature = "cpu_cortex-m7")]
pub mod cortex_m7;

#[cfg(feature = "cpu_cortex-m7")]
pub mod mem_init;

#[cfg(feature = "mcu_imxrt1064")]
pub mod imxrt1064;
