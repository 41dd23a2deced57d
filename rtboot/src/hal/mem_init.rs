//! Helper functions for memory initialization.
//!
//! At reset the vector table sits in flash. Before anything can take an
//! interrupt it is copied to RAM and VTOR is pointed at the copy. Link
//! layouts that run code from RAM without a loader also need `.text` and
//! `.data` copied; [`SectionCopy`] does both. The strategy is chosen once
//! with the `copy-sections` feature and exported as [`DefaultRelocation`].

use super::cortex_m7::scb::{self, reg::scb::Scb};
use core::mem;
use core::ptr;

/// A word-aligned region whose contents live at `load` and belong in
/// `[start, end)`.
#[derive(Clone, Copy)]
pub struct Section {
    pub load: *const u32,
    pub start: *mut u32,
    pub end: *mut u32,
}

impl Section {
    /// Copy the region word by word.
    ///
    /// Unsafe: both ranges must be valid, word aligned and disjoint.
    #[cfg_attr(target_os = "none", link_section = ".init_text")]
    pub unsafe fn copy(&self) {
        let mut load_addr = self.load;
        let mut mem_addr = self.start;
        while mem_addr < self.end {
            ptr::write_volatile(mem_addr, ptr::read_volatile(load_addr));
            mem_addr = mem_addr.offset(1);
            load_addr = load_addr.offset(1);
        }
    }
}

/// Vector table in flash and the RAM reserved for its copy.
#[derive(Clone, Copy)]
pub struct VectorTable {
    pub load: *const u32,
    pub ram: *mut u32,
    /// Always a multiple of the word size.
    pub size_bytes: usize,
}

impl VectorTable {
    #[inline(always)]
    pub fn words(&self) -> usize {
        self.size_bytes / mem::size_of::<u32>()
    }

    /// Alignment VTOR demands of the RAM copy: the table size rounded up to
    /// a power of two, at least 128 bytes.
    pub fn required_alignment(&self) -> usize {
        self.size_bytes.next_power_of_two().max(128)
    }

    pub fn ram_is_aligned(&self) -> bool {
        self.ram as usize % self.required_alignment() == 0
    }

    /// Unsafe: `load` and `ram` must both cover `size_bytes`.
    #[cfg_attr(target_os = "none", link_section = ".init_text")]
    pub unsafe fn copy(&self) {
        for i in 0..self.words() {
            ptr::write_volatile(self.ram.add(i), ptr::read_volatile(self.load.add(i)));
        }
    }
}

/// A way of getting a complete vector table into RAM.
///
/// After `relocate` returns, VTOR points at that table.
pub trait Relocate {
    unsafe fn relocate(&self, scb: &Scb);
}

/// The loader already placed code and data; only the vectors move.
pub struct VectorCopy {
    pub vectors: VectorTable,
}

impl Relocate for VectorCopy {
    #[cfg_attr(target_os = "none", link_section = ".init_text")]
    unsafe fn relocate(&self, scb: &Scb) {
        self.vectors.copy();
        scb::set_vector_offset(scb, self.vectors.ram);
    }
}

/// Vectors, then `.text` and `.data`, all copied in software.
pub struct SectionCopy {
    pub vectors: VectorTable,
    pub text: Section,
    pub data: Section,
}

impl Relocate for SectionCopy {
    #[cfg_attr(target_os = "none", link_section = ".init_text")]
    unsafe fn relocate(&self, scb: &Scb) {
        self.vectors.copy();
        scb::set_vector_offset(scb, self.vectors.ram);
        self.text.copy();
        self.data.copy();
    }
}

#[cfg(feature = "copy-sections")]
pub type DefaultRelocation = SectionCopy;
#[cfg(not(feature = "copy-sections"))]
pub type DefaultRelocation = VectorCopy;

#[cfg(target_os = "none")]
mod linker {
    extern "C" {
        pub static __VECTOR_TABLE: u32;
        pub static mut __VECTOR_RAM: u32;
        pub static __RAM_VECTOR_TABLE_SIZE_BYTES: u32;
    }

    #[cfg(feature = "copy-sections")]
    extern "C" {
        pub static __TEXT_ROM: u32;
        pub static mut __text_start__: u32;
        pub static mut __text_end__: u32;
        pub static __DATA_ROM: u32;
        pub static mut __data_start__: u32;
        pub static mut __data_end__: u32;
    }
}

#[cfg(target_os = "none")]
impl VectorTable {
    /// The table described by the linker script.
    #[inline(always)]
    pub fn from_linker() -> VectorTable {
        unsafe {
            VectorTable {
                load: ptr::addr_of!(linker::__VECTOR_TABLE),
                ram: ptr::addr_of_mut!(linker::__VECTOR_RAM),
                // The symbol's address is the size.
                size_bytes: ptr::addr_of!(linker::__RAM_VECTOR_TABLE_SIZE_BYTES) as usize,
            }
        }
    }
}

#[cfg(target_os = "none")]
impl VectorCopy {
    #[inline(always)]
    pub fn from_linker() -> VectorCopy {
        VectorCopy {
            vectors: VectorTable::from_linker(),
        }
    }
}

#[cfg(all(target_os = "none", feature = "copy-sections"))]
impl SectionCopy {
    #[inline(always)]
    pub fn from_linker() -> SectionCopy {
        unsafe {
            SectionCopy {
                vectors: VectorTable::from_linker(),
                text: Section {
                    load: ptr::addr_of!(linker::__TEXT_ROM),
                    start: ptr::addr_of_mut!(linker::__text_start__),
                    end: ptr::addr_of_mut!(linker::__text_end__),
                },
                data: Section {
                    load: ptr::addr_of!(linker::__DATA_ROM),
                    start: ptr::addr_of_mut!(linker::__data_start__),
                    end: ptr::addr_of_mut!(linker::__data_end__),
                },
            }
        }
    }
}
