// Zinc, the bare metal stack for rust.
// Copyright 2014 Vladimir "farcaller" Pouzanov <farcaller@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A cell that performs every load and store as a volatile access.
//!
//! Register blocks generated by `ioregs!` are made of these. With the
//! `replayer` feature each access is additionally recorded so tests can
//! check which registers were touched, with what value, and in what order.

#![cfg_attr(not(feature = "replayer"), no_std)]

#[cfg(feature = "replayer")]
pub mod replayer;

use core::cell::UnsafeCell;
use core::ptr;

/// Memory-mapped value that is only ever accessed with volatile operations.
#[repr(transparent)]
pub struct VolatileCell<T> {
    value: UnsafeCell<T>,
}

impl<T> VolatileCell<T> {
    /// Wraps a value. Mostly useful for building register blocks in memory.
    #[inline(always)]
    pub const fn new(value: T) -> VolatileCell<T> {
        VolatileCell {
            value: UnsafeCell::new(value),
        }
    }

    /// Address of the cell, as seen by the bus.
    #[inline(always)]
    pub fn address(&self) -> usize {
        self.value.get() as usize
    }
}

macro_rules! volatile_cell_access {
    ($($ty:ty),*) => {
        $(
            impl VolatileCell<$ty> {
                /// Volatile load of the current value.
                #[inline(always)]
                pub fn get(&self) -> $ty {
                    let value = unsafe { ptr::read_volatile(self.value.get()) };
                    #[cfg(feature = "replayer")]
                    replayer::record_read(self.address(), value as u64);
                    value
                }

                /// Volatile store of `value`.
                #[inline(always)]
                pub fn set(&self, value: $ty) {
                    #[cfg(feature = "replayer")]
                    replayer::record_write(self.address(), value as u64);
                    unsafe { ptr::write_volatile(self.value.get(), value) }
                }
            }
        )*
    }
}

volatile_cell_access!(u8, u16, u32, u64);
