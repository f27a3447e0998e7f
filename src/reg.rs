// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Register Access Module
//!
//! Volatile MMIO accessors and the write barrier that orders dependent
//! device writes.

use core::sync::atomic::{fence, Ordering};

/// Read a 32-bit register
///
/// # Safety
///
/// `addr` must be a mapped, 4-byte aligned device register.
#[inline]
pub unsafe fn read_reg32(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit register
///
/// # Safety
///
/// `addr` must be a mapped, 4-byte aligned device register.
#[inline]
pub unsafe fn write_reg32(addr: usize, val: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, val) }
}

/// Write memory barrier
///
/// Completes all prior device writes before any later one is issued.
#[inline]
pub fn wmb() {
    #[cfg(target_arch = "aarch64")]
    {
        use aarch64_cpu::asm::barrier;
        barrier::dsb(barrier::SY);
    }

    fence(Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatile_roundtrip() {
        let mut cell: u32 = 0;
        let addr = &mut cell as *mut u32 as usize;
        unsafe {
            write_reg32(addr, 0xdead_beef);
            wmb();
            assert_eq!(read_reg32(addr), 0xdead_beef);
        }
    }
}
