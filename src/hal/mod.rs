//! Hardware Abstraction Layer
//!
//! Every block in this crate reaches its registers through a per-instance
//! handle implementing [`RegisterIo`]. There is no process-wide register
//! base: the platform maps the window and hands the handle to the driver.
//!
//! # Modules
//!
//! - [`mdio`]: MDIO management access through the ETOP block
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod mdio;

pub use mdio::{EtopMdio, MDIO_TIMEOUT_US, MdioBus};

// =============================================================================
// Register Access Trait
// =============================================================================

/// 32-bit register window access
///
/// Offsets are byte offsets from the start of the block's register window.
pub trait RegisterIo {
    /// Read a 32-bit register
    fn read32(&self, offset: usize) -> u32;

    /// Write a 32-bit register
    fn write32(&mut self, offset: usize, value: u32);

    /// Read-modify-write a register
    #[inline]
    fn modify<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }

    /// Set bits in a register
    #[inline]
    fn set_bits(&mut self, offset: usize, bits: u32) {
        self.modify(offset, |v| v | bits);
    }

    /// Clear bits in a register
    #[inline]
    fn clear_bits(&mut self, offset: usize, bits: u32) {
        self.modify(offset, |v| v & !bits);
    }

    /// Clear `clear` then set `set` in a single read-modify-write
    #[inline]
    fn mask(&mut self, offset: usize, clear: u32, set: u32) {
        self.modify(offset, |v| (v & !clear) | set);
    }

    /// Replace the field selected by `mask` with `value`
    #[inline]
    fn update_bits(&mut self, offset: usize, mask: u32, value: u32) {
        self.modify(offset, |v| (v & !mask) | (value & mask));
    }
}

impl<T: RegisterIo> RegisterIo for &mut T {
    #[inline(always)]
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    #[inline(always)]
    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }
}

// =============================================================================
// Volatile MMIO Window
// =============================================================================

/// Memory-mapped register window accessed with volatile loads and stores
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create a window starting at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the mapped, 4-byte aligned start of the block's register
    /// window, valid for every offset the driver uses, and no other handle may
    /// write the same window concurrently.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the window
    #[inline(always)]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterIo for Mmio {
    #[inline(always)]
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: `new` guarantees the window is mapped for this offset.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline(always)]
    fn write32(&mut self, offset: usize, value: u32) {
        // SAFETY: `new` guarantees the window is mapped for this offset.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRegisters;

    #[test]
    fn register_io_mask_clears_then_sets() {
        let mut regs = MockRegisters::new();
        regs.set(0x10, 0xFF);
        regs.mask(0x10, 0x0F, 0x100);
        assert_eq!(regs.get(0x10), 0x1F0);
    }

    #[test]
    fn register_io_update_bits_limits_to_mask() {
        let mut regs = MockRegisters::new();
        regs.set(0x20, 0xFFFF_0000);
        regs.update_bits(0x20, 0x0000_FF00, 0xFFFF_FFFF);
        assert_eq!(regs.get(0x20), 0xFFFF_FF00);
    }

    #[test]
    fn register_io_set_and_clear_bits() {
        let mut regs = MockRegisters::new();
        regs.set_bits(0x4, 0b1010);
        regs.clear_bits(0x4, 0b0010);
        assert_eq!(regs.get(0x4), 0b1000);
    }

    #[test]
    fn register_io_forwards_through_mut_ref() {
        let mut regs = MockRegisters::new();
        {
            let mut handle = &mut regs;
            handle.write32(0x8, 7);
            assert_eq!(handle.read32(0x8), 7);
        }
        assert_eq!(regs.get(0x8), 7);
    }

    #[test]
    fn mmio_reads_and_writes_backing_memory() {
        let mut backing = [0u32; 4];
        let base = backing.as_mut_ptr() as usize;
        let mut mmio = unsafe { Mmio::new(base) };
        mmio.write32(8, 0xDEAD_BEEF);
        assert_eq!(mmio.read32(8), 0xDEAD_BEEF);
        assert_eq!(mmio.base(), base);
        assert_eq!(backing[2], 0xDEAD_BEEF);
    }
}
