//! XWAY DMA descriptor.
//!
//! Two words shared with hardware: a control word carrying ownership,
//! framing, the byte offset and the transfer length, and the buffer bus
//! address. OWN decides who may touch the descriptor: while it is set the
//! CPU reads nothing but the control word and writes nothing at all.

use core::sync::atomic::{Ordering, fence};

use crate::internal::descriptor_bits::ctl;

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: every access goes through a single aligned volatile load or store,
// which is atomic for u32 on the supported cores.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }
}

/// One DMA transfer descriptor (8 bytes)
#[repr(C, align(8))]
pub struct Descriptor {
    /// Control word: OWN, C, SOP, EOP, byte offset, length
    ctl: VolatileCell<u32>,
    /// Buffer bus address
    addr: VolatileCell<u32>,
}

impl Descriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 8;

    /// Create a zeroed, software-owned descriptor
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ctl: VolatileCell::new(0),
            addr: VolatileCell::new(0),
        }
    }

    /// Raw control word
    #[inline(always)]
    pub fn control(&self) -> u32 {
        self.ctl.get()
    }

    /// Buffer bus address
    #[inline(always)]
    pub fn address(&self) -> u32 {
        self.addr.get()
    }

    /// Hardware owns the descriptor
    #[inline(always)]
    pub fn is_owned_by_hardware(&self) -> bool {
        self.ctl.get() & ctl::OWN != 0
    }

    /// Hardware finished with the descriptor and handed it back
    #[inline(always)]
    pub fn is_complete(&self) -> bool {
        self.ctl.get() & (ctl::OWN | ctl::COMPLETE) == ctl::COMPLETE
    }

    /// Software owns the descriptor and nothing is pending on it
    #[inline(always)]
    pub fn is_idle(&self) -> bool {
        self.ctl.get() & (ctl::OWN | ctl::COMPLETE) == 0
    }

    /// Transfer length field
    #[inline(always)]
    pub fn length(&self) -> usize {
        (self.ctl.get() & ctl::SIZE_MASK) as usize
    }

    /// Byte offset field (5-bit TX encoding; RX offsets fit the low 3 bits)
    #[inline(always)]
    pub fn byte_offset(&self) -> usize {
        ((self.ctl.get() >> ctl::OFFSET_SHIFT) & ctl::TX_OFFSET_MASK) as usize
    }

    /// Hand the descriptor to hardware.
    ///
    /// The address is written first and the control word, with OWN set, last;
    /// the release fence keeps the address (and any payload writes before the
    /// call) visible before the DMA engine can observe OWN.
    #[inline]
    pub fn mark_ready(&self, addr: u32, control: u32) {
        self.addr.set(addr);
        fence(Ordering::Release);
        self.ctl.set(control | ctl::OWN);
    }

    /// Zero both words (software-owned, nothing pending)
    #[inline]
    pub fn clear(&self) {
        self.ctl.set(0);
        self.addr.set(0);
    }

    /// Overwrite the control word as the DMA engine would
    #[cfg(test)]
    pub(crate) fn set_control(&self, value: u32) {
        self.ctl.set(value);
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Descriptor")
            .field("ctl", &format_args!("{:#010x}", self.control()))
            .field("addr", &format_args!("{:#010x}", self.address()))
            .finish()
    }
}
