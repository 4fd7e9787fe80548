//! DMA buffers
//!
//! A descriptor ring never owns packet memory itself. Each outstanding
//! descriptor is bound to exactly one buffer implementing [`DmaBuffer`]; the
//! buffer moves into the channel when it is armed and moves back out when
//! hardware hands the descriptor back.
//!
//! Buffers come from a [`BufferAllocator`]. [`BufferPool`] is the static,
//! heap-free implementation: a fixed array of equally sized slots tracked by
//! an atomic free bitmap, handing out [`PoolBuffer`] guards that return their
//! slot when dropped.
//!
//! # Example
//!
//! ```ignore
//! use ph_soc_dma::buffer::{BufferAllocator, BufferPool, DmaBuffer};
//!
//! static POOL: BufferPool<16, 1600> = BufferPool::new();
//!
//! let mut buf = (&POOL).allocate().unwrap();
//! buf.storage_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
//! buf.set_len(4);
//! ```

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::internal::constants::MAX_POOL_BUFFERS;

// =============================================================================
// Traits
// =============================================================================

/// Memory a DMA engine can read from or write into
pub trait DmaBuffer {
    /// Bus address of the first byte of storage
    fn dma_addr(&self) -> u32;

    /// Whole backing storage, `capacity()` bytes
    fn storage(&self) -> &[u8];

    /// Whole backing storage, mutable
    fn storage_mut(&mut self) -> &mut [u8];

    /// Number of valid bytes
    fn len(&self) -> usize;

    /// Set the number of valid bytes (clamped to capacity)
    fn set_len(&mut self, len: usize);

    /// Size of the backing storage in bytes
    fn capacity(&self) -> usize {
        self.storage().len()
    }

    /// True when no bytes are valid
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Valid bytes
    fn as_slice(&self) -> &[u8] {
        let len = self.len();
        &self.storage()[..len]
    }
}

/// Source of fresh DMA buffers
///
/// Allocation must not block; `None` means the pool is exhausted right now.
pub trait BufferAllocator {
    /// Buffer type handed out
    type Buffer: DmaBuffer;

    /// Take a buffer, or `None` if none is available
    fn allocate(&self) -> Option<Self::Buffer>;
}

// =============================================================================
// Static Buffer Pool
// =============================================================================

#[repr(C, align(32))]
struct Slot<const SIZE: usize>(UnsafeCell<[u8; SIZE]>);

/// Fixed pool of `COUNT` buffers of `SIZE` bytes
///
/// `COUNT` is limited to 32 so the free set fits one atomic word. Slots are
/// 32-byte aligned so arming a buffer never needs a TX byte offset larger
/// than the burst size.
pub struct BufferPool<const COUNT: usize, const SIZE: usize> {
    slots: [Slot<SIZE>; COUNT],
    /// Bit `i` set means slot `i` is free
    free: AtomicU32,
}

// SAFETY: a slot's bytes are only reachable through the single PoolBuffer that
// cleared its free bit, so no two contexts alias the same storage.
unsafe impl<const COUNT: usize, const SIZE: usize> Sync for BufferPool<COUNT, SIZE> {}

impl<const COUNT: usize, const SIZE: usize> BufferPool<COUNT, SIZE> {
    const ALL_FREE: u32 = if COUNT >= 32 {
        u32::MAX
    } else {
        (1u32 << COUNT) - 1
    };

    /// Create a pool with every buffer free
    #[must_use]
    pub const fn new() -> Self {
        const {
            assert!(COUNT > 0, "buffer pool needs at least one buffer");
            assert!(COUNT <= MAX_POOL_BUFFERS, "buffer pool holds at most 32 buffers");
            assert!(SIZE > 0, "buffer size must be non-zero");
        }
        Self {
            slots: [const { Slot(UnsafeCell::new([0; SIZE])) }; COUNT],
            free: AtomicU32::new(Self::ALL_FREE),
        }
    }

    /// Take a free buffer
    pub fn alloc(&self) -> Option<PoolBuffer<'_, COUNT, SIZE>> {
        let mut current = self.free.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return None;
            }
            let index = current.trailing_zeros();
            let claimed = current & !(1 << index);
            match self.free.compare_exchange_weak(
                current,
                claimed,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(PoolBuffer {
                        pool: self,
                        index: index as usize,
                        len: 0,
                    });
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Number of buffers currently free
    pub fn available(&self) -> usize {
        self.free.load(Ordering::Acquire).count_ones() as usize
    }

    /// Total number of buffers
    pub const fn capacity(&self) -> usize {
        COUNT
    }

    fn release(&self, index: usize) {
        self.free.fetch_or(1 << index, Ordering::Release);
    }
}

impl<const COUNT: usize, const SIZE: usize> Default for BufferPool<COUNT, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p, const COUNT: usize, const SIZE: usize> BufferAllocator for &'p BufferPool<COUNT, SIZE> {
    type Buffer = PoolBuffer<'p, COUNT, SIZE>;

    fn allocate(&self) -> Option<Self::Buffer> {
        BufferPool::alloc(*self)
    }
}

/// Buffer borrowed from a [`BufferPool`], returned to it on drop
pub struct PoolBuffer<'p, const COUNT: usize, const SIZE: usize> {
    pool: &'p BufferPool<COUNT, SIZE>,
    index: usize,
    len: usize,
}

impl<const COUNT: usize, const SIZE: usize> PoolBuffer<'_, COUNT, SIZE> {
    /// Slot index inside the pool
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<const COUNT: usize, const SIZE: usize> DmaBuffer for PoolBuffer<'_, COUNT, SIZE> {
    fn dma_addr(&self) -> u32 {
        self.pool.slots[self.index].0.get() as u32
    }

    fn storage(&self) -> &[u8] {
        // SAFETY: this guard cleared the slot's free bit, so it is the only
        // accessor until it is dropped.
        unsafe { &*self.pool.slots[self.index].0.get() }
    }

    fn storage_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in `storage`; `&mut self` makes the borrow unique.
        unsafe { &mut *self.pool.slots[self.index].0.get() }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn set_len(&mut self, len: usize) {
        self.len = len.min(SIZE);
    }

    fn capacity(&self) -> usize {
        SIZE
    }
}

impl<const COUNT: usize, const SIZE: usize> Drop for PoolBuffer<'_, COUNT, SIZE> {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

impl<const COUNT: usize, const SIZE: usize> core::fmt::Debug for PoolBuffer<'_, COUNT, SIZE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolBuffer")
            .field("index", &self.index)
            .field("len", &self.len)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
