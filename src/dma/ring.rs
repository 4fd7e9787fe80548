//! Generic circular ring buffer for DMA descriptors.

use super::descriptor::Descriptor;

/// Circular descriptor ring with wraparound index.
///
/// `N` must be a non-zero power of two; this is checked at compile time when
/// the ring is constructed.
pub struct DescriptorRing<D, const N: usize> {
    /// Array of descriptors
    pub(super) descriptors: [D; N],
    /// Software cursor (next slot to produce into or consume from)
    pub(super) current: usize,
}

impl<D, const N: usize> DescriptorRing<D, N> {
    const SIZE_OK: () = assert!(
        N != 0 && N.is_power_of_two(),
        "descriptor ring size must be a non-zero power of two"
    );

    /// Create a new descriptor ring from an existing array
    #[must_use]
    pub const fn from_array(descriptors: [D; N]) -> Self {
        let () = Self::SIZE_OK;
        Self {
            descriptors,
            current: 0,
        }
    }

    /// Index following `index`, wrapping at `N`
    #[inline(always)]
    #[must_use]
    pub const fn next_index(index: usize) -> usize {
        (index + 1) & (N - 1)
    }

    /// Get the number of descriptors in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring is empty (always false for fixed-size ring)
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Get the current index
    #[inline(always)]
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Advance the current index by one, wrapping around
    #[inline(always)]
    pub fn advance(&mut self) {
        self.current = Self::next_index(self.current);
    }

    /// Advance the current index by n, wrapping around
    #[inline(always)]
    pub fn advance_by(&mut self, n: usize) {
        self.current = (self.current + n) & (N - 1);
    }

    /// Reset the current index to 0
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Get a reference to the current descriptor
    #[inline(always)]
    pub fn current(&self) -> &D {
        &self.descriptors[self.current]
    }

    /// Get a reference to a descriptor at a specific index
    #[inline(always)]
    pub fn get(&self, index: usize) -> &D {
        &self.descriptors[index & (N - 1)]
    }

    /// Get a reference to a descriptor at an offset from current
    #[inline(always)]
    pub fn at_offset(&self, offset: usize) -> &D {
        &self.descriptors[(self.current + offset) & (N - 1)]
    }

    /// Get the base address as u32 (for DMA register)
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.descriptors.as_ptr() as u32
    }

    /// Iterate over all descriptors
    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.descriptors.iter()
    }
}

impl<const N: usize> DescriptorRing<Descriptor, N> {
    /// Create a ring of zeroed, software-owned descriptors. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self::from_array([const { Descriptor::new() }; N])
    }

    /// Hardware owns the descriptor at `index`
    #[inline(always)]
    pub fn is_owned_by_hardware(&self, index: usize) -> bool {
        self.get(index).is_owned_by_hardware()
    }

    /// Hand the descriptor at `index` to hardware
    #[inline(always)]
    pub fn mark_ready(&self, index: usize, addr: u32, control: u32) {
        self.get(index).mark_ready(addr, control);
    }

    /// Zero every descriptor and rewind the cursor
    pub fn clear(&mut self) {
        for desc in &self.descriptors {
            desc.clear();
        }
        self.current = 0;
    }

    /// Number of descriptors currently owned by hardware
    pub fn hardware_owned(&self) -> usize {
        self.descriptors
            .iter()
            .filter(|d| d.is_owned_by_hardware())
            .count()
    }
}

impl<const N: usize> Default for DescriptorRing<Descriptor, N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
