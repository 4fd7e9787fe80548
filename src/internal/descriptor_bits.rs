//! DMA descriptor bit field constants.
//!
//! Layout of the 32-bit control word of an XWAY central DMA descriptor.

// =============================================================================
// Control Word
// =============================================================================

/// Descriptor control word bit fields
pub mod ctl {
    /// OWN - when set, descriptor owned by DMA; when clear, owned by CPU
    pub const OWN: u32 = 1 << 31;
    /// C - hardware finished the transfer, pending reclamation
    pub const COMPLETE: u32 = 1 << 30;
    /// Start of packet
    pub const SOP: u32 = 1 << 29;
    /// End of packet
    pub const EOP: u32 = 1 << 28;
    /// Byte offset field shift
    pub const OFFSET_SHIFT: u32 = 23;
    /// TX byte offset width mask (5 bits)
    pub const TX_OFFSET_MASK: u32 = 0x1f;
    /// RX byte offset width mask (3 bits)
    pub const RX_OFFSET_MASK: u32 = 0x7;
    /// Transfer length mask
    pub const SIZE_MASK: u32 = 0xffff;

    /// Encode a TX byte offset
    #[inline(always)]
    pub const fn tx_offset(offset: u32) -> u32 {
        (offset & TX_OFFSET_MASK) << OFFSET_SHIFT
    }

    /// Encode an RX byte offset
    #[inline(always)]
    pub const fn rx_offset(offset: u32) -> u32 {
        (offset & RX_OFFSET_MASK) << OFFSET_SHIFT
    }
}
