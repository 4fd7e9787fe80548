//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers and
//! configuration defaults used throughout the driver core.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions and DMA limits
//! - **Ring sizes**: Default descriptor counts
//! - **Polling**: Budgets, reset polls and completion timeouts
//! - **PRNG**: Packet engine job sizes and default key material
//!
//! # Note
//!
//! Hardware register offsets and bit definitions live in
//! `internal::register` and `internal::descriptor_bits`.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Standard Ethernet MTU (Maximum Transmission Unit)
pub const MTU: usize = 1500;

/// Smallest MTU the MAC accepts (IPv4 minimum)
pub const MIN_MTU: usize = 68;

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HEADER_SIZE: usize = 14;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

/// CRC/FCS size at end of a received frame
pub const CRC_SIZE: usize = 4;

/// Minimum Ethernet frame size on the wire (excluding CRC)
pub const MIN_FRAME_SIZE: usize = 60;

/// Largest transfer a single DMA descriptor carries
pub const MAX_DMA_DATA_LEN: usize = 0x600;

/// Receive payload is placed this many bytes into the buffer so the IP
/// header following the 14-byte Ethernet header lands 4-byte aligned
pub const NET_IP_ALIGN: usize = 2;

/// Default DMA buffer size (a full transfer plus the IP-align headroom)
pub const DEFAULT_BUFFER_SIZE: usize = MAX_DMA_DATA_LEN + 64;

/// Default MAC address (locally administered)
pub const DEFAULT_MAC_ADDR: [u8; MAC_ADDR_LEN] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

// =============================================================================
// Ring Sizes
// =============================================================================

/// Default number of receive descriptors
pub const DEFAULT_RX_DESCRIPTORS: usize = 64;

/// Default number of transmit descriptors
pub const DEFAULT_TX_DESCRIPTORS: usize = 64;

/// Largest buffer pool the free bitmap can track
pub const MAX_POOL_BUFFERS: usize = 32;

// =============================================================================
// Polling
// =============================================================================

/// Default receive poll budget (frames per poll)
pub const DEFAULT_RX_BUDGET: usize = 32;

/// Default transmit reclaim budget (descriptors per poll)
pub const DEFAULT_TX_BUDGET: usize = 8;

/// Polls of the channel reset bit before giving up
pub const DEFAULT_RESET_POLL_LIMIT: u32 = 10_000;

/// Default PRNG completion timeout in microseconds
pub const DEFAULT_PRNG_TIMEOUT_US: u32 = 100_000;

/// Default PRNG completion poll interval in microseconds
pub const DEFAULT_PRNG_POLL_INTERVAL_US: u32 = 10;

// =============================================================================
// PRNG
// =============================================================================

/// Bytes produced by one PRNG generate job
pub const PRNG_BLOCK_LEN: usize = 4080;

/// PRNG key, seed and date-time size in bytes
pub const PRNG_BLOCK_SIZE: usize = 16;

/// Default PRNG key used by a context reset without an explicit key
pub const DEFAULT_PRNG_KEY: [u8; PRNG_BLOCK_SIZE] = *b"0123456789abcdef";

/// Default PRNG seed (V) used by a context reset without an explicit seed
pub const DEFAULT_PRNG_SEED: [u8; PRNG_BLOCK_SIZE] = *b"zaybxcwdveuftgsh";

/// Default PRNG date-time vector
pub const DEFAULT_PRNG_DATETIME: [u8; PRNG_BLOCK_SIZE] = [0; PRNG_BLOCK_SIZE];

/// Power-on key words written to the SA record by `init`
pub const PRNG_INIT_KEY: [u32; 4] = [0xe0fc_631d, 0xcbb9_fb9a, 0x8692_85cb, 0xcbb9_fb9a];

/// Power-on seed words written to the SA record by `init`
pub const PRNG_INIT_SEED: [u32; 4] = [0x758b_ac03, 0xf20a_b39e, 0xa569_f104, 0x95df_aea6];
