//! EIP-93 Packet Engine Register and Descriptor Field Definitions

use super::genmask;

// =============================================================================
// Register Offsets
// =============================================================================

/// Command descriptor ring base address
pub const PE_CDR_BASE: usize = 0x80;
/// Command descriptor count; writing N hands N descriptors to the engine
pub const PE_CD_COUNT: usize = 0x90;
/// Command descriptor ring size (in descriptors)
pub const PE_RING_CONFIG: usize = 0x88;

// =============================================================================
// Control/Status Word
// =============================================================================

/// Descriptor ownership field of the control word
pub const PE_CTRL_READY_DES_OWN: u32 = genmask(7, 0);
/// Host filled the descriptor, engine may take it
pub const PE_CTRL_HOST_READY: u32 = 0x01;
/// PRNG mode field
pub const PE_CTRL_PRNG_MODE: u32 = genmask(25, 24);

// =============================================================================
// Length Word
// =============================================================================

/// Ownership field of the length word
pub const PE_LENGTH_HOST_PE_READY: u32 = genmask(31, 30);
/// Host filled the length word
pub const PE_LENGTH_HOST_READY: u32 = 0x01;
/// Transfer length field
pub const PE_LENGTH_LENGTH: u32 = genmask(19, 0);

// =============================================================================
// User ID Flags
// =============================================================================

/// Descriptor belongs to the PRNG
pub const DESC_PRNG: u32 = 1 << 1;
/// Last descriptor of a request
pub const DESC_LAST: u32 = 1 << 3;
/// Request finished after this descriptor
pub const DESC_FINISH: u32 = 1 << 4;

// =============================================================================
// SA Record
// =============================================================================

/// SA command word 0 for PRNG operation
pub const SA_CMD0_PRNG: u32 = 0x0000_1307;
/// SA command word 1 for PRNG operation
pub const SA_CMD1_PRNG: u32 = 0x0200_0000;
