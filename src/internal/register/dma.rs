//! XWAY Central DMA Register Definitions
//!
//! Channel registers are banked: writing a channel number to `CS` selects
//! which channel the `C*` registers address.

// =============================================================================
// Register Offsets
// =============================================================================

/// DMA controller control register
pub const CTRL: usize = 0x10;
/// Descriptor poll register
pub const CPOLL: usize = 0x14;
/// Channel select register
pub const CS: usize = 0x18;
/// Channel control register
pub const CCTRLC: usize = 0x1C;
/// Channel descriptor base address register
pub const CDBA: usize = 0x20;
/// Channel descriptor length register
pub const CDLEN: usize = 0x24;
/// Channel interrupt status register
pub const CIS: usize = 0x28;
/// Channel interrupt enable register
pub const CIE: usize = 0x2C;
/// Port select register
pub const PS: usize = 0x40;
/// Port control register
pub const PCTRL: usize = 0x44;
/// Interrupt node enable register
pub const IRNEN: usize = 0xF4;

// =============================================================================
// Channel Control (CCTRLC) Bits
// =============================================================================

/// Channel on
pub const CHAN_ON: u32 = 1 << 0;
/// Channel reset, self-clearing
pub const CHAN_RST: u32 = 1 << 1;
/// Channel direction is transmit
pub const CHAN_TX: u32 = 1 << 8;
/// Channel arbitration weight
pub const CHAN_WEIGHT: u32 = (1 << 17) | (1 << 16);

// =============================================================================
// Channel Interrupt (CIS/CIE) Bits
// =============================================================================

/// Descriptor complete interrupt
pub const DESCPT: u32 = 1 << 3;
/// Value written to CIS to acknowledge every channel interrupt source
pub const IRQ_ACK: u32 = 0x7E;

// =============================================================================
// Port Control (PCTRL) Fields
// =============================================================================

/// DMA port number of the ETOP block
pub const PORT_ETOP: u32 = 0;
/// Byte-swap settings for the ETOP port
pub const ETOP_ENDIANNESS: u32 = 0xF << 8;
/// Burst length field covering both directions
pub const BURST_MASK: u32 = 0x3C;
/// RX burst length field shift
pub const RX_BURST_SHIFT: u32 = 2;
/// TX burst length field shift
pub const TX_BURST_SHIFT: u32 = 4;
/// 2-word burst encoding
pub const BURST_2W: u32 = 1;
/// 4-word burst encoding
pub const BURST_4W: u32 = 2;
/// 8-word burst encoding
pub const BURST_8W: u32 = 3;
