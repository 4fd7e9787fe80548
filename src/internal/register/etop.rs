//! ETOP (Ethernet front end) Register Definitions

// =============================================================================
// Register Offsets
// =============================================================================

/// MDIO configuration register
pub const MDIO_CFG: usize = 0x11800;
/// MDIO access register
pub const MDIO_ACC: usize = 0x11804;
/// Front end configuration register
pub const CFG: usize = 0x11808;
/// Ingress packet length register
pub const IGPLEN: usize = 0x11820;
/// MAC configuration register
pub const MAC_CFG: usize = 0x11840;
/// Ethernet switch status/control register 0
pub const ENETS0: usize = 0x11850;
/// Unicast filter address, bytes 0..4
pub const MAC_DA0: usize = 0x1186C;
/// Unicast filter address, bytes 4..6
pub const MAC_DA1: usize = 0x11870;

// =============================================================================
// MDIO Fields
// =============================================================================

/// MDIO configuration bits cleared at init
pub const MDIO_CFG_MASK: u32 = 0x6;
/// Request in progress; set by software, cleared by hardware
pub const MDIO_REQUEST: u32 = 0x8000_0000;
/// Read (clear for write)
pub const MDIO_READ: u32 = 0x4000_0000;
/// PHY address mask
pub const MDIO_ADDR_MASK: u32 = 0x1F;
/// PHY address shift
pub const MDIO_ADDR_SHIFT: u32 = 21;
/// Register number mask
pub const MDIO_REG_MASK: u32 = 0x1F;
/// Register number shift
pub const MDIO_REG_SHIFT: u32 = 16;
/// Data mask
pub const MDIO_VAL_MASK: u32 = 0xFFFF;

// =============================================================================
// Front End Configuration (CFG) Bits
// =============================================================================

/// Writable bits of CFG
pub const CFG_MASK: u32 = 0xFFF;
/// Port 0 receive enable
pub const CFG_FEN0: u32 = 1 << 8;
/// Port 0 transmit enable
pub const CFG_SEN0: u32 = 1 << 6;
/// Port 1 off
pub const CFG_OFF1: u32 = 1 << 3;
/// Port 0 reverse MII (RMII)
pub const CFG_REMII0: u32 = 1 << 1;
/// Disable external MII on port 0 (internal PHY)
pub const CFG_MII0: u32 = 1 << 0;

// =============================================================================
// MAC Configuration (MAC_CFG) Bits
// =============================================================================

/// Writable bits of MAC_CFG
pub const MAC_CFG_MASK: u32 = 0xFFF;
/// Clock gate enable
pub const MAC_CFG_CGEN: u32 = 1 << 11;
/// Full duplex
pub const MAC_CFG_DUPLEX: u32 = 1 << 2;
/// 100 Mbps
pub const MAC_CFG_SPEED: u32 = 1 << 1;
/// Link forced up
pub const MAC_CFG_LINK: u32 = 1 << 0;

// =============================================================================
// Misc
// =============================================================================

/// Forward to CPU only frames matching the unicast filter
pub const ENETS0_FTCU: u32 = 1 << 28;
/// Undersize packet length programmed in the upper half of IGPLEN
pub const PLEN_UNDER: u32 = 0x40;

/// Internal PHY address used by EPHY mode
pub const EPHY_ADDR: u8 = 0x8;
/// Internal PHY register written by EPHY mode
pub const EPHY_REG: u8 = 0x12;
/// Value written to the internal PHY to bring it up
pub const EPHY_MAGIC: u16 = 0xC020;
