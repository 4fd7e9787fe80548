//! Airoha SCU SerDes lane-mode mux Register Definitions

use super::genmask;

/// PCIe controller configuration register
pub const PCIC: usize = 0x88;
/// PCIe port 0 runs two lanes
pub const PCIC_PCIE_2LANE_MODE: u32 = 1 << 14;

/// SerDes status register 3
pub const SSR3: usize = 0x94;
/// USB1 SerDes feeds the HSGMII block
pub const SSR3_HSGMII_SEL: u32 = 1 << 29;

/// SerDes selection register
pub const SSTR: usize = 0x9C;
/// USB2 SerDes feeds USB3 (clear for PCIe2)
pub const SSTR_USB_PCIE_SEL: u32 = 1 << 3;
/// WiFi1 lane selector
pub const SSTR_PCIE_XSI0_SEL: u32 = genmask(14, 13);
/// WiFi2 lane selector
pub const SSTR_PCIE_XSI1_SEL: u32 = genmask(12, 11);
/// Selector value routing a lane to PCIe
pub const SSTR_PCIE_XSI_SEL_PCIE: u32 = 0;
