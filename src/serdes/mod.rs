//! SerDes lane-mode mux.
//!
//! Each of the four SerDes ports (two WiFi, two USB) can carry one of a
//! few protocols. The mode comes from a board property
//! (`airoha,serdes-wifi1` and friends), falls back to a per-port default,
//! is checked against the SoC's allow-list and is only then written to the
//! SCU select registers.
//!
//! - [`mode`] - modes, ports, allow-lists and property parsing
//! - [`scu`] - register programming
//!
//! # Example
//!
//! ```ignore
//! use ph_soc_dma::serdes::{ScuSsr, SerdesPlatformData};
//!
//! let ssr = ScuSsr::probe(scu_regs, &SerdesPlatformData::en7581(), &board_props)?;
//! ```

pub mod mode;
pub mod scu;

pub use mode::{
    PropertySource, SerdesMode, SerdesPlatformData, SerdesPort, SerdesPortInfo, SerdesSelection,
};
pub use scu::ScuSsr;
