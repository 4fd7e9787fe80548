//! Core driver components.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`etop`] - The ETOP Ethernet device
//! - [`frame`] - Received frame classification
//!
//! # Example
//!
//! ```ignore
//! use ph_soc_dma::driver::{EtopConfig, MiiMode};
//!
//! let config = EtopConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01])
//!     .with_mii_mode(MiiMode::Mii);
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod etop;
pub mod frame;

// Re-exports for convenience
pub use config::{DmaBurstLen, EtopConfig, IrqMap, MiiMode, PrngConfig, State};
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use etop::{Etop, EtopDefault, EtopStats};
pub use frame::{EtherType, PacketClass};
