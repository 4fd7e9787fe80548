//! SoC DMA Driver Core
//!
//! A `no_std`, `no_alloc` Rust implementation of three small SoC blocks that
//! all come down to handing memory between software and hardware:
//!
//! 1. **ETOP Ethernet** ([`driver::etop`]): Lantiq/XWAY style MAC front end
//!    with one TX and one RX DMA descriptor ring ([`dma`])
//! 2. **EIP-93 PRNG** ([`prng`]): double-buffered random bytes from a crypto
//!    packet engine's command ring
//! 3. **SerDes mux** ([`serdes`]): lane-mode selection in the Airoha SCU
//!
//! # Architecture
//!
//! - **HAL Layer** ([`hal`]): per-instance register windows ([`RegisterIo`])
//!   and MDIO access. Nothing is addressed through a global base.
//! - **DMA Layer** ([`dma`]): descriptor rings, channel control
//!   ([`DmaChannelOps`]) and the budgeted RX/TX polls
//! - **Buffers** ([`buffer`]): [`DmaBuffer`] and [`BufferAllocator`], plus the
//!   static [`BufferPool`](buffer::BufferPool)
//! - **Device** ([`driver`]): configuration, errors, the [`Etop`] lifecycle
//!   and frame classification
//!
//! # Features
//!
//! - `log`: route diagnostics through the `log` facade
//! - `defmt`: route diagnostics through `defmt` and derive `defmt::Format`
//! - `smoltcp`: `smoltcp::phy::Device` for [`Etop`]
//! - `critical-section`: ISR-safe [`SharedEtop`](sync::SharedEtop) wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_soc_dma::buffer::BufferPool;
//! use ph_soc_dma::dma::XwayDma;
//! use ph_soc_dma::hal::Mmio;
//! use ph_soc_dma::{Etop, EtopConfig, IrqMap, MiiMode, PollRequest};
//!
//! static POOL: BufferPool<32, 1600> = BufferPool::new();
//!
//! let regs = unsafe { Mmio::new(ETOP_BASE) };
//! let dma = XwayDma::new(unsafe { Mmio::new(DMA_BASE) });
//! let config = EtopConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56])
//!     .with_mii_mode(MiiMode::Rmii);
//!
//! // the device must not move once `init` has programmed its rings
//! let mut etop: Etop<_, _, _, 16, 16> =
//!     Etop::new(regs, dma, &POOL, config, IrqMap::new(TX_IRQ, RX_IRQ, DMA_IRQ_BASE));
//! etop.init(&mut delay)?;
//! etop.open()?;
//!
//! // interrupt: pick the poll, run it from the worker
//! match etop.handle_irq(irq) {
//!     Some(PollRequest::Rx) => { etop.poll_rx(|frame| stack.input(frame))?; }
//!     Some(PollRequest::Tx) => { etop.poll_tx()?; }
//!     None => {}
//! }
//! ```
//!
//! # Memory Requirements
//!
//! Each descriptor is 8 bytes; buffers live wherever the allocator keeps
//! them. A 32 x 1600 byte [`BufferPool`](buffer::BufferPool) is about 50 KB.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels mirror the [lints] table in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

#[cfg(test)]
extern crate std;

// Logging macros first so every module below can use them
#[macro_use]
mod fmt;

// =============================================================================
// Modules
// =============================================================================

pub mod buffer;
pub mod dma;
pub mod driver;
pub mod hal;
pub mod prng;
pub mod serdes;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use buffer::{BufferAllocator, DmaBuffer};
pub use dma::{
    ChannelState, ChannelStats, DmaChannelOps, PollOutcome, PollRequest, PollStatus, RxFrame,
    TxStatus, XwayDma,
};
pub use driver::config::{DmaBurstLen, EtopConfig, IrqMap, MiiMode, PrngConfig, State};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::etop::{Etop, EtopDefault, EtopStats};
pub use driver::frame::{EtherType, PacketClass};
pub use hal::{EtopMdio, MdioBus, Mmio, RegisterIo};
pub use prng::{PacketEngine, PrngCompletion, PrngEngine};
pub use serdes::{ScuSsr, SerdesMode, SerdesPort};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedEtop};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{
        // Frame/buffer sizes
        CRC_SIZE,
        DEFAULT_BUFFER_SIZE,
        // MAC address
        DEFAULT_MAC_ADDR,
        // PRNG
        DEFAULT_PRNG_DATETIME,
        DEFAULT_PRNG_KEY,
        DEFAULT_PRNG_POLL_INTERVAL_US,
        DEFAULT_PRNG_SEED,
        DEFAULT_PRNG_TIMEOUT_US,
        // Timing
        DEFAULT_RESET_POLL_LIMIT,
        // Polling
        DEFAULT_RX_BUDGET,
        // Ring sizes
        DEFAULT_RX_DESCRIPTORS,
        DEFAULT_TX_BUDGET,
        DEFAULT_TX_DESCRIPTORS,
        ETH_HEADER_SIZE,
        MAC_ADDR_LEN,
        MAX_DMA_DATA_LEN,
        MAX_POOL_BUFFERS,
        MIN_FRAME_SIZE,
        MIN_MTU,
        MTU,
        NET_IP_ALIGN,
        PRNG_BLOCK_LEN,
        PRNG_BLOCK_SIZE,
    };
}
