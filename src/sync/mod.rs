//! Interrupt-safe sharing
//!
//! - [`CriticalSectionCell`] - interior mutability guarded by a critical
//!   section
//! - [`SharedEtop`] - an [`Etop`](crate::Etop) reachable from both the
//!   interrupt handler and the worker that runs the polls
//!
//! The lock is held only for the closure, so each ring-index update and
//! descriptor write happens with interrupts masked and nothing else.
//! Received frames are handed upward after the lock is released. Never
//! wait on a [`PrngCompletion`](crate::prng::PrngCompletion) inside it.
//!
//! # Feature Flags
//!
//! - `critical-section`: enables this module; the platform HAL provides the
//!   critical-section implementation
//!
//! # Example
//!
//! ```ignore
//! use ph_soc_dma::sync::SharedEtop;
//!
//! static POOL: BufferPool<32, 1600> = BufferPool::new();
//! static ETOP: SharedEtop<Mmio, XwayDma<Mmio>, &'static BufferPool<32, 1600>, 16, 16> =
//!     SharedEtop::new(
//!         unsafe { Mmio::new(ETOP_BASE) },
//!         XwayDma::new(unsafe { Mmio::new(DMA_BASE) }),
//!         &POOL,
//!         EtopConfig::new().with_mac_address(MAC),
//!         IrqMap::new(TX_IRQ, RX_IRQ, DMA_IRQ_BASE),
//!     );
//!
//! // rings are programmed at their final address
//! ETOP.init(&mut delay)?;
//! ETOP.open()?;
//!
//! #[interrupt]
//! fn DMA_IRQ(irq: u32) {
//!     if let Some(request) = ETOP.handle_irq(irq) {
//!         schedule(request);
//!     }
//! }
//!
//! // worker
//! ETOP.poll(request, |frame| stack.push(frame))?;
//! ```

mod primitives;
mod shared;

pub use primitives::CriticalSectionCell;
pub use shared::SharedEtop;
