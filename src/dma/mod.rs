//! DMA descriptor rings and channels
//!
//! - [`descriptor`]: the two-word XWAY descriptor and its ownership bits
//! - [`ring`]: fixed-size circular descriptor array
//! - [`channel`]: the [`DmaChannelOps`] seam and the XWAY controller
//! - [`rx`] / [`tx`]: per-direction buffer binding and polling
//! - [`poll`]: bounded-work poll results

pub mod channel;
pub mod descriptor;
pub mod poll;
pub mod ring;
pub mod rx;
pub mod tx;

pub use channel::{ChannelState, ChannelStats, Direction, DmaChannelOps, XwayDma};
pub use descriptor::Descriptor;
pub use poll::{PollOutcome, PollRequest, PollStatus};
pub use ring::DescriptorRing;
pub use rx::{RxChannel, RxFrame};
pub use tx::{TxChannel, TxStatus};
