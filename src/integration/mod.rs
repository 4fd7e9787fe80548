//! External Stack Integrations
//!
//! - **smoltcp** (`smoltcp`): `smoltcp::phy::Device` for [`Etop`](crate::Etop)
//!   - RX tokens own the received buffer, TX tokens borrow the device
//!   - Requires `smoltcp` feature
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::phy::Device;
//! let caps = etop.capabilities();
//! if let Some((rx, _tx)) = etop.receive(Instant::ZERO) {
//!     rx.consume(|frame| handle(frame));
//! }
//! ```

#[cfg(feature = "smoltcp")]
pub mod smoltcp;

#[cfg(feature = "smoltcp")]
pub use smoltcp::{EtopRxToken, EtopTxToken, ethernet_address};
