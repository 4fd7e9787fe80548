//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! Implements `smoltcp::phy::Device` for [`Etop`], so the device can back a
//! smoltcp `Interface` directly.
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::iface::{Config, Interface};
//! use ph_soc_dma::integration::smoltcp::ethernet_address;
//!
//! etop.init(&mut delay)?;
//! etop.open()?;
//!
//! let config = Config::new(ethernet_address(&etop).into());
//! let mut iface = Interface::new(config, &mut etop, Instant::ZERO);
//! ```
//!
//! # Tokens
//!
//! The RX token owns the received buffer, so it never borrows the device;
//! the TX token holds the only `&mut` borrow. Neither needs raw pointers.
//! Frames go out through the device allocator; if it is empty, or its
//! buffers are too small for the requested length, the frame is built on
//! the stack and dropped.

use crate::buffer::{BufferAllocator, DmaBuffer};
use crate::dma::{DmaChannelOps, RxFrame, TxStatus};
use crate::driver::config::State;
use crate::driver::etop::Etop;
use crate::hal::RegisterIo;
use crate::internal::constants::{ETH_HEADER_SIZE, MAX_DMA_DATA_LEN};

use smoltcp::phy::{Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;

// =============================================================================
// RX Token
// =============================================================================

/// Receive token owning one frame
pub struct EtopRxToken<B: DmaBuffer> {
    frame: RxFrame<B>,
}

impl<B: DmaBuffer> smoltcp::phy::RxToken for EtopRxToken<B> {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        // buffer goes back to the allocator when the frame drops
        f(self.frame.payload())
    }
}

// =============================================================================
// TX Token
// =============================================================================

/// Transmit token borrowing the device
pub struct EtopTxToken<'a, R, D, A, const RX: usize, const TX: usize>
where
    R: RegisterIo,
    D: DmaChannelOps,
    A: BufferAllocator,
{
    etop: &'a mut Etop<R, D, A, RX, TX>,
}

impl<R, D, A, const RX: usize, const TX: usize> smoltcp::phy::TxToken
    for EtopTxToken<'_, R, D, A, RX, TX>
where
    R: RegisterIo,
    D: DmaChannelOps,
    A: BufferAllocator,
{
    fn consume<T, F>(self, len: usize, f: F) -> T
    where
        F: FnOnce(&mut [u8]) -> T,
    {
        // capabilities cap smoltcp at MTU + header, well below this
        let len = len.min(MAX_DMA_DATA_LEN);

        let Some(mut buf) = self.etop.allocator().allocate() else {
            warn!("smoltcp tx: no buffer, dropping frame");
            return discard(len, f);
        };
        if buf.capacity() < len {
            warn!("smoltcp tx: {} byte buffer for {} byte frame, dropping", buf.capacity(), len);
            return discard(len, f);
        }

        let result = f(&mut buf.storage_mut()[..len]);
        buf.set_len(len);

        match self.etop.transmit(buf) {
            Ok(TxStatus::Accepted) => {}
            Ok(TxStatus::Busy(_)) => warn!("smoltcp tx: ring busy, dropping frame"),
            Err(e) => warn!("smoltcp tx: {}", e),
        }
        result
    }
}

/// Let smoltcp build a frame that is never sent
fn discard<T, F>(len: usize, f: F) -> T
where
    F: FnOnce(&mut [u8]) -> T,
{
    let mut scratch = [0u8; MAX_DMA_DATA_LEN];
    f(&mut scratch[..len])
}

// =============================================================================
// Device Implementation
// =============================================================================

impl<R, D, A, const RX: usize, const TX: usize> Device for Etop<R, D, A, RX, TX>
where
    R: RegisterIo,
    D: DmaChannelOps,
    A: BufferAllocator,
{
    type RxToken<'a>
        = EtopRxToken<A::Buffer>
    where
        Self: 'a;
    type TxToken<'a>
        = EtopTxToken<'a, R, D, A, RX, TX>
    where
        Self: 'a;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        if self.state() != State::Running {
            return None;
        }
        let frame = self.receive_frame().ok().flatten()?;
        Some((EtopRxToken { frame }, EtopTxToken { etop: self }))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.state() != State::Running {
            return None;
        }
        if self.queue_stopped() {
            // reclaim before giving up
            let _ = self.poll_tx();
            if self.queue_stopped() {
                return None;
            }
        }
        Some(EtopTxToken { etop: self })
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.medium = Medium::Ethernet;
        caps.max_transmission_unit = self.config().mtu + ETH_HEADER_SIZE;
        caps.max_burst_size = Some(1);
        caps
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Station address as a smoltcp `EthernetAddress`
pub fn ethernet_address<R, D, A, const RX: usize, const TX: usize>(
    etop: &Etop<R, D, A, RX, TX>,
) -> smoltcp::wire::EthernetAddress
where
    R: RegisterIo,
    D: DmaChannelOps,
    A: BufferAllocator,
{
    smoltcp::wire::EthernetAddress(*etop.mac_address())
}
