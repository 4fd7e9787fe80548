//! ISR-safe ETOP wrapper.

use embedded_hal::delay::DelayNs;

use super::primitives::CriticalSectionCell;
use crate::buffer::BufferAllocator;
use crate::dma::{DmaChannelOps, PollOutcome, PollRequest, RxFrame, TxStatus};
use crate::driver::config::{EtopConfig, IrqMap, State};
use crate::driver::error::Result;
use crate::driver::etop::Etop;
use crate::hal::RegisterIo;

/// [`Etop`] behind a critical section
///
/// The device is built in place by the `const` constructor, so a `static`
/// holds it from the start and the ring addresses handed to the DMA
/// controller by [`init`](Self::init) stay valid for good.
pub struct SharedEtop<R, D, A, const RX: usize, const TX: usize>
where
    R: RegisterIo,
    D: DmaChannelOps,
    A: BufferAllocator,
{
    inner: CriticalSectionCell<Etop<R, D, A, RX, TX>>,
}

impl<R, D, A, const RX: usize, const TX: usize> SharedEtop<R, D, A, RX, TX>
where
    R: RegisterIo,
    D: DmaChannelOps,
    A: BufferAllocator,
{
    /// Wrap a device built from these parts; see [`Etop::new`]
    pub const fn new(regs: R, dma: D, alloc: A, config: EtopConfig, irqs: IrqMap) -> Self {
        Self {
            inner: CriticalSectionCell::new(Etop::new(regs, dma, alloc, config, irqs)),
        }
    }

    /// Run `f` on the device with interrupts masked
    #[inline]
    pub fn with<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut Etop<R, D, A, RX, TX>) -> T,
    {
        self.inner.with(f)
    }

    /// Like [`with`](Self::with), but `None` on reentry
    #[inline]
    pub fn try_with<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut Etop<R, D, A, RX, TX>) -> T,
    {
        self.inner.try_with(f)
    }

    /// Bring the device up in place; see [`Etop::init`]
    pub fn init<Dl: DelayNs>(&self, delay: Dl) -> Result<()> {
        self.with(|etop| etop.init(delay))
    }

    /// See [`Etop::open`]
    pub fn open(&self) -> Result<()> {
        self.with(|etop| etop.open())
    }

    /// See [`Etop::stop`]
    pub fn stop(&self) -> Result<()> {
        self.with(|etop| etop.stop())
    }

    /// Device state
    pub fn state(&self) -> State {
        self.with(|etop| etop.state())
    }

    /// Interrupt half: which poll `irq` asks for
    pub fn handle_irq(&self, irq: u32) -> Option<PollRequest> {
        self.try_with(|etop| etop.handle_irq(irq)).flatten()
    }

    /// Run the poll `request` names.
    ///
    /// The RX poll takes the lock once per descriptor and calls `deliver`
    /// with it released, so the upper layer runs with interrupts enabled
    /// and may use this wrapper itself. The budget and acknowledge rules
    /// are those of [`Etop::poll_rx`].
    ///
    /// # Errors
    /// - the errors of [`Etop::poll_rx`] / [`Etop::poll_tx`]
    pub fn poll<F>(&self, request: PollRequest, mut deliver: F) -> Result<PollOutcome>
    where
        F: FnMut(RxFrame<A::Buffer>),
    {
        match request {
            PollRequest::Tx => self.with(|etop| etop.poll_tx()),
            PollRequest::Rx => {
                let budget = self.with(|etop| etop.config().rx_budget);
                let mut work_done = 0;
                while work_done < budget {
                    match self.with(|etop| etop.receive_frame())? {
                        Some(frame) => {
                            deliver(frame);
                            work_done += 1;
                        }
                        None => break,
                    }
                }
                Ok(PollOutcome::from_budget(work_done, budget))
            }
        }
    }

    /// Offer a frame to the TX ring; see [`Etop::transmit`]
    pub fn transmit(&self, buf: A::Buffer) -> Result<TxStatus<A::Buffer>> {
        self.with(|etop| etop.transmit(buf))
    }

    /// TX queue is stopped
    pub fn queue_stopped(&self) -> bool {
        self.with(|etop| etop.queue_stopped())
    }
}
