//! Transmit channel.
//!
//! The ring's cursor is the producer (tail); `free` is the consumer that
//! reclaims what hardware finished. A slot is usable only when its
//! descriptor is idle and no buffer is bound to it, so the two indices never
//! meet on a hardware-owned descriptor.

use crate::buffer::DmaBuffer;
use crate::driver::config::DmaBurstLen;
use crate::driver::error::{ConfigResult, DmaError, DmaResult};
use crate::internal::constants::{MAX_DMA_DATA_LEN, MIN_FRAME_SIZE};
use crate::internal::descriptor_bits::ctl;

use super::channel::{ChannelState, ChannelStats, Direction, DmaChannelOps};
use super::descriptor::Descriptor;
use super::poll::PollOutcome;
use super::ring::DescriptorRing;

/// Result of offering a frame to the TX ring
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum TxStatus<B> {
    /// The frame is owned by the ring until hardware sends it
    Accepted,
    /// The ring is full; the frame comes back untouched and the queue is
    /// stopped until a TX poll frees the tail
    Busy(B),
}

impl<B> TxStatus<B> {
    /// The frame was queued
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Transmit side of a DMA channel with `N` descriptors
pub struct TxChannel<B: DmaBuffer, const N: usize> {
    nr: u8,
    ring: DescriptorRing<Descriptor, N>,
    programmed: Option<u32>,
    free: usize,
    slots: [Option<B>; N],
    state: ChannelState,
    stats: ChannelStats,
    queue_stopped: bool,
    burst: DmaBurstLen,
}

impl<B: DmaBuffer, const N: usize> TxChannel<B, N> {
    /// Channel `nr`; buffer addresses are aligned down to `burst`
    pub const fn new(nr: u8, burst: DmaBurstLen) -> Self {
        Self {
            nr,
            ring: DescriptorRing::new(),
            programmed: None,
            free: 0,
            slots: [const { None }; N],
            state: ChannelState::Idle,
            stats: ChannelStats::new(),
            queue_stopped: true,
            burst,
        }
    }

    /// DMA channel number
    pub const fn channel(&self) -> u8 {
        self.nr
    }

    /// Current lifecycle state
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    /// Counters since creation
    pub const fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Descriptor ring, for inspection
    pub fn ring(&self) -> &DescriptorRing<Descriptor, N> {
        &self.ring
    }

    /// Producer index
    pub const fn tail(&self) -> usize {
        self.ring.current_index()
    }

    /// Consumer index
    pub const fn free_index(&self) -> usize {
        self.free
    }

    /// Frames handed to hardware and not yet reclaimed
    pub fn in_flight(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Upstream must hold frames back
    pub const fn is_queue_stopped(&self) -> bool {
        self.queue_stopped
    }

    /// Change the alignment used for later submissions
    pub fn set_burst(&mut self, burst: DmaBurstLen) {
        self.burst = burst;
    }

    /// Program the ring and reset the channel, dropping anything in flight
    ///
    /// The channel must stay where it is until it is released.
    pub fn setup<D: DmaChannelOps>(&mut self, dma: &mut D, reset_poll_limit: u32) -> ConfigResult<()> {
        self.release(dma);
        let base = self.ring.base_addr_u32();
        dma.setup_ring(self.nr, Direction::Tx, base, N, reset_poll_limit)?;
        self.programmed = Some(base);
        self.state = ChannelState::Closed;
        Ok(())
    }

    /// Switch the channel on and start the queue
    pub fn open<D: DmaChannelOps>(&mut self, dma: &mut D) -> DmaResult<()> {
        match self.state {
            ChannelState::Open => {}
            ChannelState::Closed => {
                self.check_ring()?;
                dma.open(self.nr);
                self.state = ChannelState::Open;
            }
            ChannelState::Idle | ChannelState::Failed => return Err(DmaError::ChannelClosed),
        }
        self.queue_stopped = !self.slot_free(self.tail());
        Ok(())
    }

    /// Renumber an idle channel
    pub(crate) fn set_channel(&mut self, nr: u8) {
        if self.state == ChannelState::Idle {
            self.nr = nr;
        }
    }

    /// Switch the channel off and stop the queue
    pub fn close<D: DmaChannelOps>(&mut self, dma: &mut D) {
        if self.state == ChannelState::Open {
            dma.close(self.nr);
            self.state = ChannelState::Closed;
        }
        self.queue_stopped = true;
    }

    /// Switch the channel off and drop every frame still in flight
    pub fn release<D: DmaChannelOps>(&mut self, dma: &mut D) {
        self.close(dma);
        let dropped = self.in_flight();
        if dropped > 0 {
            debug!("tx ring {}: dropping {} queued frames", self.nr, dropped);
        }
        for slot in &mut self.slots {
            *slot = None;
        }
        self.ring.clear();
        self.free = 0;
        self.programmed = None;
        self.state = ChannelState::Idle;
    }

    /// Queue a frame.
    ///
    /// Frames shorter than the Ethernet minimum are zero padded. An error
    /// consumes the buffer; a full ring hands it back in
    /// [`TxStatus::Busy`].
    pub fn submit(&mut self, mut buf: B) -> DmaResult<TxStatus<B>> {
        if self.state != ChannelState::Open {
            return Err(DmaError::ChannelClosed);
        }
        self.check_ring()?;
        let mut len = buf.len();
        if len == 0 {
            return Err(DmaError::InvalidLength);
        }
        if len > MAX_DMA_DATA_LEN {
            self.stats.record_drop();
            return Err(DmaError::FrameTooLarge);
        }

        let tail = self.tail();
        if !self.slot_free(tail) {
            warn!("tx ring {} full", self.nr);
            self.queue_stopped = true;
            return Ok(TxStatus::Busy(buf));
        }

        if len < MIN_FRAME_SIZE {
            if buf.capacity() < MIN_FRAME_SIZE {
                return Err(DmaError::InvalidLength);
            }
            buf.storage_mut()[len..MIN_FRAME_SIZE].fill(0);
            buf.set_len(MIN_FRAME_SIZE);
            len = MIN_FRAME_SIZE;
        }

        let addr = buf.dma_addr();
        let offset = addr % self.burst.bytes();
        self.ring.mark_ready(
            tail,
            addr - offset,
            ctl::SOP | ctl::EOP | ctl::tx_offset(offset) | len as u32,
        );
        self.slots[tail] = Some(buf);
        self.ring.advance();

        self.stats.record_frame(len);

        if !self.slot_free(self.tail()) {
            self.queue_stopped = true;
        }
        Ok(TxStatus::Accepted)
    }

    /// Reclaim up to `budget` sent frames and wake the queue if the tail
    /// is free again
    pub fn poll<D: DmaChannelOps>(&mut self, dma: &mut D, budget: usize) -> DmaResult<PollOutcome> {
        if self.state != ChannelState::Open {
            return Err(DmaError::ChannelClosed);
        }
        self.check_ring()?;

        let mut work_done = 0;
        while work_done < budget {
            let desc = self.ring.get(self.free);
            if !desc.is_complete() {
                break;
            }
            self.slots[self.free] = None;
            desc.clear();
            self.free = DescriptorRing::<Descriptor, N>::next_index(self.free);
            work_done += 1;
        }

        if self.queue_stopped && self.slot_free(self.tail()) {
            trace!("tx ring {}: queue woken", self.nr);
            self.queue_stopped = false;
        }

        let outcome = PollOutcome::from_budget(work_done, budget);
        if outcome.is_complete() {
            dma.ack_irq(self.nr);
        }
        Ok(outcome)
    }

    fn check_ring(&self) -> DmaResult<()> {
        match self.programmed {
            Some(base) if base == self.ring.base_addr_u32() => Ok(()),
            Some(_) => {
                error!("tx ring {} moved after setup", self.nr);
                Err(DmaError::RingRelocated)
            }
            None => Err(DmaError::ChannelClosed),
        }
    }

    fn slot_free(&self, index: usize) -> bool {
        self.ring.get(index).is_idle() && self.slots[index].is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================
