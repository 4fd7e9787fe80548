//! Receive channel.
//!
//! Every descriptor of the ring is armed with a buffer when the channel is
//! set up. The poll walks the ring from the current index; each completed
//! descriptor gets a fresh buffer before the filled one travels upward, so
//! the ring never holds an armed descriptor without memory behind it.
//!
//! Running out of buffers is fail-stop. The channel is switched off once,
//! the filled buffer stays bound to its descriptor and the frame is dropped.
//! The channel stays dead until it is set up again.

use core::sync::atomic::{Ordering, fence};

use crate::buffer::{BufferAllocator, DmaBuffer};
use crate::driver::error::{DmaError, DmaResult, Result};
use crate::driver::frame::{EtherType, PacketClass};
use crate::internal::constants::{CRC_SIZE, MAC_ADDR_LEN, MAX_DMA_DATA_LEN, NET_IP_ALIGN};
use crate::internal::descriptor_bits::ctl;

use super::channel::{ChannelState, ChannelStats, Direction, DmaChannelOps};
use super::descriptor::Descriptor;
use super::poll::PollOutcome;
use super::ring::DescriptorRing;

/// Frame taken out of the RX ring, owning the buffer it landed in
pub struct RxFrame<B: DmaBuffer> {
    buffer: B,
    offset: usize,
    len: usize,
    protocol: Option<EtherType>,
    class: PacketClass,
}

impl<B: DmaBuffer> RxFrame<B> {
    /// Frame bytes, from the destination address up to (not including) the FCS
    pub fn payload(&self) -> &[u8] {
        &self.buffer.storage()[self.offset..self.offset + self.len]
    }

    /// Mutable frame bytes
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let (offset, len) = (self.offset, self.len);
        &mut self.buffer.storage_mut()[offset..offset + len]
    }

    /// Frame length without the FCS
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-length frame
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// EtherType, `None` for runts shorter than an Ethernet header
    pub fn protocol(&self) -> Option<EtherType> {
        self.protocol
    }

    /// Destination class relative to the station address
    pub fn class(&self) -> PacketClass {
        self.class
    }

    /// Give the buffer back; its valid bytes end where the frame ends
    pub fn into_buffer(self) -> B {
        self.buffer
    }
}

impl<B: DmaBuffer> core::fmt::Debug for RxFrame<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RxFrame")
            .field("len", &self.len)
            .field("protocol", &self.protocol)
            .field("class", &self.class)
            .finish()
    }
}

/// What one step of the RX walk produced
enum RxStep<B: DmaBuffer> {
    Frame(RxFrame<B>),
    /// Descriptor consumed without a frame (bad length)
    Recycled,
    /// Hardware still owns the current descriptor
    Empty,
}

/// Receive side of a DMA channel with `N` descriptors
pub struct RxChannel<A: BufferAllocator, const N: usize> {
    nr: u8,
    ring: DescriptorRing<Descriptor, N>,
    programmed: Option<u32>,
    slots: [Option<A::Buffer>; N],
    alloc: A,
    state: ChannelState,
    stats: ChannelStats,
    station: [u8; MAC_ADDR_LEN],
}

impl<A: BufferAllocator, const N: usize> RxChannel<A, N> {
    /// Channel `nr` drawing buffers from `alloc`
    pub const fn new(nr: u8, alloc: A) -> Self {
        Self {
            nr,
            ring: DescriptorRing::new(),
            programmed: None,
            slots: [const { None }; N],
            alloc,
            state: ChannelState::Idle,
            stats: ChannelStats::new(),
            station: [0; MAC_ADDR_LEN],
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

    /// Buffer source
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Address frames are classified against
    pub fn set_station_address(&mut self, addr: [u8; MAC_ADDR_LEN]) {
        self.station = addr;
    }

    /// Number of descriptors with a buffer bound
    pub fn bound(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Program the ring, reset the channel and arm every descriptor.
    ///
    /// Buffers still bound from an earlier run are released first. If the
    /// allocator runs dry while priming, everything bound so far is released
    /// again and the channel is left idle.
    ///
    /// The hardware keeps the ring address, so the channel must not move
    /// until it is released; [`open`](Self::open) and [`poll`](Self::poll)
    /// refuse a ring that did.
    pub fn setup<D: DmaChannelOps>(&mut self, dma: &mut D, reset_poll_limit: u32) -> Result<()> {
        self.release(dma);
        let base = self.ring.base_addr_u32();
        dma.setup_ring(self.nr, Direction::Rx, base, N, reset_poll_limit)?;
        self.programmed = Some(base);

        for index in 0..N {
            let Some(buf) = self.alloc.allocate() else {
                error!("rx ring {}: only {} of {} buffers", self.nr, index, N);
                self.release(dma);
                return Err(DmaError::AllocationFailed.into());
            };
            self.arm(index, buf);
        }

        self.state = ChannelState::Closed;
        debug!("rx ring {} primed with {} buffers", self.nr, N);
        Ok(())
    }

    /// Switch the channel on
    pub fn open<D: DmaChannelOps>(&mut self, dma: &mut D) -> DmaResult<()> {
        match self.state {
            ChannelState::Open => Ok(()),
            ChannelState::Closed => {
                self.check_ring()?;
                dma.open(self.nr);
                self.state = ChannelState::Open;
                Ok(())
            }
            ChannelState::Idle | ChannelState::Failed => Err(DmaError::ChannelClosed),
        }
    }

    /// Renumber an idle channel
    pub(crate) fn set_channel(&mut self, nr: u8) {
        if self.state == ChannelState::Idle {
            self.nr = nr;
        }
    }

    /// Switch the channel off, keeping its buffers armed
    pub fn close<D: DmaChannelOps>(&mut self, dma: &mut D) {
        if self.state == ChannelState::Open {
            dma.close(self.nr);
            self.state = ChannelState::Closed;
        }
    }

    /// Switch the channel off and drop every bound buffer
    pub fn release<D: DmaChannelOps>(&mut self, dma: &mut D) {
        self.close(dma);
        for slot in &mut self.slots {
            *slot = None;
        }
        self.ring.clear();
        self.programmed = None;
        self.state = ChannelState::Idle;
    }

    /// Hand up to `budget` received frames to `deliver`.
    ///
    /// The channel interrupt is acknowledged only when the ring drained
    /// before the budget ran out.
    pub fn poll<D, F>(&mut self, dma: &mut D, budget: usize, mut deliver: F) -> DmaResult<PollOutcome>
    where
        D: DmaChannelOps,
        F: FnMut(RxFrame<A::Buffer>),
    {
        if self.state != ChannelState::Open {
            return Err(DmaError::ChannelClosed);
        }
        self.check_ring()?;

        let mut work_done = 0;
        while work_done < budget {
            match self.take_frame(dma)? {
                RxStep::Frame(frame) => {
                    deliver(frame);
                    work_done += 1;
                }
                RxStep::Recycled => work_done += 1,
                RxStep::Empty => break,
            }
        }

        let outcome = PollOutcome::from_budget(work_done, budget);
        if outcome.is_complete() {
            dma.ack_irq(self.nr);
        }
        Ok(outcome)
    }

    fn take_frame<D: DmaChannelOps>(&mut self, dma: &mut D) -> DmaResult<RxStep<A::Buffer>> {
        let index = self.ring.current_index();
        let desc = self.ring.get(index);
        if !desc.is_complete() {
            return Ok(RxStep::Empty);
        }
        // Payload written by the engine is visible once C is observed
        fence(Ordering::Acquire);
        let raw = desc.length();

        let capacity = match &self.slots[index] {
            Some(buf) => buf.capacity(),
            None => 0,
        };
        if raw < CRC_SIZE || NET_IP_ALIGN + raw > capacity {
            warn!("rx ring {}: bad length {} at {}", self.nr, raw, index);
            self.stats.record_error();
            let buf = match self.slots[index].take() {
                Some(buf) => buf,
                None => match self.alloc.allocate() {
                    Some(buf) => buf,
                    None => return Err(self.fail_stop(dma)),
                },
            };
            self.arm(index, buf);
            self.ring.advance();
            return Ok(RxStep::Recycled);
        }

        let Some(fresh) = self.alloc.allocate() else {
            return Err(self.fail_stop(dma));
        };
        let previous = self.slots[index].take();
        self.arm(index, fresh);
        self.ring.advance();

        let Some(mut buffer) = previous else {
            return Ok(RxStep::Recycled);
        };
        let len = raw - CRC_SIZE;
        buffer.set_len(NET_IP_ALIGN + len);
        let frame = &buffer.storage()[NET_IP_ALIGN..NET_IP_ALIGN + len];
        let protocol = EtherType::of_frame(frame);
        let class = PacketClass::of_frame(frame, &self.station);

        self.stats.record_frame(len);
        trace!("rx ring {}: {} bytes at {}", self.nr, len, index);

        Ok(RxStep::Frame(RxFrame {
            buffer,
            offset: NET_IP_ALIGN,
            len,
            protocol,
            class,
        }))
    }

    /// Close the channel once, leaving the completed descriptor and its
    /// buffer where they are
    fn fail_stop<D: DmaChannelOps>(&mut self, dma: &mut D) -> DmaError {
        self.stats.record_drop();
        if self.state != ChannelState::Failed {
            error!("rx ring {} out of buffers, closing channel", self.nr);
            dma.close(self.nr);
            self.state = ChannelState::Failed;
        }
        DmaError::AllocationFailed
    }

    fn check_ring(&self) -> DmaResult<()> {
        match self.programmed {
            Some(base) if base == self.ring.base_addr_u32() => Ok(()),
            Some(_) => {
                error!("rx ring {} moved after setup", self.nr);
                Err(DmaError::RingRelocated)
            }
            None => Err(DmaError::ChannelClosed),
        }
    }

    fn arm(&mut self, index: usize, buf: A::Buffer) {
        let len = buf
            .capacity()
            .saturating_sub(NET_IP_ALIGN)
            .min(MAX_DMA_DATA_LEN);
        self.ring.mark_ready(
            index,
            buf.dma_addr(),
            ctl::rx_offset(NET_IP_ALIGN as u32) | len as u32,
        );
        self.slots[index] = Some(buf);
    }

    #[cfg(test)]
    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut A::Buffer> {
        self.slots[index].as_mut()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::boxed::Box;
    use std::vec::Vec;

    use super::*;
    use crate::driver::error::Error;
    use crate::testing::{MockAllocator, MockDma, complete_rx};

    const NR: u8 = 1;

    fn channel(alloc: &MockAllocator) -> (RxChannel<MockAllocator, 4>, MockDma) {
        (RxChannel::new(NR, alloc.clone()), MockDma::new())
    }

    // the ring address goes to hardware here, so the channel is set up
    // where the test keeps it
    fn start(rx: &mut RxChannel<MockAllocator, 4>, dma: &mut MockDma) {
        rx.setup(dma, 10).unwrap();
        rx.open(dma).unwrap();
    }

    fn receive(rx: &mut RxChannel<MockAllocator, 4>, index: usize, frame: &[u8]) {
        let buf = rx.slot_mut(index).unwrap();
        buf.storage_mut()[NET_IP_ALIGN..NET_IP_ALIGN + frame.len()].copy_from_slice(frame);
        complete_rx(rx.ring().get(index), frame.len() + CRC_SIZE);
    }

    fn arp_frame() -> [u8; 60] {
        let mut f = [0u8; 60];
        f[..6].copy_from_slice(&[0xFF; 6]);
        f[12..14].copy_from_slice(&0x0806u16.to_be_bytes());
        f
    }

    #[test]
    fn rx_setup_arms_every_descriptor() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);

        assert_eq!(rx.bound(), 4);
        assert_eq!(rx.ring().hardware_owned(), 4);
        assert_eq!(alloc.live(), 4);
        assert_eq!(dma.setups(), &[(NR, Direction::Rx, rx.ring().base_addr_u32(), 4)]);

        let desc = rx.ring().get(0);
        assert_eq!(desc.byte_offset(), NET_IP_ALIGN);
        assert_eq!(desc.length(), MAX_DMA_DATA_LEN);
    }

    #[test]
    fn rx_moved_ring_is_refused() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        rx.setup(&mut dma, 10).unwrap();

        let mut moved = Box::new(rx);
        assert_eq!(moved.open(&mut dma), Err(DmaError::RingRelocated));
        assert_eq!(dma.opens(NR), 0);

        // programming the ring again at its new home makes it usable
        moved.setup(&mut dma, 10).unwrap();
        moved.open(&mut dma).unwrap();
        assert_eq!(dma.setups().last(), Some(&(NR, Direction::Rx, moved.ring().base_addr_u32(), 4)));
    }

    #[test]
    fn rx_open_ring_moved_while_running_stops_polling() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);

        let mut moved = Box::new(rx);
        assert_eq!(moved.poll(&mut dma, 4, drop), Err(DmaError::RingRelocated));
        assert_eq!(dma.acks(NR), 0);
    }

    #[test]
    fn rx_setup_failure_releases_partial_ring() {
        let alloc = MockAllocator::new(1600);
        alloc.fail_after(2);
        let mut dma = MockDma::new();
        let mut rx: RxChannel<_, 4> = RxChannel::new(NR, alloc.clone());

        assert_eq!(
            rx.setup(&mut dma, 10),
            Err(Error::Dma(DmaError::AllocationFailed))
        );
        assert_eq!(rx.state(), ChannelState::Idle);
        assert_eq!(rx.bound(), 0);
        assert_eq!(alloc.live(), 0);
        assert_eq!(rx.open(&mut dma), Err(DmaError::ChannelClosed));
    }

    #[test]
    fn rx_poll_delivers_frame_and_rearms() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        rx.set_station_address([0x02, 0, 0, 0, 0, 1]);
        receive(&mut rx, 0, &arp_frame());

        let mut frames = Vec::new();
        let outcome = rx.poll(&mut dma, 32, |f| frames.push(f)).unwrap();

        assert_eq!(outcome.work_done, 1);
        assert!(outcome.is_complete());
        assert_eq!(dma.acks(NR), 1);

        let frame = &frames[0];
        assert_eq!(frame.len(), 60);
        assert_eq!(frame.protocol(), Some(EtherType::Arp));
        assert_eq!(frame.class(), PacketClass::Broadcast);
        assert_eq!(&frame.payload()[..6], &[0xFF; 6]);

        assert!(rx.ring().is_owned_by_hardware(0));
        assert_eq!(rx.ring().current_index(), 1);
        assert_eq!(rx.stats().packets, 1);
        assert_eq!(rx.stats().bytes, 60);
        // four armed plus the one handed up
        assert_eq!(alloc.live(), 5);
    }

    #[test]
    fn rx_poll_stops_at_budget_without_ack() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        for i in 0..3 {
            receive(&mut rx, i, &arp_frame());
        }

        let outcome = rx.poll(&mut dma, 2, drop).unwrap();
        assert_eq!(outcome.work_done, 2);
        assert!(!outcome.is_complete());
        assert_eq!(dma.acks(NR), 0);

        let outcome = rx.poll(&mut dma, 2, drop).unwrap();
        assert_eq!(outcome.work_done, 1);
        assert!(outcome.is_complete());
        assert_eq!(dma.acks(NR), 1);
    }

    #[test]
    fn rx_poll_wraps_around_the_ring() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        let mut total = 0;
        for round in 0..3 {
            for i in 0..4 {
                receive(&mut rx, i, &arp_frame());
            }
            let outcome = rx.poll(&mut dma, 8, drop).unwrap();
            total += outcome.work_done;
            assert_eq!(rx.ring().current_index(), 0, "round {round}");
        }
        assert_eq!(total, 12);
        assert_eq!(alloc.live(), 4);
    }

    #[test]
    fn rx_allocation_failure_is_fail_stop() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        receive(&mut rx, 0, &arp_frame());
        receive(&mut rx, 1, &arp_frame());
        alloc.fail_after(0);

        let mut delivered = 0;
        let result = rx.poll(&mut dma, 32, |_| delivered += 1);

        assert_eq!(result, Err(DmaError::AllocationFailed));
        assert_eq!(delivered, 0);
        assert_eq!(rx.state(), ChannelState::Failed);
        assert_eq!(dma.closes(NR), 1);
        assert_eq!(rx.stats().dropped, 1);
        // the completed descriptor keeps its buffer and is not re-armed
        assert_eq!(rx.bound(), 4);
        assert!(rx.ring().get(0).is_complete());
        assert_eq!(rx.ring().current_index(), 0);

        // later polls never reach hardware, even with buffers back
        alloc.refill();
        assert_eq!(rx.poll(&mut dma, 32, drop), Err(DmaError::ChannelClosed));
        assert_eq!(dma.closes(NR), 1);
        assert_eq!(dma.acks(NR), 0);
    }

    #[test]
    fn rx_failed_channel_revives_after_setup() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        receive(&mut rx, 0, &arp_frame());
        alloc.fail_after(0);
        assert!(rx.poll(&mut dma, 32, drop).is_err());

        alloc.refill();
        rx.setup(&mut dma, 10).unwrap();
        rx.open(&mut dma).unwrap();
        assert_eq!(rx.state(), ChannelState::Open);
        assert_eq!(alloc.live(), 4);
    }

    #[test]
    fn rx_bad_length_recycles_in_place() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        let addr = rx.ring().get(0).address();
        complete_rx(rx.ring().get(0), 2);

        let mut delivered = 0;
        let outcome = rx.poll(&mut dma, 32, |_| delivered += 1).unwrap();

        assert_eq!(outcome.work_done, 1);
        assert_eq!(delivered, 0);
        assert_eq!(rx.stats().errors, 1);
        assert!(rx.ring().is_owned_by_hardware(0));
        assert_eq!(rx.ring().get(0).address(), addr);
        assert_eq!(alloc.live(), 4);
    }

    #[test]
    fn rx_closed_channel_rejects_poll() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        rx.close(&mut dma);
        assert_eq!(rx.state(), ChannelState::Closed);
        assert_eq!(rx.poll(&mut dma, 4, drop), Err(DmaError::ChannelClosed));
        assert_eq!(rx.bound(), 4);
    }

    #[test]
    fn rx_release_drops_every_buffer() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        rx.release(&mut dma);
        assert_eq!(alloc.live(), 0);
        assert_eq!(rx.ring().hardware_owned(), 0);
        assert_eq!(dma.closes(NR), 1);
    }

    #[test]
    fn rx_frame_into_buffer_keeps_frame_bytes() {
        let alloc = MockAllocator::new(1600);
        let (mut rx, mut dma) = channel(&alloc);
        start(&mut rx, &mut dma);
        receive(&mut rx, 0, &arp_frame());

        let mut frames = Vec::new();
        let _ = rx.poll(&mut dma, 1, |f| frames.push(f)).unwrap();
        let buf = frames.pop().unwrap().into_buffer();
        assert_eq!(buf.len(), NET_IP_ALIGN + 60);
    }
}
