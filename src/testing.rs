//! Testing utilities and mock implementations
//!
//! Mocks for the hardware seams of the crate (registers, DMA controller,
//! buffers, delays, packet engine and board properties) so drivers can be
//! exercised on the host.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use core::fmt;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::buffer::{BufferAllocator, DmaBuffer};
use crate::dma::{Descriptor, Direction, DmaChannelOps};
use crate::driver::config::DmaBurstLen;
use crate::driver::error::{ConfigError, ConfigResult, DmaError, DmaResult};
use crate::hal::RegisterIo;
use crate::internal::descriptor_bits::ctl;
use crate::prng::{CommandDescriptor, PacketEngine, PrngCompletion};
use crate::serdes::PropertySource;

// =============================================================================
// Mock Registers
// =============================================================================

/// Register window backed by a map, with a write log
///
/// Unset registers read as 0. Reads queued with
/// [`queue_reads`](Self::queue_reads) are returned first, one per read.
#[derive(Debug, Default)]
pub struct MockRegisters {
    values: RefCell<HashMap<usize, u32>>,
    queued: RefCell<HashMap<usize, VecDeque<u32>>>,
    write_log: RefCell<Vec<(usize, u32)>>,
    auto_clear: RefCell<Vec<(usize, u32)>>,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a register without logging a write
    pub fn set(&self, offset: usize, value: u32) {
        self.values.borrow_mut().insert(offset, value);
    }

    /// Current stored value
    pub fn get(&self, offset: usize) -> u32 {
        self.values.borrow().get(&offset).copied().unwrap_or(0)
    }

    /// Every write so far, in order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.write_log.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.write_log.borrow_mut().clear();
    }

    /// Some write to `offset` had all of `bits` set
    pub fn was_written(&self, offset: usize, bits: u32) -> bool {
        self.write_log
            .borrow()
            .iter()
            .any(|&(o, v)| o == offset && v & bits == bits)
    }

    /// `bits` self-clear once written (reset or busy bits)
    pub fn auto_clear(&self, offset: usize, bits: u32) {
        self.auto_clear.borrow_mut().push((offset, bits));
    }

    /// Values returned by the next reads of `offset`
    pub fn queue_reads(&self, offset: usize, values: &[u32]) {
        self.queued
            .borrow_mut()
            .entry(offset)
            .or_default()
            .extend(values.iter().copied());
    }
}

impl RegisterIo for MockRegisters {
    fn read32(&self, offset: usize) -> u32 {
        if let Some(value) = self
            .queued
            .borrow_mut()
            .get_mut(&offset)
            .and_then(VecDeque::pop_front)
        {
            return value;
        }
        self.get(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        self.write_log.borrow_mut().push((offset, value));
        let cleared = self
            .auto_clear
            .borrow()
            .iter()
            .filter(|&&(o, _)| o == offset)
            .fold(0, |acc, &(_, bits)| acc | bits);
        self.set(offset, value & !cleared);
    }
}

// =============================================================================
// Mock DMA Controller
// =============================================================================

/// DMA controller that records every channel operation
#[derive(Debug, Default)]
pub struct MockDma {
    setups: Vec<(u8, Direction, u32, usize)>,
    open: Vec<u8>,
    opens: HashMap<u8, usize>,
    closes: HashMap<u8, usize>,
    acks: HashMap<u8, usize>,
    irq_enabled: HashMap<u8, bool>,
    port: Option<(DmaBurstLen, DmaBurstLen)>,
    fail_reset: bool,
}

impl MockDma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `setup_ring` time out
    pub fn fail_reset(&mut self, fail: bool) {
        self.fail_reset = fail;
    }

    /// `(channel, direction, base, len)` per successful ring setup
    pub fn setups(&self) -> Vec<(u8, Direction, u32, usize)> {
        self.setups.clone()
    }

    pub fn is_open(&self, nr: u8) -> bool {
        self.open.contains(&nr)
    }

    pub fn opens(&self, nr: u8) -> usize {
        self.opens.get(&nr).copied().unwrap_or(0)
    }

    pub fn closes(&self, nr: u8) -> usize {
        self.closes.get(&nr).copied().unwrap_or(0)
    }

    pub fn acks(&self, nr: u8) -> usize {
        self.acks.get(&nr).copied().unwrap_or(0)
    }

    pub fn irq_enabled(&self, nr: u8) -> bool {
        self.irq_enabled.get(&nr).copied().unwrap_or(false)
    }

    /// `(tx_burst, rx_burst)` of the last port setup
    pub fn port(&self) -> Option<(DmaBurstLen, DmaBurstLen)> {
        self.port
    }
}

impl DmaChannelOps for MockDma {
    fn init_port(&mut self, tx_burst: DmaBurstLen, rx_burst: DmaBurstLen) {
        self.port = Some((tx_burst, rx_burst));
    }

    fn setup_ring(
        &mut self,
        nr: u8,
        direction: Direction,
        base: u32,
        len: usize,
        _reset_poll_limit: u32,
    ) -> ConfigResult<()> {
        if self.fail_reset {
            return Err(ConfigError::ChannelResetTimeout);
        }
        self.open.retain(|&n| n != nr);
        self.setups.push((nr, direction, base, len));
        Ok(())
    }

    fn open(&mut self, nr: u8) {
        if !self.open.contains(&nr) {
            self.open.push(nr);
        }
        *self.opens.entry(nr).or_default() += 1;
        self.irq_enabled.insert(nr, true);
    }

    fn close(&mut self, nr: u8) {
        self.open.retain(|&n| n != nr);
        *self.closes.entry(nr).or_default() += 1;
        self.irq_enabled.insert(nr, false);
    }

    fn enable_irq(&mut self, nr: u8) {
        self.irq_enabled.insert(nr, true);
    }

    fn disable_irq(&mut self, nr: u8) {
        self.irq_enabled.insert(nr, false);
    }

    fn ack_irq(&mut self, nr: u8) {
        *self.acks.entry(nr).or_default() += 1;
    }
}

// =============================================================================
// Mock Buffers
// =============================================================================

/// Heap-backed DMA buffer with a fake bus address
pub struct MockBuffer {
    storage: Vec<u8>,
    addr: u32,
    len: usize,
    live: Option<Rc<Cell<usize>>>,
}

impl MockBuffer {
    /// Empty buffer of `capacity` bytes at `addr`
    pub fn new(addr: u32, capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity],
            addr,
            len: 0,
            live: None,
        }
    }

    /// Buffer holding `len` bytes of a counting pattern
    pub fn filled(addr: u32, capacity: usize, len: usize) -> Self {
        let mut buf = Self::new(addr, capacity.max(len));
        for (i, b) in buf.storage[..len].iter_mut().enumerate() {
            *b = i as u8;
        }
        buf.len = len;
        buf
    }

    /// Counter shared by [`tracked`](Self::tracked) buffers
    pub fn live_counter() -> Rc<Cell<usize>> {
        Rc::new(Cell::new(0))
    }

    /// Filled buffer that counts itself in `live` until dropped
    pub fn tracked(addr: u32, len: usize, live: &Rc<Cell<usize>>) -> Self {
        live.set(live.get() + 1);
        let mut buf = Self::filled(addr, 1600, len);
        buf.live = Some(Rc::clone(live));
        buf
    }
}

impl fmt::Debug for MockBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBuffer")
            .field("addr", &self.addr)
            .field("len", &self.len)
            .field("capacity", &self.storage.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for MockBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr && self.len == other.len
    }
}

impl Eq for MockBuffer {}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        if let Some(live) = &self.live {
            live.set(live.get() - 1);
        }
    }
}

impl DmaBuffer for MockBuffer {
    fn dma_addr(&self) -> u32 {
        self.addr
    }

    fn storage(&self) -> &[u8] {
        &self.storage
    }

    fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }

    fn len(&self) -> usize {
        self.len
    }

    fn set_len(&mut self, len: usize) {
        self.len = len.min(self.storage.len());
    }
}

#[derive(Debug)]
struct AllocatorInner {
    next_addr: Cell<u32>,
    size: usize,
    remaining: Cell<Option<usize>>,
    live: Rc<Cell<usize>>,
}

/// Allocator handing out [`MockBuffer`]s with failure injection
///
/// Clones share state, so a test can keep one handle while a channel owns
/// another.
#[derive(Debug, Clone)]
pub struct MockAllocator {
    inner: Rc<AllocatorInner>,
}

impl MockAllocator {
    const BASE_ADDR: u32 = 0x1000_0000;

    /// Buffers of `size` bytes, unlimited supply
    pub fn new(size: usize) -> Self {
        Self {
            inner: Rc::new(AllocatorInner {
                next_addr: Cell::new(Self::BASE_ADDR),
                size,
                remaining: Cell::new(None),
                live: MockBuffer::live_counter(),
            }),
        }
    }

    /// Allow `n` more allocations, then fail
    pub fn fail_after(&self, n: usize) {
        self.inner.remaining.set(Some(n));
    }

    /// Lift the allocation limit
    pub fn refill(&self) {
        self.inner.remaining.set(None);
    }

    /// Buffers handed out and not yet dropped
    pub fn live(&self) -> usize {
        self.inner.live.get()
    }
}

impl BufferAllocator for MockAllocator {
    type Buffer = MockBuffer;

    fn allocate(&self) -> Option<MockBuffer> {
        let inner = &self.inner;
        if let Some(n) = inner.remaining.get() {
            if n == 0 {
                return None;
            }
            inner.remaining.set(Some(n - 1));
        }
        let addr = inner.next_addr.get();
        let stride = inner.size.next_multiple_of(32) as u32;
        inner.next_addr.set(addr.wrapping_add(stride));

        inner.live.set(inner.live.get() + 1);
        let mut buf = MockBuffer::new(addr, inner.size);
        buf.live = Some(Rc::clone(&inner.live));
        Some(buf)
    }
}

// =============================================================================
// Descriptor Helpers
// =============================================================================

/// Hardware finished receiving `len` bytes (CRC included) into `desc`
pub fn complete_rx(desc: &Descriptor, len: usize) {
    desc.set_control(ctl::COMPLETE | (len as u32 & ctl::SIZE_MASK));
}

/// Hardware finished sending the frame in `desc`
pub fn complete_tx(desc: &Descriptor) {
    desc.set_control((desc.control() & !ctl::OWN) | ctl::COMPLETE);
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Delay that only accumulates the requested time
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

// =============================================================================
// Mock Packet Engine
// =============================================================================

/// How [`MockPacketEngine`] answers a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineBehavior {
    /// Fill the output and signal success on kick
    Complete,
    /// Signal the given error code on kick
    Fail(u32),
    /// Accept the job and never signal
    Hang,
    /// Refuse the descriptor
    NoSpace,
}

/// Packet engine that completes jobs synchronously on kick
pub struct MockPacketEngine<'a> {
    completion: &'a PrngCompletion,
    behavior: EngineBehavior,
    fill: u8,
    descriptors: Vec<CommandDescriptor>,
    kicks: u32,
}

impl<'a> MockPacketEngine<'a> {
    pub fn new(completion: &'a PrngCompletion) -> Self {
        Self {
            completion,
            behavior: EngineBehavior::Complete,
            fill: 0xA5,
            descriptors: Vec::new(),
            kicks: 0,
        }
    }

    pub fn set_behavior(&mut self, behavior: EngineBehavior) {
        self.behavior = behavior;
    }

    /// Byte written into generated output
    pub fn set_fill(&mut self, fill: u8) {
        self.fill = fill;
    }

    /// Accepted descriptors, oldest first
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        self.descriptors.clone()
    }

    /// Total descriptor count kicked
    pub fn kicks(&self) -> u32 {
        self.kicks
    }
}

impl PacketEngine for MockPacketEngine<'_> {
    fn put_descriptor(&mut self, desc: &CommandDescriptor, output: &mut [u8]) -> DmaResult<()> {
        if self.behavior == EngineBehavior::NoSpace {
            return Err(DmaError::NoDescriptorSpace);
        }
        self.descriptors.push(*desc);
        if self.behavior == EngineBehavior::Complete {
            let len = (desc.transfer_len() as usize).min(output.len());
            output[..len].fill(self.fill);
        }
        Ok(())
    }

    fn kick(&mut self, count: u32) {
        self.kicks += count;
        match self.behavior {
            EngineBehavior::Complete => self.completion.signal(0),
            EngineBehavior::Fail(err) => self.completion.signal(err),
            EngineBehavior::Hang | EngineBehavior::NoSpace => {}
        }
    }
}

// =============================================================================
// Mock Properties
// =============================================================================

/// String property source backed by a map
#[derive(Debug, Default)]
pub struct MapProperties {
    values: HashMap<String, String>,
}

impl MapProperties {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl PropertySource for MapProperties {
    fn read_string(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_registers_queue_then_stored() {
        let mut regs = MockRegisters::new();
        regs.write32(0x10, 7);
        regs.queue_reads(0x10, &[1, 2]);
        assert_eq!(regs.read32(0x10), 1);
        assert_eq!(regs.read32(0x10), 2);
        assert_eq!(regs.read32(0x10), 7);
        assert_eq!(regs.writes(), &[(0x10, 7)]);
    }

    #[test]
    fn mock_registers_auto_clear_bits() {
        let mut regs = MockRegisters::new();
        regs.auto_clear(0x4, 0x2);
        regs.write32(0x4, 0x3);
        assert_eq!(regs.get(0x4), 0x1);
        assert!(regs.was_written(0x4, 0x2));
    }

    #[test]
    fn mock_allocator_limits_and_counts() {
        let alloc = MockAllocator::new(100);
        alloc.fail_after(1);
        let a = alloc.allocate().unwrap();
        assert!(alloc.allocate().is_none());
        assert_eq!(alloc.live(), 1);
        drop(a);
        assert_eq!(alloc.live(), 0);

        alloc.refill();
        let b = alloc.allocate().unwrap();
        assert_eq!(b.dma_addr() % 32, 0);
        assert_eq!(b.capacity(), 100);
    }
}
