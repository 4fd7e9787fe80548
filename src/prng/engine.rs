//! PRNG front end of the EIP-93 packet engine.
//!
//! The engine writes random bytes into one half of a double buffer while
//! the caller draws from the other. Each job is one command descriptor:
//! the submitter arms the [`PrngCompletion`], queues the descriptor, kicks
//! the engine and then waits, bounded by [`PrngConfig::timeout_us`], for the
//! result interrupt to signal it.

use embedded_hal::delay::DelayNs;

use super::completion::{BufferState, PrngCompletion};
use super::descriptor::{CommandDescriptor, PrngMode, SaRecord};
use crate::dma::descriptor::VolatileCell;
use crate::driver::config::PrngConfig;
use crate::driver::error::{DmaError, DmaResult, IoError, Result};
use crate::hal::RegisterIo;
use crate::internal::constants::{
    DEFAULT_PRNG_DATETIME, DEFAULT_PRNG_KEY, DEFAULT_PRNG_SEED, PRNG_BLOCK_LEN, PRNG_BLOCK_SIZE,
    PRNG_INIT_KEY, PRNG_INIT_SEED,
};
use crate::internal::register::eip93::{
    PE_CD_COUNT, PE_CDR_BASE, PE_CTRL_HOST_READY, PE_CTRL_READY_DES_OWN, PE_RING_CONFIG,
};
use crate::internal::register::field_get;

// =============================================================================
// Packet Engine Seam
// =============================================================================

/// Command-descriptor submission to a packet engine
pub trait PacketEngine {
    /// Queue one descriptor. `output` is the memory `desc.dst_addr` points at.
    ///
    /// # Errors
    /// - `NoDescriptorSpace` - the command ring has no free slot
    fn put_descriptor(&mut self, desc: &CommandDescriptor, output: &mut [u8]) -> DmaResult<()>;

    /// Tell the engine `count` new descriptors are ready
    fn kick(&mut self, count: u32);
}

impl<T: PacketEngine> PacketEngine for &mut T {
    fn put_descriptor(&mut self, desc: &CommandDescriptor, output: &mut [u8]) -> DmaResult<()> {
        (**self).put_descriptor(desc, output)
    }

    fn kick(&mut self, count: u32) {
        (**self).kick(count);
    }
}

#[repr(C, align(4))]
struct CommandSlot([VolatileCell<u32>; CommandDescriptor::WORDS]);

/// EIP-93 command descriptor ring with `N` slots
///
/// A slot is free unless its ownership field still says host-ready, meaning
/// the engine has not fetched it yet.
///
/// The engine keeps the slot address it got from [`setup`](Self::setup), so
/// the ring must stay where it is afterwards; a moved ring refuses further
/// descriptors.
pub struct Eip93CommandRing<R: RegisterIo, const N: usize> {
    regs: R,
    slots: [CommandSlot; N],
    write: usize,
    programmed: Option<u32>,
}

impl<R: RegisterIo, const N: usize> Eip93CommandRing<R, N> {
    /// Ring over the engine's register window
    pub const fn new(regs: R) -> Self {
        const {
            assert!(N > 0, "command ring needs at least one slot");
        }
        Self {
            regs,
            slots: [const { CommandSlot([const { VolatileCell::new(0) }; CommandDescriptor::WORDS]) }; N],
            write: 0,
            programmed: None,
        }
    }

    /// Program the ring base and size
    pub fn setup(&mut self) {
        for slot in &self.slots {
            for word in &slot.0 {
                word.set(0);
            }
        }
        self.write = 0;
        let base = self.base_addr_u32();
        self.regs.write32(PE_CDR_BASE, base);
        self.regs.write32(PE_RING_CONFIG, N as u32);
        self.programmed = Some(base);
    }

    /// Address of the first slot
    pub fn base_addr_u32(&self) -> u32 {
        self.slots.as_ptr() as u32
    }

    /// Register handle
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Raw words of slot `index`
    pub fn slot_words(&self, index: usize) -> [u32; CommandDescriptor::WORDS] {
        let mut out = [0; CommandDescriptor::WORDS];
        for (dst, word) in out.iter_mut().zip(&self.slots[index % N].0) {
            *dst = word.get();
        }
        out
    }
}

impl<R: RegisterIo, const N: usize> PacketEngine for Eip93CommandRing<R, N> {
    fn put_descriptor(&mut self, desc: &CommandDescriptor, _output: &mut [u8]) -> DmaResult<()> {
        match self.programmed {
            None => return Err(DmaError::ChannelClosed),
            Some(base) if base != self.base_addr_u32() => {
                error!("eip93 command ring moved after setup");
                return Err(DmaError::RingRelocated);
            }
            Some(_) => {}
        }
        let slot = &self.slots[self.write];
        if field_get(PE_CTRL_READY_DES_OWN, slot.0[0].get()) == PE_CTRL_HOST_READY {
            return Err(DmaError::NoDescriptorSpace);
        }
        let words = desc.to_words();
        for (cell, &value) in slot.0.iter().zip(&words).skip(1) {
            cell.set(value);
        }
        // ownership word last
        core::sync::atomic::fence(core::sync::atomic::Ordering::Release);
        slot.0[0].set(words[0]);
        self.write = (self.write + 1) % N;
        Ok(())
    }

    fn kick(&mut self, count: u32) {
        self.regs.write32(PE_CD_COUNT, count);
    }
}

// =============================================================================
// PRNG Engine
// =============================================================================

/// Double-buffered PRNG front end
pub struct PrngEngine<'c, E: PacketEngine> {
    engine: E,
    completion: &'c PrngCompletion,
    config: PrngConfig,
    buffers: [[u8; PRNG_BLOCK_LEN]; 2],
    cur_buf: usize,
    available: usize,
    sa: SaRecord,
}

impl<'c, E: PacketEngine> PrngEngine<'c, E> {
    /// Front end over `engine`; `completion` must be the signal the result
    /// interrupt reports to.
    pub const fn new(engine: E, completion: &'c PrngCompletion, config: PrngConfig) -> Self {
        Self {
            engine,
            completion,
            config,
            buffers: [[0; PRNG_BLOCK_LEN]; 2],
            cur_buf: 0,
            available: 0,
            sa: SaRecord::new(),
        }
    }

    /// Packet engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Packet engine, mutable
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Current buffer state
    pub fn state(&self) -> BufferState {
        self.completion.state()
    }

    /// Index of the buffer the last job wrote
    pub fn current_buffer(&self) -> usize {
        self.cur_buf
    }

    /// Bytes left in the current buffer
    pub fn available(&self) -> usize {
        self.available
    }

    /// SA record the engine reads key, seed and date-time from
    pub fn sa_record(&self) -> &SaRecord {
        &self.sa
    }

    /// Load the built-in key and seed and reinitialize the PRNG
    pub fn init<D: DelayNs>(&mut self, delay: D) -> Result<()> {
        self.cur_buf = 0;
        self.sa = SaRecord::prng(PRNG_INIT_KEY, PRNG_INIT_SEED, [0; 4]);
        self.reinit(delay)
    }

    /// Reinitialize the PRNG from the current SA record
    pub fn reinit<D: DelayNs>(&mut self, mut delay: D) -> Result<()> {
        self.push_job(true, &mut delay).map(|_| ())
    }

    /// Replace key, seed and date-time and reinitialize.
    ///
    /// `None` selects the defaults: key `"0123456789abcdef"`, seed
    /// `"zaybxcwdveuftgsh"` and an all-zero date-time.
    pub fn reset_context<D: DelayNs>(
        &mut self,
        key: Option<&[u8; PRNG_BLOCK_SIZE]>,
        seed: Option<&[u8; PRNG_BLOCK_SIZE]>,
        datetime: Option<&[u8; PRNG_BLOCK_SIZE]>,
        delay: D,
    ) -> Result<()> {
        self.sa = SaRecord::prng_from_bytes(
            key.unwrap_or(&DEFAULT_PRNG_KEY),
            seed.unwrap_or(&DEFAULT_PRNG_SEED),
            datetime.unwrap_or(&DEFAULT_PRNG_DATETIME),
        );
        self.reinit(delay)
    }

    /// Run one job into the current buffer and wait for it.
    ///
    /// A `reset` job reinitializes the PRNG and produces no data; otherwise
    /// the returned buffer holds a full block of random bytes.
    ///
    /// # Errors
    /// - `NeedsReset` - a generate job was asked for while a reset is pending
    /// - `NoDescriptorSpace` - the command ring was full; state is unchanged
    /// - `Timeout` - no completion in time; the engine now needs a reset
    /// - `HardwareFault` - the engine reported an error
    pub fn push_job<D: DelayNs>(&mut self, reset: bool, delay: &mut D) -> Result<&[u8; PRNG_BLOCK_LEN]> {
        let previous = self.completion.state();
        if !reset && previous == BufferState::NeedReset {
            return Err(IoError::NeedsReset.into());
        }

        let (mode, len) = if reset {
            (PrngMode::Reinit, 0)
        } else {
            (PrngMode::Generate, PRNG_BLOCK_LEN as u32)
        };
        let cur = self.cur_buf;
        let desc = CommandDescriptor::prng(
            mode,
            len,
            self.buffers[cur].as_ptr() as u32,
            &raw const self.sa as u32,
        );

        self.completion.arm();
        if let Err(e) = self.engine.put_descriptor(&desc, &mut self.buffers[cur]) {
            error!("prng: no descriptor space");
            self.completion.set_state(previous);
            return Err(e.into());
        }
        self.completion.set_state(BufferState::Pending);
        self.engine.kick(1);

        self.wait(delay)?;

        if reset {
            self.completion.set_state(BufferState::Empty);
            self.available = 0;
        } else {
            self.completion.set_state(BufferState::NotEmpty);
            self.available = PRNG_BLOCK_LEN;
        }
        Ok(&self.buffers[cur])
    }

    /// Fill `dst` with random bytes, refilling the other buffer whenever the
    /// current one runs out
    ///
    /// # Errors
    /// As [`push_job`](Self::push_job).
    pub fn generate<D: DelayNs>(&mut self, dst: &mut [u8], mut delay: D) -> Result<()> {
        if self.completion.state() == BufferState::NeedReset {
            return Err(IoError::NeedsReset.into());
        }

        let mut written = 0;
        while written < dst.len() {
            if self.available == 0 {
                self.cur_buf ^= 1;
                self.push_job(false, &mut delay)?;
            }
            let start = PRNG_BLOCK_LEN - self.available;
            let n = self.available.min(dst.len() - written);
            dst[written..written + n].copy_from_slice(&self.buffers[self.cur_buf][start..start + n]);
            self.available -= n;
            written += n;
        }
        if self.available == 0 {
            self.completion.set_state(BufferState::Empty);
        }
        Ok(())
    }

    fn wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<()> {
        let interval = self.config.poll_interval_us.max(1);
        let mut waited: u32 = 0;
        while !self.completion.is_filled() {
            if waited >= self.config.timeout_us {
                error!("prng: job timed out after {} us", waited);
                self.completion.set_state(BufferState::NeedReset);
                self.available = 0;
                return Err(IoError::Timeout.into());
            }
            delay.delay_us(interval);
            waited = waited.saturating_add(interval);
        }

        if self.completion.state() == BufferState::NeedReset {
            error!("prng: engine error {}", self.completion.last_error());
            self.available = 0;
            return Err(IoError::HardwareFault.into());
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::boxed::Box;

    use super::*;
    use crate::driver::error::Error;
    use crate::testing::{EngineBehavior, MockDelay, MockPacketEngine, MockRegisters};

    fn engine(completion: &PrngCompletion) -> PrngEngine<'_, MockPacketEngine<'_>> {
        PrngEngine::new(MockPacketEngine::new(completion), completion, PrngConfig::new())
    }

    #[test]
    fn prng_init_pushes_reinit_job_with_init_key() {
        let completion = PrngCompletion::new();
        let mut prng = engine(&completion);
        prng.init(MockDelay::new()).unwrap();

        let desc = prng.engine().descriptors()[0];
        assert_eq!(desc.mode(), PrngMode::Reinit as u32);
        assert_eq!(desc.transfer_len(), 0);
        assert_eq!(prng.engine().kicks(), 1);
        assert_eq!(prng.sa_record().key, PRNG_INIT_KEY);
        assert_eq!(prng.sa_record().i_digest, PRNG_INIT_SEED);
        assert_eq!(prng.state(), BufferState::Empty);
    }

    #[test]
    fn prng_push_job_returns_filled_buffer() {
        let completion = PrngCompletion::new();
        let mut prng = engine(&completion);
        prng.init(MockDelay::new()).unwrap();
        prng.engine_mut().set_fill(0x5A);

        let mut delay = MockDelay::new();
        let block = prng.push_job(false, &mut delay).unwrap();
        assert_eq!(block.len(), 4080);
        assert!(block.iter().all(|&b| b == 0x5A));

        let desc = prng.engine().descriptors()[1];
        assert_eq!(desc.mode(), PrngMode::Generate as u32);
        assert_eq!(desc.transfer_len(), 4080);
        assert_eq!(prng.state(), BufferState::NotEmpty);
        assert_eq!(prng.available(), 4080);
    }

    #[test]
    fn prng_fresh_engine_needs_reset() {
        let completion = PrngCompletion::new();
        let mut prng = engine(&completion);
        let mut out = [0u8; 8];
        assert_eq!(
            prng.generate(&mut out, MockDelay::new()),
            Err(Error::Io(IoError::NeedsReset))
        );
        assert!(prng.engine().descriptors().is_empty());
    }

    #[test]
    fn prng_hardware_error_needs_reset_until_reinit() {
        let completion = PrngCompletion::new();
        let mut prng = engine(&completion);
        prng.init(MockDelay::new()).unwrap();

        prng.engine_mut().set_behavior(EngineBehavior::Fail(0x13));
        let mut delay = MockDelay::new();
        assert_eq!(
            prng.push_job(false, &mut delay).map(|_| ()),
            Err(Error::Io(IoError::HardwareFault))
        );
        assert_eq!(prng.state(), BufferState::NeedReset);
        assert_eq!(completion.last_error(), 0x13);

        prng.engine_mut().set_behavior(EngineBehavior::Complete);
        assert_eq!(
            prng.push_job(false, &mut delay).map(|_| ()),
            Err(Error::Io(IoError::NeedsReset))
        );

        prng.reinit(&mut delay).unwrap();
        assert!(prng.push_job(false, &mut delay).is_ok());
    }

    #[test]
    fn prng_timeout_is_bounded() {
        let completion = PrngCompletion::new();
        let config = PrngConfig::new().with_timeout_us(1_000).with_poll_interval_us(10);
        let mut prng = PrngEngine::new(MockPacketEngine::new(&completion), &completion, config);
        prng.init(MockDelay::new()).unwrap();
        prng.engine_mut().set_behavior(EngineBehavior::Hang);

        let mut delay = MockDelay::new();
        assert_eq!(
            prng.push_job(false, &mut delay).map(|_| ()),
            Err(Error::Io(IoError::Timeout))
        );
        assert_eq!(delay.total_ns(), 1_000_000);
        assert_eq!(prng.state(), BufferState::NeedReset);
    }

    #[test]
    fn prng_no_descriptor_space_keeps_state() {
        let completion = PrngCompletion::new();
        let mut prng = engine(&completion);
        prng.init(MockDelay::new()).unwrap();
        prng.engine_mut().set_behavior(EngineBehavior::NoSpace);

        let mut delay = MockDelay::new();
        assert_eq!(
            prng.push_job(false, &mut delay).map(|_| ()),
            Err(Error::Dma(DmaError::NoDescriptorSpace))
        );
        assert_eq!(prng.state(), BufferState::Empty);
        assert_eq!(prng.engine().kicks(), 1);
    }

    #[test]
    fn prng_generate_toggles_buffers() {
        let completion = PrngCompletion::new();
        let mut prng = engine(&completion);
        prng.init(MockDelay::new()).unwrap();

        let mut out = [0u8; 100];
        prng.generate(&mut out, MockDelay::new()).unwrap();
        assert_eq!(prng.current_buffer(), 1);
        assert_eq!(prng.available(), 4080 - 100);

        // crosses into a second block
        let mut big = [0u8; 4080];
        prng.generate(&mut big, MockDelay::new()).unwrap();
        assert_eq!(prng.current_buffer(), 0);
        assert_eq!(prng.available(), 4080 - 100);
        assert_eq!(prng.engine().descriptors().len(), 3);

        let first = prng.engine().descriptors()[1].dst_addr;
        let second = prng.engine().descriptors()[2].dst_addr;
        assert_ne!(first, second);
    }

    #[test]
    fn prng_reset_context_uses_defaults() {
        let completion = PrngCompletion::new();
        let mut prng = engine(&completion);
        prng.reset_context(None, None, None, MockDelay::new()).unwrap();

        let expected = SaRecord::prng_from_bytes(
            &DEFAULT_PRNG_KEY,
            &DEFAULT_PRNG_SEED,
            &DEFAULT_PRNG_DATETIME,
        );
        assert_eq!(*prng.sa_record(), expected);
        assert_eq!(prng.state(), BufferState::Empty);

        let key = *b"fedcba9876543210";
        prng.reset_context(Some(&key), None, None, MockDelay::new()).unwrap();
        assert_eq!(prng.sa_record().key[0].to_ne_bytes(), *b"fedc");
        assert_eq!(prng.engine().descriptors().len(), 2);
    }

    #[test]
    fn command_ring_refuses_unfetched_slot() {
        let mut regs = MockRegisters::new();
        let mut ring: Eip93CommandRing<_, 2> = Eip93CommandRing::new(&mut regs);
        ring.setup();
        let desc = CommandDescriptor::prng(PrngMode::Generate, 16, 0x100, 0x200);

        ring.put_descriptor(&desc, &mut []).unwrap();
        ring.put_descriptor(&desc, &mut []).unwrap();
        assert_eq!(
            ring.put_descriptor(&desc, &mut []),
            Err(DmaError::NoDescriptorSpace)
        );
        assert_eq!(ring.slot_words(0), desc.to_words());

        ring.kick(2);
        assert_eq!(ring.regs().get(PE_RING_CONFIG), 2);
        assert_eq!(ring.regs().get(PE_CD_COUNT), 2);
    }

    #[test]
    fn command_ring_programs_its_own_address() {
        let mut regs = MockRegisters::new();
        let mut ring: Eip93CommandRing<_, 4> = Eip93CommandRing::new(&mut regs);
        ring.setup();
        assert_eq!(ring.regs().get(PE_CDR_BASE), ring.base_addr_u32());
    }

    #[test]
    fn command_ring_needs_setup_before_use() {
        let mut ring: Eip93CommandRing<_, 2> = Eip93CommandRing::new(MockRegisters::new());
        let desc = CommandDescriptor::prng(PrngMode::Generate, 16, 0x100, 0x200);
        assert_eq!(
            ring.put_descriptor(&desc, &mut []),
            Err(DmaError::ChannelClosed)
        );
    }

    #[test]
    fn command_ring_moved_after_setup_is_refused() {
        let mut ring: Eip93CommandRing<_, 2> = Eip93CommandRing::new(MockRegisters::new());
        ring.setup();
        let programmed = ring.regs().get(PE_CDR_BASE);

        let mut moved = Box::new(ring);
        assert_ne!(moved.base_addr_u32(), programmed);
        let desc = CommandDescriptor::prng(PrngMode::Generate, 16, 0x100, 0x200);
        assert_eq!(
            moved.put_descriptor(&desc, &mut []),
            Err(DmaError::RingRelocated)
        );
        assert_eq!(moved.slot_words(0), [0; CommandDescriptor::WORDS]);
    }
}
