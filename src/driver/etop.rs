//! ETOP Ethernet device.
//!
//! This module ties the ETOP register block and two DMA channels into one
//! device with the usual lifecycle:
//!
//! - Initialization (PHY attachment mode, MAC setup, DMA rings)
//! - Open/stop of both channels and the TX queue
//! - Frame transmission and budgeted RX/TX polling
//! - Address, MTU and receive filter changes
//! - Recovery after a TX timeout
//!
//! Interrupts only select a poll ([`Etop::handle_irq`]); the poll itself
//! runs wherever the caller schedules it.

use embedded_hal::delay::DelayNs;

use super::config::{EtopConfig, IrqMap, MiiMode, State, is_valid_ether_addr};
use super::error::{ConfigError, IoError, Result};
use crate::buffer::BufferAllocator;
use crate::dma::{
    ChannelStats, DmaChannelOps, PollOutcome, PollRequest, RxChannel, RxFrame, TxChannel,
    TxStatus,
};
use crate::hal::RegisterIo;
use crate::hal::mdio::{EtopMdio, MdioBus};
use crate::internal::constants::{
    DEFAULT_RX_DESCRIPTORS, DEFAULT_TX_DESCRIPTORS, MAC_ADDR_LEN, MIN_MTU, MTU,
};
use crate::internal::register::etop::{
    CFG, CFG_FEN0, CFG_MASK, CFG_MII0, CFG_OFF1, CFG_REMII0, CFG_SEN0, ENETS0, ENETS0_FTCU,
    EPHY_ADDR, EPHY_MAGIC, EPHY_REG, IGPLEN, MAC_CFG, MAC_CFG_CGEN, MAC_CFG_DUPLEX, MAC_CFG_LINK,
    MAC_CFG_MASK, MAC_CFG_SPEED, MAC_DA0, MAC_DA1, MDIO_CFG, MDIO_CFG_MASK, PLEN_UNDER,
};

/// Counters of both directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EtopStats {
    /// Receive channel
    pub rx: ChannelStats,
    /// Transmit channel
    pub tx: ChannelStats,
}

/// ETOP Ethernet device
///
/// # Type Parameters
/// * `R` - register window of the ETOP block
/// * `D` - DMA controller driving both channels
/// * `A` - buffer source for received frames; transmitted frames use the
///   same buffer type
/// * `RX` / `TX` - descriptors per ring (power of two)
///
/// # Example
/// ```ignore
/// static POOL: BufferPool<32, 1600> = BufferPool::new();
///
/// let regs = unsafe { Mmio::new(ETOP_BASE) };
/// let dma = XwayDma::new(unsafe { Mmio::new(DMA_BASE) });
/// let irqs = IrqMap::new(TX_IRQ, RX_IRQ, DMA_IRQ_BASE);
///
/// let mut etop: Etop<_, _, _, 16, 16> = Etop::new(regs, dma, &POOL, EtopConfig::new(), irqs);
/// etop.init(&mut delay)?;
/// etop.open()?;
/// ```
pub struct Etop<R, D, A, const RX: usize, const TX: usize>
where
    R: RegisterIo,
    D: DmaChannelOps,
    A: BufferAllocator,
{
    regs: R,
    dma: D,
    rx: RxChannel<A, RX>,
    tx: TxChannel<A::Buffer, TX>,
    config: EtopConfig,
    irqs: IrqMap,
    state: State,
}

impl<R, D, A, const RX: usize, const TX: usize> Etop<R, D, A, RX, TX>
where
    R: RegisterIo,
    D: DmaChannelOps,
    A: BufferAllocator,
{
    /// Create a device in the `Uninitialized` state.
    ///
    /// Nothing touches hardware until [`init`](Self::init). The rings live
    /// inside the device and their addresses are handed to the DMA
    /// controller by `init`, so build the device where it will stay (a
    /// `static` through `SharedEtop`, or a
    /// local that is not moved afterwards). A device moved after `init`
    /// refuses to open or run with `RingRelocated` until
    /// [`restart`](Self::restart) programs the rings again.
    pub const fn new(regs: R, dma: D, alloc: A, config: EtopConfig, irqs: IrqMap) -> Self {
        let tx_burst = config.tx_burst;
        Self {
            regs,
            dma,
            rx: RxChannel::new(0, alloc),
            tx: TxChannel::new(0, tx_burst),
            config,
            irqs,
            state: State::Uninitialized,
        }
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Active configuration
    pub fn config(&self) -> &EtopConfig {
        &self.config
    }

    /// Station address
    pub fn mac_address(&self) -> &[u8; MAC_ADDR_LEN] {
        &self.config.mac_address
    }

    /// Receive channel
    pub fn rx(&self) -> &RxChannel<A, RX> {
        &self.rx
    }

    /// Transmit channel
    pub fn tx(&self) -> &TxChannel<A::Buffer, TX> {
        &self.tx
    }

    /// DMA controller
    pub fn dma(&self) -> &D {
        &self.dma
    }

    /// ETOP register window
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Buffer source, also used to build outbound frames
    pub fn allocator(&self) -> &A {
        self.rx.allocator()
    }

    /// Counters of both channels
    pub fn stats(&self) -> EtopStats {
        EtopStats {
            rx: self.rx.stats(),
            tx: self.tx.stats(),
        }
    }

    /// Upstream must stop offering frames
    pub fn queue_stopped(&self) -> bool {
        self.tx.is_queue_stopped()
    }

    #[cfg(test)]
    pub(crate) fn rx_mut(&mut self) -> &mut RxChannel<A, RX> {
        &mut self.rx
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bring the block up.
    ///
    /// The configuration is validated before the first register write.
    /// Afterwards the PHY attachment mode, MAC clocking, MTU, DMA port and
    /// both rings are programmed, the RX ring is primed and the station
    /// address and receive filter are set. The device ends up `Initialized`
    /// with both channels switched off.
    ///
    /// # Errors
    /// - `AlreadyInitialized` - `init` already ran
    /// - `InvalidMacAddress` / `InvalidMtu` / `InvalidConfig` - bad config,
    ///   or interrupts that do not map to two distinct DMA channels
    /// - `ChannelResetTimeout` - a DMA channel did not leave reset
    /// - `AllocationFailed` - the RX ring could not be primed
    pub fn init<Dl: DelayNs>(&mut self, mut delay: Dl) -> Result<()> {
        if self.state != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        self.config.validate()?;
        let tx_nr = self.irqs.tx_channel()?;
        let rx_nr = self.irqs.rx_channel()?;
        if tx_nr == rx_nr {
            return Err(ConfigError::InvalidConfig.into());
        }
        self.tx.set_channel(tx_nr);
        self.rx.set_channel(rx_nr);

        if let Err(e) = self.bring_up(&mut delay) {
            self.rx.release(&mut self.dma);
            self.tx.release(&mut self.dma);
            return Err(e);
        }

        self.state = State::Initialized;
        info!(
            "etop up: mtu {} rx {} tx {} descriptors",
            self.config.mtu, RX, TX
        );
        Ok(())
    }

    fn bring_up<Dl: DelayNs>(&mut self, delay: &mut Dl) -> Result<()> {
        self.hw_init(delay)?;
        self.write_mtu(self.config.mtu);
        self.dma_init()?;
        self.write_mac_address();
        self.write_rx_mode();
        Ok(())
    }

    fn hw_init<Dl: DelayNs>(&mut self, delay: &mut Dl) -> Result<()> {
        self.regs.mask(MDIO_CFG, MDIO_CFG_MASK, 0);
        self.regs.mask(
            MAC_CFG,
            MAC_CFG_MASK,
            MAC_CFG_CGEN | MAC_CFG_DUPLEX | MAC_CFG_SPEED | MAC_CFG_LINK,
        );

        match self.config.mii_mode {
            MiiMode::Rmii => self.regs.mask(
                CFG,
                CFG_MASK,
                CFG_REMII0 | CFG_OFF1 | CFG_SEN0 | CFG_FEN0,
            ),
            MiiMode::Mii => self
                .regs
                .mask(CFG, CFG_MASK, CFG_OFF1 | CFG_SEN0 | CFG_FEN0),
            MiiMode::Ephy => {
                // external MII off, internal PHY needs its magic word
                self.regs.set_bits(CFG, CFG_MII0);
                EtopMdio::new(&mut self.regs, &mut *delay).write(EPHY_ADDR, EPHY_REG, EPHY_MAGIC)?;
                info!("selected EPHY mode");
            }
        }
        Ok(())
    }

    fn dma_init(&mut self) -> Result<()> {
        let limit = self.config.reset_poll_limit;
        self.dma.init_port(self.config.tx_burst, self.config.rx_burst);
        self.tx.set_burst(self.config.tx_burst);
        self.tx.setup(&mut self.dma, limit)?;
        self.rx.setup(&mut self.dma, limit)?;
        self.rx.set_station_address(self.config.mac_address);
        Ok(())
    }

    // =========================================================================
    // Open / Stop
    // =========================================================================

    /// Switch both channels on and start the TX queue
    ///
    /// # Errors
    /// - `InvalidState` - not initialized
    /// - `ChannelClosed` - the RX ring failed and needs [`restart`](Self::restart)
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            State::Initialized | State::Stopped => {}
            State::Running => return Ok(()),
            State::Uninitialized => return Err(IoError::InvalidState.into()),
        }
        self.tx.open(&mut self.dma)?;
        if let Err(e) = self.rx.open(&mut self.dma) {
            self.tx.close(&mut self.dma);
            return Err(e.into());
        }
        self.state = State::Running;
        debug!("etop open");
        Ok(())
    }

    /// Stop the TX queue and switch both channels off
    ///
    /// # Errors
    /// - `InvalidState` - not running
    pub fn stop(&mut self) -> Result<()> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }
        self.tx.close(&mut self.dma);
        self.rx.close(&mut self.dma);
        self.state = State::Stopped;
        debug!("etop stopped");
        Ok(())
    }

    /// Recover from a TX timeout.
    ///
    /// Both channels are closed and every buffer is released, then the block
    /// and both rings are programmed again. A device that was running is
    /// reopened. On failure everything stays released and the device is
    /// left `Stopped`.
    pub fn restart<Dl: DelayNs>(&mut self, mut delay: Dl) -> Result<()> {
        if self.state == State::Uninitialized {
            return Err(IoError::InvalidState.into());
        }
        let was_running = self.state == State::Running;
        warn!("etop restart, running: {}", was_running);

        self.rx.release(&mut self.dma);
        self.tx.release(&mut self.dma);
        self.state = State::Stopped;

        let result = self.hw_init(&mut delay).and_then(|()| self.dma_init());
        if let Err(e) = result {
            error!("etop restart failed");
            self.rx.release(&mut self.dma);
            self.tx.release(&mut self.dma);
            return Err(e);
        }

        if was_running {
            self.open()?;
        } else {
            self.state = State::Initialized;
        }
        Ok(())
    }

    // =========================================================================
    // Data Path
    // =========================================================================

    /// Offer a frame to the TX ring
    ///
    /// # Errors
    /// - `InvalidState` - not running
    /// - `InvalidLength` / `FrameTooLarge` - the frame cannot be sent
    pub fn transmit(&mut self, buf: A::Buffer) -> Result<TxStatus<A::Buffer>> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }
        Ok(self.tx.submit(buf)?)
    }

    /// Run one RX poll with the configured budget
    ///
    /// # Errors
    /// - `InvalidState` - not running
    /// - `AllocationFailed` - the ring ran out of buffers and was closed
    /// - `ChannelClosed` - the ring was closed by an earlier failure
    pub fn poll_rx<F>(&mut self, deliver: F) -> Result<PollOutcome>
    where
        F: FnMut(RxFrame<A::Buffer>),
    {
        self.rx_poll_with_budget(self.config.rx_budget, deliver)
    }

    /// Run one TX reclaim poll with the configured budget
    ///
    /// # Errors
    /// - `InvalidState` - not running
    pub fn poll_tx(&mut self) -> Result<PollOutcome> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }
        Ok(self.tx.poll(&mut self.dma, self.config.tx_budget)?)
    }

    /// Take at most one received frame.
    ///
    /// Polls with a budget of one, so the interrupt stays pending while a
    /// frame comes back and is acknowledged once the ring is empty.
    /// Descriptors with a bad length are recycled on the way, at most one
    /// ring's worth per call.
    ///
    /// # Errors
    /// As [`poll_rx`](Self::poll_rx).
    pub fn receive_frame(&mut self) -> Result<Option<RxFrame<A::Buffer>>> {
        for _ in 0..RX {
            let mut frame = None;
            let outcome = self.rx_poll_with_budget(1, |f| frame = Some(f))?;
            if frame.is_some() || outcome.is_complete() {
                return Ok(frame);
            }
        }
        Ok(None)
    }

    fn rx_poll_with_budget<F>(&mut self, budget: usize, deliver: F) -> Result<PollOutcome>
    where
        F: FnMut(RxFrame<A::Buffer>),
    {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }
        Ok(self.rx.poll(&mut self.dma, budget, deliver)?)
    }

    /// Map an interrupt number to the poll it asks for
    pub fn handle_irq(&self, irq: u32) -> Option<PollRequest> {
        if irq == self.irqs.tx {
            Some(PollRequest::Tx)
        } else if irq == self.irqs.rx {
            Some(PollRequest::Rx)
        } else {
            None
        }
    }

    // =========================================================================
    // Address and Filter Configuration
    // =========================================================================

    /// Change the station address and the unicast filter
    ///
    /// # Errors
    /// - `InvalidMacAddress` - all-zero or multicast address
    pub fn set_mac_address(&mut self, addr: [u8; MAC_ADDR_LEN]) -> Result<()> {
        if !is_valid_ether_addr(&addr) {
            return Err(ConfigError::InvalidMacAddress.into());
        }
        self.config.mac_address = addr;
        self.rx.set_station_address(addr);
        if self.state != State::Uninitialized {
            self.write_mac_address();
        }
        Ok(())
    }

    /// Change the MTU
    ///
    /// # Errors
    /// - `InvalidMtu` - outside 68..=1500
    pub fn change_mtu(&mut self, mtu: usize) -> Result<()> {
        if !(MIN_MTU..=MTU).contains(&mtu) {
            return Err(ConfigError::InvalidMtu.into());
        }
        self.config.mtu = mtu;
        if self.state != State::Uninitialized {
            self.write_mtu(mtu);
        }
        Ok(())
    }

    /// Update the receive filter.
    ///
    /// The unicast filter stays off whenever every frame or every multicast
    /// frame must be received.
    pub fn set_rx_mode(&mut self, promiscuous: bool, all_multicast: bool) {
        self.config.promiscuous = promiscuous;
        self.config.all_multicast = all_multicast;
        if self.state != State::Uninitialized {
            self.write_rx_mode();
        }
    }

    fn write_mtu(&mut self, mtu: usize) {
        self.regs.write32(IGPLEN, (PLEN_UNDER << 16) | mtu as u32);
    }

    fn write_mac_address(&mut self) {
        let mac = self.config.mac_address;
        self.regs
            .write32(MAC_DA0, u32::from_be_bytes([mac[0], mac[1], mac[2], mac[3]]));
        self.regs
            .write32(MAC_DA1, u32::from(u16::from_be_bytes([mac[4], mac[5]])) << 16);
    }

    fn write_rx_mode(&mut self) {
        if self.config.promiscuous || self.config.all_multicast {
            self.regs.clear_bits(ENETS0, ENETS0_FTCU);
        } else {
            self.regs.set_bits(ENETS0, ENETS0_FTCU);
        }
    }

    // =========================================================================
    // MDIO
    // =========================================================================

    /// MDIO access through the ETOP block
    pub fn mdio<Dl: DelayNs>(&mut self, delay: Dl) -> EtopMdio<&mut R, Dl> {
        EtopMdio::new(&mut self.regs, delay)
    }
}

/// Device with the default ring sizes
pub type EtopDefault<R, D, A> = Etop<R, D, A, DEFAULT_RX_DESCRIPTORS, DEFAULT_TX_DESCRIPTORS>;

// =============================================================================
// Tests
// =============================================================================
