//! DMA channel control.
//!
//! [`DmaChannelOps`] is the seam between ring bookkeeping and the DMA
//! controller that walks the rings. [`XwayDma`] drives the Lantiq XWAY
//! central DMA controller through its banked channel registers.

use crate::driver::config::DmaBurstLen;
use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::RegisterIo;
use crate::internal::register::dma::{
    BURST_MASK, CCTRLC, CDBA, CDLEN, CHAN_ON, CHAN_RST, CHAN_TX, CHAN_WEIGHT, CIE, CIS, CS,
    DESCPT, ETOP_ENDIANNESS, IRNEN, IRQ_ACK, PCTRL, PORT_ETOP, PS, RX_BURST_SHIFT,
    TX_BURST_SHIFT,
};

/// Transfer direction of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Device to memory
    Rx,
    /// Memory to device
    Tx,
}

/// Channel lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// No ring programmed, no buffers bound
    #[default]
    Idle,
    /// Ring programmed and armed, DMA switched off
    Closed,
    /// DMA running
    Open,
    /// Closed after running out of buffers; only a new setup revives it
    Failed,
}

/// Per-channel counters
///
/// Every counter wraps on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStats {
    /// Frames handed upward or reclaimed
    pub packets: u32,
    /// Payload bytes of those frames
    pub bytes: u64,
    /// Frames lost for lack of buffers
    pub dropped: u32,
    /// Descriptors completed with an impossible length
    pub errors: u32,
}

impl ChannelStats {
    /// All counters zero
    pub const fn new() -> Self {
        Self {
            packets: 0,
            bytes: 0,
            dropped: 0,
            errors: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, len: usize) {
        self.packets = self.packets.wrapping_add(1);
        self.bytes = self.bytes.wrapping_add(len as u64);
    }

    pub(crate) fn record_drop(&mut self) {
        self.dropped = self.dropped.wrapping_add(1);
    }

    pub(crate) fn record_error(&mut self) {
        self.errors = self.errors.wrapping_add(1);
    }
}

/// Operations a DMA controller provides per channel
///
/// Interrupt masking is owned by the controller: a channel's interrupt stays
/// pending until [`ack_irq`](Self::ack_irq) is called, which is how a poll
/// that ran out of budget keeps the interrupt quiet until it finishes.
pub trait DmaChannelOps {
    /// Configure the ETOP port: byte order and burst lengths
    fn init_port(&mut self, tx_burst: DmaBurstLen, rx_burst: DmaBurstLen);

    /// Program a ring (base address and length), reset the channel and
    /// enable its descriptor-complete interrupt source.
    ///
    /// The channel is left switched off.
    fn setup_ring(
        &mut self,
        nr: u8,
        direction: Direction,
        base: u32,
        len: usize,
        reset_poll_limit: u32,
    ) -> ConfigResult<()>;

    /// Switch the channel on and enable its interrupt
    fn open(&mut self, nr: u8);

    /// Switch the channel off and disable its interrupt
    fn close(&mut self, nr: u8);

    /// Enable the channel interrupt line
    fn enable_irq(&mut self, nr: u8);

    /// Disable the channel interrupt line
    fn disable_irq(&mut self, nr: u8);

    /// Acknowledge every pending interrupt source of the channel
    fn ack_irq(&mut self, nr: u8);
}

impl<T: DmaChannelOps> DmaChannelOps for &mut T {
    fn init_port(&mut self, tx_burst: DmaBurstLen, rx_burst: DmaBurstLen) {
        (**self).init_port(tx_burst, rx_burst);
    }

    fn setup_ring(
        &mut self,
        nr: u8,
        direction: Direction,
        base: u32,
        len: usize,
        reset_poll_limit: u32,
    ) -> ConfigResult<()> {
        (**self).setup_ring(nr, direction, base, len, reset_poll_limit)
    }

    fn open(&mut self, nr: u8) {
        (**self).open(nr);
    }

    fn close(&mut self, nr: u8) {
        (**self).close(nr);
    }

    fn enable_irq(&mut self, nr: u8) {
        (**self).enable_irq(nr);
    }

    fn disable_irq(&mut self, nr: u8) {
        (**self).disable_irq(nr);
    }

    fn ack_irq(&mut self, nr: u8) {
        (**self).ack_irq(nr);
    }
}

// =============================================================================
// XWAY Central DMA
// =============================================================================

/// Lantiq XWAY central DMA controller
#[derive(Debug)]
pub struct XwayDma<R: RegisterIo> {
    regs: R,
}

impl<R: RegisterIo> XwayDma<R> {
    /// Wrap the controller's register window
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Borrow the register handle
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Release the register handle
    pub fn into_inner(self) -> R {
        self.regs
    }

    #[inline(always)]
    fn select(&mut self, nr: u8) {
        self.regs.write32(CS, nr as u32);
    }
}

impl<R: RegisterIo> DmaChannelOps for XwayDma<R> {
    fn init_port(&mut self, tx_burst: DmaBurstLen, rx_burst: DmaBurstLen) {
        self.regs.write32(PS, PORT_ETOP);
        self.regs.mask(PCTRL, 0, ETOP_ENDIANNESS);
        self.regs.mask(
            PCTRL,
            BURST_MASK,
            (rx_burst.to_pctrl() << RX_BURST_SHIFT) | (tx_burst.to_pctrl() << TX_BURST_SHIFT),
        );
    }

    fn setup_ring(
        &mut self,
        nr: u8,
        direction: Direction,
        base: u32,
        len: usize,
        reset_poll_limit: u32,
    ) -> ConfigResult<()> {
        self.select(nr);
        self.regs.write32(CDBA, base);
        self.regs.write32(CDLEN, len as u32);
        self.regs.clear_bits(CCTRLC, CHAN_ON);
        self.regs.set_bits(CCTRLC, CHAN_RST);

        let mut remaining = reset_poll_limit;
        while self.regs.read32(CCTRLC) & CHAN_RST != 0 {
            if remaining == 0 {
                error!("dma channel {} reset timed out", nr);
                return Err(ConfigError::ChannelResetTimeout);
            }
            remaining -= 1;
            core::hint::spin_loop();
        }

        self.regs.write32(CIE, DESCPT);
        self.regs.set_bits(IRNEN, 1 << nr);
        let cctrl = match direction {
            Direction::Tx => CHAN_WEIGHT | CHAN_TX,
            Direction::Rx => CHAN_WEIGHT,
        };
        self.regs.write32(CCTRLC, cctrl);
        Ok(())
    }

    fn open(&mut self, nr: u8) {
        self.select(nr);
        self.regs.set_bits(CCTRLC, CHAN_ON);
        self.enable_irq(nr);
    }

    fn close(&mut self, nr: u8) {
        self.select(nr);
        self.regs.clear_bits(CCTRLC, CHAN_ON);
        self.disable_irq(nr);
    }

    fn enable_irq(&mut self, nr: u8) {
        self.select(nr);
        self.regs.set_bits(IRNEN, 1 << nr);
    }

    fn disable_irq(&mut self, nr: u8) {
        self.select(nr);
        self.regs.clear_bits(IRNEN, 1 << nr);
    }

    fn ack_irq(&mut self, nr: u8) {
        self.select(nr);
        self.regs.write32(CIS, IRQ_ACK);
    }
}

// =============================================================================
// Tests
// =============================================================================
