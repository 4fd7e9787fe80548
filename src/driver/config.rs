//! Configuration types for the driver core

use crate::internal::constants::{
    DEFAULT_MAC_ADDR, DEFAULT_PRNG_POLL_INTERVAL_US, DEFAULT_PRNG_TIMEOUT_US,
    DEFAULT_RESET_POLL_LIMIT, DEFAULT_RX_BUDGET, DEFAULT_TX_BUDGET, MAC_ADDR_LEN, MIN_MTU, MTU,
};
use crate::internal::register::dma::{BURST_2W, BURST_4W, BURST_8W};

use super::error::{ConfigError, ConfigResult};

/// Ethernet PHY attachment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MiiMode {
    /// Media Independent Interface
    Mii,
    /// Reduced Media Independent Interface
    #[default]
    Rmii,
    /// Internal PHY (external MII disabled)
    Ephy,
}

/// DMA burst length, in 32-bit words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DmaBurstLen {
    /// 2-word burst
    Words2 = 2,
    /// 4-word burst
    Words4 = 4,
    /// 8-word burst (default)
    #[default]
    Words8 = 8,
}

impl DmaBurstLen {
    /// Parse a burst length given in words (as platform properties carry it)
    pub const fn from_words(words: u32) -> ConfigResult<Self> {
        match words {
            2 => Ok(Self::Words2),
            4 => Ok(Self::Words4),
            8 => Ok(Self::Words8),
            _ => Err(ConfigError::InvalidBurstLength),
        }
    }

    /// Burst length in words
    #[must_use]
    pub const fn words(self) -> u32 {
        self as u32
    }

    /// Burst length in bytes; TX buffers are aligned down to this
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self.words() * 4
    }

    /// Encoding for the port control register burst fields
    #[must_use]
    pub const fn to_pctrl(self) -> u32 {
        match self {
            Self::Words2 => BURST_2W,
            Self::Words4 => BURST_4W,
            Self::Words8 => BURST_8W,
        }
    }
}

/// Scheduler-side interrupt numbers of the two ETOP DMA channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqMap {
    /// Interrupt number of the TX channel
    pub tx: u32,
    /// Interrupt number of the RX channel
    pub rx: u32,
    /// Interrupt number of DMA channel 0; channel numbers are offsets from it
    pub dma_base: u32,
}

impl IrqMap {
    /// Build a map from the two channel interrupts and the DMA base interrupt
    #[must_use]
    pub const fn new(tx: u32, rx: u32, dma_base: u32) -> Self {
        Self { tx, rx, dma_base }
    }

    /// DMA channel number of the TX channel
    pub const fn tx_channel(&self) -> ConfigResult<u8> {
        channel_number(self.tx, self.dma_base)
    }

    /// DMA channel number of the RX channel
    pub const fn rx_channel(&self) -> ConfigResult<u8> {
        channel_number(self.rx, self.dma_base)
    }
}

const fn channel_number(irq: u32, base: u32) -> ConfigResult<u8> {
    // IRNEN has one enable bit per channel
    if irq < base || irq - base >= 32 {
        Err(ConfigError::InvalidConfig)
    } else {
        Ok((irq - base) as u8)
    }
}

/// ETOP device configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EtopConfig {
    /// MAC address (6 bytes)
    pub mac_address: [u8; MAC_ADDR_LEN],
    /// PHY attachment mode
    pub mii_mode: MiiMode,
    /// Maximum transmission unit
    pub mtu: usize,
    /// TX burst length
    pub tx_burst: DmaBurstLen,
    /// RX burst length
    pub rx_burst: DmaBurstLen,
    /// Frames handled per RX poll
    pub rx_budget: usize,
    /// Descriptors reclaimed per TX poll
    pub tx_budget: usize,
    /// Polls of the channel reset bit before giving up
    pub reset_poll_limit: u32,
    /// Enable promiscuous mode (receive all frames)
    pub promiscuous: bool,
    /// Accept all multicast frames
    pub all_multicast: bool,
}

impl Default for EtopConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EtopConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: DEFAULT_MAC_ADDR,
            mii_mode: MiiMode::Rmii,
            mtu: MTU,
            tx_burst: DmaBurstLen::Words8,
            rx_burst: DmaBurstLen::Words8,
            rx_budget: DEFAULT_RX_BUDGET,
            tx_budget: DEFAULT_TX_BUDGET,
            reset_poll_limit: DEFAULT_RESET_POLL_LIMIT,
            promiscuous: false,
            all_multicast: false,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the MAC address
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; MAC_ADDR_LEN]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the PHY attachment mode
    #[must_use]
    pub const fn with_mii_mode(mut self, mode: MiiMode) -> Self {
        self.mii_mode = mode;
        self
    }

    /// Set the MTU
    #[must_use]
    pub const fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set the TX burst length
    #[must_use]
    pub const fn with_tx_burst(mut self, burst: DmaBurstLen) -> Self {
        self.tx_burst = burst;
        self
    }

    /// Set the RX burst length
    #[must_use]
    pub const fn with_rx_burst(mut self, burst: DmaBurstLen) -> Self {
        self.rx_burst = burst;
        self
    }

    /// Set the RX poll budget
    #[must_use]
    pub const fn with_rx_budget(mut self, budget: usize) -> Self {
        self.rx_budget = budget;
        self
    }

    /// Set the TX reclaim budget
    #[must_use]
    pub const fn with_tx_budget(mut self, budget: usize) -> Self {
        self.tx_budget = budget;
        self
    }

    /// Set the channel reset poll limit
    #[must_use]
    pub const fn with_reset_poll_limit(mut self, limit: u32) -> Self {
        self.reset_poll_limit = limit;
        self
    }

    /// Enable or disable promiscuous mode
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Accept or filter multicast frames
    #[must_use]
    pub const fn with_all_multicast(mut self, enabled: bool) -> Self {
        self.all_multicast = enabled;
        self
    }

    /// Check every field before anything reaches hardware
    pub const fn validate(&self) -> ConfigResult<()> {
        if !is_valid_ether_addr(&self.mac_address) {
            return Err(ConfigError::InvalidMacAddress);
        }
        if self.mtu < MIN_MTU || self.mtu > MTU {
            return Err(ConfigError::InvalidMtu);
        }
        if self.rx_budget == 0 || self.tx_budget == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

/// Unicast and non-zero
pub const fn is_valid_ether_addr(addr: &[u8; MAC_ADDR_LEN]) -> bool {
    let is_zero = addr[0] == 0
        && addr[1] == 0
        && addr[2] == 0
        && addr[3] == 0
        && addr[4] == 0
        && addr[5] == 0;
    let is_multicast = addr[0] & 0x01 != 0;
    !is_zero && !is_multicast
}

/// PRNG completion wait configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrngConfig {
    /// Give up on a job after this many microseconds
    pub timeout_us: u32,
    /// Poll the completion flag this often
    pub poll_interval_us: u32,
}

impl Default for PrngConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PrngConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_us: DEFAULT_PRNG_TIMEOUT_US,
            poll_interval_us: DEFAULT_PRNG_POLL_INTERVAL_US,
        }
    }

    /// Set the completion timeout
    #[must_use]
    pub const fn with_timeout_us(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    /// Set the completion poll interval (0 is treated as 1)
    #[must_use]
    pub const fn with_poll_interval_us(mut self, interval_us: u32) -> Self {
        self.poll_interval_us = interval_us;
        self
    }
}

/// Device driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not initialized
    #[default]
    Uninitialized,
    /// Initialized but not started
    Initialized,
    /// Running (TX/RX enabled)
    Running,
    /// Stopped (TX/RX disabled but still initialized)
    Stopped,
}

// =============================================================================
// Unit Tests
// =============================================================================
