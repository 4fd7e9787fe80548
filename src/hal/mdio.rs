//! MDIO (Management Data Input/Output) HAL
//!
//! The ETOP block exposes a single MDIO access register: software writes a
//! request word with the busy flag set and the block clears it once the
//! management frame has been shifted out (and, for reads, the data field is
//! valid). PHY discovery and link management stay with the caller; this
//! module only moves register values.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{ConfigError, IoError, Result};
use crate::hal::RegisterIo;
use crate::internal::register::etop::{
    MDIO_ACC, MDIO_ADDR_MASK, MDIO_ADDR_SHIFT, MDIO_READ, MDIO_REG_MASK, MDIO_REG_SHIFT,
    MDIO_REQUEST, MDIO_VAL_MASK,
};

// =============================================================================
// MDIO Constants
// =============================================================================

/// Default MDIO operation timeout in microseconds
pub const MDIO_TIMEOUT_US: u32 = 1_000;

/// Busy-flag poll interval in microseconds
const MDIO_POLL_INTERVAL_US: u32 = 10;

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
///
/// This trait can be implemented by different backends, allowing
/// PHY management code to work with various MDIO implementations.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;

    /// Check if the MDIO bus is busy
    fn is_busy(&self) -> bool;
}

// =============================================================================
// ETOP MDIO Controller
// =============================================================================

/// MDIO controller driving the ETOP `MDIO_ACC` register
#[derive(Debug)]
pub struct EtopMdio<R: RegisterIo, D: DelayNs> {
    regs: R,
    delay: D,
    timeout_us: u32,
}

impl<R: RegisterIo, D: DelayNs> EtopMdio<R, D> {
    /// Create a controller over the ETOP register window
    pub fn new(regs: R, delay: D) -> Self {
        Self {
            regs,
            delay,
            timeout_us: MDIO_TIMEOUT_US,
        }
    }

    /// Set the operation timeout
    pub fn set_timeout_us(&mut self, timeout_us: u32) {
        self.timeout_us = timeout_us;
    }

    /// Release the register handle and delay
    pub fn release(self) -> (R, D) {
        (self.regs, self.delay)
    }

    /// Wait for the request flag to clear
    fn wait_not_busy(&mut self) -> Result<()> {
        let mut elapsed = 0u32;
        while self.regs.read32(MDIO_ACC) & MDIO_REQUEST != 0 {
            if elapsed >= self.timeout_us {
                return Err(IoError::Timeout.into());
            }
            self.delay.delay_us(MDIO_POLL_INTERVAL_US);
            elapsed = elapsed.saturating_add(MDIO_POLL_INTERVAL_US);
        }
        Ok(())
    }

    /// Build the MDIO_ACC request word
    fn request(phy_addr: u8, reg_addr: u8) -> u32 {
        MDIO_REQUEST
            | ((phy_addr as u32 & MDIO_ADDR_MASK) << MDIO_ADDR_SHIFT)
            | ((reg_addr as u32 & MDIO_REG_MASK) << MDIO_REG_SHIFT)
    }

    fn validate(phy_addr: u8, reg_addr: u8) -> Result<()> {
        if phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        if reg_addr > MAX_REG_ADDR {
            return Err(ConfigError::InvalidConfig.into());
        }
        Ok(())
    }
}

impl<R: RegisterIo, D: DelayNs> MdioBus for EtopMdio<R, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Self::validate(phy_addr, reg_addr)?;

        self.wait_not_busy()?;
        self.regs
            .write32(MDIO_ACC, Self::request(phy_addr, reg_addr) | MDIO_READ);
        self.wait_not_busy()?;

        Ok((self.regs.read32(MDIO_ACC) & MDIO_VAL_MASK) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        Self::validate(phy_addr, reg_addr)?;

        self.wait_not_busy()?;
        self.regs
            .write32(MDIO_ACC, Self::request(phy_addr, reg_addr) | value as u32);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        (self.regs.read32(MDIO_ACC) & MDIO_REQUEST) != 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::error::Error;
    use crate::testing::{MockDelay, MockRegisters};

    #[test]
    fn mdio_write_encodes_request_word() {
        let mut regs = MockRegisters::new();
        let mut mdio = EtopMdio::new(&mut regs, MockDelay::new());

        mdio.write(0x8, 0x12, 0xC020).unwrap();

        let expected = MDIO_REQUEST | (0x8 << 21) | (0x12 << 16) | 0xC020;
        assert_eq!(regs.writes(), &[(MDIO_ACC, expected)]);
    }

    #[test]
    fn mdio_read_returns_data_field() {
        let mut regs = MockRegisters::new();
        // idle, idle after request, then the completed word
        regs.queue_reads(MDIO_ACC, &[0, 0, 0xFFFF_1234]);
        let mut mdio = EtopMdio::new(&mut regs, MockDelay::new());

        assert_eq!(mdio.read(1, 2).unwrap(), 0x1234);
        let (_, value) = regs.writes()[0];
        assert_ne!(value & MDIO_READ, 0);
        assert_eq!((value >> 21) & 0x1F, 1);
        assert_eq!((value >> 16) & 0x1F, 2);
    }

    #[test]
    fn mdio_times_out_when_request_never_clears() {
        let mut regs = MockRegisters::new();
        regs.set(MDIO_ACC, MDIO_REQUEST);
        let mut delay = MockDelay::new();
        let mut mdio = EtopMdio::new(&mut regs, &mut delay);
        mdio.set_timeout_us(100);

        assert_eq!(mdio.write(0, 0, 0), Err(Error::Io(IoError::Timeout)));
        assert!(mdio.is_busy());
        drop(mdio);
        assert!(delay.total_ns() >= 100_000);
    }

    #[test]
    fn mdio_timeout_rounds_up_to_whole_polls() {
        let mut regs = MockRegisters::new();
        regs.set(MDIO_ACC, MDIO_REQUEST);
        let mut delay = MockDelay::new();
        let mut mdio = EtopMdio::new(&mut regs, &mut delay);
        mdio.set_timeout_us(95);

        assert_eq!(mdio.read(0, 0), Err(Error::Io(IoError::Timeout)));
        drop(mdio);
        assert_eq!(delay.total_ns(), 100_000);
    }

    #[test]
    fn mdio_max_timeout_still_completes() {
        let mut regs = MockRegisters::new();
        // busy twice, idle, idle after request, then the completed word
        regs.queue_reads(MDIO_ACC, &[MDIO_REQUEST, MDIO_REQUEST, 0, 0, 0x0000_BEEF]);
        let mut mdio = EtopMdio::new(&mut regs, MockDelay::new());
        mdio.set_timeout_us(u32::MAX);

        assert_eq!(mdio.read(3, 1).unwrap(), 0xBEEF);
    }

    #[test]
    fn mdio_rejects_out_of_range_addresses() {
        let mut regs = MockRegisters::new();
        let mut mdio = EtopMdio::new(&mut regs, MockDelay::new());

        assert_eq!(
            mdio.read(32, 0),
            Err(Error::Config(ConfigError::InvalidPhyAddress))
        );
        assert_eq!(
            mdio.write(0, 32, 0),
            Err(Error::Config(ConfigError::InvalidConfig))
        );
        drop(mdio);
        assert!(regs.writes().is_empty());
    }
}
