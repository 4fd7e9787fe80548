//! Error types for the SoC DMA driver core
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Setup and configuration failures
//! - [`DmaError`]: Descriptor ring and buffer issues
//! - [`IoError`]: Runtime failures (timeouts, hardware faults)
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most driver methods.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and setup errors
///
/// These errors occur while a block is being brought up. Nothing is applied
/// to hardware when validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidConfig,
    /// Driver already initialized
    AlreadyInitialized,
    /// Burst length is not supported by the DMA port
    InvalidBurstLength,
    /// Invalid PHY address (must be 0-31)
    InvalidPhyAddress,
    /// MAC address is all-zero or multicast
    InvalidMacAddress,
    /// MTU outside the supported range
    InvalidMtu,
    /// Lane mode string does not name a known mode
    UnknownLaneMode,
    /// Lane mode is known but not allowed on this port
    UnsupportedLaneMode,
    /// Dual-lane mode configured on only one of its paired ports
    LanePairingMismatch,
    /// DMA channel reset bit did not clear in time
    ChannelResetTimeout,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::InvalidBurstLength => "invalid DMA burst length",
            ConfigError::InvalidPhyAddress => "invalid PHY address",
            ConfigError::InvalidMacAddress => "invalid MAC address",
            ConfigError::InvalidMtu => "invalid MTU",
            ConfigError::UnknownLaneMode => "unknown lane mode",
            ConfigError::UnsupportedLaneMode => "lane mode not supported on port",
            ConfigError::LanePairingMismatch => "dual-lane mode not set on both ports",
            ConfigError::ChannelResetTimeout => "DMA channel reset timed out",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// DMA ring and buffer errors
///
/// These errors relate to descriptor ring management and buffer allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Ring memory moved after its address was handed to hardware
    RingRelocated,
    /// Buffer allocator returned nothing
    AllocationFailed,
    /// Channel is closed or has failed
    ChannelClosed,
    /// Invalid frame length (zero or malformed)
    InvalidLength,
    /// Frame larger than a DMA transfer can carry
    FrameTooLarge,
    /// Packet engine has no room for another command descriptor
    NoDescriptorSpace,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::RingRelocated => "descriptor ring moved after setup",
            DmaError::AllocationFailed => "buffer allocation failed",
            DmaError::ChannelClosed => "DMA channel closed",
            DmaError::InvalidLength => "invalid frame length",
            DmaError::FrameTooLarge => "frame too large for DMA",
            DmaError::NoDescriptorSpace => "no command descriptor space",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime errors
///
/// These errors occur while a block is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Operation timed out
    Timeout,
    /// Invalid state for operation (e.g., not running)
    InvalidState,
    /// Hardware reported an error for the operation
    HardwareFault,
    /// Engine must be reinitialized before further use
    NeedsReset,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::InvalidState => "invalid state for operation",
            IoError::HardwareFault => "hardware fault",
            IoError::NeedsReset => "engine needs reset",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::UnknownLaneMode)) => { /* ... */ }
///     Err(Error::Dma(DmaError::AllocationFailed)) => { /* ... */ }
///     Err(Error::Io(IoError::Timeout)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
