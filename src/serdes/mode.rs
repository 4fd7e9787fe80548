//! SerDes lane modes, ports and per-platform allow-lists.

use core::fmt;

use crate::driver::error::{ConfigError, ConfigResult};

/// Protocol a SerDes lane carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerdesMode {
    /// PCIe0, one lane
    Pcie0X1,
    /// PCIe0, two lanes (claims both WiFi lanes)
    Pcie0X2,
    /// PCIe1, one lane
    Pcie1X1,
    /// PCIe2, one lane
    Pcie2X1,
    /// USB 3
    Usb3,
    /// Ethernet (HSGMII/USXGMII)
    Ethernet,
}

impl SerdesMode {
    /// Every mode in property-string order
    pub const ALL: [Self; 6] = [
        Self::Pcie0X1,
        Self::Pcie0X2,
        Self::Pcie1X1,
        Self::Pcie2X1,
        Self::Usb3,
        Self::Ethernet,
    ];

    /// Property string for this mode
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pcie0X1 => "pcie0_x1",
            Self::Pcie0X2 => "pcie0_x2",
            Self::Pcie1X1 => "pcie1_x1",
            Self::Pcie2X1 => "pcie2_x1",
            Self::Usb3 => "usb3",
            Self::Ethernet => "ethernet",
        }
    }

    /// Parse a property string; only exact matches are accepted
    ///
    /// # Errors
    /// - `UnknownLaneMode` - not one of the six mode strings
    pub fn parse(s: &str) -> ConfigResult<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or(ConfigError::UnknownLaneMode)
    }

    /// Mode drives PCIe0
    pub const fn is_pcie0(self) -> bool {
        matches!(self, Self::Pcie0X1 | Self::Pcie0X2)
    }
}

impl fmt::Display for SerdesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SerDes port controlled by the SCU mux
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerdesPort {
    /// First WiFi lane
    Wifi1,
    /// Second WiFi lane
    Wifi2,
    /// First USB lane
    Usb1,
    /// Second USB lane
    Usb2,
}

impl SerdesPort {
    /// Number of ports
    pub const COUNT: usize = 4;

    /// Every port in index order
    pub const ALL: [Self; Self::COUNT] = [Self::Wifi1, Self::Wifi2, Self::Usb1, Self::Usb2];

    /// Position in per-port tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Platform property naming this port's mode
    pub const fn property_name(self) -> &'static str {
        match self {
            Self::Wifi1 => "airoha,serdes-wifi1",
            Self::Wifi2 => "airoha,serdes-wifi2",
            Self::Usb1 => "airoha,serdes-usb1",
            Self::Usb2 => "airoha,serdes-usb2",
        }
    }

    /// Mode used when the property is absent
    pub const fn default_mode(self) -> SerdesMode {
        match self {
            Self::Wifi1 => SerdesMode::Pcie0X1,
            Self::Wifi2 => SerdesMode::Pcie1X1,
            Self::Usb1 | Self::Usb2 => SerdesMode::Usb3,
        }
    }
}

/// Modes one port may be switched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerdesPortInfo {
    /// Allowed modes
    pub possible_modes: &'static [SerdesMode],
}

impl SerdesPortInfo {
    /// Allow-list over `modes`
    pub const fn new(possible_modes: &'static [SerdesMode]) -> Self {
        Self { possible_modes }
    }

    /// `mode` is on the allow-list
    pub fn supports(&self, mode: SerdesMode) -> bool {
        self.possible_modes.contains(&mode)
    }
}

/// Per-SoC description of what each port supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerdesPlatformData {
    /// Allow-list per port, indexed by [`SerdesPort::index`]
    pub ports_info: [SerdesPortInfo; SerdesPort::COUNT],
}

impl SerdesPlatformData {
    /// Airoha EN7581 lane capabilities
    pub const fn en7581() -> Self {
        Self {
            ports_info: [
                SerdesPortInfo::new(&[SerdesMode::Pcie0X1, SerdesMode::Pcie0X2, SerdesMode::Ethernet]),
                SerdesPortInfo::new(&[SerdesMode::Pcie1X1, SerdesMode::Pcie0X2, SerdesMode::Ethernet]),
                SerdesPortInfo::new(&[SerdesMode::Usb3, SerdesMode::Ethernet]),
                SerdesPortInfo::new(&[SerdesMode::Usb3, SerdesMode::Pcie2X1]),
            ],
        }
    }

    /// Allow-list for `port`
    pub const fn port_info(&self, port: SerdesPort) -> &SerdesPortInfo {
        &self.ports_info[port.index()]
    }
}

/// String properties describing the board (device-tree style)
pub trait PropertySource {
    /// Value of property `name`, if present
    fn read_string(&self, name: &str) -> Option<&str>;
}

impl<T: PropertySource + ?Sized> PropertySource for &T {
    fn read_string(&self, name: &str) -> Option<&str> {
        (**self).read_string(name)
    }
}

/// Validated mode for every port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerdesSelection {
    modes: [SerdesMode; SerdesPort::COUNT],
}

impl SerdesSelection {
    /// The mode each port falls back to without properties
    pub const fn defaults() -> Self {
        Self {
            modes: [
                SerdesPort::Wifi1.default_mode(),
                SerdesPort::Wifi2.default_mode(),
                SerdesPort::Usb1.default_mode(),
                SerdesPort::Usb2.default_mode(),
            ],
        }
    }

    /// Build from explicit modes and validate them against `platform`
    ///
    /// # Errors
    /// As [`validate`](Self::validate).
    pub fn new(
        modes: [SerdesMode; SerdesPort::COUNT],
        platform: &SerdesPlatformData,
    ) -> ConfigResult<Self> {
        let selection = Self { modes };
        selection.validate(platform)?;
        Ok(selection)
    }

    /// Read every port property and validate the result
    ///
    /// Only modes read from a property are held to the allow-list; a port
    /// without one keeps its default. The pairing rule covers every port.
    ///
    /// # Errors
    /// - `UnknownLaneMode` - a property is not a mode string
    /// - `UnsupportedLaneMode` - a port does not allow the mode
    /// - `LanePairingMismatch` - `pcie0_x2` set on only one WiFi port
    pub fn parse<P: PropertySource + ?Sized>(
        props: &P,
        platform: &SerdesPlatformData,
    ) -> ConfigResult<Self> {
        let mut selection = Self::defaults();
        for port in SerdesPort::ALL {
            let Some(value) = props.read_string(port.property_name()) else {
                continue;
            };
            let mode = SerdesMode::parse(value).inspect_err(|_| {
                error!("serdes: invalid mode {} for {}", value, port.property_name());
            })?;
            Self::check_supported(platform, port, mode)?;
            selection.modes[port.index()] = mode;
        }
        selection.check_pairing()?;
        Ok(selection)
    }

    /// Check every port against its allow-list, then the dual-lane pairing
    ///
    /// # Errors
    /// As [`parse`](Self::parse), minus `UnknownLaneMode`.
    pub fn validate(&self, platform: &SerdesPlatformData) -> ConfigResult<()> {
        for port in SerdesPort::ALL {
            Self::check_supported(platform, port, self.mode(port))?;
        }
        self.check_pairing()
    }

    fn check_supported(
        platform: &SerdesPlatformData,
        port: SerdesPort,
        mode: SerdesMode,
    ) -> ConfigResult<()> {
        if !platform.port_info(port).supports(mode) {
            error!("serdes: mode {} not supported for {}", mode.as_str(), port.property_name());
            return Err(ConfigError::UnsupportedLaneMode);
        }
        Ok(())
    }

    fn check_pairing(&self) -> ConfigResult<()> {
        let wifi1_x2 = self.mode(SerdesPort::Wifi1) == SerdesMode::Pcie0X2;
        let wifi2_x2 = self.mode(SerdesPort::Wifi2) == SerdesMode::Pcie0X2;
        if wifi1_x2 != wifi2_x2 {
            error!("serdes: pcie0_x2 must be set on both wifi ports");
            return Err(ConfigError::LanePairingMismatch);
        }
        Ok(())
    }

    /// Mode of `port`
    pub const fn mode(&self, port: SerdesPort) -> SerdesMode {
        self.modes[port.index()]
    }

    /// PCIe0 runs on both WiFi lanes
    pub fn is_pcie0_dual_lane(&self) -> bool {
        self.mode(SerdesPort::Wifi1) == SerdesMode::Pcie0X2
    }
}

impl Default for SerdesSelection {
    fn default() -> Self {
        Self::defaults()
    }
}
