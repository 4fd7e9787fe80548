//! SCU SerDes select/status registers.

use super::mode::{PropertySource, SerdesMode, SerdesPlatformData, SerdesPort, SerdesSelection};
use crate::driver::error::ConfigResult;
use crate::hal::RegisterIo;
use crate::internal::register::field_prep;
use crate::internal::register::scu::{
    PCIC, PCIC_PCIE_2LANE_MODE, SSR3, SSR3_HSGMII_SEL, SSTR, SSTR_PCIE_XSI_SEL_PCIE,
    SSTR_PCIE_XSI0_SEL, SSTR_PCIE_XSI1_SEL, SSTR_USB_PCIE_SEL,
};

/// Lane mux configured from board properties
///
/// Built only by [`probe`](Self::probe), so a value of this type always
/// means the registers hold a validated selection.
pub struct ScuSsr<R: RegisterIo> {
    regs: R,
    selection: SerdesSelection,
}

impl<R: RegisterIo> ScuSsr<R> {
    /// Parse, validate and apply the lane modes.
    ///
    /// Nothing is written unless every port parses and validates.
    ///
    /// # Errors
    /// - `UnknownLaneMode` - a property is not a mode string
    /// - `UnsupportedLaneMode` - a port does not allow the mode
    /// - `LanePairingMismatch` - `pcie0_x2` set on only one WiFi port
    pub fn probe<P: PropertySource + ?Sized>(
        regs: R,
        platform: &SerdesPlatformData,
        props: &P,
    ) -> ConfigResult<Self> {
        let selection = SerdesSelection::parse(props, platform)?;
        Ok(Self::with_selection(regs, selection))
    }

    /// Apply an already validated selection
    pub fn with_selection(regs: R, selection: SerdesSelection) -> Self {
        let mut ssr = Self { regs, selection };
        ssr.apply();
        ssr
    }

    /// Active selection
    pub fn selection(&self) -> &SerdesSelection {
        &self.selection
    }

    /// Mode of `port`
    pub fn mode(&self, port: SerdesPort) -> SerdesMode {
        self.selection.mode(port)
    }

    /// Register handle
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Give the register handle back
    pub fn release(self) -> R {
        self.regs
    }

    fn apply(&mut self) {
        let sel = self.selection;

        // The PCS driver owns the non-PCIe selector values.
        if sel.mode(SerdesPort::Wifi1).is_pcie0() {
            self.regs.update_bits(
                SSTR,
                SSTR_PCIE_XSI0_SEL,
                field_prep(SSTR_PCIE_XSI0_SEL, SSTR_PCIE_XSI_SEL_PCIE),
            );
        }
        if matches!(sel.mode(SerdesPort::Wifi2), SerdesMode::Pcie1X1 | SerdesMode::Pcie0X2) {
            self.regs.update_bits(
                SSTR,
                SSTR_PCIE_XSI1_SEL,
                field_prep(SSTR_PCIE_XSI1_SEL, SSTR_PCIE_XSI_SEL_PCIE),
            );
        }

        if sel.is_pcie0_dual_lane() {
            self.regs.set_bits(PCIC, PCIC_PCIE_2LANE_MODE);
        } else {
            self.regs.clear_bits(PCIC, PCIC_PCIE_2LANE_MODE);
        }

        if sel.mode(SerdesPort::Usb1) == SerdesMode::Ethernet {
            self.regs.clear_bits(SSR3, SSR3_HSGMII_SEL);
        } else {
            self.regs.set_bits(SSR3, SSR3_HSGMII_SEL);
        }

        if sel.mode(SerdesPort::Usb2) == SerdesMode::Pcie2X1 {
            self.regs.clear_bits(SSTR, SSTR_USB_PCIE_SEL);
        } else {
            self.regs.set_bits(SSTR, SSTR_USB_PCIE_SEL);
        }

        info!(
            "serdes: wifi1={} wifi2={} usb1={} usb2={}",
            sel.mode(SerdesPort::Wifi1).as_str(),
            sel.mode(SerdesPort::Wifi2).as_str(),
            sel.mode(SerdesPort::Usb1).as_str(),
            sel.mode(SerdesPort::Usb2).as_str()
        );
    }
}
