//! Received frame classification.
//!
//! Upstream stacks want to know two things about a frame before looking at
//! it: which protocol follows the Ethernet header and whether it was sent to
//! this station, to everyone, or to a group.

use crate::internal::constants::{ETH_HEADER_SIZE, MAC_ADDR_LEN};

/// Smallest EtherType value; anything below is an IEEE 802.3 length field
const ETH_P_802_3_MIN: u16 = 0x0600;

/// Protocol carried after the Ethernet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EtherType {
    /// IPv4 (0x0800)
    Ipv4,
    /// ARP (0x0806)
    Arp,
    /// IPv6 (0x86DD)
    Ipv6,
    /// 802.1Q VLAN tag (0x8100)
    Vlan,
    /// IEEE 802.3 frame carrying a length instead of a type
    Ieee8023,
    /// Any other EtherType
    Other(u16),
}

impl EtherType {
    /// Decode the type/length field
    pub const fn from_u16(value: u16) -> Self {
        match value {
            0x0800 => Self::Ipv4,
            0x0806 => Self::Arp,
            0x86DD => Self::Ipv6,
            0x8100 => Self::Vlan,
            v if v < ETH_P_802_3_MIN => Self::Ieee8023,
            v => Self::Other(v),
        }
    }

    /// Type of the frame starting at `frame`; `None` if the header is cut off
    pub fn of_frame(frame: &[u8]) -> Option<Self> {
        if frame.len() < ETH_HEADER_SIZE {
            return None;
        }
        let raw = u16::from_be_bytes([frame[12], frame[13]]);
        Some(Self::from_u16(raw))
    }
}

/// Who a frame was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketClass {
    /// Unicast to this station
    Host,
    /// Broadcast
    Broadcast,
    /// Group address other than broadcast
    Multicast,
    /// Unicast to some other station (seen in promiscuous mode)
    OtherHost,
}

impl PacketClass {
    /// Classify `frame` relative to `station`
    pub fn of_frame(frame: &[u8], station: &[u8; MAC_ADDR_LEN]) -> Self {
        let Some(dst) = frame.get(..MAC_ADDR_LEN) else {
            return Self::OtherHost;
        };
        if dst.iter().all(|&b| b == 0xFF) {
            Self::Broadcast
        } else if dst[0] & 0x01 != 0 {
            Self::Multicast
        } else if dst == station {
            Self::Host
        } else {
            Self::OtherHost
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATION: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

    fn frame(dst: [u8; 6], ethertype: u16) -> [u8; 60] {
        let mut f = [0u8; 60];
        f[..6].copy_from_slice(&dst);
        f[6..12].copy_from_slice(&[0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);
        f[12..14].copy_from_slice(&ethertype.to_be_bytes());
        f
    }

    #[test]
    fn ether_type_known_values() {
        assert_eq!(EtherType::from_u16(0x0800), EtherType::Ipv4);
        assert_eq!(EtherType::from_u16(0x0806), EtherType::Arp);
        assert_eq!(EtherType::from_u16(0x86DD), EtherType::Ipv6);
        assert_eq!(EtherType::from_u16(0x8100), EtherType::Vlan);
        assert_eq!(EtherType::from_u16(0x88CC), EtherType::Other(0x88CC));
        assert_eq!(EtherType::from_u16(0x05DC), EtherType::Ieee8023);
    }

    #[test]
    fn ether_type_of_short_frame_is_none() {
        assert_eq!(EtherType::of_frame(&[0u8; 13]), None);
        assert_eq!(
            EtherType::of_frame(&frame(STATION, 0x0806)),
            Some(EtherType::Arp)
        );
    }

    #[test]
    fn packet_class_by_destination() {
        assert_eq!(
            PacketClass::of_frame(&frame([0xFF; 6], 0x0806), &STATION),
            PacketClass::Broadcast
        );
        assert_eq!(
            PacketClass::of_frame(&frame([0x01, 0x00, 0x5E, 0, 0, 1], 0x0800), &STATION),
            PacketClass::Multicast
        );
        assert_eq!(
            PacketClass::of_frame(&frame(STATION, 0x0800), &STATION),
            PacketClass::Host
        );
        assert_eq!(
            PacketClass::of_frame(&frame([0x02, 0, 0, 0, 0, 9], 0x0800), &STATION),
            PacketClass::OtherHost
        );
    }
}
