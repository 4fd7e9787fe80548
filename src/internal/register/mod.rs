//! Memory-mapped register definitions
//!
//! Offsets are relative to the register window handed to the driver through
//! [`RegisterIo`](crate::hal::RegisterIo); no block carries a fixed base
//! address.

pub mod dma;
pub mod eip93;
pub mod etop;
pub mod scu;

/// Build a contiguous bit mask covering bits `low..=high`
#[inline(always)]
pub const fn genmask(high: u32, low: u32) -> u32 {
    (u32::MAX >> (31 - high)) & (u32::MAX << low)
}

/// Place `value` into the field described by `mask`
#[inline(always)]
pub const fn field_prep(mask: u32, value: u32) -> u32 {
    (value << mask.trailing_zeros()) & mask
}

/// Extract the field described by `mask` from `reg`
#[inline(always)]
pub const fn field_get(mask: u32, reg: u32) -> u32 {
    (reg & mask) >> mask.trailing_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genmask_matches_bit_ranges() {
        assert_eq!(genmask(0, 0), 0x1);
        assert_eq!(genmask(7, 0), 0xff);
        assert_eq!(genmask(14, 13), 0x6000);
        assert_eq!(genmask(31, 30), 0xc000_0000);
        assert_eq!(genmask(31, 0), u32::MAX);
    }

    #[test]
    fn field_prep_and_get_are_inverse() {
        let mask = genmask(25, 24);
        assert_eq!(field_prep(mask, 2), 2 << 24);
        assert_eq!(field_get(mask, field_prep(mask, 3)), 3);
        // Values wider than the field are truncated
        assert_eq!(field_prep(mask, 0x7), 3 << 24);
    }
}
