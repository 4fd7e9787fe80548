//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`register`]: Register offsets and fields of the ETOP, DMA, EIP-93 and SCU blocks
//! - [`constants`]: Internal constants and magic numbers
//! - [`descriptor_bits`]: DMA descriptor control word fields
//!
//! # Stability
//!
//! **WARNING:** This module is `pub(crate)` only. Do not depend on any types
//! or functions in this module from external code. They are subject to change
//! without notice.

pub(crate) mod constants;
pub(crate) mod descriptor_bits;
pub(crate) mod register;
