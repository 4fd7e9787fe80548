//! EIP-93 command descriptor and PRNG SA record.

use crate::internal::constants::PRNG_BLOCK_SIZE;
use crate::internal::register::eip93::{
    DESC_FINISH, DESC_LAST, DESC_PRNG, PE_CTRL_HOST_READY, PE_CTRL_PRNG_MODE,
    PE_CTRL_READY_DES_OWN, PE_LENGTH_HOST_PE_READY, PE_LENGTH_HOST_READY, PE_LENGTH_LENGTH,
    SA_CMD0_PRNG, SA_CMD1_PRNG,
};
use crate::internal::register::{field_get, field_prep};

/// Operation requested from the PRNG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum PrngMode {
    /// Load key, seed and date-time from the SA record; produces no data
    Reinit = 1,
    /// Produce random bytes
    Generate = 2,
}

/// One command descriptor as the engine reads it (eight words)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct CommandDescriptor {
    /// Ownership, error status and PRNG mode
    pub ctrl_stat: u32,
    /// Source buffer (unused by the PRNG)
    pub src_addr: u32,
    /// Output buffer
    pub dst_addr: u32,
    /// SA record
    pub sa_addr: u32,
    /// State record (unused by the PRNG)
    pub state_addr: u32,
    /// ARC4 state (unused by the PRNG)
    pub arc4_addr: u32,
    /// Request flags echoed back in the result
    pub user_id: u32,
    /// Ownership and transfer length
    pub length: u32,
}

impl CommandDescriptor {
    /// Size in 32-bit words
    pub const WORDS: usize = 8;

    /// Host-ready PRNG request writing `len` bytes to `dst`
    #[must_use]
    pub const fn prng(mode: PrngMode, len: u32, dst: u32, sa: u32) -> Self {
        Self {
            ctrl_stat: field_prep(PE_CTRL_READY_DES_OWN, PE_CTRL_HOST_READY)
                | field_prep(PE_CTRL_PRNG_MODE, mode as u32),
            src_addr: 0,
            dst_addr: dst,
            sa_addr: sa,
            state_addr: 0,
            arc4_addr: 0,
            user_id: DESC_PRNG | DESC_LAST | DESC_FINISH,
            length: field_prep(PE_LENGTH_HOST_PE_READY, PE_LENGTH_HOST_READY)
                | field_prep(PE_LENGTH_LENGTH, len),
        }
    }

    /// PRNG mode field
    pub const fn mode(&self) -> u32 {
        field_get(PE_CTRL_PRNG_MODE, self.ctrl_stat)
    }

    /// Requested transfer length
    pub const fn transfer_len(&self) -> u32 {
        field_get(PE_LENGTH_LENGTH, self.length)
    }

    /// Words in the order the engine reads them
    pub const fn to_words(&self) -> [u32; Self::WORDS] {
        [
            self.ctrl_stat,
            self.src_addr,
            self.dst_addr,
            self.sa_addr,
            self.state_addr,
            self.arc4_addr,
            self.user_id,
            self.length,
        ]
    }
}

/// The part of the SA record the PRNG uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C, align(4))]
pub struct SaRecord {
    /// Command word 0
    pub cmd0: u32,
    /// Command word 1
    pub cmd1: u32,
    /// 128-bit key
    pub key: [u32; 4],
    /// Seed (inner digest slot)
    pub i_digest: [u32; 4],
    /// Date-time vector (outer digest slot)
    pub o_digest: [u32; 4],
}

impl SaRecord {
    /// Zeroed record
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cmd0: 0,
            cmd1: 0,
            key: [0; 4],
            i_digest: [0; 4],
            o_digest: [0; 4],
        }
    }

    /// PRNG record from key, seed and date-time words
    #[must_use]
    pub const fn prng(key: [u32; 4], seed: [u32; 4], datetime: [u32; 4]) -> Self {
        Self {
            cmd0: SA_CMD0_PRNG,
            cmd1: SA_CMD1_PRNG,
            key,
            i_digest: seed,
            o_digest: datetime,
        }
    }

    /// PRNG record from byte blocks, copied word by word in memory order
    #[must_use]
    pub fn prng_from_bytes(
        key: &[u8; PRNG_BLOCK_SIZE],
        seed: &[u8; PRNG_BLOCK_SIZE],
        datetime: &[u8; PRNG_BLOCK_SIZE],
    ) -> Self {
        Self::prng(words(key), words(seed), words(datetime))
    }
}

fn words(block: &[u8; PRNG_BLOCK_SIZE]) -> [u32; 4] {
    let mut out = [0u32; 4];
    for (word, chunk) in out.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}
