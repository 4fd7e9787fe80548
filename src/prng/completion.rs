//! Interrupt-safe completion signal for PRNG jobs.
//!
//! The submitting context arms the signal before a job is queued and polls it
//! afterwards; the engine's result interrupt calls
//! [`PrngCompletion::signal`]. Everything is plain atomics, so the signal can
//! live in a `static` shared with the interrupt handler.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

/// PRNG output buffer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BufferState {
    /// Holds random bytes ready to be drawn
    NotEmpty = 0,
    /// Holds nothing usable
    Empty = 1,
    /// A job is filling it
    Pending = 2,
    /// The engine reported an error or never answered; reinitialize first
    NeedReset = 3,
}

impl BufferState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotEmpty,
            1 => Self::Empty,
            2 => Self::Pending,
            _ => Self::NeedReset,
        }
    }
}

/// Completion flag plus buffer state shared with the interrupt handler
#[derive(Debug)]
pub struct PrngCompletion {
    filled: AtomicBool,
    state: AtomicU8,
    error: AtomicU32,
}

impl PrngCompletion {
    /// A fresh signal needs a reinitialize job before bytes can be drawn
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filled: AtomicBool::new(false),
            state: AtomicU8::new(BufferState::NeedReset as u8),
            error: AtomicU32::new(0),
        }
    }

    /// Reset for a new job
    pub fn arm(&self) {
        self.error.store(0, Ordering::Relaxed);
        self.state.store(BufferState::Empty as u8, Ordering::Relaxed);
        self.filled.store(false, Ordering::Release);
    }

    /// Report the job result; called from the result interrupt.
    ///
    /// A non-zero `err` moves the buffer to [`BufferState::NeedReset`].
    pub fn signal(&self, err: u32) {
        if err != 0 {
            self.error.store(err, Ordering::Relaxed);
            self.state.store(BufferState::NeedReset as u8, Ordering::Relaxed);
        }
        self.filled.store(true, Ordering::Release);
    }

    /// The job finished (successfully or not)
    pub fn is_filled(&self) -> bool {
        self.filled.load(Ordering::Acquire)
    }

    /// Current buffer state
    pub fn state(&self) -> BufferState {
        BufferState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: BufferState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Error code of the last failed job, 0 if none
    pub fn last_error(&self) -> u32 {
        self.error.load(Ordering::Relaxed)
    }
}

impl Default for PrngCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_starts_needing_reset() {
        let done = PrngCompletion::new();
        assert_eq!(done.state(), BufferState::NeedReset);
        assert!(!done.is_filled());
    }

    #[test]
    fn completion_arm_then_signal_ok() {
        let done = PrngCompletion::new();
        done.arm();
        assert_eq!(done.state(), BufferState::Empty);
        done.signal(0);
        assert!(done.is_filled());
        assert_eq!(done.state(), BufferState::Empty);
        assert_eq!(done.last_error(), 0);
    }

    #[test]
    fn completion_error_needs_reset() {
        let done = PrngCompletion::new();
        done.arm();
        done.signal(0x42);
        assert!(done.is_filled());
        assert_eq!(done.state(), BufferState::NeedReset);
        assert_eq!(done.last_error(), 0x42);

        done.arm();
        assert_eq!(done.last_error(), 0);
        assert!(!done.is_filled());
    }

    #[test]
    fn buffer_state_decodes_raw_values() {
        assert_eq!(BufferState::from_u8(0), BufferState::NotEmpty);
        assert_eq!(BufferState::from_u8(2), BufferState::Pending);
        assert_eq!(BufferState::from_u8(9), BufferState::NeedReset);
    }
}
