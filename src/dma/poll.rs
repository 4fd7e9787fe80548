//! Bounded-work poll results.

/// What the scheduler should do after a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollStatus {
    /// All pending work was drained and the channel interrupt was
    /// acknowledged; wait for the next interrupt
    Complete,
    /// The budget ran out; the interrupt stays pending, poll again
    Reschedule,
}

/// Result of one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub struct PollOutcome {
    /// Descriptors handled in this cycle
    pub work_done: usize,
    /// Whether the poll finished
    pub status: PollStatus,
}

impl PollOutcome {
    /// Classify `work_done` against `budget`
    pub const fn from_budget(work_done: usize, budget: usize) -> Self {
        let status = if work_done < budget {
            PollStatus::Complete
        } else {
            PollStatus::Reschedule
        };
        Self { work_done, status }
    }

    /// The poll drained everything and re-armed the interrupt
    pub const fn is_complete(&self) -> bool {
        matches!(self.status, PollStatus::Complete)
    }
}

/// Which poll an interrupt asks the scheduler to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollRequest {
    /// Run the RX poll
    Rx,
    /// Run the TX poll
    Tx,
}
