//! Attempt state of a single logical fetch
//!
//! ```text
//! Pending -> Attempting(1) -> Success(1)
//!                          -> RetryWait(1) -> Attempting(2) -> ...
//!                          -> Exhausted(n)      (after the last allowed attempt)
//! ```

use std::fmt;

/// Represents where a fetch is in its retry cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    /// Not started, no permit held yet
    Pending,

    /// Attempt number `attempt` (1-based) is in flight
    Attempting { attempt: u32 },

    /// Attempt `attempt` failed and the retry delay is running
    RetryWait { attempt: u32 },

    /// Attempt `attempt` produced a document
    Success { attempt: u32 },

    /// All `attempts` allowed attempts failed
    Exhausted { attempts: u32 },
}

impl FetchState {
    /// Returns true once no further attempt will be made
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Exhausted { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Attempts started so far
    pub fn attempts(&self) -> u32 {
        match *self {
            Self::Pending => 0,
            Self::Attempting { attempt }
            | Self::RetryWait { attempt }
            | Self::Success { attempt } => attempt,
            Self::Exhausted { attempts } => attempts,
        }
    }

    /// Starts the next attempt
    ///
    /// `Pending` and `RetryWait` advance; every other state is returned unchanged.
    pub fn begin_attempt(self) -> Self {
        match self {
            Self::Pending => Self::Attempting { attempt: 1 },
            Self::RetryWait { attempt } => Self::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    /// Records a failed attempt
    ///
    /// Moves to `RetryWait` while attempts remain, to `Exhausted` once
    /// `max_attempts` have been used. Only meaningful from `Attempting`.
    pub fn fail(self, max_attempts: u32) -> Self {
        match self {
            Self::Attempting { attempt } if attempt >= max_attempts => Self::Exhausted {
                attempts: attempt,
            },
            Self::Attempting { attempt } => Self::RetryWait { attempt },
            other => other,
        }
    }

    /// Records a successful attempt
    pub fn succeed(self) -> Self {
        match self {
            Self::Attempting { attempt } => Self::Success { attempt },
            other => other,
        }
    }

    /// Checks whether moving from this state to `next` is a legal transition
    pub fn can_transition_to(&self, next: &Self) -> bool {
        match (*self, *next) {
            (Self::Pending, Self::Attempting { attempt }) => attempt == 1,
            (Self::Attempting { attempt: a }, Self::Success { attempt: b })
            | (Self::Attempting { attempt: a }, Self::RetryWait { attempt: b })
            | (Self::Attempting { attempt: a }, Self::Exhausted { attempts: b }) => a == b,
            (Self::RetryWait { attempt: a }, Self::Attempting { attempt: b }) => b == a + 1,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Attempting { .. } => "attempting",
            Self::RetryWait { .. } => "retry_wait",
            Self::Success { .. } => "success",
            Self::Exhausted { .. } => "exhausted",
        }
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            other => write!(f, "{}({})", other.name(), other.attempts()),
        }
    }
}
