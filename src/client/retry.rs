// Retry/backoff policy
//
// Wraps every remote operation. Transport failures and unclassified faults
// back off and retry; faults carrying a server wait hint sleep exactly that
// long; faults whose code maps to a typed kind surface immediately so
// callers can branch on them.

use std::time::Duration;

use crate::errors::{Error, FaultKind};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, jitter: Duration::from_millis(200) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Surface the error now; further attempts cannot help.
    Fail,
    /// Sleep this long, then try again.
    RetryAfter(Duration),
}

impl RetryPolicy {
    /// Decides what to do with a failed attempt. `attempt` is 1-based.
    pub fn decide(&self, err: &Error, attempt: u32) -> Decision {
        match err {
            Error::Transport(_) => Decision::RetryAfter(self.jitter * attempt),
            Error::Fault { kind, fault } => {
                if let Some(wait) = fault.data.cooldown_remaining() {
                    Decision::RetryAfter(wait)
                } else if let Some(wait) = fault.data.wait_hint() {
                    Decision::RetryAfter(wait)
                } else if *kind != FaultKind::Unclassified {
                    Decision::Fail
                } else {
                    Decision::RetryAfter(self.jitter * attempt)
                }
            }
            // Local errors (decode, io, config) are not retryable.
            _ => Decision::Fail,
        }
    }
}
