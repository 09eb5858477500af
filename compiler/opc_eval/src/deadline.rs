//! Cooperative wall-clock cancellation.

use std::time::{Duration, Instant};

use crate::errors::{self, EvalResult};

/// A point in time after which building or resolution gives up.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    pub(crate) fn after(limit: Duration) -> Self {
        Deadline {
            at: Instant::now() + limit,
            limit,
        }
    }

    pub(crate) fn check(&self) -> EvalResult<()> {
        if Instant::now() >= self.at {
            return Err(errors::timeout(self.limit.as_millis()));
        }
        Ok(())
    }
}
