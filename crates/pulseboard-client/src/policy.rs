//! Retry and fallback decisions for failed reads.

use std::time::Duration;

use crate::api::{ApiError, FailureClass};

/// One fetch attempt, classified.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Ok(T),
    TransientFailure(ApiError),
    PermanentFailure(ApiError),
}

impl<T> FetchOutcome<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => FetchOutcome::Ok(value),
            Err(e) => match e.class() {
                FailureClass::Transient => FetchOutcome::TransientFailure(e),
                FailureClass::Permanent => FetchOutcome::PermanentFailure(e),
            },
        }
    }

    pub fn class(&self) -> Option<FailureClass> {
        match self {
            FetchOutcome::Ok(_) => None,
            FetchOutcome::TransientFailure(_) => Some(FailureClass::Transient),
            FetchOutcome::PermanentFailure(_) => Some(FailureClass::Permanent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry(Duration),
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }

    /// Overview, campaign and revenue reads.
    pub const fn data() -> Self {
        Self::with_retries(3)
    }

    pub const fn health() -> Self {
        Self::with_retries(5)
    }

    /// What to do after a failure. `retries_so_far` counts retries already
    /// made for this read, so the first failure passes 0.
    pub fn decide(
        &self,
        class: FailureClass,
        retries_so_far: u32,
        fallback_in_use: bool,
    ) -> Decision {
        if fallback_in_use || class == FailureClass::Permanent {
            return Decision::Fallback;
        }
        if retries_so_far < self.max_retries {
            Decision::Retry(self.backoff(retries_so_far))
        } else {
            Decision::Fallback
        }
    }

    /// `base * 2^retries`, capped at `max_delay`.
    pub fn backoff(&self, retries_so_far: u32) -> Duration {
        let factor = 1u32.checked_shl(retries_so_far).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}
