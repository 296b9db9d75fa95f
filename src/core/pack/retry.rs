//! Fixed-count retry for pack mutations.

use std::thread;
use std::time::Duration;

use crate::core::error::{KmgrError, Result};

/// Attempt count and fixed delay between attempts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay_ms: u64) -> Self {
        Self {
            attempts: attempts.max(1),
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Run `op` until it succeeds or attempts run out
    ///
    /// Errors that are not transient (bad input, size ceilings, access
    /// checks) are returned on the first failure. The last error is
    /// returned once every attempt has failed.
    pub fn run<T, F>(&self, step: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut last_err = None;
        for attempt in 1..=self.attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        step,
                        attempt,
                        attempts = self.attempts,
                        "Attempt failed: {}",
                        err
                    );
                    last_err = Some(err);
                    if attempt < self.attempts {
                        thread::sleep(self.delay);
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            KmgrError::Internal(format!("{step}: no attempts left"))
        }))
    }
}
