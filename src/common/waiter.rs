// Copyright 2026 The openstack-service-test Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Waiters: polling delays and phase deadlines.

use std::future::Future;
use std::time::Duration;

use futures::future::pending;
use tokio::signal;
use tokio::time::{sleep, timeout};

use crate::{Error, ErrorKind, Result};

/// Linearly growing delay between polling sweeps.
///
/// The n-th call to `next_delay` returns `n * step`, capped at `max` if set.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    step: Duration,
    max: Option<Duration>,
    attempt: u32,
}

impl LinearBackoff {
    /// Create a backoff with the given step.
    pub fn new(step: Duration) -> LinearBackoff {
        LinearBackoff {
            step,
            max: None,
            attempt: 0,
        }
    }

    /// Never wait longer than `max`.
    pub fn with_max(mut self, max: Duration) -> LinearBackoff {
        self.max = Some(max);
        self
    }

    /// Advance and return the next delay.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        let delay = self.step.saturating_mul(self.attempt);
        match self.max {
            Some(max) if delay > max => max,
            _ => delay,
        }
    }

    /// Sleep for the next delay.
    pub async fn wait(&mut self) {
        let delay = self.next_delay();
        trace!("Sleeping {:?} before the next poll", delay);
        sleep(delay).await
    }
}

impl Default for LinearBackoff {
    fn default() -> LinearBackoff {
        LinearBackoff::new(Duration::from_secs(1))
    }
}

/// Resolve with an `Interrupted` error on SIGINT.
///
/// Never resolves if the signal handler cannot be installed.
pub async fn interrupted() -> Error {
    match signal::ctrl_c().await {
        Ok(()) => {
            warn!("Caught SIGINT, tearing down");
            Error::new(ErrorKind::Interrupted, "Interrupted by SIGINT")
        }
        Err(e) => {
            warn!("Cannot listen for SIGINT: {}", e);
            pending().await
        }
    }
}

/// Run a phase under a wall-clock ceiling.
pub async fn with_deadline<F, T>(limit: Duration, phase: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(..) => {
            let minutes = limit.as_secs_f64() / 60.0;
            error!("{} did not finish in {} minutes", phase, minutes);
            Err(Error::new(
                ErrorKind::OperationTimedOut,
                format!("Maximum lifespan greater than {} minutes", minutes),
            ))
        }
    }
}
