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

//! Pause before the network checks.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::super::report::ReportWriter;
use super::super::timing::Tracker;
use super::super::Result;
use super::Check;

/// Sleep for a fixed time.
#[derive(Debug, Clone)]
pub struct SleepCheck {
    duration: Duration,
}

impl SleepCheck {
    /// Create a sleep check.
    pub fn new(duration: Duration) -> SleepCheck {
        SleepCheck { duration }
    }
}

#[async_trait]
impl Check for SleepCheck {
    fn name(&self) -> &str {
        "sleep"
    }

    async fn run(&self, _tracker: &mut Tracker, _reports: &ReportWriter) -> Result<()> {
        info!("Sleeping for {:?}", self.duration);
        sleep(self.duration).await;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use super::SleepCheck;
    use crate::checks::Check;
    use crate::report::ReportWriter;
    use crate::timing::Tracker;

    #[tokio::test]
    async fn test_sleep() {
        let check = SleepCheck::new(Duration::from_millis(20));
        let started = Instant::now();
        check
            .run(&mut Tracker::new(), &ReportWriter::new("."))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
