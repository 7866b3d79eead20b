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

//! ICMP reachability of active instances.

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::time::sleep;

use super::super::report::ReportWriter;
use super::super::timing::Tracker;
use super::super::{Error, ErrorKind, Result};
use super::{Check, CommandRunner};

/// Ping every instance until it answers or the rounds run out.
#[derive(Debug, Clone)]
pub struct PingCheck {
    runner: Arc<dyn CommandRunner>,
    rounds: u32,
    interval: Duration,
}

fn ping_args(ip: IpAddr) -> Vec<String> {
    vec![
        "-q".to_string(),
        "-n".to_string(),
        "-c".to_string(),
        "3".to_string(),
        ip.to_string(),
    ]
}

impl PingCheck {
    /// Create a ping check.
    pub fn new(runner: Arc<dyn CommandRunner>, rounds: u32, interval: Duration) -> PingCheck {
        PingCheck {
            runner,
            rounds,
            interval,
        }
    }

    async fn ping(&self, ip: IpAddr) -> bool {
        match self.runner.run("ping", &ping_args(ip)).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Cannot ping {}: {}", ip, e);
                false
            }
        }
    }
}

#[async_trait]
impl Check for PingCheck {
    fn name(&self) -> &str {
        "ping"
    }

    async fn run(&self, tracker: &mut Tracker, _reports: &ReportWriter) -> Result<()> {
        let addresses = tracker.probe_addresses()?;
        if addresses.is_empty() {
            warn!("No addresses to ping");
            return Ok(());
        }

        let mut reached: HashSet<IpAddr> = HashSet::new();
        for round in 1..=self.rounds {
            let pending: Vec<IpAddr> = addresses
                .iter()
                .filter(|ip| !reached.contains(*ip))
                .copied()
                .collect();

            let results = join_all(pending.iter().map(|ip| self.ping(*ip))).await;
            for (ip, ok) in pending.into_iter().zip(results) {
                if ok {
                    info!("Successful ping: {} (round {})", ip, round);
                    let _ = reached.insert(ip);
                } else {
                    debug!("No reply from {} in round {}", ip, round);
                }
            }

            if reached.len() == addresses.len() {
                return Ok(());
            }
            if round < self.rounds {
                sleep(self.interval).await;
            }
        }

        let failed: Vec<String> = addresses
            .iter()
            .filter(|ip| !reached.contains(*ip))
            .map(|ip| {
                warn!("Could not ping {}", ip);
                ip.to_string()
            })
            .collect();
        Err(Error::new(
            ErrorKind::CheckFailed,
            format!("Could not ping some servers: {}", failed.join(", ")),
        ))
    }
}
