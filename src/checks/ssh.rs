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

//! Ssh availability of active instances.
//!
//! Every host is probed from its own task. Tasks report through two channels:
//! one for errors and one for successful timings.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use super::super::common::LinearBackoff;
use super::super::report::ReportWriter;
use super::super::timing::Tracker;
use super::super::{Error, ErrorKind, Result};
use super::{Check, CommandRunner};

/// Log into every instance and record how long it took to succeed.
#[derive(Debug, Clone)]
pub struct SshCheck {
    runner: Arc<dyn CommandRunner>,
    user: String,
    attempts: u32,
    step: Duration,
}

#[derive(Debug)]
struct SshTiming {
    ip: IpAddr,
    open: DateTime<Local>,
    close: DateTime<Local>,
}

#[derive(Debug, Clone)]
struct Probe {
    runner: Arc<dyn CommandRunner>,
    user: String,
    attempts: u32,
    step: Duration,
}

impl Probe {
    fn args(&self, ip: IpAddr) -> Vec<String> {
        vec![
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            format!("{}@{}", self.user, ip),
            "/bin/true".to_string(),
        ]
    }

    async fn run(
        self,
        ip: IpAddr,
        results: UnboundedSender<SshTiming>,
        errors: UnboundedSender<Error>,
    ) {
        let open = Local::now();
        let args = self.args(ip);
        let mut backoff = LinearBackoff::new(self.step);
        for attempt in 1..=self.attempts {
            match self.runner.run("ssh", &args).await {
                Ok(true) => {
                    info!("Successful ssh to {}", ip);
                    let _ = results.send(SshTiming {
                        ip,
                        open,
                        close: Local::now(),
                    });
                    return;
                }
                Ok(false) => debug!(
                    "ssh to {} failed, attempt {} of {}",
                    ip, attempt, self.attempts
                ),
                Err(e) => {
                    warn!("Cannot run ssh for {}: {}", ip, e);
                    let _ = errors.send(e);
                }
            }
            if attempt < self.attempts {
                backoff.wait().await;
            }
        }

        error!("Could not ssh to {}", ip);
        let _ = errors.send(Error::new(
            ErrorKind::CheckFailed,
            format!("Could not ssh to {}", ip),
        ));
    }
}

impl SshCheck {
    /// Create an ssh check logging in as `user`.
    pub fn new<S: Into<String>>(runner: Arc<dyn CommandRunner>, user: S) -> SshCheck {
        SshCheck {
            runner,
            user: user.into(),
            attempts: 5,
            step: Duration::from_secs(2),
        }
    }

    /// Change the number of attempts and the backoff step.
    pub fn with_retries(mut self, attempts: u32, step: Duration) -> SshCheck {
        self.attempts = attempts;
        self.step = step;
        self
    }

    fn probe(&self) -> Probe {
        Probe {
            runner: self.runner.clone(),
            user: self.user.clone(),
            attempts: self.attempts,
            step: self.step,
        }
    }
}

#[async_trait]
impl Check for SshCheck {
    fn name(&self) -> &str {
        "ssh"
    }

    async fn run(&self, tracker: &mut Tracker, reports: &ReportWriter) -> Result<()> {
        let addresses = tracker.probe_addresses()?;
        info!("Checking ssh on {} host(s)", addresses.len());

        let (results_tx, mut results_rx) = unbounded_channel();
        let (errors_tx, mut errors_rx) = unbounded_channel();
        let handles: Vec<_> = addresses
            .into_iter()
            .map(|ip| {
                tokio::spawn(
                    self.probe()
                        .run(ip, results_tx.clone(), errors_tx.clone()),
                )
            })
            .collect();
        drop(results_tx);
        drop(errors_tx);

        for handle in handles {
            if let Err(e) = handle.await {
                return Err(Error::new(
                    ErrorKind::OperationFailed,
                    format!("ssh task failed: {}", e),
                ));
            }
        }

        if let Ok(err) = errors_rx.try_recv() {
            error!("At least one ssh probe failed");
            return Err(err);
        }

        while let Ok(timing) = results_rx.try_recv() {
            if let Some(record) = tracker.find_by_ip_mut(timing.ip) {
                record.ssh_open = Some(timing.open);
                record.ssh_close = Some(timing.close);
            }
        }

        let path = reports.write_ssh(tracker)?;
        info!("ssh timings written to {}", path.display());
        Ok(())
    }
}
