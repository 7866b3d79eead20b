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

//! Generic create/poll/check/delete runner.
//!
//! A run goes through the following phases:
//!
//! 1. cleanup: resources left over from a previous run fail the run (and are
//!    deleted during the teardown);
//! 2. create: `count` resources are requested and polled until active;
//! 3. checks: every registered check runs against the active resources;
//! 4. delete: all resources are deleted and polled until gone;
//! 5. results: timings are logged and written as CSV.
//!
//! Creation and deletion run under a deadline, the whole run races SIGINT.
//! Any failure deletes every tracked resource before returning.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use tokio::time::sleep;

use super::checks::Check;
use super::common::{interrupted, with_deadline, LinearBackoff, Status};
use super::report::ReportWriter;
use super::timing::{minutes, DurationStats, ResourceRecord, Tracker};
use super::{Error, ErrorKind, Result};

/// A resource as seen in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSummary {
    /// Resource ID.
    pub id: String,
    /// Resource name.
    pub name: String,
}

/// Current state of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStatus {
    /// Status classification.
    pub status: Status,
    /// Address to probe the resource on, if any.
    pub address: Option<IpAddr>,
}

/// A service whose resources can be created, polled and deleted.
#[async_trait]
pub trait LifecycleService: Send + Sync {
    /// Human-readable kind of resources, e.g. "server".
    fn kind(&self) -> &'static str;

    /// List existing resources.
    async fn list(&self) -> Result<Vec<ResourceSummary>>;

    /// Request creation of a resource, returning its ID.
    async fn create(&self, name: &str) -> Result<String>;

    /// Get the current state of a resource.
    ///
    /// Must fail with `ResourceNotFound` once the resource is gone.
    async fn status(&self, id: &str) -> Result<ResourceStatus>;

    /// Request deletion of a resource.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Settings of a lifecycle run.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Resources are named `<name_prefix><index>`.
    pub name_prefix: String,
    /// Number of resources to create.
    pub count: usize,
    /// Deadline for the create and the delete phases (each).
    pub timeout: Duration,
    /// Step of the linear backoff between polling sweeps.
    pub poll_interval: Duration,
    /// Upper bound on the delay between polling sweeps.
    pub max_poll_interval: Option<Duration>,
    /// Pause between create requests.
    pub create_spacing: Duration,
}

impl Default for LifecycleSettings {
    fn default() -> LifecycleSettings {
        LifecycleSettings {
            name_prefix: String::from("nova_test"),
            count: 20,
            timeout: Duration::from_secs(20 * 60),
            poll_interval: Duration::from_secs(1),
            max_poll_interval: None,
            create_spacing: Duration::from_secs(1),
        }
    }
}

impl LifecycleSettings {
    fn backoff(&self) -> LinearBackoff {
        let backoff = LinearBackoff::new(self.poll_interval);
        match self.max_poll_interval {
            Some(max) => backoff.with_max(max),
            None => backoff,
        }
    }
}

/// Lifecycle runner for a service.
pub struct LifecycleTest<S> {
    service: S,
    settings: LifecycleSettings,
    checks: Vec<Box<dyn Check>>,
    reports: ReportWriter,
    tracker: Tracker,
}

impl<S: LifecycleService> fmt::Debug for LifecycleTest<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LifecycleTest")
            .field("kind", &self.service.kind())
            .field("settings", &self.settings)
            .field(
                "checks",
                &self.checks.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("reports", &self.reports)
            .field("tracker", &self.tracker)
            .finish()
    }
}

impl<S: LifecycleService> LifecycleTest<S> {
    /// Create a runner without checks.
    pub fn new(service: S, settings: LifecycleSettings, reports: ReportWriter) -> LifecycleTest<S> {
        LifecycleTest {
            service,
            settings,
            checks: Vec::new(),
            reports,
            tracker: Tracker::new(),
        }
    }

    /// Run these checks between creation and deletion.
    pub fn with_checks(mut self, checks: Vec<Box<dyn Check>>) -> LifecycleTest<S> {
        self.checks = checks;
        self
    }

    /// Resources tracked so far.
    #[inline]
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Track resources left over from a previous run.
    ///
    /// Fails with `Conflict` if any are found, so that the teardown removes them.
    pub async fn cleanup(&mut self) -> Result<()> {
        let prefix = &self.settings.name_prefix;
        let leftovers: Vec<_> = self
            .service
            .list()
            .await?
            .into_iter()
            .filter(|r| r.name.starts_with(prefix.as_str()))
            .collect();
        if leftovers.is_empty() {
            return Ok(());
        }

        for item in &leftovers {
            warn!(
                "Detected {} {} ({}) from another run",
                self.service.kind(),
                item.id,
                item.name
            );
            self.tracker
                .insert(ResourceRecord::new(item.id.clone(), item.name.clone()));
        }
        Err(Error::new(
            ErrorKind::Conflict,
            format!(
                "{} {}(s) named {}* left from a previous run",
                leftovers.len(),
                self.service.kind(),
                prefix
            ),
        ))
    }

    /// Create the resources and wait for them to become active.
    pub async fn create(&mut self) -> Result<()> {
        let kind = self.service.kind();
        for index in 0..self.settings.count {
            let name = format!("{}{}", self.settings.name_prefix, index);
            let started = Local::now();
            let id = self.service.create(&name).await?;
            info!("Creating {} {} ({})", kind, id, name);
            let mut record = ResourceRecord::new(id, name);
            record.create_start = Some(started);
            self.tracker.insert(record);
            if index + 1 < self.settings.count {
                sleep(self.settings.create_spacing).await;
            }
        }

        let mut pending: Vec<String> = self
            .tracker
            .iter()
            .filter(|r| !r.active)
            .map(|r| r.id.clone())
            .collect();
        let mut backoff = self.settings.backoff();
        while !pending.is_empty() {
            let mut waiting = Vec::with_capacity(pending.len());
            for id in pending {
                let state = match self.service.status(&id).await {
                    Ok(state) => state,
                    Err(e) if e.kind() == ErrorKind::RateLimited => {
                        warn!("Rate limited while polling {} {}, will retry", kind, id);
                        waiting.push(id);
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                match state.status {
                    Status::Active => {
                        if let Some(record) = self.tracker.get_mut(&id) {
                            record.create_end = Some(Local::now());
                            record.active = true;
                            record.ip = state.address;
                        }
                        info!("{} {} created", kind, id);
                    }
                    Status::Building(..) => waiting.push(id),
                    Status::Error(status) => {
                        error!("{} {} status: {}", kind, id, status);
                        return Err(Error::new(
                            ErrorKind::OperationFailed,
                            format!("{} {} entered status {}", kind, id, status),
                        ));
                    }
                    Status::Other(status) => {
                        warn!("{} {} status: {}", kind, id, status);
                        waiting.push(id);
                    }
                }
            }

            pending = waiting;
            if !pending.is_empty() {
                backoff.wait().await;
            }
        }

        Ok(())
    }

    /// Run the registered checks in order.
    pub async fn run_checks(&mut self) -> Result<()> {
        for check in &self.checks {
            info!("Running check {}", check.name());
            if let Err(e) = check.run(&mut self.tracker, &self.reports).await {
                error!("Check {} failed: {}", check.name(), e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Delete the resources and wait for them to disappear.
    pub async fn delete(&mut self) -> Result<()> {
        let kind = self.service.kind();
        info!("Waiting for {}s to die", kind);
        self.tracker.mark_delete_start(Local::now());
        self.delete_all().await?;

        let mut backoff = self.settings.backoff();
        loop {
            let alive: Vec<String> = self
                .tracker
                .iter()
                .filter(|r| r.active)
                .map(|r| r.id.clone())
                .collect();
            if alive.is_empty() {
                break;
            }

            for id in alive {
                match self.service.status(&id).await {
                    Ok(state) if state.status.is_error() => {
                        error!("{} {} has entered an error state", kind, id);
                        return Err(Error::new(
                            ErrorKind::OperationFailed,
                            format!("{} {} entered status {} on deletion", kind, id, state.status),
                        ));
                    }
                    Ok(state) => trace!("{} {} is still {}", kind, id, state.status),
                    Err(e) if e.kind() == ErrorKind::ResourceNotFound => {
                        if let Some(record) = self.tracker.get_mut(&id) {
                            record.delete_end = Some(Local::now());
                            record.active = false;
                        }
                        info!("{} {} has died", kind, id);
                    }
                    Err(e) if e.kind() == ErrorKind::RateLimited => {
                        warn!("Rate limited while polling {} {}, will retry", kind, id);
                    }
                    Err(e) => return Err(e),
                }
            }

            if self.tracker.iter().any(|r| r.active) {
                backoff.wait().await;
            }
        }

        Ok(())
    }

    /// Log the timings and write the CSV reports.
    pub fn results(&self) -> Result<()> {
        for record in self.tracker.iter() {
            info!(
                "{} {} ({}): create {:?}, delete {:?}, lifespan {:?}",
                self.service.kind(),
                record.id,
                record.name,
                record.create_total().map(minutes),
                record.delete_total().map(minutes),
                record.lifespan().map(minutes)
            );
        }

        match DurationStats::from_durations(self.tracker.iter().filter_map(|r| r.lifespan())) {
            Some(stats) => {
                info!("min lifespan: {} minutes", minutes(stats.min));
                info!("max lifespan: {} minutes", minutes(stats.max));
                info!("mean lifespan: {} minutes", minutes(stats.mean));
            }
            None => warn!("No {} lifespan was measured", self.service.kind()),
        }

        self.reports.write_lifecycle(&self.tracker)?;
        info!(
            "Results written to {}",
            self.reports.results_dir().display()
        );
        Ok(())
    }

    /// Request deletion of every tracked resource.
    ///
    /// Missing resources are skipped, other failures are logged and the first
    /// one is returned after all deletions were attempted.
    pub async fn delete_all(&self) -> Result<()> {
        let mut first_error = None;
        for record in self.tracker.iter() {
            match self.service.delete(&record.id).await {
                Ok(()) => debug!("Requested deletion of {} {}", self.service.kind(), record.id),
                Err(e) if e.kind() == ErrorKind::ResourceNotFound => {
                    debug!("{} {} is already gone", self.service.kind(), record.id)
                }
                Err(e) => {
                    error!(
                        "Failed to delete {} {}: {}",
                        self.service.kind(),
                        record.id,
                        e
                    );
                    let _ = first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Delete everything that is tracked, logging failures.
    pub async fn die_gracefully(&self) {
        if self.tracker.is_empty() {
            return;
        }
        warn!(
            "Deleting {} tracked {}(s)",
            self.tracker.len(),
            self.service.kind()
        );
        if let Err(e) = self.delete_all().await {
            error!("Teardown was incomplete: {}", e);
        }
    }

    async fn run_phases(&mut self) -> Result<()> {
        self.cleanup().await?;
        let timeout = self.settings.timeout;
        with_deadline(timeout, "create", self.create()).await?;
        self.run_checks().await?;
        with_deadline(timeout, "delete", self.delete()).await?;
        self.results()
    }

    /// Run all phases, tearing down on failure or SIGINT.
    pub async fn run(&mut self) -> Result<()> {
        let result = tokio::select! {
            result = self.run_phases() => result,
            err = interrupted() => Err(err),
        };

        if let Err(ref e) = result {
            error!("{} lifecycle failed: {}", self.service.kind(), e);
            self.die_gracefully().await;
        }
        result
    }
}
