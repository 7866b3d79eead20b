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

//! Per-resource timestamps collected during a run.

use std::net::IpAddr;

use chrono::{DateTime, Duration, Local};

use super::{Error, ErrorKind, Result};

/// Timestamps and transient attributes of one tracked resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Resource ID.
    pub id: String,
    /// Resource name.
    pub name: String,
    /// When the create request was sent.
    pub create_start: Option<DateTime<Local>>,
    /// When the resource was first seen active.
    pub create_end: Option<DateTime<Local>>,
    /// Start of the delete phase (shared by all resources).
    pub delete_start: Option<DateTime<Local>>,
    /// When the resource was confirmed gone.
    pub delete_end: Option<DateTime<Local>>,
    /// When the ssh check started for this resource.
    pub ssh_open: Option<DateTime<Local>>,
    /// When the resource first accepted an ssh login.
    pub ssh_close: Option<DateTime<Local>>,
    /// Address used by the network checks.
    pub ip: Option<IpAddr>,
    /// Whether the resource reached the active state.
    pub active: bool,
}

/// Resources tracked during a run, in creation order.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    records: Vec<ResourceRecord>,
}

/// Shortest, longest and mean of a set of durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationStats {
    /// Shortest duration.
    pub min: Duration,
    /// Longest duration.
    pub max: Duration,
    /// Mean duration.
    pub mean: Duration,
}

fn elapsed(start: Option<DateTime<Local>>, end: Option<DateTime<Local>>) -> Option<Duration> {
    Some(end?.signed_duration_since(start?))
}

impl ResourceRecord {
    /// Start tracking a resource.
    pub fn new<S1, S2>(id: S1, name: S2) -> ResourceRecord
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        ResourceRecord {
            id: id.into(),
            name: name.into(),
            create_start: None,
            create_end: None,
            delete_start: None,
            delete_end: None,
            ssh_open: None,
            ssh_close: None,
            ip: None,
            active: false,
        }
    }

    /// Time from the create request to the active state.
    pub fn create_total(&self) -> Option<Duration> {
        elapsed(self.create_start, self.create_end)
    }

    /// Time from the start of the delete phase to the resource being gone.
    pub fn delete_total(&self) -> Option<Duration> {
        elapsed(self.delete_start, self.delete_end)
    }

    /// Creation plus deletion time.
    pub fn lifespan(&self) -> Option<Duration> {
        Some(self.create_total()? + self.delete_total()?)
    }

    /// Time until ssh became available.
    pub fn ssh_total(&self) -> Option<Duration> {
        elapsed(self.ssh_open, self.ssh_close)
    }
}

impl Tracker {
    /// Create an empty tracker.
    pub fn new() -> Tracker {
        Tracker::default()
    }

    /// Start tracking a record, replacing any record with the same ID.
    pub fn insert(&mut self, record: ResourceRecord) {
        match self.get_mut(&record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Get a record by resource ID.
    pub fn get(&self, id: &str) -> Option<&ResourceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Get a mutable record by resource ID.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ResourceRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Get a mutable record by its probe address.
    pub fn find_by_ip_mut(&mut self, ip: IpAddr) -> Option<&mut ResourceRecord> {
        self.records.iter_mut().find(|r| r.ip == Some(ip))
    }

    /// Iterate over records in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter()
    }

    /// Probe addresses of active resources.
    ///
    /// Fails with `CheckFailed` if an active resource has no address, since
    /// it cannot be probed at all.
    pub fn probe_addresses(&self) -> Result<Vec<IpAddr>> {
        let missing: Vec<&str> = self
            .records
            .iter()
            .filter(|r| r.active && r.ip.is_none())
            .map(|r| r.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(Error::new(
                ErrorKind::CheckFailed,
                format!("No address to probe for: {}", missing.join(", ")),
            ));
        }

        Ok(self
            .records
            .iter()
            .filter(|r| r.active)
            .filter_map(|r| r.ip)
            .collect())
    }

    /// Number of tracked resources.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stamp the start of the delete phase on every record.
    pub fn mark_delete_start(&mut self, when: DateTime<Local>) {
        for record in &mut self.records {
            record.delete_start = Some(when);
        }
    }
}

impl DurationStats {
    /// Compute statistics, `None` if there are no durations.
    pub fn from_durations<I>(durations: I) -> Option<DurationStats>
    where
        I: IntoIterator<Item = Duration>,
    {
        let mut iter = durations.into_iter();
        let first = iter.next()?;
        let (min, max, total, count) = iter.fold(
            (first, first, first, 1i32),
            |(min, max, total, count), item| {
                (min.min(item), max.max(item), total + item, count + 1)
            },
        );
        Some(DurationStats {
            min,
            max,
            mean: total / count,
        })
    }
}

/// Convert a duration to fractional minutes at millisecond precision.
pub fn minutes(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 60_000.0
}
