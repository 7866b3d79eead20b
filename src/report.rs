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

//! CSV reports with timing results.
//!
//! Duration files consist of two rows: indices `0..n` and the durations in
//! minutes. The lifespan summary has a header row and a single value row.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;

use super::timing::{minutes, DurationStats, Tracker};
use super::Result;

const RESULTS_DIR: &str = "results";
const LIFESPAN_HEADER: [&str; 3] = ["Shortest Lifespan", "Longest Lifespan", "Mean Lifespan"];

/// Writer of CSV reports under an output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    root: PathBuf,
    results_dir: PathBuf,
}

fn write_rows<P, R>(path: P, rows: R) -> Result<()>
where
    P: AsRef<Path>,
    R: IntoIterator<Item = Vec<String>>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    debug!("Wrote {}", path.display());
    Ok(())
}

impl ReportWriter {
    /// Create a writer with lifecycle results going to `<root>/results`.
    pub fn new<P: Into<PathBuf>>(root: P) -> ReportWriter {
        let root = root.into();
        let results_dir = root.join(RESULTS_DIR);
        ReportWriter { root, results_dir }
    }

    /// Put lifecycle results into a different directory relative to the root.
    pub fn with_results_dir<P: AsRef<Path>>(mut self, dir: P) -> ReportWriter {
        self.results_dir = self.root.join(dir);
        self
    }

    /// Directory for lifecycle results.
    #[inline]
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Write a list of durations as indices and minutes.
    pub fn write_durations<P: AsRef<Path>>(&self, path: P, durations: &[Duration]) -> Result<()> {
        let indices: Vec<String> = (0..durations.len()).map(|i| i.to_string()).collect();
        let values: Vec<String> = durations.iter().map(|d| minutes(*d).to_string()).collect();
        write_rows(path, vec![indices, values])
    }

    /// Write the lifespan summary.
    pub fn write_lifespan_summary(&self, stats: Option<&DurationStats>) -> Result<PathBuf> {
        let path = self.results_dir.join("lifespan.csv");
        let mut rows: Vec<Vec<String>> = vec![LIFESPAN_HEADER.iter().map(|s| s.to_string()).collect()];
        match stats {
            Some(stats) => rows.push(vec![
                minutes(stats.min).to_string(),
                minutes(stats.max).to_string(),
                minutes(stats.mean).to_string(),
            ]),
            None => warn!("No lifespan measured, writing an empty summary"),
        }
        write_rows(&path, rows)?;
        Ok(path)
    }

    /// Write creation, deletion and lifespan results of a lifecycle run.
    pub fn write_lifecycle(&self, tracker: &Tracker) -> Result<()> {
        let creation: Vec<_> = tracker.iter().filter_map(|r| r.create_total()).collect();
        self.write_durations(self.results_dir.join("creation.csv"), &creation)?;

        let deletion: Vec<_> = tracker.iter().filter_map(|r| r.delete_total()).collect();
        self.write_durations(self.results_dir.join("deletion.csv"), &deletion)?;

        let stats = DurationStats::from_durations(tracker.iter().filter_map(|r| r.lifespan()));
        let _ = self.write_lifespan_summary(stats.as_ref())?;
        Ok(())
    }

    /// Write ssh availability times.
    pub fn write_ssh(&self, tracker: &Tracker) -> Result<PathBuf> {
        let path = self.root.join("ssh.csv");
        let durations: Vec<_> = tracker.iter().filter_map(|r| r.ssh_total()).collect();
        self.write_durations(&path, &durations)?;
        Ok(path)
    }

    /// Write object upload times of a stress run.
    pub fn write_stress(
        &self,
        name: &str,
        count: usize,
        size: usize,
        durations: &[Duration],
    ) -> Result<PathBuf> {
        let path = self
            .root
            .join(format!("stress-{}-{}-{}-times.csv", name, count, size));
        self.write_durations(&path, durations)?;
        Ok(path)
    }
}
