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

//! Sanity checks run against active resources.
//!
//! Checks are registered explicitly by name, see [registry](fn.registry.html).
//! Currently available:
//!
//! * `sleep`: give the instances time to boot;
//! * `ping`: every instance answers ICMP echo;
//! * `ssh`: every instance accepts an ssh login, timings go to `ssh.csv`.

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::report::ReportWriter;
use super::timing::Tracker;
use super::{Error, ErrorKind, Result};

mod ping;
mod sleep;
mod ssh;

pub use self::ping::PingCheck;
pub use self::sleep::SleepCheck;
pub use self::ssh::SshCheck;

/// Checks run when none are requested explicitly, in this order.
pub const DEFAULT_CHECKS: &[&str] = &["sleep", "ping", "ssh"];

/// A check run between creation and deletion.
#[async_trait]
pub trait Check: Send + Sync {
    /// Name used to request the check.
    fn name(&self) -> &str;

    /// Run the check against the tracked resources.
    async fn run(&self, tracker: &mut Tracker, reports: &ReportWriter) -> Result<()>;
}

/// Runner of external commands.
#[async_trait]
pub trait CommandRunner: fmt::Debug + Send + Sync {
    /// Run a command, returning whether it exited successfully.
    async fn run(&self, program: &str, args: &[String]) -> Result<bool>;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<bool> {
        trace!("Running {} {:?}", program, args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;
        if output.status.success() {
            debug!("{}: {}", program, String::from_utf8_lossy(&output.stdout).trim());
            Ok(true)
        } else {
            debug!("{}: {}", program, String::from_utf8_lossy(&output.stdout).trim());
            warn!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Ok(false)
        }
    }
}

/// Settings shared by the checks.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// Pause of the `sleep` check.
    pub sleep: Duration,
    /// Number of ping rounds.
    pub ping_rounds: u32,
    /// Pause between ping rounds.
    pub ping_interval: Duration,
    /// User to log in as.
    pub ssh_user: String,
    /// Number of ssh attempts per host.
    pub ssh_attempts: u32,
    /// Step of the linear backoff between ssh attempts.
    pub ssh_step: Duration,
    /// Runner of `ping` and `ssh`.
    pub runner: Arc<dyn CommandRunner>,
}

impl Default for CheckSettings {
    fn default() -> CheckSettings {
        CheckSettings {
            sleep: Duration::from_secs(5),
            ping_rounds: 19,
            ping_interval: Duration::from_secs(3),
            ssh_user: String::from("root"),
            ssh_attempts: 5,
            ssh_step: Duration::from_secs(2),
            runner: Arc::new(SystemRunner),
        }
    }
}

/// Resolve check names into checks.
///
/// An empty list selects [DEFAULT_CHECKS](constant.DEFAULT_CHECKS.html).
pub fn registry<S: AsRef<str>>(names: &[S], settings: &CheckSettings) -> Result<Vec<Box<dyn Check>>> {
    let names: Vec<&str> = if names.is_empty() {
        DEFAULT_CHECKS.to_vec()
    } else {
        names.iter().map(|name| name.as_ref()).collect()
    };

    names
        .into_iter()
        .map(|name| -> Result<Box<dyn Check>> {
            match name {
                "sleep" => Ok(Box::new(SleepCheck::new(settings.sleep))),
                "ping" => Ok(Box::new(PingCheck::new(
                    settings.runner.clone(),
                    settings.ping_rounds,
                    settings.ping_interval,
                ))),
                "ssh" => Ok(Box::new(
                    SshCheck::new(settings.runner.clone(), settings.ssh_user.clone())
                        .with_retries(settings.ssh_attempts, settings.ssh_step),
                )),
                other => Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!(
                        "Unknown check {}, expected one of {}",
                        other,
                        DEFAULT_CHECKS.join(", ")
                    ),
                )),
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::{HashMap, VecDeque};
    use std::net::IpAddr;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{registry, CheckSettings, CommandRunner};
    use crate::timing::{ResourceRecord, Tracker};
    use crate::ErrorKind;

    /// Runner returning scripted outcomes per IP address.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedRunner {
        outcomes: Mutex<HashMap<IpAddr, VecDeque<bool>>>,
        pub(crate) calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl ScriptedRunner {
        pub(crate) fn script(self, ip: IpAddr, outcomes: &[bool]) -> ScriptedRunner {
            let _ = self
                .outcomes
                .lock()
                .unwrap()
                .insert(ip, outcomes.iter().copied().collect());
            self
        }

        pub(crate) fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(p, _)| p == program)
                .count()
        }
    }

    fn target_ip(args: &[String]) -> Option<IpAddr> {
        args.iter()
            .filter_map(|arg| arg.rsplit('@').next())
            .find_map(|arg| arg.parse().ok())
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, program: &str, args: &[String]) -> crate::Result<bool> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            let ip = match target_ip(args) {
                Some(ip) => ip,
                None => return Ok(false),
            };
            Ok(self
                .outcomes
                .lock()
                .unwrap()
                .get_mut(&ip)
                .and_then(|queue| queue.pop_front())
                .unwrap_or(false))
        }
    }

    pub(crate) fn active_tracker(ips: &[&str]) -> Tracker {
        let mut tracker = Tracker::new();
        for (i, ip) in ips.iter().enumerate() {
            let mut record = ResourceRecord::new(format!("id{}", i), format!("test{}", i));
            record.ip = Some(ip.parse().unwrap());
            record.active = true;
            tracker.insert(record);
        }
        tracker
    }

    /// Like `active_tracker`, plus an active record without an address.
    pub(crate) fn tracker_with_unaddressed(ips: &[&str], name: &str) -> Tracker {
        let mut tracker = active_tracker(ips);
        let mut record = ResourceRecord::new("no-ip", name);
        record.active = true;
        tracker.insert(record);
        tracker
    }

    #[test]
    fn test_registry_default() {
        let checks = registry::<&str>(&[], &CheckSettings::default()).unwrap();
        let names: Vec<_> = checks.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["sleep", "ping", "ssh"]);
    }

    #[test]
    fn test_registry_explicit() {
        let checks = registry(&["ssh", "sleep"], &CheckSettings::default()).unwrap();
        let names: Vec<_> = checks.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["ssh", "sleep"]);
    }

    #[test]
    fn test_registry_unknown() {
        let err = registry(&["sleep", "traceroute"], &CheckSettings::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("traceroute"));
    }
}
