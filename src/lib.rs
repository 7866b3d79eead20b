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

//! Lifecycle and timing checks for OpenStack clouds.
//!
//! Every check authenticates against the cloud, creates a batch of
//! resources, waits for them to become usable, runs sanity checks against
//! them and deletes them again, recording how long each step took.
//!
//! # Features
//!
//! * [Compute](compute/index.html) servers with [ping and ssh
//!   checks](checks/index.html)
//! * [Object storage](object_storage/index.html) API exercise and
//!   [upload stress test](storage_test/index.html)
//! * [Database](database/index.html) instances
//!
//! Timings are written as CSV files by the [report](report/index.html)
//! module.
//!
//! # Usage
//!
//! ```rust,no_run
//! use service_test::compute::ComputeService;
//! use service_test::lifecycle::{LifecycleSettings, LifecycleTest};
//! use service_test::report::ReportWriter;
//!
//! # async fn run() -> service_test::Result<()> {
//! let session = service_test::Config::from_env()?.session().await?;
//! let service = ComputeService::from_names(
//!     session,
//!     service_test::compute::DEFAULT_IMAGE,
//!     service_test::compute::DEFAULT_FLAVOR,
//! )
//! .await?;
//! let mut test = LifecycleTest::new(
//!     service,
//!     LifecycleSettings::default(),
//!     ReportWriter::new("."),
//! );
//! test.run().await
//! # }
//! ```

#![crate_name = "service_test"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
#![deny(
    improper_ctypes,
    missing_debug_implementations,
    missing_docs,
    no_mangle_generic_items,
    non_shorthand_field_patterns,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unsafe_code,
    unused_allocation,
    unused_comparisons,
    unused_import_braces,
    unused_parens,
    while_true
)]
#![warn(unused_results)]
#![allow(clippy::new_ret_no_self)]

#[macro_use]
extern crate log;

pub mod checks;
pub mod common;
pub mod compute;
mod config;
pub mod database;
mod error;
pub mod identity;
pub mod lifecycle;
pub mod object_storage;
pub mod report;
mod request;
pub mod services;
pub mod session;
pub mod timing;

pub use crate::config::Config;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::identity::{EndpointFilters, InterfaceType};
pub use crate::session::Session;
