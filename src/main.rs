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

//! Command line entry point.
//!
//! ```bash
//! # Boot 5 servers, run the default checks and write timings to ./results
//! openstack-service-test compute --count 5
//!
//! # Upload 100 objects of 1 MiB
//! openstack-service-test object-storage --enable-stress --stress-count 100 --stress-size 1048576
//!
//! # Only list database instances
//! openstack-service-test database --list-only
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::{error, info, LevelFilter};

use service_test::checks::{self, CheckSettings, SystemRunner};
use service_test::compute::{self, ComputeService};
use service_test::database::{self, DatabaseService};
use service_test::lifecycle::{LifecycleSettings, LifecycleTest};
use service_test::object_storage::ObjectStorage;
use service_test::report::ReportWriter;
use service_test::storage_test::{StorageSettings, StorageTest};
use service_test::{Config, Result, Session};

#[derive(Debug, Parser)]
#[command(name = "openstack-service-test")]
#[command(about = "Lifecycle and timing checks for OpenStack services", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: LevelFilter,

    /// Deadline of the create and delete phases in minutes
    #[arg(
        short,
        long,
        global = true,
        default_value_t = 20,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Cloud from clouds.yaml to use instead of OS_* variables
    #[arg(long, global = true, env = "OS_CLOUD")]
    os_cloud: Option<String>,

    /// Directory to write CSV results to
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,
}

impl Cli {
    fn phase_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.saturating_mul(60))
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Boot servers, check them and delete them
    Compute(ComputeArgs),
    /// Exercise the object storage API and/or stress it with uploads
    ObjectStorage(StorageArgs),
    /// List database instances and run their lifecycle
    Database(DatabaseArgs),
}

#[derive(Debug, Args)]
struct ComputeArgs {
    /// Number of servers
    #[arg(long, env = "NOVA_INSTANCE_COUNT", default_value_t = 20)]
    count: usize,

    /// Prefix of server names
    #[arg(long, env = "NOVA_NAME", default_value = "nova_test")]
    name: String,

    /// Flavor name
    #[arg(long, default_value = compute::DEFAULT_FLAVOR)]
    flavor: String,

    /// Image name
    #[arg(long, default_value = compute::DEFAULT_IMAGE)]
    image: String,

    /// Network to probe servers on when they have no floating IP
    #[arg(long, default_value = compute::DEFAULT_NETWORK)]
    network: String,

    /// User to log in as during the ssh check
    #[arg(long, default_value = "root")]
    ssh_user: String,

    /// Check to run, may be repeated (default: sleep, ping, ssh)
    #[arg(long = "check")]
    checks: Vec<String>,

    /// Do not run any checks
    #[arg(long, conflicts_with = "checks")]
    no_checks: bool,

    /// Step of the polling backoff in seconds
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_secs: u64,
}

#[derive(Debug, Args)]
struct StorageArgs {
    /// Run the API exercise
    #[arg(long)]
    enable_api: bool,

    /// Run the upload stress test
    #[arg(long)]
    enable_stress: bool,

    /// Name of the stress run, used in container and report names
    #[arg(long, default_value = "swift_test")]
    stress_name: String,

    /// Number of objects to upload
    #[arg(long, default_value_t = 10)]
    stress_count: usize,

    /// Size of every object in bytes
    #[arg(long, default_value_t = 1024)]
    stress_size: usize,
}

#[derive(Debug, Args)]
struct DatabaseArgs {
    /// Number of instances
    #[arg(long, default_value_t = 1)]
    count: usize,

    /// Prefix of instance names
    #[arg(long, default_value = "reddwarf_test")]
    name: String,

    /// Flavor name
    #[arg(long, required_unless_present = "list_only")]
    flavor: Option<String>,

    /// Volume size in GiB
    #[arg(long, default_value_t = database::DEFAULT_VOLUME_SIZE)]
    volume_size: u32,

    /// Only list existing instances
    #[arg(long)]
    list_only: bool,
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .format(|buf, record| {
            writeln!(
                buf,
                "{}\t{}\t{}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .parse_default_env()
        .init();
}

async fn run_compute(cli: &Cli, args: &ComputeArgs, config: &Config, session: Session) -> Result<()> {
    let mut service = ComputeService::from_names(session, &args.image, &args.flavor)
        .await?
        .with_network(&args.network);
    if let Some(ref keypair) = config.keypair {
        service = service.with_keypair(keypair);
    }

    let checks = if args.no_checks {
        Vec::new()
    } else {
        let settings = CheckSettings {
            ssh_user: args.ssh_user.clone(),
            runner: Arc::new(SystemRunner),
            ..CheckSettings::default()
        };
        checks::registry(&args.checks, &settings)?
    };

    let settings = LifecycleSettings {
        name_prefix: args.name.clone(),
        count: args.count,
        timeout: cli.phase_timeout(),
        poll_interval: Duration::from_secs(args.poll_interval_secs),
        ..LifecycleSettings::default()
    };
    LifecycleTest::new(service, settings, ReportWriter::new(&cli.output_dir))
        .with_checks(checks)
        .run()
        .await
}

async fn run_storage(cli: &Cli, args: &StorageArgs, session: Session) -> Result<()> {
    let settings = StorageSettings {
        enable_api: args.enable_api,
        enable_stress: args.enable_stress,
        name: args.stress_name.clone(),
        count: args.stress_count,
        size: args.stress_size,
        timeout: cli.phase_timeout(),
    };
    StorageTest::new(
        ObjectStorage::new(session),
        settings,
        ReportWriter::new(&cli.output_dir),
    )
    .run()
    .await
}

async fn run_database(cli: &Cli, args: &DatabaseArgs, session: Session) -> Result<()> {
    let mut service = DatabaseService::new(session).with_volume_size(args.volume_size);
    let _ = service.log_instances().await?;
    if args.list_only {
        return Ok(());
    }
    if let Some(ref flavor) = args.flavor {
        service = service.with_flavor_name(flavor).await?;
    }

    let settings = LifecycleSettings {
        name_prefix: args.name.clone(),
        count: args.count,
        timeout: cli.phase_timeout(),
        ..LifecycleSettings::default()
    };
    let reports = ReportWriter::new(&cli.output_dir).with_results_dir("results/database");
    LifecycleTest::new(service, settings, reports).run().await
}

async fn run(cli: &Cli) -> Result<()> {
    let config = match cli.os_cloud {
        Some(ref cloud) => Config::from_cloud(cloud)?,
        None => Config::from_env()?,
    };
    info!("Connecting to {} as {}", config.auth_url, config.username);
    let session = config.session().await?;

    match cli.command {
        Commands::Compute(ref args) => run_compute(cli, args, &config, session).await,
        Commands::ObjectStorage(ref args) => run_storage(cli, args, session).await,
        Commands::Database(ref args) => run_database(cli, args, session).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(&cli).await {
        Ok(()) => {
            info!("Finished successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
