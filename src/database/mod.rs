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

//! Database as a service (Reddwarf/Trove) support.

use async_trait::async_trait;

use super::lifecycle::{LifecycleService, ResourceStatus, ResourceSummary};
use super::session::Session;
use super::{Error, ErrorKind, Result};

mod api;
mod protocol;

pub use self::protocol::{Flavor, Instance};

/// Default size of the instance volume in GiB.
pub const DEFAULT_VOLUME_SIZE: u32 = 1;

/// Database instances as lifecycle resources.
#[derive(Debug, Clone)]
pub struct DatabaseService {
    session: Session,
    flavor_id: Option<String>,
    volume_size: u32,
}

impl DatabaseService {
    /// Create the service without a flavor (enough for listing).
    pub fn new(session: Session) -> DatabaseService {
        DatabaseService {
            session,
            flavor_id: None,
            volume_size: DEFAULT_VOLUME_SIZE,
        }
    }

    /// Use the flavor with this ID for new instances.
    pub fn with_flavor_id<S: Into<String>>(mut self, flavor_id: S) -> DatabaseService {
        self.flavor_id = Some(flavor_id.into());
        self
    }

    /// Look up the flavor by name and use it for new instances.
    pub async fn with_flavor_name<S: AsRef<str>>(self, name: S) -> Result<DatabaseService> {
        let flavor = api::find_flavor(&self.session, name).await?;
        info!("Using database flavor {} ({})", flavor.name, flavor.id);
        Ok(self.with_flavor_id(flavor.id))
    }

    /// Volume size of new instances in GiB.
    pub fn with_volume_size(mut self, size: u32) -> DatabaseService {
        self.volume_size = size;
        self
    }

    /// List all database instances.
    pub async fn instances(&self) -> Result<Vec<Instance>> {
        api::list_instances(&self.session).await
    }

    /// List all database flavors.
    pub async fn flavors(&self) -> Result<Vec<Flavor>> {
        api::list_flavors(&self.session).await
    }

    /// Log all database instances, returning their number.
    pub async fn log_instances(&self) -> Result<usize> {
        let instances = self.instances().await?;
        info!("Found {} database instance(s)", instances.len());
        for instance in &instances {
            info!(
                "Instance {} ({}): {}, host {}",
                instance.id,
                instance.name,
                instance.status,
                instance.hostname.as_deref().unwrap_or("unknown")
            );
        }
        Ok(instances.len())
    }
}

#[async_trait]
impl LifecycleService for DatabaseService {
    fn kind(&self) -> &'static str {
        "database instance"
    }

    async fn list(&self) -> Result<Vec<ResourceSummary>> {
        Ok(self
            .instances()
            .await?
            .into_iter()
            .map(|i| ResourceSummary {
                id: i.id,
                name: i.name,
            })
            .collect())
    }

    async fn create(&self, name: &str) -> Result<String> {
        let flavor_id = self.flavor_id.clone().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidConfig,
                "A flavor is required to create database instances",
            )
        })?;
        let request = protocol::InstanceCreate {
            name: name.to_string(),
            flavorRef: flavor_id,
            volume: protocol::Volume {
                size: self.volume_size,
            },
        };
        api::create_instance(&self.session, request).await
    }

    async fn status(&self, id: &str) -> Result<ResourceStatus> {
        let instance = api::get_instance(&self.session, id).await?;
        Ok(ResourceStatus {
            address: instance.address(),
            status: instance.status,
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        api::delete_instance(&self.session, id).await
    }
}
