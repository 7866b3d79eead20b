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

//! Compute (Nova) support.
//!
//! Servers are created from an image and a flavor looked up by name, and are
//! probed on the address picked by
//! [Server::probe_address](struct.Server.html#method.probe_address).

use async_trait::async_trait;

use super::lifecycle::{LifecycleService, ResourceStatus, ResourceSummary};
use super::session::Session;
use super::Result;

mod api;
mod protocol;

pub use self::protocol::{IdAndName, Server, ServerAddress};

/// Flavor used when none is requested.
pub const DEFAULT_FLAVOR: &str = "standard.xsmall";

/// Image used when none is requested.
pub const DEFAULT_IMAGE: &str = "Ubuntu Precise 12.04 LTS Server 64-bit 20121026 (b)";

/// Network whose addresses are probed when no floating IP is present.
pub const DEFAULT_NETWORK: &str = "private";

/// Compute servers as lifecycle resources.
#[derive(Debug, Clone)]
pub struct ComputeService {
    session: Session,
    image_id: String,
    flavor_id: String,
    keypair: Option<String>,
    network: String,
}

impl ComputeService {
    /// Create the service with known image and flavor IDs.
    pub fn new<S1, S2>(session: Session, image_id: S1, flavor_id: S2) -> ComputeService
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        ComputeService {
            session,
            image_id: image_id.into(),
            flavor_id: flavor_id.into(),
            keypair: None,
            network: String::from(DEFAULT_NETWORK),
        }
    }

    /// Create the service looking up the image and the flavor by name.
    pub async fn from_names<S1, S2>(session: Session, image: S1, flavor: S2) -> Result<ComputeService>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let flavor = api::find_flavor(&session, flavor).await?;
        info!("Using flavor {} ({})", flavor.name, flavor.id);
        let image = api::find_image(&session, image).await?;
        info!("Using image {} ({})", image.name, image.id);
        Ok(ComputeService::new(session, image.id, flavor.id))
    }

    /// Inject this key pair into new servers.
    pub fn with_keypair<S: Into<String>>(mut self, keypair: S) -> ComputeService {
        self.keypair = Some(keypair.into());
        self
    }

    /// Probe servers on this network when they have no floating IP.
    pub fn with_network<S: Into<String>>(mut self, network: S) -> ComputeService {
        self.network = network.into();
        self
    }

    /// Get a server.
    pub async fn get_server<S: AsRef<str>>(&self, id: S) -> Result<Server> {
        api::get_server(&self.session, id).await
    }
}

#[async_trait]
impl LifecycleService for ComputeService {
    fn kind(&self) -> &'static str {
        "server"
    }

    async fn list(&self) -> Result<Vec<ResourceSummary>> {
        Ok(api::list_servers(&self.session)
            .await?
            .into_iter()
            .map(|s| ResourceSummary {
                id: s.id,
                name: s.name,
            })
            .collect())
    }

    async fn create(&self, name: &str) -> Result<String> {
        let request = protocol::ServerCreate {
            name: name.to_string(),
            imageRef: self.image_id.clone(),
            flavorRef: self.flavor_id.clone(),
            key_name: self.keypair.clone(),
        };
        api::create_server(&self.session, request).await
    }

    async fn status(&self, id: &str) -> Result<ResourceStatus> {
        let server = self.get_server(id).await?;
        Ok(ResourceStatus {
            address: server.probe_address(&self.network),
            status: server.status,
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        api::delete_server(&self.session, id).await
    }
}
