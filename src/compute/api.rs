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

//! Low-level Compute API calls.

use super::super::common;
use super::super::request;
use super::super::services::COMPUTE;
use super::super::session::Session;
use super::super::Result;
use super::protocol::*;

/// List servers.
pub async fn list_servers(session: &Session) -> Result<Vec<ServerSummary>> {
    trace!("Listing compute servers");
    let root: ServersRoot = session.get_json(COMPUTE, &["servers"]).await?;
    trace!("Received servers: {:?}", root.servers);
    Ok(root.servers)
}

/// Get a server.
pub async fn get_server<S: AsRef<str>>(session: &Session, id: S) -> Result<Server> {
    trace!("Get compute server {}", id.as_ref());
    let root: ServerRoot = session.get_json(COMPUTE, &["servers", id.as_ref()]).await?;
    trace!("Received {:?}", root.server);
    Ok(root.server)
}

/// Create a server, returning its ID.
pub async fn create_server(session: &Session, server: ServerCreate) -> Result<String> {
    debug!("Creating a server with {:?}", server);
    let body = ServerCreateRoot { server };
    let builder = session.post(COMPUTE, &["servers"]).await?.json(&body);
    let root: CreatedServerRoot = request::fetch_json(builder).await?;
    debug!("Requested creation of server {}", root.server.id);
    Ok(root.server.id)
}

/// Delete a server.
pub async fn delete_server<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting server {}", id.as_ref());
    session.delete(COMPUTE, &["servers", id.as_ref()]).await?;
    debug!("Successfully requested deletion of server {}", id.as_ref());
    Ok(())
}

/// List flavors.
pub async fn list_flavors(session: &Session) -> Result<Vec<IdAndName>> {
    trace!("Listing compute flavors");
    let root: FlavorsRoot = session.get_json(COMPUTE, &["flavors"]).await?;
    trace!("Received flavors: {:?}", root.flavors);
    Ok(root.flavors)
}

/// Find a flavor by its name.
pub async fn find_flavor<S: AsRef<str>>(session: &Session, name: S) -> Result<IdAndName> {
    let name = name.as_ref();
    let matching = list_flavors(session)
        .await?
        .into_iter()
        .filter(|f| f.name == name)
        .collect();
    common::one(matching, &format!("flavor named {}", name))
}

/// List images known to the compute service.
pub async fn list_images(session: &Session) -> Result<Vec<IdAndName>> {
    trace!("Listing images");
    let root: ImagesRoot = session.get_json(COMPUTE, &["images"]).await?;
    trace!("Received images: {:?}", root.images);
    Ok(root.images)
}

/// Find an image by its name.
pub async fn find_image<S: AsRef<str>>(session: &Session, name: S) -> Result<IdAndName> {
    let name = name.as_ref();
    let matching = list_images(session)
        .await?
        .into_iter()
        .filter(|i| i.name == name)
        .collect();
    common::one(matching, &format!("image named {}", name))
}
