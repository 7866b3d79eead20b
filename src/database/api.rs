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

//! Low-level Database API calls.

use super::super::common;
use super::super::request;
use super::super::services::DATABASE;
use super::super::session::Session;
use super::super::Result;
use super::protocol::*;

/// List database instances.
pub async fn list_instances(session: &Session) -> Result<Vec<Instance>> {
    trace!("Listing database instances");
    let root: InstancesRoot = session.get_json(DATABASE, &["instances"]).await?;
    trace!("Received instances: {:?}", root.instances);
    Ok(root.instances)
}

/// Get a database instance.
pub async fn get_instance<S: AsRef<str>>(session: &Session, id: S) -> Result<Instance> {
    trace!("Get database instance {}", id.as_ref());
    let root: InstanceRoot = session
        .get_json(DATABASE, &["instances", id.as_ref()])
        .await?;
    trace!("Received {:?}", root.instance);
    Ok(root.instance)
}

/// Create a database instance, returning its ID.
pub async fn create_instance(session: &Session, instance: InstanceCreate) -> Result<String> {
    debug!("Creating a database instance with {:?}", instance);
    let body = InstanceCreateRoot { instance };
    let builder = session.post(DATABASE, &["instances"]).await?.json(&body);
    let root: CreatedInstanceRoot = request::fetch_json(builder).await?;
    debug!("Requested creation of database instance {}", root.instance.id);
    Ok(root.instance.id)
}

/// Delete a database instance.
pub async fn delete_instance<S: AsRef<str>>(session: &Session, id: S) -> Result<()> {
    debug!("Deleting database instance {}", id.as_ref());
    session.delete(DATABASE, &["instances", id.as_ref()]).await
}

/// List database flavors.
pub async fn list_flavors(session: &Session) -> Result<Vec<Flavor>> {
    trace!("Listing database flavors");
    let root: FlavorsRoot = session.get_json(DATABASE, &["flavors"]).await?;
    trace!("Received flavors: {:?}", root.flavors);
    Ok(root.flavors)
}

/// Find a database flavor by its name.
pub async fn find_flavor<S: AsRef<str>>(session: &Session, name: S) -> Result<Flavor> {
    let name = name.as_ref();
    let matching = list_flavors(session)
        .await?
        .into_iter()
        .filter(|f| f.name == name)
        .collect();
    common::one(matching, &format!("database flavor named {}", name))
}
