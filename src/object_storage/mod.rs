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

//! Object storage (Swift) support.

use super::session::Session;
use super::Result;

mod api;
mod protocol;

pub use self::protocol::{normalize_etag, Account, Container, Object};

/// Object storage of the current account.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    session: Session,
}

impl ObjectStorage {
    /// Create a wrapper around the session.
    pub fn new(session: Session) -> ObjectStorage {
        ObjectStorage { session }
    }

    /// Account statistics.
    pub async fn account(&self) -> Result<Account> {
        api::get_account(&self.session).await
    }

    /// List all containers.
    pub async fn containers(&self) -> Result<Vec<Container>> {
        api::list_containers(&self.session).await
    }

    /// List all objects in a container.
    pub async fn objects<C: AsRef<str>>(&self, container: C) -> Result<Vec<Object>> {
        api::list_objects(&self.session, container).await
    }

    /// Create a container, returning `false` if it already existed.
    pub async fn create_container<C: AsRef<str>>(&self, container: C) -> Result<bool> {
        api::create_container(&self.session, container).await
    }

    /// Get container metadata.
    pub async fn get_container<C: AsRef<str>>(&self, container: C) -> Result<Container> {
        api::get_container(&self.session, container).await
    }

    /// Delete an empty container.
    pub async fn delete_container<C: AsRef<str>>(&self, container: C) -> Result<()> {
        api::delete_container(&self.session, container).await
    }

    /// Upload an object, returning its ETag.
    pub async fn create_object<C, O>(&self, container: C, object: O, body: Vec<u8>) -> Result<String>
    where
        C: AsRef<str>,
        O: AsRef<str>,
    {
        api::create_object(&self.session, container, object, body).await
    }

    /// Get object metadata.
    pub async fn get_object<C, O>(&self, container: C, object: O) -> Result<Object>
    where
        C: AsRef<str>,
        O: AsRef<str>,
    {
        api::get_object(&self.session, container, object).await
    }

    /// Download an object.
    pub async fn download_object<C, O>(&self, container: C, object: O) -> Result<Vec<u8>>
    where
        C: AsRef<str>,
        O: AsRef<str>,
    {
        api::download_object(&self.session, container, object).await
    }

    /// Delete an object.
    pub async fn delete_object<C, O>(&self, container: C, object: O) -> Result<()>
    where
        C: AsRef<str>,
        O: AsRef<str>,
    {
        api::delete_object(&self.session, container, object).await
    }
}
