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

//! Foundation bits exposing the object storage API.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::super::common::protocol::get_required_header;
use super::super::request;
use super::super::services::OBJECT_STORAGE;
use super::super::session::{Session, NO_PATH};
use super::super::Result;
use super::protocol::*;

/// Get account statistics.
pub async fn get_account(session: &Session) -> Result<Account> {
    trace!("Requesting account statistics");
    let resp = request::send_checked(session.head(OBJECT_STORAGE, NO_PATH).await?).await?;
    let result = Account::from_headers(resp.headers())?;
    trace!("Received {:?}", result);
    Ok(result)
}

async fn list_paginated<T, F>(session: &Session, path: &[&str], marker_of: F) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> String,
{
    let mut result = Vec::new();
    let mut marker: Option<String> = None;
    loop {
        let mut builder = session
            .get(OBJECT_STORAGE, path)
            .await?
            .query(&[("format", "json")]);
        if let Some(ref m) = marker {
            builder = builder.query(&[("marker", m.as_str())]);
        }
        let page: Vec<T> = request::fetch_json(builder).await?;
        match page.last() {
            Some(last) => marker = Some(marker_of(last)),
            None => break,
        }
        result.extend(page);
    }
    Ok(result)
}

/// List containers for the current account.
pub async fn list_containers(session: &Session) -> Result<Vec<Container>> {
    trace!("Listing containers");
    list_paginated(session, NO_PATH, |c: &Container| c.name.clone()).await
}

/// List objects in a given container.
pub async fn list_objects<C: AsRef<str>>(session: &Session, container: C) -> Result<Vec<Object>> {
    let id = container.as_ref();
    trace!("Listing objects in container {}", id);
    list_paginated(session, &[id], |o: &Object| o.name.clone()).await
}

/// Create a new container.
///
/// Returns `true` if the container was created, `false` if it existed.
pub async fn create_container<C: AsRef<str>>(session: &Session, container: C) -> Result<bool> {
    let c_id = container.as_ref();
    debug!("Creating container {}", c_id);
    let resp = request::send_checked(session.put(OBJECT_STORAGE, &[c_id]).await?).await?;
    let result = resp.status() == StatusCode::CREATED;
    if result {
        debug!("Successfully created container {}", c_id);
    } else {
        debug!("Container {} already exists", c_id);
    }
    Ok(result)
}

/// Get container metadata.
pub async fn get_container<C: AsRef<str>>(session: &Session, container: C) -> Result<Container> {
    let c_id = container.as_ref();
    trace!("Requesting container {}", c_id);
    let resp = request::send_checked(session.head(OBJECT_STORAGE, &[c_id]).await?).await?;
    let result = Container::from_headers(c_id, resp.headers())?;
    trace!("Received {:?}", result);
    Ok(result)
}

/// Delete an empty container.
pub async fn delete_container<C: AsRef<str>>(session: &Session, container: C) -> Result<()> {
    let c_id = container.as_ref();
    debug!("Deleting container {}", c_id);
    session.delete(OBJECT_STORAGE, &[c_id]).await?;
    debug!("Successfully deleted container {}", c_id);
    Ok(())
}

/// Create a new object, returning its ETag.
pub async fn create_object<C, O>(
    session: &Session,
    container: C,
    object: O,
    body: Vec<u8>,
) -> Result<String>
where
    C: AsRef<str>,
    O: AsRef<str>,
{
    let c_id = container.as_ref();
    let o_id = object.as_ref();
    debug!("Creating object {} ({} bytes) in container {}", o_id, body.len(), c_id);
    let resp = request::send_checked(
        session
            .put(OBJECT_STORAGE, &[c_id, o_id])
            .await?
            .body(body),
    )
    .await?;
    let etag = normalize_etag(get_required_header(resp.headers(), "etag")?);
    debug!("Successfully created object {} in container {}", o_id, c_id);
    Ok(etag)
}

/// Get object metadata.
pub async fn get_object<C, O>(session: &Session, container: C, object: O) -> Result<Object>
where
    C: AsRef<str>,
    O: AsRef<str>,
{
    let c_id = container.as_ref();
    let o_id = object.as_ref();
    trace!("Requesting object {} from container {}", o_id, c_id);
    let resp = request::send_checked(session.head(OBJECT_STORAGE, &[c_id, o_id]).await?).await?;
    let result = Object::from_headers(o_id, resp.headers())?;
    trace!("Received {:?}", result);
    Ok(result)
}

/// Download the requested object.
pub async fn download_object<C, O>(session: &Session, container: C, object: O) -> Result<Vec<u8>>
where
    C: AsRef<str>,
    O: AsRef<str>,
{
    let c_id = container.as_ref();
    let o_id = object.as_ref();
    trace!("Downloading object {} from container {}", o_id, c_id);
    let resp = request::send_checked(session.get(OBJECT_STORAGE, &[c_id, o_id]).await?).await?;
    Ok(resp.bytes().await?.to_vec())
}

/// Delete an object.
pub async fn delete_object<C, O>(session: &Session, container: C, object: O) -> Result<()>
where
    C: AsRef<str>,
    O: AsRef<str>,
{
    let c_id = container.as_ref();
    let o_id = object.as_ref();
    debug!("Deleting object {} in container {}", o_id, c_id);
    session.delete(OBJECT_STORAGE, &[c_id, o_id]).await?;
    debug!("Successfully deleted object {} in container {}", o_id, c_id);
    Ok(())
}
