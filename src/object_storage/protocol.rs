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

//! JSON structures and protocol bits for the object storage API.

#![allow(missing_docs)]

use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::super::common::protocol;
use super::super::{Error, ErrorKind, Result};

/// Account statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub container_count: u64,
    pub object_count: u64,
    pub bytes_used: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub bytes: u64,
    pub name: String,
    #[serde(rename = "count", default)]
    pub object_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Object {
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub content_type: Option<String>,
    pub name: String,
    #[serde(default)]
    pub hash: Option<String>,
}

/// Strip the quotes some proxies add around ETag values.
pub fn normalize_etag(value: &str) -> String {
    value.trim().trim_matches('"').to_lowercase()
}

impl Account {
    pub fn from_headers(value: &HeaderMap) -> Result<Account> {
        Ok(Account {
            container_count: protocol::get_number_header(value, "x-account-container-count")?,
            object_count: protocol::get_number_header(value, "x-account-object-count")?,
            bytes_used: protocol::get_number_header(value, "x-account-bytes-used")?,
        })
    }
}

impl Container {
    pub fn from_headers(name: &str, value: &HeaderMap) -> Result<Container> {
        Ok(Container {
            bytes: protocol::get_number_header(value, "x-container-bytes-used")?,
            name: name.into(),
            object_count: protocol::get_number_header(value, "x-container-object-count")?,
        })
    }
}

impl Object {
    pub fn from_headers(name: &str, value: &HeaderMap) -> Result<Object> {
        let size: u64 = protocol::get_required_header(value, "content-length")?
            .parse()
            .map_err(|e| {
                Error::new(
                    ErrorKind::InvalidResponse,
                    format!("Content-Length is not an integer: {}", e),
                )
            })?;
        let content_type = protocol::get_header(value, "content-type")?.map(From::from);
        let hash = protocol::get_header(value, "etag")?.map(normalize_etag);
        Ok(Object {
            bytes: size,
            content_type,
            name: name.into(),
            hash,
        })
    }
}

#[cfg(test)]
mod test {
    use reqwest::header::{HeaderMap, HeaderValue};

    use super::{normalize_etag, Account, Container, Object};
    use crate::ErrorKind;

    #[test]
    fn test_account_from_headers() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-account-container-count", HeaderValue::from_static("2"));
        let _ = headers.insert("x-account-object-count", HeaderValue::from_static("10"));
        let account = Account::from_headers(&headers).unwrap();
        assert_eq!(account.container_count, 2);
        assert_eq!(account.object_count, 10);
        assert_eq!(account.bytes_used, 0);
    }

    #[test]
    fn test_object_from_headers() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("content-length", HeaderValue::from_static("11"));
        let _ = headers.insert("etag", HeaderValue::from_static("\"5EB63BBBE01EEED093CB22BB8F5ACDC3\""));
        let object = Object::from_headers("hello", &headers).unwrap();
        assert_eq!(object.bytes, 11);
        assert_eq!(object.hash.as_deref(), Some("5eb63bbbe01eeed093cb22bb8f5acdc3"));
        assert_eq!(object.content_type, None);

        let _ = headers.remove("content-length");
        assert_eq!(
            Object::from_headers("hello", &headers).unwrap_err().kind(),
            ErrorKind::InvalidResponse
        );
    }

    #[test]
    fn test_container_listing() {
        let containers: Vec<Container> =
            serde_json::from_str(r#"[{"name": "c1", "count": 3, "bytes": 1024}]"#).unwrap();
        assert_eq!(containers[0].object_count, 3);
        assert_eq!(normalize_etag(" abc "), "abc");
    }
}
