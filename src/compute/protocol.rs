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

//! JSON structures and protocol bits for the Compute API.

#![allow(non_snake_case)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::common::protocol::deser_id;
use crate::common::Status;

/// Address type reported for floating IPs.
const FLOATING: &str = "floating";

/// Address of a server.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerAddress {
    /// IP (v4 or v6) address.
    pub addr: IpAddr,
    /// IP version.
    #[serde(default)]
    pub version: Option<u8>,
    /// Address type (if known).
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub addr_type: Option<String>,
}

/// A server as returned by `GET /servers/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
    #[serde(rename = "accessIPv4", default)]
    pub access_ipv4: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerRoot {
    pub server: Server,
}

/// A server as returned by `GET /servers`.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerSummary {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServersRoot {
    pub servers: Vec<ServerSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ServerCreate {
    pub name: String,
    pub imageRef: String,
    pub flavorRef: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ServerCreateRoot {
    pub server: ServerCreate,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedServer {
    pub id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedServerRoot {
    pub server: CreatedServer,
}

/// A flavor or an image.
#[derive(Clone, Debug, Deserialize)]
pub struct IdAndName {
    #[serde(deserialize_with = "deser_id")]
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FlavorsRoot {
    pub flavors: Vec<IdAndName>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ImagesRoot {
    pub images: Vec<IdAndName>,
}

impl Server {
    /// Pick the address to probe the server on.
    ///
    /// Preference: a floating IP, then `accessIPv4`, then the last address on
    /// `network`, then the first address on any network.
    pub fn probe_address(&self, network: &str) -> Option<IpAddr> {
        let mut networks: Vec<_> = self.addresses.iter().collect();
        networks.sort_by(|a, b| a.0.cmp(b.0));

        let floating = networks
            .iter()
            .flat_map(|(_, addrs)| addrs.iter())
            .find(|a| a.addr_type.as_deref() == Some(FLOATING));
        if let Some(found) = floating {
            return Some(found.addr);
        }

        let access = self
            .access_ipv4
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok());
        if access.is_some() {
            return access;
        }

        if let Some(found) = self.addresses.get(network).and_then(|addrs| addrs.last()) {
            return Some(found.addr);
        }

        networks
            .iter()
            .flat_map(|(_, addrs)| addrs.iter())
            .next()
            .map(|a| a.addr)
    }
}

#[cfg(test)]
mod test {
    use std::net::IpAddr;

    use super::{Server, ServerCreate, ServerCreateRoot, ServerRoot};
    use crate::common::Status;

    fn server(body: &str) -> Server {
        serde_json::from_str::<ServerRoot>(body).unwrap().server
    }

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_probe_address_floating() {
        let srv = server(
            r#"{"server": {"id": "1", "name": "nova_test0", "status": "ACTIVE",
                "accessIPv4": "",
                "addresses": {"private": [
                    {"addr": "10.0.0.3", "version": 4, "OS-EXT-IPS:type": "fixed"},
                    {"addr": "172.24.4.10", "version": 4, "OS-EXT-IPS:type": "floating"}
                ]}}}"#,
        );
        assert_eq!(srv.status, Status::Active);
        assert_eq!(srv.probe_address("private"), ip("172.24.4.10"));
    }

    #[test]
    fn test_probe_address_access_ip() {
        let srv = server(
            r#"{"server": {"id": "1", "name": "nova_test0", "status": "ACTIVE",
                "accessIPv4": "203.0.113.7",
                "addresses": {"private": [{"addr": "10.0.0.3"}]}}}"#,
        );
        assert_eq!(srv.probe_address("private"), ip("203.0.113.7"));
    }

    #[test]
    fn test_probe_address_network() {
        let srv = server(
            r#"{"server": {"id": "1", "name": "nova_test0", "status": "BUILD",
                "addresses": {
                    "backend": [{"addr": "192.168.0.2"}],
                    "private": [{"addr": "10.0.0.3"}, {"addr": "15.185.1.2"}]
                }}}"#,
        );
        assert_eq!(srv.probe_address("private"), ip("15.185.1.2"));
        assert_eq!(srv.probe_address("public"), ip("192.168.0.2"));
    }

    #[test]
    fn test_probe_address_none() {
        let srv = server(r#"{"server": {"id": "1", "name": "x", "status": "BUILD"}}"#);
        assert_eq!(srv.probe_address("private"), None);
    }

    #[test]
    fn test_server_create_body() {
        let root = ServerCreateRoot {
            server: ServerCreate {
                name: "nova_test0".into(),
                imageRef: "img".into(),
                flavorRef: "101".into(),
                key_name: None,
            },
        };
        let value = serde_json::to_value(&root).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"server": {"name": "nova_test0", "imageRef": "img", "flavorRef": "101"}})
        );
    }
}
