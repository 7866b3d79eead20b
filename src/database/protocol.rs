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

//! JSON structures and protocol bits for the Database API.

#![allow(non_snake_case)]
#![allow(missing_docs)]

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::common::protocol::deser_id;
use crate::common::Status;

/// A database instance.
#[derive(Clone, Debug, Deserialize)]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct InstanceRoot {
    pub instance: Instance,
}

#[derive(Clone, Debug, Deserialize)]
pub struct InstancesRoot {
    pub instances: Vec<Instance>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Volume {
    pub size: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct InstanceCreate {
    pub name: String,
    pub flavorRef: String,
    pub volume: Volume,
}

#[derive(Clone, Debug, Serialize)]
pub struct InstanceCreateRoot {
    pub instance: InstanceCreate,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedInstance {
    pub id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedInstanceRoot {
    pub instance: CreatedInstance,
}

/// A database flavor.
#[derive(Clone, Debug, Deserialize)]
pub struct Flavor {
    #[serde(deserialize_with = "deser_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ram: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FlavorsRoot {
    pub flavors: Vec<Flavor>,
}

impl Instance {
    /// First valid IP address of the instance, if reported.
    pub fn address(&self) -> Option<IpAddr> {
        self.ip.iter().find_map(|ip| ip.parse().ok())
    }
}

#[cfg(test)]
mod test {
    use super::{FlavorsRoot, InstanceRoot, InstancesRoot};

    #[test]
    fn test_instance() {
        let root: InstanceRoot = serde_json::from_str(
            r#"{"instance": {"id": "dbid", "name": "db_test0", "status": "BUILD",
                "ip": ["not-an-ip", "10.1.2.3"], "volume": {"size": 2}}}"#,
        )
        .unwrap();
        assert!(!root.instance.status.is_active());
        assert_eq!(root.instance.address(), Some("10.1.2.3".parse().unwrap()));
    }

    #[test]
    fn test_instances_minimal() {
        let root: InstancesRoot = serde_json::from_str(
            r#"{"instances": [{"id": "a", "name": "x", "status": "FAILED"}]}"#,
        )
        .unwrap();
        assert!(root.instances[0].status.is_error());
        assert_eq!(root.instances[0].address(), None);
    }

    #[test]
    fn test_flavors() {
        let root: FlavorsRoot = serde_json::from_str(
            r#"{"flavors": [{"id": 1, "name": "m1.tiny", "ram": 512},
                            {"id": "7", "name": "medium"}]}"#,
        )
        .unwrap();
        assert_eq!(root.flavors[0].id, "1");
        assert_eq!(root.flavors[1].id, "7");
        assert_eq!(root.flavors[1].ram, None);
    }
}
