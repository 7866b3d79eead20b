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

//! JSON structures and protocol bits for the Identity V2.0 and V3 APIs.

#![allow(missing_docs)]

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// Identity V2.0 (tenant-scoped tokens).

#[derive(Clone, Serialize)]
pub struct PasswordCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct V2Auth {
    #[serde(rename = "passwordCredentials")]
    pub password_credentials: PasswordCredentials,
    #[serde(rename = "tenantName", skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct V2AuthRoot {
    pub auth: V2Auth,
}

#[derive(Clone, Debug, Deserialize)]
pub struct V2Token {
    pub id: String,
    pub expires: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct V2Endpoint {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(rename = "publicURL", default)]
    pub public_url: Option<String>,
    #[serde(rename = "internalURL", default)]
    pub internal_url: Option<String>,
    #[serde(rename = "adminURL", default)]
    pub admin_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct V2CatalogRecord {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<V2Endpoint>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct V2Access {
    pub token: V2Token,
    #[serde(rename = "serviceCatalog", default)]
    pub service_catalog: Vec<V2CatalogRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct V2AccessRoot {
    pub access: V2Access,
}

// Identity V3 (project-scoped tokens).

#[derive(Clone, Debug, Serialize)]
pub struct Domain {
    pub name: String,
}

#[derive(Clone, Serialize)]
pub struct UserAndPassword {
    pub name: String,
    pub password: String,
    pub domain: Domain,
}

#[derive(Clone, Debug, Serialize)]
pub struct PasswordAuth {
    pub user: UserAndPassword,
}

#[derive(Clone, Debug, Serialize)]
pub struct PasswordIdentity {
    pub methods: Vec<String>,
    pub password: PasswordAuth,
}

#[derive(Clone, Debug, Serialize)]
pub struct Project {
    pub name: String,
    pub domain: Domain,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectScope {
    pub project: Project,
}

#[derive(Clone, Debug, Serialize)]
pub struct V3Auth {
    pub identity: PasswordIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ProjectScope>,
}

#[derive(Clone, Debug, Serialize)]
pub struct V3AuthRoot {
    pub auth: V3Auth,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Endpoint {
    pub interface: String,
    #[serde(default)]
    pub region: Option<String>,
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogRecord {
    #[serde(rename = "type")]
    pub service_type: String,
    pub endpoints: Vec<Endpoint>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct V3Token {
    pub expires_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub catalog: Vec<CatalogRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct V3TokenRoot {
    pub token: V3Token,
}

const PASSWORD_METHOD: &str = "password";

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for UserAndPassword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UserAndPassword")
            .field("name", &self.name)
            .field("password", &"***")
            .field("domain", &self.domain)
            .finish()
    }
}

impl V2AuthRoot {
    pub fn new<S1, S2>(user_name: S1, password: S2, tenant_name: Option<String>) -> V2AuthRoot
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        V2AuthRoot {
            auth: V2Auth {
                password_credentials: PasswordCredentials {
                    username: user_name.into(),
                    password: password.into(),
                },
                tenant_name,
            },
        }
    }
}

impl V3AuthRoot {
    pub fn new<S1, S2, S3>(user_name: S1, password: S2, user_domain: S3) -> V3AuthRoot
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        V3AuthRoot {
            auth: V3Auth {
                identity: PasswordIdentity {
                    methods: vec![String::from(PASSWORD_METHOD)],
                    password: PasswordAuth {
                        user: UserAndPassword {
                            name: user_name.into(),
                            password: password.into(),
                            domain: Domain {
                                name: user_domain.into(),
                            },
                        },
                    },
                },
                scope: None,
            },
        }
    }

    pub fn with_project_scope<S1, S2>(mut self, project_name: S1, project_domain: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        self.auth.scope = Some(ProjectScope {
            project: Project {
                name: project_name.into(),
                domain: Domain {
                    name: project_domain.into(),
                },
            },
        });
        self
    }
}

impl From<V2CatalogRecord> for CatalogRecord {
    fn from(value: V2CatalogRecord) -> CatalogRecord {
        let mut endpoints = Vec::with_capacity(value.endpoints.len() * 3);
        for endp in value.endpoints {
            let candidates = [
                ("public", endp.public_url),
                ("internal", endp.internal_url),
                ("admin", endp.admin_url),
            ];
            for (interface, url) in candidates {
                if let Some(url) = url {
                    endpoints.push(Endpoint {
                        interface: interface.to_string(),
                        region: endp.region.clone(),
                        url,
                    });
                }
            }
        }

        CatalogRecord {
            service_type: value.service_type,
            endpoints,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{CatalogRecord, V2AccessRoot, V2AuthRoot, V3AuthRoot};

    #[test]
    fn test_v2_auth_body() {
        let body = V2AuthRoot::new("admin", "pa$$w0rd", Some("demo".into()));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "auth": {
                    "passwordCredentials": {"username": "admin", "password": "pa$$w0rd"},
                    "tenantName": "demo"
                }
            })
        );
    }

    #[test]
    fn test_v3_auth_body() {
        let body = V3AuthRoot::new("admin", "pa$$w0rd", "Default").with_project_scope("demo", "Default");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["auth"]["identity"]["methods"][0], "password");
        assert_eq!(value["auth"]["identity"]["password"]["user"]["name"], "admin");
        assert_eq!(value["auth"]["scope"]["project"]["name"], "demo");
        assert_eq!(value["auth"]["scope"]["project"]["domain"]["name"], "Default");
    }

    #[test]
    fn test_debug_hides_password() {
        let v2 = format!("{:?}", V2AuthRoot::new("admin", "pa$$w0rd", None));
        assert!(v2.contains("admin"));
        assert!(!v2.contains("pa$$w0rd"));
        let v3 = format!("{:?}", V3AuthRoot::new("admin", "pa$$w0rd", "Default"));
        assert!(!v3.contains("pa$$w0rd"));
    }

    #[test]
    fn test_v2_catalog_normalization() {
        let root: V2AccessRoot = serde_json::from_value(serde_json::json!({
            "access": {
                "token": {"id": "abcdef", "expires": "2013-02-27T18:30:59Z"},
                "serviceCatalog": [{
                    "type": "compute",
                    "name": "Compute",
                    "endpoints": [{
                        "region": "az-1.region-a.geo-1",
                        "publicURL": "https://az-1.compute.example.com/v1.1/12345",
                        "internalURL": "http://10.0.0.1/v1.1/12345"
                    }]
                }]
            }
        }))
        .unwrap();
        assert_eq!(root.access.token.id, "abcdef");

        let record: CatalogRecord = root.access.service_catalog[0].clone().into();
        assert_eq!(record.service_type, "compute");
        assert_eq!(record.endpoints.len(), 2);
        assert_eq!(record.endpoints[0].interface, "public");
        assert_eq!(
            record.endpoints[0].region.as_deref(),
            Some("az-1.region-a.geo-1")
        );
        assert_eq!(record.endpoints[1].interface, "internal");
        assert_eq!(record.endpoints[1].url, "http://10.0.0.1/v1.1/12345");
    }
}
