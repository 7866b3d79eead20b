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

//! Cloud configuration from the environment or `clouds.yaml`.

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;

use super::identity::{EndpointFilters, IdentityVersion, InterfaceType, Password};
use super::services::{DATABASE, OBJECT_STORAGE};
use super::session::Session;
use super::{Error, ErrorKind, Result};

const DEFAULT_DOMAIN: &str = "Default";

/// Connection settings for a cloud.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Identity service URL.
    pub auth_url: String,
    /// User name.
    pub username: String,
    /// User password.
    pub password: String,
    /// Tenant (V2.0) or project (V3) name.
    pub project_name: String,
    /// Domain of the user (V3 only).
    pub user_domain_name: String,
    /// Domain of the project (V3 only).
    pub project_domain_name: String,
    /// Identity API version, detected from the URL if not set.
    pub identity_version: Option<IdentityVersion>,
    /// Region to pick endpoints from.
    pub region_name: Option<String>,
    /// Endpoint interface to use.
    pub interface: Option<InterfaceType>,
    /// Key pair to inject into compute instances.
    pub keypair: Option<String>,
    /// Object storage URL overriding the catalog.
    pub object_url: Option<Url>,
    /// Database service URL overriding the catalog.
    pub database_url: Option<Url>,
}

#[derive(Debug, Clone, Deserialize)]
struct CloudAuth {
    auth_url: String,
    username: String,
    password: String,
    #[serde(default)]
    project_name: Option<String>,
    #[serde(default)]
    tenant_name: Option<String>,
    #[serde(default)]
    user_domain_name: Option<String>,
    #[serde(default)]
    project_domain_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Cloud {
    auth: CloudAuth,
    #[serde(default)]
    region_name: Option<String>,
    #[serde(default)]
    interface: Option<String>,
    #[serde(default, deserialize_with = "crate::common::protocol::deser_opt_id")]
    identity_api_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Root {
    clouds: HashMap<String, Cloud>,
}

// Passwords must not end up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("project_name", &self.project_name)
            .field("user_domain_name", &self.user_domain_name)
            .field("project_domain_name", &self.project_domain_name)
            .field("identity_version", &self.identity_version)
            .field("region_name", &self.region_name)
            .field("interface", &self.interface)
            .field("keypair", &self.keypair)
            .field("object_url", &self.object_url)
            .field("database_url", &self.database_url)
            .finish()
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Environment variable {} is not set", name),
        )
    })
}

fn parse_url(value: &str, name: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Invalid URL {} in {}: {}", value, name, e),
        )
    })
}

fn find_config() -> Option<PathBuf> {
    let current = Path::new("./clouds.yaml");
    if current.is_file() {
        match current.canonicalize() {
            Ok(val) => return Some(val),
            Err(e) => warn!("Cannot canonicalize {:?}: {}", current, e),
        }
    }

    match env::var_os("HOME") {
        Some(home) => {
            let path = PathBuf::from(home).join(".config/openstack/clouds.yaml");
            if path.is_file() {
                return Some(path);
            }
        }
        None => warn!("Cannot find home directory"),
    }

    let abs = PathBuf::from("/etc/openstack/clouds.yaml");
    if abs.is_file() {
        Some(abs)
    } else {
        None
    }
}

impl Config {
    /// Read the configuration from `OS_*` environment variables.
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|name| env::var(name).ok().filter(|v| !v.is_empty()))
    }

    /// Read the configuration using a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_name = lookup("OS_TENANT_NAME")
            .or_else(|| lookup("OS_PROJECT_NAME"))
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidConfig,
                    "Environment variable OS_TENANT_NAME (or OS_PROJECT_NAME) is not set",
                )
            })?;

        let config = Config {
            auth_url: required(&lookup, "OS_AUTH_URL")?,
            username: required(&lookup, "OS_USERNAME")?,
            password: required(&lookup, "OS_PASSWORD")?,
            project_name,
            user_domain_name: lookup("OS_USER_DOMAIN_NAME")
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            project_domain_name: lookup("OS_PROJECT_DOMAIN_NAME")
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            identity_version: lookup("OS_IDENTITY_API_VERSION")
                .map(|v| v.parse())
                .transpose()?,
            region_name: lookup("OS_REGION_NAME"),
            interface: lookup("OS_INTERFACE").map(|v| v.parse()).transpose()?,
            keypair: None,
            object_url: None,
            database_url: None,
        };
        config.with_extras(&lookup)
    }

    /// Read the configuration of the named cloud from `clouds.yaml`.
    ///
    /// The key pair and the endpoint overrides still come from the environment.
    pub fn from_cloud<S: AsRef<str>>(cloud_name: S) -> Result<Config> {
        let path = find_config().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidConfig,
                "clouds.yaml was not found in any location",
            )
        })?;
        debug!("Using cloud configuration from {}", path.display());
        let file = File::open(&path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot read {}: {}", path.display(), e),
            )
        })?;
        Config::from_reader(file, cloud_name.as_ref())?
            .with_extras(&|name: &str| env::var(name).ok().filter(|v| !v.is_empty()))
    }

    /// Parse the named cloud from a `clouds.yaml` document.
    pub fn from_reader<R: Read>(reader: R, cloud_name: &str) -> Result<Config> {
        let mut root: Root = serde_yaml::from_reader(reader).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot parse clouds.yaml: {}", e),
            )
        })?;
        let cloud = root.clouds.remove(cloud_name).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("No such cloud: {}", cloud_name),
            )
        })?;

        let auth = cloud.auth;
        let project_name = auth
            .project_name
            .or(auth.tenant_name)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidConfig,
                    format!("Cloud {} has neither project_name nor tenant_name", cloud_name),
                )
            })?;

        Ok(Config {
            auth_url: auth.auth_url,
            username: auth.username,
            password: auth.password,
            project_name,
            user_domain_name: auth
                .user_domain_name
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            project_domain_name: auth
                .project_domain_name
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            identity_version: cloud
                .identity_api_version
                .map(|v| v.parse())
                .transpose()?,
            region_name: cloud.region_name,
            interface: cloud.interface.map(|v| v.parse()).transpose()?,
            keypair: None,
            object_url: None,
            database_url: None,
        })
    }

    fn with_extras<F>(mut self, lookup: &F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.keypair = lookup("OS_KEYPAIR");
        self.object_url = lookup("OS_OBJECT_URL")
            .map(|v| parse_url(&v, "OS_OBJECT_URL"))
            .transpose()?;
        self.database_url = lookup("OS_DB_URL")
            .map(|v| parse_url(&v, "OS_DB_URL"))
            .transpose()?;
        Ok(self)
    }

    /// Identity API version to use.
    pub fn identity_version(&self) -> IdentityVersion {
        self.identity_version
            .unwrap_or_else(|| IdentityVersion::detect(&self.auth_url))
    }

    /// Endpoint filters derived from the region and interface.
    pub fn endpoint_filters(&self) -> EndpointFilters {
        let mut filters = EndpointFilters::default();
        if let Some(interface) = self.interface {
            filters = filters.with_interfaces(vec![interface]);
        }
        if let Some(ref region) = self.region_name {
            filters = filters.with_region(region.clone());
        }
        filters
    }

    /// Build the password authentication.
    pub fn authentication(&self) -> Result<Password> {
        Ok(match self.identity_version() {
            IdentityVersion::V2 => Password::new_v2(
                &self.auth_url,
                &self.username,
                &self.password,
                Some(self.project_name.clone()),
            )?,
            IdentityVersion::V3 => Password::new_v3(
                &self.auth_url,
                &self.username,
                &self.password,
                &self.user_domain_name,
            )?
            .with_project_scope(&self.project_name, &self.project_domain_name),
        })
    }

    /// Authenticate and create a session with the endpoint overrides applied.
    pub async fn session(&self) -> Result<Session> {
        let mut session = Session::new(self.authentication()?, self.endpoint_filters()).await?;
        if let Some(ref url) = self.object_url {
            session.set_endpoint_override(OBJECT_STORAGE, url.clone());
        }
        if let Some(ref url) = self.database_url {
            session.set_endpoint_override(DATABASE, url.clone());
        }
        Ok(session)
    }
}
