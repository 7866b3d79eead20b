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

//! Service catalog and endpoint selection.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use super::protocol;
use crate::{Error, ErrorKind, Result};

/// Endpoint interface type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceType {
    /// Public interface (the default).
    Public,
    /// Internal interface.
    Internal,
    /// Admin interface.
    Admin,
}

/// Filters applied when picking an endpoint from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFilters {
    /// Acceptable interfaces in the order of preference.
    pub interfaces: Vec<InterfaceType>,
    /// Cloud region (any region if `None`).
    pub region: Option<String>,
}

/// Service catalog received with a token.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    inner: Vec<protocol::CatalogRecord>,
}

impl InterfaceType {
    /// Name of the interface as used in the catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceType::Public => "public",
            InterfaceType::Internal => "internal",
            InterfaceType::Admin => "admin",
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterfaceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<InterfaceType> {
        match s.trim_end_matches("URL") {
            "public" => Ok(InterfaceType::Public),
            "internal" => Ok(InterfaceType::Internal),
            "admin" => Ok(InterfaceType::Admin),
            other => Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("Unknown endpoint interface {}", other),
            )),
        }
    }
}

impl Default for EndpointFilters {
    fn default() -> EndpointFilters {
        EndpointFilters {
            interfaces: vec![InterfaceType::Public],
            region: None,
        }
    }
}

impl EndpointFilters {
    /// Replace the list of acceptable interfaces.
    pub fn with_interfaces(mut self, interfaces: Vec<InterfaceType>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Restrict endpoints to the given region.
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    fn rank(&self, endpoint: &protocol::Endpoint) -> Option<usize> {
        if let Some(ref region) = self.region {
            if endpoint.region.as_ref() != Some(region) {
                return None;
            }
        }
        self.interfaces
            .iter()
            .position(|item| item.as_str() == endpoint.interface)
    }
}

impl ServiceCatalog {
    pub(crate) fn new(catalog: Vec<protocol::CatalogRecord>) -> ServiceCatalog {
        ServiceCatalog { inner: catalog }
    }

    /// Find an endpoint in the catalog.
    pub fn find_endpoint(&self, service_type: &str, filters: &EndpointFilters) -> Result<Url> {
        let svc = match self.inner.iter().find(|x| x.service_type == service_type) {
            Some(s) => s,
            None => return Err(Error::new_endpoint_not_found(service_type)),
        };

        let endp = svc
            .endpoints
            .iter()
            .filter_map(|x| filters.rank(x).map(|rank| (rank, x)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, x)| x)
            .ok_or_else(|| Error::new_endpoint_not_found(service_type))?;

        debug!("Received {:?} for {}", endp, service_type);
        Url::parse(&endp.url).map_err(|e| {
            error!(
                "Invalid URL {} received from service catalog for service \
                 '{}', filters {:?}: {}",
                endp.url, service_type, filters, e
            );
            Error::new(
                ErrorKind::InvalidResponse,
                format!("Invalid URL {} for {} - {}", endp.url, service_type, e),
            )
        })
    }
}
