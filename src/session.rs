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

//! Session structure definition.
//!
//! The Session object serves as a wrapper around an HTTP(s) client, handling
//! authentication, accessing the service catalog and token refresh.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use static_assertions::assert_impl_all;

use super::identity::{EndpointFilters, Password};
use super::request;
use super::services::ServiceType;
use super::{Error, ErrorKind, Result};

/// An empty path, i.e. the service endpoint itself.
pub const NO_PATH: &[&str] = &[];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// An OpenStack API session.
///
/// Cloning a session is cheap: the HTTP client and the cached token are shared.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    auth: Arc<Password>,
    filters: EndpointFilters,
    overrides: HashMap<&'static str, Url>,
}

assert_impl_all!(Session: Send, Sync);

impl Session {
    /// Create a new session and authenticate right away.
    pub async fn new(auth: Password, filters: EndpointFilters) -> Result<Session> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let session = Session {
            client,
            auth: Arc::new(auth),
            filters,
            overrides: HashMap::new(),
        };
        session.auth.refresh(&session.client, false).await?;
        info!("Authenticated against {}", session.auth.token_endpoint());
        Ok(session)
    }

    /// Endpoint filters in use.
    #[inline]
    pub fn endpoint_filters(&self) -> &EndpointFilters {
        &self.filters
    }

    /// Use the given URL for a service instead of looking it up in the catalog.
    pub fn set_endpoint_override(&mut self, service: ServiceType, url: Url) {
        debug!("Using {} for service {}", url, service);
        let _ = self.overrides.insert(service.catalog_type(), url);
    }

    /// Get an endpoint URL for the service.
    pub async fn get_endpoint(&self, service: ServiceType) -> Result<Url> {
        if let Some(url) = self.overrides.get(service.catalog_type()) {
            return Ok(url.clone());
        }

        let mut first_error = None;
        for catalog_type in service.catalog_types() {
            match self
                .auth
                .get_endpoint(&self.client, catalog_type, &self.filters)
                .await
            {
                Ok(url) => return Ok(url),
                Err(e) if e.kind() == ErrorKind::EndpointNotFound => {
                    trace!("No endpoint for {}, trying alternatives", catalog_type);
                    let _ = first_error.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(first_error.unwrap_or_else(|| Error::new_endpoint_not_found(service)))
    }

    /// Start an authenticated request to the service.
    pub async fn request(
        &self,
        service: ServiceType,
        method: Method,
        path: &[&str],
    ) -> Result<RequestBuilder> {
        let mut url = self.get_endpoint(service).await?;
        let _ = url
            .path_segments_mut()
            .map_err(|_| {
                Error::new(
                    ErrorKind::InvalidConfig,
                    format!("Endpoint for {} cannot be a base URL", service),
                )
            })?
            .pop_if_empty()
            .extend(path);
        trace!("Sending {} {}", method, url);
        self.auth
            .authenticate(&self.client, self.client.request(method, url))
            .await
    }

    /// Start a GET request.
    #[inline]
    pub async fn get(&self, service: ServiceType, path: &[&str]) -> Result<RequestBuilder> {
        self.request(service, Method::GET, path).await
    }

    /// Start a POST request.
    #[inline]
    pub async fn post(&self, service: ServiceType, path: &[&str]) -> Result<RequestBuilder> {
        self.request(service, Method::POST, path).await
    }

    /// Start a PUT request.
    #[inline]
    pub async fn put(&self, service: ServiceType, path: &[&str]) -> Result<RequestBuilder> {
        self.request(service, Method::PUT, path).await
    }

    /// Start a HEAD request.
    #[inline]
    pub async fn head(&self, service: ServiceType, path: &[&str]) -> Result<RequestBuilder> {
        self.request(service, Method::HEAD, path).await
    }

    /// Issue a DELETE request and check the result.
    pub async fn delete(&self, service: ServiceType, path: &[&str]) -> Result<()> {
        let _ = request::send_checked(self.request(service, Method::DELETE, path).await?).await?;
        Ok(())
    }

    /// Issue a GET request and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        service: ServiceType,
        path: &[&str],
    ) -> Result<T> {
        request::fetch_json(self.get(service, path).await?).await
    }
}
