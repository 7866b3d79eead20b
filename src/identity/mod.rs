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

//! Password authentication against the Identity service.
//!
//! Both the V2.0 API (tenant-scoped tokens, used by older public clouds) and
//! the V3 API (project-scoped tokens) are supported. The token and the service
//! catalog that comes with it are cached and refreshed shortly before expiry.

mod catalog;
pub(crate) mod protocol;

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, Local};
use reqwest::{Client, RequestBuilder, Response, Url};
use static_assertions::assert_impl_all;
use tokio::sync::RwLock;

use super::request;
use super::{Error, ErrorKind, Result};

pub use self::catalog::{EndpointFilters, InterfaceType, ServiceCatalog};

const MISSING_SUBJECT_HEADER: &str = "Missing X-Subject-Token header";
const INVALID_SUBJECT_HEADER: &str = "Invalid X-Subject-Token header";
const TOKEN_MIN_VALIDITY: i64 = 10;

/// Version of the Identity API to authenticate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityVersion {
    /// Identity V2.0 with tenant names.
    V2,
    /// Identity V3 with domains and projects.
    V3,
}

#[derive(Debug, Clone)]
enum AuthBody {
    V2(protocol::V2AuthRoot),
    V3(protocol::V3AuthRoot),
}

#[derive(Clone)]
struct Token {
    value: String,
    expires_at: DateTime<FixedOffset>,
    catalog: ServiceCatalog,
}

/// Password authentication with a cached token.
#[derive(Debug)]
pub struct Password {
    body: AuthBody,
    token_endpoint: String,
    cached_token: RwLock<Option<Token>>,
}

assert_impl_all!(Password: Send, Sync);

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut hasher = DefaultHasher::new();
        self.value.hash(&mut hasher);
        write!(
            f,
            "Token {{ value: hash({}), expires_at: {}, catalog: {:?} }}",
            hasher.finish(),
            self.expires_at,
            self.catalog
        )
    }
}

impl IdentityVersion {
    /// Guess the Identity version from an authentication URL.
    ///
    /// URLs mentioning `v2.0` or pointing at `/tokens` are V2.0, the rest is V3.
    pub fn detect(auth_url: &str) -> IdentityVersion {
        let trimmed = auth_url.trim_end_matches('/');
        if trimmed.contains("/v2.0") || trimmed.ends_with("/tokens") {
            IdentityVersion::V2
        } else {
            IdentityVersion::V3
        }
    }
}

impl FromStr for IdentityVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<IdentityVersion> {
        match s.trim_start_matches('v') {
            "2" | "2.0" => Ok(IdentityVersion::V2),
            "3" | "3.0" => Ok(IdentityVersion::V3),
            other => Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("Unsupported identity API version {}", other),
            )),
        }
    }
}

fn parse_auth_url(auth_url: &str) -> Result<Url> {
    let mut url = Url::parse(auth_url)
        .map_err(|e| Error::new(ErrorKind::InvalidConfig, format!("Invalid auth_url: {}", e)))?;
    if !url.path().ends_with("/tokens") {
        let _ = url
            .path_segments_mut()
            .map_err(|_| Error::new(ErrorKind::InvalidConfig, "Invalid auth_url: wrong schema?"))?
            .pop_if_empty()
            .push("");
    }
    Ok(url)
}

impl Password {
    /// Create a V2.0 password authentication scoped to a tenant.
    pub fn new_v2<U, S1, S2>(
        auth_url: U,
        user_name: S1,
        password: S2,
        tenant_name: Option<String>,
    ) -> Result<Password>
    where
        U: AsRef<str>,
        S1: Into<String>,
        S2: Into<String>,
    {
        let url = parse_auth_url(auth_url.as_ref())?;
        let token_endpoint = if url.path().ends_with("/tokens") {
            url.to_string()
        } else {
            format!("{}tokens", url)
        };

        Ok(Password {
            body: AuthBody::V2(protocol::V2AuthRoot::new(user_name, password, tenant_name)),
            token_endpoint,
            cached_token: RwLock::new(None),
        })
    }

    /// Create a V3 password authentication.
    pub fn new_v3<U, S1, S2, S3>(
        auth_url: U,
        user_name: S1,
        password: S2,
        user_domain_name: S3,
    ) -> Result<Password>
    where
        U: AsRef<str>,
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let url = parse_auth_url(auth_url.as_ref())?;
        let token_endpoint = if url.as_str().ends_with("/v3/") {
            format!("{}auth/tokens", url)
        } else {
            format!("{}v3/auth/tokens", url)
        };

        Ok(Password {
            body: AuthBody::V3(protocol::V3AuthRoot::new(
                user_name,
                password,
                user_domain_name,
            )),
            token_endpoint,
            cached_token: RwLock::new(None),
        })
    }

    /// Scope a V3 authentication to the given project.
    ///
    /// Has no effect on V2.0 authentication, which is scoped by tenant on creation.
    pub fn with_project_scope<S1, S2>(mut self, project_name: S1, project_domain: S2) -> Password
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        self.body = match self.body {
            AuthBody::V3(body) => {
                AuthBody::V3(body.with_project_scope(project_name, project_domain))
            }
            other => other,
        };
        self
    }

    /// Identity API version in use.
    pub fn version(&self) -> IdentityVersion {
        match self.body {
            AuthBody::V2(..) => IdentityVersion::V2,
            AuthBody::V3(..) => IdentityVersion::V3,
        }
    }

    /// URL used to request tokens.
    #[inline]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Get the authentication token string.
    pub async fn get_token(&self, client: &Client) -> Result<String> {
        self.refresh(client, false).await?;
        let guard = self.cached_token.read().await;
        guard
            .as_ref()
            .map(|token| token.value.clone())
            .ok_or_else(|| Error::new(ErrorKind::AuthenticationFailed, "No token available"))
    }

    /// Get a URL for the requested service.
    pub async fn get_endpoint(
        &self,
        client: &Client,
        service_type: &str,
        filters: &EndpointFilters,
    ) -> Result<Url> {
        debug!(
            "Requesting a catalog endpoint for service '{}', filters {:?}",
            service_type, filters
        );
        self.refresh(client, false).await?;
        let guard = self.cached_token.read().await;
        match guard.as_ref() {
            Some(token) => token.catalog.find_endpoint(service_type, filters),
            None => Err(Error::new(
                ErrorKind::AuthenticationFailed,
                "No service catalog available",
            )),
        }
    }

    /// Create an authenticated request.
    pub async fn authenticate(
        &self,
        client: &Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder> {
        let token = self.get_token(client).await?;
        Ok(request.header("x-auth-token", token))
    }

    /// Refresh the token (if needed or forced).
    pub async fn refresh(&self, client: &Client, force: bool) -> Result<()> {
        // This is executed every request at least once, so start with a read lock.
        if !force && token_alive(&self.cached_token.read().await) {
            return Ok(());
        }

        let mut lock = self.cached_token.write().await;
        // Another task may have updated the token while we were waiting for the lock.
        if !force && token_alive(&lock) {
            return Ok(());
        }

        debug!("Requesting a new token from {}", self.token_endpoint);
        let token = match self.body {
            AuthBody::V2(ref body) => {
                let resp = client.post(&self.token_endpoint).json(body).send().await?;
                token_from_v2_response(request::check(resp).await?).await?
            }
            AuthBody::V3(ref body) => {
                let resp = client.post(&self.token_endpoint).json(body).send().await?;
                token_from_v3_response(request::check(resp).await?).await?
            }
        };
        *lock = Some(token);
        Ok(())
    }
}

#[inline]
fn token_alive(token: &impl Deref<Target = Option<Token>>) -> bool {
    if let Some(value) = token.deref() {
        let validity_time_left = value.expires_at.signed_duration_since(Local::now());
        trace!("Token is valid for {:?}", validity_time_left);
        validity_time_left > Duration::minutes(TOKEN_MIN_VALIDITY)
    } else {
        false
    }
}

async fn token_from_v2_response(resp: Response) -> Result<Token> {
    let root = resp.json::<protocol::V2AccessRoot>().await?;
    debug!("Received a token expiring at {}", root.access.token.expires);
    trace!("Received catalog: {:?}", root.access.service_catalog);
    Ok(Token {
        value: root.access.token.id,
        expires_at: root.access.token.expires,
        catalog: ServiceCatalog::new(
            root.access
                .service_catalog
                .into_iter()
                .map(From::from)
                .collect(),
        ),
    })
}

async fn token_from_v3_response(resp: Response) -> Result<Token> {
    let value = match resp.headers().get("x-subject-token") {
        Some(hdr) => match hdr.to_str() {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                error!(
                    "Invalid X-Subject-Token {:?} received from {}: {}",
                    hdr,
                    resp.url(),
                    e
                );
                Err(Error::new(ErrorKind::InvalidResponse, INVALID_SUBJECT_HEADER))
            }
        },
        None => {
            error!("No X-Subject-Token header received from {}", resp.url());
            Err(Error::new(ErrorKind::InvalidResponse, MISSING_SUBJECT_HEADER))
        }
    }?;

    let root = resp.json::<protocol::V3TokenRoot>().await?;
    debug!("Received a token expiring at {}", root.token.expires_at);
    trace!("Received catalog: {:?}", root.token.catalog);
    Ok(Token {
        value,
        expires_at: root.token.expires_at,
        catalog: ServiceCatalog::new(root.token.catalog),
    })
}

#[cfg(test)]
mod test {
    use super::{IdentityVersion, Password};

    #[test]
    fn test_detect_version() {
        let cases = [
            ("https://region-a.geo-1.identity.example.com:35357/v2.0/", IdentityVersion::V2),
            ("https://identity.example.com/v2.0", IdentityVersion::V2),
            ("https://identity.example.com/v2.0/tokens", IdentityVersion::V2),
            ("https://identity.example.com/v3", IdentityVersion::V3),
            ("https://identity.example.com/identity", IdentityVersion::V3),
        ];
        for (url, expected) in cases {
            assert_eq!(IdentityVersion::detect(url), expected, "for {}", url);
        }
    }

    #[test]
    fn test_version_from_str() {
        assert_eq!("2.0".parse::<IdentityVersion>().unwrap(), IdentityVersion::V2);
        assert_eq!("v3".parse::<IdentityVersion>().unwrap(), IdentityVersion::V3);
        assert!("4".parse::<IdentityVersion>().is_err());
    }

    #[test]
    fn test_v2_token_endpoint() {
        let id = Password::new_v2(
            "http://127.0.0.1:35357/v2.0",
            "admin",
            "pa$$w0rd",
            Some("demo".into()),
        )
        .unwrap();
        assert_eq!(id.version(), IdentityVersion::V2);
        assert_eq!(id.token_endpoint(), "http://127.0.0.1:35357/v2.0/tokens");

        let id = Password::new_v2("http://127.0.0.1:35357/v2.0/tokens", "admin", "pw", None)
            .unwrap();
        assert_eq!(id.token_endpoint(), "http://127.0.0.1:35357/v2.0/tokens");
    }

    #[test]
    fn test_v3_token_endpoint() {
        let id = Password::new_v3("http://127.0.0.1:8080/identity", "user", "pa$$w0rd", "Default")
            .unwrap()
            .with_project_scope("cool project", "Default");
        assert_eq!(id.version(), IdentityVersion::V3);
        assert_eq!(
            id.token_endpoint(),
            "http://127.0.0.1:8080/identity/v3/auth/tokens"
        );

        let id = Password::new_v3("http://127.0.0.1:8080/v3/", "user", "pw", "Default").unwrap();
        assert_eq!(id.token_endpoint(), "http://127.0.0.1:8080/v3/auth/tokens");
    }

    #[test]
    fn test_invalid_auth_url() {
        assert!(Password::new_v3("http://127.0.0.1 8080/", "admin", "pw", "Default").is_err());
        assert!(Password::new_v2("not a url", "admin", "pw", None).is_err());
    }
}
