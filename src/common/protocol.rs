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

//! Common protocol bits.

use std::fmt;

use reqwest::header::HeaderMap;
use serde::de::Error as DeserError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{Error, ErrorKind, Result};

/// Status of a compute or database instance.
///
/// Services report free-form status strings, they are classified by prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Still being built (`BUILD`, `BUILDING`, ...).
    Building(String),
    /// Ready for use.
    Active,
    /// Failed (`ERROR`, `FAILED`, ...).
    Error(String),
    /// Anything else (`REBOOT`, `SHUTOFF`, `DELETED`, ...).
    Other(String),
}

impl Status {
    /// Whether the resource reached the active state.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }

    /// Whether the resource ended up in an error state.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(..))
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Status {
        let upper = value.trim().to_uppercase();
        if upper.starts_with("BUILD") {
            Status::Building(upper)
        } else if upper == "ACTIVE" {
            Status::Active
        } else if upper.starts_with("ERROR") || upper.starts_with("FAIL") {
            Status::Error(upper)
        } else {
            Status::Other(upper)
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Active => f.write_str("ACTIVE"),
            Status::Building(s) | Status::Error(s) | Status::Other(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> ::std::result::Result<Status, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: String = Deserialize::deserialize(deserializer)?;
        Ok(Status::from(value.as_str()))
    }
}

/// Deserialize an identifier that can be either a string or a number.
pub fn deser_id<'de, D>(des: D) -> ::std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(des)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(DeserError::custom(format!(
            "expected a string or a number as an ID, got {}",
            other
        ))),
    }
}

/// Deserialize an optional string-or-number value.
pub fn deser_opt_id<'de, D>(des: D) -> ::std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(des)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(DeserError::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

/// Get a header as a string, if present.
pub fn get_header<'m>(headers: &'m HeaderMap, name: &str) -> Result<Option<&'m str>> {
    match headers.get(name) {
        Some(value) => Ok(Some(value.to_str()?)),
        None => Ok(None),
    }
}

/// Get a required header as a string.
pub fn get_required_header<'m>(headers: &'m HeaderMap, name: &str) -> Result<&'m str> {
    get_header(headers, name)?.ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidResponse,
            format!("Missing {} header in the response", name),
        )
    })
}

/// Get a numeric header, defaulting to zero when missing.
pub fn get_number_header(headers: &HeaderMap, name: &str) -> Result<u64> {
    match get_header(headers, name)? {
        Some(value) => value.trim().parse().map_err(|e| {
            Error::new(
                ErrorKind::InvalidResponse,
                format!("Invalid value {} of header {}: {}", value, name, e),
            )
        }),
        None => Ok(0),
    }
}

#[cfg(test)]
mod test {
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde::Deserialize;

    use super::{get_number_header, get_required_header, Status};
    use crate::ErrorKind;

    #[derive(Debug, Deserialize)]
    struct WithId {
        #[serde(deserialize_with = "super::deser_id")]
        id: String,
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(Status::from("BUILD"), Status::Building("BUILD".into()));
        assert_eq!(
            Status::from("build(spawning)"),
            Status::Building("BUILD(SPAWNING)".into())
        );
        assert!(Status::from("ACTIVE").is_active());
        assert!(Status::from("ERROR").is_error());
        assert!(Status::from("FAILED").is_error());
        assert_eq!(Status::from("SHUTOFF"), Status::Other("SHUTOFF".into()));
        assert!(!Status::from("ACTIVE_ish").is_active());
    }

    #[test]
    fn test_status_deserialize() {
        let status: Status = serde_json::from_str("\"BUILDING\"").unwrap();
        assert_eq!(status.to_string(), "BUILDING");
    }

    #[test]
    fn test_deser_id() {
        let numeric: WithId = serde_json::from_str(r#"{"id": 101}"#).unwrap();
        assert_eq!(numeric.id, "101");
        let string: WithId = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(string.id, "abc");
        assert!(serde_json::from_str::<WithId>(r#"{"id": null}"#).is_err());
    }

    #[test]
    fn test_headers() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-account-object-count", HeaderValue::from_static("42"));
        let _ = headers.insert("x-bogus", HeaderValue::from_static("many"));
        assert_eq!(get_number_header(&headers, "x-account-object-count").unwrap(), 42);
        assert_eq!(get_number_header(&headers, "x-account-bytes-used").unwrap(), 0);
        assert_eq!(
            get_number_header(&headers, "x-bogus").unwrap_err().kind(),
            ErrorKind::InvalidResponse
        );
        assert_eq!(
            get_required_header(&headers, "etag").unwrap_err().kind(),
            ErrorKind::InvalidResponse
        );
    }
}
