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

//! Sending requests and checking responses.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Error, Result};

const MAX_MESSAGE_LENGTH: usize = 256;

/// Extract a human-readable message from an error body.
///
/// OpenStack services wrap errors as `{"itemNotFound": {"message": "..."}}`,
/// `{"error": {"message": "..."}}` and similar. Anything else is returned as
/// (truncated) text.
fn error_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let found = map.values().find_map(|value| match value {
            Value::Object(inner) => inner.get("message").and_then(Value::as_str),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        });
        if let Some(msg) = found {
            return Some(msg.to_string());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_MESSAGE_LENGTH).collect())
    }
}

/// Check the response status and convert failures into errors.
pub async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    let message = match error_message(&body) {
        Some(msg) => format!("request to {} returned {}: {}", url, status, msg),
        None => format!("request to {} returned {}", url, status),
    };
    debug!("Request failed: {}", message);
    Err(Error::from_status(status, Some(message)))
}

/// Send the request and check the response status.
pub async fn send_checked(builder: RequestBuilder) -> Result<Response> {
    check(builder.send().await?).await
}

/// Send the request, check the response status and decode its JSON body.
pub async fn fetch_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let resp = send_checked(builder).await?;
    Ok(resp.json::<T>().await?)
}
