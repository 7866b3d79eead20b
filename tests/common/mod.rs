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

//! Fake Keystone, Nova, Swift and Trove on top of wiremock.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Once};

use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use service_test::identity::Password;
use service_test::storage_test::md5_hex;
use service_test::{EndpointFilters, Session};

pub const TOKEN: &str = "fake-token";
pub const EXPIRES: &str = "2099-01-01T00:00:00Z";
pub const COMPUTE_PATH: &str = "/compute/v2.1";
pub const SWIFT_PATH: &str = "/swift/v1/AUTH_demo";
pub const TROVE_PATH: &str = "/trove/v1.0/demo";

static INIT: Once = Once::new();

pub fn set_up_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Catalog with compute, object storage and database (under its HP name).
pub fn v3_catalog(uri: &str) -> Value {
    json!([
        {"type": "compute", "endpoints": [
            {"interface": "public", "region": "RegionOne", "url": format!("{}{}", uri, COMPUTE_PATH)},
            {"interface": "internal", "region": "RegionOne", "url": "http://10.0.0.1/compute"}
        ]},
        {"type": "object-store", "endpoints": [
            {"interface": "public", "region": "RegionOne", "url": format!("{}{}", uri, SWIFT_PATH)}
        ]},
        {"type": "hpext:dbaas", "endpoints": [
            {"interface": "public", "region": "RegionOne", "url": format!("{}{}", uri, TROVE_PATH)}
        ]}
    ])
}

pub async fn mount_keystone_v3(server: &MockServer) {
    let body = json!({"token": {"expires_at": EXPIRES, "catalog": v3_catalog(&server.uri())}});
    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("x-subject-token", TOKEN)
                .set_body_json(body),
        )
        .mount(server)
        .await;
}

pub async fn mount_keystone_v2(server: &MockServer) {
    let uri = server.uri();
    let body = json!({"access": {
        "token": {"id": TOKEN, "expires": EXPIRES},
        "serviceCatalog": [
            {"type": "compute", "endpoints": [
                {"region": "az-1.region-a.geo-1", "publicURL": format!("{}{}", uri, COMPUTE_PATH)}
            ]},
            {"type": "object-store", "endpoints": [
                {"region": "region-a.geo-1", "publicURL": format!("{}{}", uri, SWIFT_PATH)}
            ]}
        ]
    }});
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// A session authenticated against a fake Keystone V3.
pub async fn session(server: &MockServer) -> Session {
    set_up_logging();
    mount_keystone_v3(server).await;
    let auth = Password::new_v3(server.uri(), "demo", "secret", "Default")
        .expect("valid auth URL")
        .with_project_scope("demo", "Default");
    Session::new(auth, EndpointFilters::default())
        .await
        .expect("authentication against the fake Keystone")
}

fn segments<'a>(request: &'a Request, prefix: &str) -> Vec<&'a str> {
    request
        .url
        .path()
        .trim_start_matches(prefix)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"itemNotFound": {"message": "Not found", "code": 404}}))
}

fn wrap(key: &str, value: Value) -> Value {
    let mut root = serde_json::Map::new();
    let _ = root.insert(key.to_string(), value);
    Value::Object(root)
}

fn has_token(request: &Request) -> bool {
    request
        .headers
        .get("x-auth-token")
        .and_then(|v| v.to_str().ok())
        == Some(TOKEN)
}

#[derive(Debug, Clone)]
pub struct FakeResource {
    pub name: String,
    pub polls: usize,
    pub deleted: bool,
    pub delete_requests: usize,
    /// Every GET of this resource, including rate-limited ones.
    pub gets: usize,
}

/// Fake Nova or Trove: resources build for a number of polls, then become active.
#[derive(Debug, Clone)]
pub struct FakeLifecycle {
    pub resources: Arc<Mutex<BTreeMap<String, FakeResource>>>,
    pub build_polls: usize,
    pub final_status: &'static str,
    /// GETs of a single resource (1-based, counted per resource) answered with 429.
    pub rate_limited_gets: &'static [usize],
    root: &'static str,
    single: &'static str,
    prefix: &'static str,
}

impl FakeLifecycle {
    pub fn nova() -> FakeLifecycle {
        FakeLifecycle {
            resources: Arc::new(Mutex::new(BTreeMap::new())),
            build_polls: 1,
            final_status: "ACTIVE",
            rate_limited_gets: &[],
            root: "servers",
            single: "server",
            prefix: COMPUTE_PATH,
        }
    }

    pub fn trove() -> FakeLifecycle {
        FakeLifecycle {
            root: "instances",
            single: "instance",
            prefix: TROVE_PATH,
            ..FakeLifecycle::nova()
        }
    }

    pub fn with_existing(self, id: &str, name: &str) -> FakeLifecycle {
        let _ = self.resources.lock().unwrap().insert(
            id.to_string(),
            FakeResource {
                name: name.to_string(),
                polls: 0,
                deleted: false,
                delete_requests: 0,
                gets: 0,
            },
        );
        self
    }

    pub fn snapshot(&self) -> BTreeMap<String, FakeResource> {
        self.resources.lock().unwrap().clone()
    }

    fn render(&self, id: &str, res: &FakeResource, status: &str) -> Value {
        if self.single == "server" {
            json!({
                "id": id,
                "name": res.name,
                "status": status,
                "accessIPv4": "",
                "addresses": {"private": [
                    {"addr": format!("10.0.0.{}", id.trim_start_matches("id-")), "version": 4, "OS-EXT-IPS:type": "fixed"}
                ]}
            })
        } else {
            json!({
                "id": id,
                "name": res.name,
                "status": status,
                "hostname": format!("{}.db.example.com", id),
                "ip": [format!("10.1.0.{}", id.trim_start_matches("id-"))]
            })
        }
    }

    pub async fn mount(&self, server: &MockServer) {
        Mock::given(path_regex(format!("^{}/.*", self.prefix)))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }
}

impl Respond for FakeLifecycle {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !has_token(request) {
            return ResponseTemplate::new(401);
        }

        let parts = segments(request, self.prefix);
        let mut resources = self.resources.lock().unwrap();
        match (request.method.as_str(), parts.as_slice()) {
            ("GET", ["flavors"]) => ResponseTemplate::new(200).set_body_json(json!({"flavors": [
                {"id": 1, "name": "m1.tiny", "ram": 512},
                {"id": "2", "name": "m1.small", "ram": 2048}
            ]})),
            ("GET", ["images"]) => ResponseTemplate::new(200).set_body_json(json!({"images": [
                {"id": "img-1", "name": "cirros"},
                {"id": "img-2", "name": "ubuntu"}
            ]})),
            ("GET", [root]) if *root == self.root => {
                let items: Vec<Value> = resources
                    .iter()
                    .filter(|(_, r)| !r.deleted)
                    .map(|(id, r)| {
                        if self.single == "server" {
                            json!({"id": id, "name": r.name})
                        } else {
                            self.render(id, r, "ACTIVE")
                        }
                    })
                    .collect();
                ResponseTemplate::new(200).set_body_json(wrap(self.root, Value::Array(items)))
            }
            ("POST", [root]) if *root == self.root => {
                let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
                let name = body[self.single]["name"].as_str().unwrap_or("unnamed").to_string();
                let id = format!("id-{}", resources.len() + 1);
                let _ = resources.insert(
                    id.clone(),
                    FakeResource {
                        name,
                        polls: 0,
                        deleted: false,
                        delete_requests: 0,
                        gets: 0,
                    },
                );
                ResponseTemplate::new(202).set_body_json(wrap(self.single, json!({"id": id})))
            }
            ("GET", [root, id]) if *root == self.root => match resources.get_mut(*id) {
                Some(res) => {
                    res.gets += 1;
                    if self.rate_limited_gets.contains(&res.gets) {
                        ResponseTemplate::new(429).set_body_string("Too Many Requests")
                    } else if res.deleted {
                        not_found()
                    } else {
                        res.polls += 1;
                        let status = if res.polls <= self.build_polls {
                            "BUILD"
                        } else {
                            self.final_status
                        };
                        let body = self.render(id, res, status);
                        ResponseTemplate::new(200).set_body_json(wrap(self.single, body))
                    }
                }
                None => not_found(),
            },
            ("DELETE", [root, id]) if *root == self.root => match resources.get_mut(*id) {
                Some(res) if !res.deleted => {
                    res.deleted = true;
                    res.delete_requests += 1;
                    ResponseTemplate::new(204)
                }
                _ => not_found(),
            },
            _ => not_found(),
        }
    }
}

/// Fake Swift keeping objects in memory.
#[derive(Debug, Clone, Default)]
pub struct FakeSwift {
    pub containers: Arc<Mutex<BTreeMap<String, BTreeMap<String, Vec<u8>>>>>,
    /// Corrupt the ETag of uploaded objects.
    pub bad_etag: bool,
}

impl FakeSwift {
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(path_regex(format!("^{}(/.*)?$", SWIFT_PATH)))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    pub fn with_container(self, name: &str, objects: &[(&str, &[u8])]) -> FakeSwift {
        let _ = self.containers.lock().unwrap().insert(
            name.to_string(),
            objects
                .iter()
                .map(|(n, b)| (n.to_string(), b.to_vec()))
                .collect(),
        );
        self
    }

    pub fn container_names(&self) -> Vec<String> {
        self.containers.lock().unwrap().keys().cloned().collect()
    }
}

fn marker(request: &Request) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == "marker")
        .map(|(_, v)| v.into_owned())
}

impl Respond for FakeSwift {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !has_token(request) {
            return ResponseTemplate::new(401);
        }

        let parts = segments(request, SWIFT_PATH);
        let marker = marker(request);
        let mut containers = self.containers.lock().unwrap();
        match (request.method.as_str(), parts.as_slice()) {
            ("HEAD", []) => {
                let objects: usize = containers.values().map(|c| c.len()).sum();
                let bytes: usize = containers
                    .values()
                    .flat_map(|c| c.values())
                    .map(|b| b.len())
                    .sum();
                ResponseTemplate::new(204)
                    .insert_header("x-account-container-count", containers.len().to_string().as_str())
                    .insert_header("x-account-object-count", objects.to_string().as_str())
                    .insert_header("x-account-bytes-used", bytes.to_string().as_str())
            }
            ("GET", []) => {
                let items: Vec<Value> = containers
                    .iter()
                    .filter(|(name, _)| marker.as_ref().map_or(true, |m| *name > m))
                    .map(|(name, objects)| {
                        json!({
                            "name": name,
                            "count": objects.len(),
                            "bytes": objects.values().map(|b| b.len()).sum::<usize>()
                        })
                    })
                    .collect();
                ResponseTemplate::new(200).set_body_json(items)
            }
            ("PUT", [container]) => {
                if containers.contains_key(*container) {
                    ResponseTemplate::new(202)
                } else {
                    let _ = containers.insert(container.to_string(), BTreeMap::new());
                    ResponseTemplate::new(201)
                }
            }
            ("GET", [container]) => match containers.get(*container) {
                Some(objects) => {
                    let items: Vec<Value> = objects
                        .iter()
                        .filter(|(name, _)| marker.as_ref().map_or(true, |m| *name > m))
                        .map(|(name, body)| {
                            json!({"name": name, "bytes": body.len(), "hash": md5_hex(body)})
                        })
                        .collect();
                    ResponseTemplate::new(200).set_body_json(items)
                }
                None => not_found(),
            },
            ("DELETE", [container]) => match containers.get(*container) {
                Some(objects) if !objects.is_empty() => ResponseTemplate::new(409),
                Some(_) => {
                    let _ = containers.remove(*container);
                    ResponseTemplate::new(204)
                }
                None => not_found(),
            },
            ("PUT", [container, object]) => match containers.get_mut(*container) {
                Some(objects) => {
                    let etag = if self.bad_etag {
                        String::from("00000000000000000000000000000000")
                    } else {
                        md5_hex(&request.body)
                    };
                    let _ = objects.insert(object.to_string(), request.body.clone());
                    ResponseTemplate::new(201).insert_header("etag", etag.as_str())
                }
                None => not_found(),
            },
            ("HEAD", [container, object]) => {
                match containers.get(*container).and_then(|c| c.get(*object)) {
                    Some(body) => ResponseTemplate::new(200)
                        .insert_header("etag", format!("\"{}\"", md5_hex(body)).as_str())
                        .insert_header("content-type", "application/octet-stream")
                        .set_body_bytes(body.clone()),
                    None => not_found(),
                }
            }
            ("GET", [container, object]) => {
                match containers.get(*container).and_then(|c| c.get(*object)) {
                    Some(body) => ResponseTemplate::new(200).set_body_bytes(body.clone()),
                    None => not_found(),
                }
            }
            ("DELETE", [container, object]) => {
                match containers.get_mut(*container).and_then(|c| c.remove(*object)) {
                    Some(_) => ResponseTemplate::new(204),
                    None => not_found(),
                }
            }
            _ => ResponseTemplate::new(405),
        }
    }
}
