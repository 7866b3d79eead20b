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

mod common;

use std::time::Duration;

use wiremock::MockServer;

use service_test::database::DatabaseService;
use service_test::lifecycle::{LifecycleService, LifecycleSettings, LifecycleTest};
use service_test::report::ReportWriter;
use service_test::ErrorKind;

use common::FakeLifecycle;

#[tokio::test]
async fn test_list_instances() {
    let server = MockServer::start().await;
    let session = common::session(&server).await;
    FakeLifecycle::trove()
        .with_existing("id-1", "mysql-1")
        .with_existing("id-2", "mysql-2")
        .mount(&server)
        .await;

    let service = DatabaseService::new(session);
    assert_eq!(service.log_instances().await.unwrap(), 2);
    let instances = service.instances().await.unwrap();
    assert_eq!(instances[0].name, "mysql-1");
    assert!(instances[0].status.is_active());
    assert_eq!(
        instances[1].address(),
        Some("10.1.0.2".parse().unwrap())
    );

    let flavors = service.flavors().await.unwrap();
    assert_eq!(flavors[0].id, "1");
    assert_eq!(flavors[1].ram, Some(2048));
}

#[tokio::test]
async fn test_create_requires_flavor() {
    let server = MockServer::start().await;
    let session = common::session(&server).await;
    FakeLifecycle::trove().mount(&server).await;

    let service = DatabaseService::new(session.clone());
    assert_eq!(
        service.create("db0").await.unwrap_err().kind(),
        ErrorKind::InvalidConfig
    );

    let err = DatabaseService::new(session)
        .with_flavor_name("m1.giant")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
}

#[tokio::test]
async fn test_instance_lifecycle() {
    let server = MockServer::start().await;
    let session = common::session(&server).await;
    let trove = FakeLifecycle::trove();
    trove.mount(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let service = DatabaseService::new(session)
        .with_flavor_name("m1.tiny")
        .await
        .unwrap();
    let settings = LifecycleSettings {
        name_prefix: String::from("reddwarf_test"),
        count: 1,
        timeout: Duration::from_secs(30),
        poll_interval: Duration::from_millis(10),
        max_poll_interval: None,
        create_spacing: Duration::from_millis(1),
    };
    let reports = ReportWriter::new(dir.path()).with_results_dir("results/database");
    let mut test = LifecycleTest::new(service, settings, reports);
    test.run().await.unwrap();

    let state = trove.snapshot();
    assert_eq!(state["id-1"].name, "reddwarf_test0");
    assert!(state["id-1"].deleted);
    assert!(dir.path().join("results/database/creation.csv").exists());
    assert!(dir.path().join("results/database/lifespan.csv").exists());
}
