// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! End-to-end tests for session creation against a mocked Kudu master.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kudu_client::KuduClientConfig;
use kudu_connector::{
    create_session, ConnectorBootstrap, Error, SchemaEmulation, SchemaTableName,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_master(tables: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tables"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "tables": tables })),
        )
        .mount(&server)
        .await;

    server
}

// ---- session scenarios ----

#[tokio::test]
async fn test_emulation_disabled_session() {
    let server = setup_master(serde_json::json!([{ "name": "orders" }])).await;
    let config = KuduClientConfig::new([server.uri()]);

    let session = create_session("kudu", &config).await.unwrap();
    assert_eq!(session.connector_id(), "kudu");
    assert_eq!(*session.strategy(), SchemaEmulation::Disabled);

    let strategy = session.strategy();
    assert_eq!(strategy.to_physical_name("default", "orders").unwrap(), "orders");
    let err = strategy.to_physical_name("sales", "orders").unwrap_err();
    assert!(matches!(err, Error::UnsupportedSchema { .. }));

    // A naming error leaves the session usable.
    assert_eq!(session.list_schema_names().await.unwrap(), vec!["default"]);
}

#[tokio::test]
async fn test_prefix_emulation_session() {
    let server = setup_master(serde_json::json!([
        { "name": "presto::sales.orders" },
        { "name": "presto::sales.items" },
        { "name": "presto::hr.people" },
        { "name": "other_table" }
    ]))
    .await;
    let config = KuduClientConfig::new([server.uri()]).with_schema_emulation("presto::");

    let session = create_session("kudu", &config).await.unwrap();
    assert_eq!(
        session
            .to_physical_name(&SchemaTableName::new("sales", "orders"))
            .unwrap(),
        "presto::sales.orders"
    );
    assert_eq!(
        session.to_logical_name("presto::sales.orders").unwrap(),
        SchemaTableName::new("sales", "orders")
    );
    assert!(matches!(
        session.to_logical_name("other_table").unwrap_err(),
        Error::NotConvertible { .. }
    ));

    assert_eq!(session.list_schema_names().await.unwrap(), vec!["hr", "sales"]);
    assert_eq!(
        session.list_tables(Some("sales")).await.unwrap(),
        vec![
            SchemaTableName::new("sales", "items"),
            SchemaTableName::new("sales", "orders"),
        ]
    );
}

#[tokio::test]
async fn test_zero_timeout_fails_before_connecting() {
    let server = setup_master(serde_json::json!([])).await;
    let config = KuduClientConfig::new([server.uri()]).with_admin_operation_timeout(Duration::ZERO);

    let err = create_session("kudu", &config).await.unwrap_err();
    assert!(matches!(err, Error::ConfigValidation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ---- construction failures ----

#[tokio::test]
async fn test_missing_masters_is_config_error() {
    let err = create_session("kudu", &KuduClientConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConfigValidation { .. }));
}

#[tokio::test]
async fn test_empty_connector_id_is_config_error() {
    let server = setup_master(serde_json::json!([])).await;
    let err = create_session(" ", &KuduClientConfig::new([server.uri()]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConfigValidation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_master_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = create_session("kudu", &KuduClientConfig::new([server.uri()]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StorageConnection { .. }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_malformed_master_is_connection_error() {
    let err = create_session("kudu", &KuduClientConfig::new(["h1:notaport"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StorageConnection { .. }));
}

// ---- bootstrap ----

#[tokio::test]
async fn test_bootstrap_from_properties_builds_one_client() {
    let server = setup_master(serde_json::json!([{ "name": "presto::sales.orders" }])).await;
    let properties: HashMap<String, String> = [
        ("kudu.client.master-addresses", server.uri()),
        ("kudu.schema-emulation.enabled", "true".to_string()),
        ("kudu.schema-emulation.prefix", "presto::".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let bootstrap = ConnectorBootstrap::from_properties("kudu", &properties).unwrap();
    let first = bootstrap.session().await.unwrap();
    let second = bootstrap.session().await.unwrap();
    assert!(Arc::ptr_eq(first.client(), second.client()));

    let connector = bootstrap.connector().await.unwrap();
    assert_eq!(connector.metadata().list_schema_names().await.unwrap(), vec!["sales"]);

    let health_probes = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/v1/health")
        .count();
    assert_eq!(health_probes, 1);

    bootstrap.shutdown().await.unwrap();
    let err = connector.metadata().list_schema_names().await.unwrap_err();
    assert!(matches!(err, Error::SessionClosed { .. }));
}

#[tokio::test]
async fn test_bootstrap_retries_after_failed_start() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let bootstrap = ConnectorBootstrap::new("kudu", KuduClientConfig::new([server.uri()]));
    assert!(bootstrap.connector().await.is_err());
    assert!(bootstrap.connector().await.is_ok());
}
