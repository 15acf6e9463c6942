//! Remote-procedure store client tests against a mocked executor.

use std::time::Duration;

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use orgchart_core::domain::{NodeKind, OrgChart, OrgNode};
use orgchart_core::error::DomainError;
use orgchart_core::repositories::{HierarchyStore, NodeFilter};
use orgchart_infrastructure::RpcHierarchyStore;

fn store_for(server: &MockServer) -> RpcHierarchyStore {
    RpcHierarchyStore::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn chart_node(company_id: Uuid) -> OrgNode {
    OrgChart::new(company_id, "Main".to_string(), None, "1.0".to_string(), None)
        .unwrap()
        .into()
}

#[tokio::test]
async fn get_returns_node_or_none() {
    let server = MockServer::start().await;
    let company_id = Uuid::new_v4();
    let node = chart_node(company_id);
    let node_id = node.id();

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "orgnode.get", "params": { "id": node_id } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "data": serde_json::to_value(&node).unwrap(),
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "orgnode.get" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "data": null })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let found = store.get(company_id, node_id).await.unwrap();
    assert_eq!(found.map(|n| n.id()), Some(node_id));

    let missing = store.get(company_id, Uuid::new_v4()).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn put_round_trips_and_maps_revision_conflicts() {
    let server = MockServer::start().await;
    let company_id = Uuid::new_v4();
    let node = chart_node(company_id);
    let node_id = node.id();

    let mut stored = node.clone();
    stored.set_revision(1);
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "orgnode.put" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "data": serde_json::to_value(&stored).unwrap(),
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let returned = store.put(node.clone()).await.unwrap();
    assert_eq!(returned.revision(), 1);
    server.reset().await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "orgnode.put" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "data": null,
            "error": "stale revision",
            "code": "revision_conflict",
        })))
        .mount(&server)
        .await;

    let err = store.put(node).await.unwrap_err();
    assert!(matches!(err, DomainError::RevisionConflict(id) if id == node_id));
}

#[tokio::test]
async fn find_unwraps_the_list() {
    let server = MockServer::start().await;
    let company_id = Uuid::new_v4();
    let node = chart_node(company_id);

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({ "method": "orgnode.find" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "data": [serde_json::to_value(&node).unwrap()],
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let found = store
        .find(company_id, NodeKind::OrgChart, NodeFilter::all())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), node.id());
}

#[tokio::test]
async fn transport_and_remote_failures_surface_as_storage_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store.get(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::StorageError(_)));

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "data": null,
            "error": "executor unavailable",
        })))
        .mount(&server)
        .await;

    let err = store.remove(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::StorageError(message) if message == "executor unavailable"));
}
