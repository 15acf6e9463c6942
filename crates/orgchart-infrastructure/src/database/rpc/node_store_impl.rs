// ============================================================================
// OrgChart Infrastructure - Remote-Procedure Hierarchy Store
// File: crates/orgchart-infrastructure/src/database/rpc/node_store_impl.rs
// ============================================================================
//! Thin client calling named remote functions with structured parameters;
//! the executor runs against its own backing store. Transport and remote
//! failures surface as storage errors.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use orgchart_core::domain::{NodeKind, OrgNode};
use orgchart_core::error::DomainError;
use orgchart_core::repositories::{HierarchyStore, NodeFilter};

pub struct RpcHierarchyStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P: Serialize> {
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
    code: Option<String>,
}

/// Remote rejection, kept apart from DomainError so callers can map
/// well-known codes onto domain variants.
struct RpcFailure {
    code: Option<String>,
    message: String,
}

impl RpcFailure {
    fn into_storage(self) -> DomainError {
        DomainError::StorageError(self.message)
    }
}

#[derive(Debug, Serialize)]
struct NodeRef {
    company_id: Uuid,
    id: Uuid,
}

#[derive(Debug, Serialize)]
struct FindParams {
    company_id: Uuid,
    kind: NodeKind,
    filter: NodeFilter,
}

impl RpcHierarchyStore {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::StorageError(e.to_string()))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    async fn call<P, T>(&self, method: &str, params: P) -> Result<Option<T>, RpcFailure>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let url = format!("{}/rpc", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RpcRequest { method, params })
            .send()
            .await
            .map_err(|e| {
                error!("RPC transport error calling {}: {}", method, e);
                RpcFailure { code: None, message: e.to_string() }
            })?;

        if !response.status().is_success() {
            error!("RPC call {} failed with status {}", method, response.status());
            return Err(RpcFailure {
                code: None,
                message: format!("{method} returned status {}", response.status()),
            });
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| RpcFailure { code: None, message: e.to_string() })?;

        if envelope.ok {
            return Ok(envelope.data);
        }
        let message = envelope.error.unwrap_or_else(|| "unspecified remote error".to_string());
        error!("RPC call {} rejected: {}", method, message);
        Err(RpcFailure { code: envelope.code, message })
    }
}

#[async_trait]
impl HierarchyStore for RpcHierarchyStore {
    async fn get(&self, company_id: Uuid, id: Uuid) -> Result<Option<OrgNode>, DomainError> {
        self.call("orgnode.get", NodeRef { company_id, id })
            .await
            .map_err(RpcFailure::into_storage)
    }

    async fn put(&self, node: OrgNode) -> Result<OrgNode, DomainError> {
        let node_id = node.id();
        let stored: Option<OrgNode> =
            self.call("orgnode.put", node).await.map_err(|failure| {
                if failure.code.as_deref() == Some("revision_conflict") {
                    DomainError::RevisionConflict(node_id)
                } else {
                    failure.into_storage()
                }
            })?;
        stored.ok_or_else(|| {
            DomainError::StorageError(format!("orgnode.put returned no node for {node_id}"))
        })
    }

    async fn remove(&self, company_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        self.call::<_, serde_json::Value>("orgnode.remove", NodeRef { company_id, id })
            .await
            .map_err(RpcFailure::into_storage)?;
        Ok(())
    }

    async fn find(
        &self,
        company_id: Uuid,
        kind: NodeKind,
        filter: NodeFilter,
    ) -> Result<Vec<OrgNode>, DomainError> {
        let found: Option<Vec<OrgNode>> = self
            .call("orgnode.find", FindParams { company_id, kind, filter })
            .await
            .map_err(RpcFailure::into_storage)?;
        Ok(found.unwrap_or_default())
    }
}
