// ============================================================================
// OrgChart Infrastructure - In-Memory Hierarchy Store
// File: crates/orgchart-infrastructure/src/database/memory/node_store_impl.rs
// ============================================================================
//! Direct document-store client: one ordered partition per company, with
//! the optimistic revision token enforced on every upsert.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::error;
use uuid::Uuid;

use orgchart_core::domain::{NodeKind, OrgNode};
use orgchart_core::error::DomainError;
use orgchart_core::repositories::{HierarchyStore, NodeFilter};

#[derive(Default)]
pub struct MemoryHierarchyStore {
    partitions: RwLock<HashMap<Uuid, BTreeMap<Uuid, OrgNode>>>,
}

impl MemoryHierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HierarchyStore for MemoryHierarchyStore {
    async fn get(&self, company_id: Uuid, id: Uuid) -> Result<Option<OrgNode>, DomainError> {
        let partitions = self.partitions.read().await;
        Ok(partitions.get(&company_id).and_then(|p| p.get(&id)).cloned())
    }

    async fn put(&self, mut node: OrgNode) -> Result<OrgNode, DomainError> {
        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(node.company_id()).or_default();

        let stored_revision = partition.get(&node.id()).map(OrgNode::revision).unwrap_or(0);
        if node.revision() != stored_revision {
            error!(
                "Revision mismatch for node {}: held {}, stored {}",
                node.id(),
                node.revision(),
                stored_revision
            );
            return Err(DomainError::RevisionConflict(node.id()));
        }

        node.set_revision(stored_revision + 1);
        partition.insert(node.id(), node.clone());
        Ok(node)
    }

    async fn remove(&self, company_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let mut partitions = self.partitions.write().await;
        if let Some(partition) = partitions.get_mut(&company_id) {
            partition.remove(&id);
        }
        Ok(())
    }

    async fn find(
        &self,
        company_id: Uuid,
        kind: NodeKind,
        filter: NodeFilter,
    ) -> Result<Vec<OrgNode>, DomainError> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(&company_id) else {
            return Ok(Vec::new());
        };
        Ok(partition
            .values()
            .filter(|node| node.kind() == kind && filter.matches(node))
            .cloned()
            .collect())
    }
}
