//! Hierarchy store trait (port)
//!
//! The engine is written against these four primitives only, so a direct
//! document-store client and a remote-procedure thin client are
//! interchangeable behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{NodeKind, OrgNode};
use crate::error::DomainError;

/// Range-read filter. All set fields must match; an unset filter matches
/// every node of the requested kind in the company scope.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NodeFilter {
    pub org_chart_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
}

impl NodeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_chart(org_chart_id: Uuid) -> Self {
        Self { org_chart_id: Some(org_chart_id), ..Self::default() }
    }

    pub fn in_department(department_id: Uuid) -> Self {
        Self { department_id: Some(department_id), ..Self::default() }
    }

    pub fn in_position(position_id: Uuid) -> Self {
        Self { position_id: Some(position_id), ..Self::default() }
    }

    pub fn matches(&self, node: &OrgNode) -> bool {
        if let Some(chart_id) = self.org_chart_id {
            if node.org_chart_id() != chart_id {
                return false;
            }
        }
        if let Some(department_id) = self.department_id {
            if node.department_id() != Some(department_id) {
                return false;
            }
        }
        if let Some(position_id) = self.position_id {
            if node.position_id() != Some(position_id) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait HierarchyStore: Send + Sync {
    async fn get(&self, company_id: Uuid, id: Uuid) -> Result<Option<OrgNode>, DomainError>;

    /// Upsert. The node's revision must match the stored revision (0 for a
    /// new node); the returned node carries the bumped token.
    async fn put(&self, node: OrgNode) -> Result<OrgNode, DomainError>;

    /// Idempotent delete: removing an absent id succeeds.
    async fn remove(&self, company_id: Uuid, id: Uuid) -> Result<(), DomainError>;

    async fn find(
        &self,
        company_id: Uuid,
        kind: NodeKind,
        filter: NodeFilter,
    ) -> Result<Vec<OrgNode>, DomainError>;
}
