// ============================================================================
// OrgChart Core - Lifecycle Controller
// File: crates/orgchart-core/src/services/lifecycle_service.rs
// ============================================================================
//! Chart status machine: draft -> pending_approval -> approved -> revoked,
//! with an optional decline back to draft. Transitions are the sole trigger
//! for version freezing and permission-regime changes; chart content below
//! the root is never touched here.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::codegen::frozen_chart_version;
use crate::domain::{ChartStatus, NodeKind, OrgChart, OrgNode};
use crate::error::DomainError;
use crate::repositories::{HierarchyStore, NodeFilter};

use super::ScopeLocks;

pub struct LifecycleService<S: HierarchyStore + ?Sized> {
    store: Arc<S>,
    locks: ScopeLocks,
}

impl<S: HierarchyStore + ?Sized> LifecycleService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, locks: ScopeLocks::default() }
    }

    /// Current status, re-read from the store. Callers must not cache this
    /// across mutations.
    pub async fn status_of(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
    ) -> Result<ChartStatus, DomainError> {
        Ok(self.load_chart(company_id, chart_id).await?.status)
    }

    pub async fn submit_for_approval(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
        submitted_by: Option<Uuid>,
    ) -> Result<OrgChart, DomainError> {
        let _guard = self.locks.acquire(company_id).await;
        let mut chart = self.checked(company_id, chart_id, ChartStatus::PendingApproval).await?;
        chart.mark_submitted(submitted_by);
        info!("Chart {} submitted for approval", chart.id);
        self.put_chart(chart).await
    }

    /// Approve a pending chart. The version is recomputed with the minor
    /// frozen to 0 and the enforcement timestamp is set on first approval.
    pub async fn approve(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
        approved_by: Option<Uuid>,
    ) -> Result<OrgChart, DomainError> {
        let _guard = self.locks.acquire(company_id).await;
        let mut chart = self.checked(company_id, chart_id, ChartStatus::Approved).await?;

        // The chart being approved is still pending, so it is not in this count.
        let frozen = self
            .store
            .find(company_id, NodeKind::OrgChart, NodeFilter::all())
            .await?
            .into_iter()
            .filter_map(OrgNode::into_org_chart)
            .filter(|c| matches!(c.status, ChartStatus::Approved | ChartStatus::Revoked))
            .count();

        chart.mark_approved(frozen_chart_version(frozen), approved_by);
        info!("Chart {} approved as version {}", chart.id, chart.version);
        self.put_chart(chart).await
    }

    /// Decline: send a pending chart back to draft.
    pub async fn return_to_draft(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
        returned_by: Option<Uuid>,
    ) -> Result<OrgChart, DomainError> {
        let _guard = self.locks.acquire(company_id).await;
        let mut chart = self.checked(company_id, chart_id, ChartStatus::Draft).await?;
        chart.mark_returned(returned_by);
        info!("Chart {} returned to draft", chart.id);
        self.put_chart(chart).await
    }

    pub async fn revoke(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
        revoked_by: Option<Uuid>,
    ) -> Result<OrgChart, DomainError> {
        let _guard = self.locks.acquire(company_id).await;
        let mut chart = self.checked(company_id, chart_id, ChartStatus::Revoked).await?;
        chart.mark_revoked(revoked_by);
        info!("Chart {} revoked", chart.id);
        self.put_chart(chart).await
    }

    async fn checked(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
        target: ChartStatus,
    ) -> Result<OrgChart, DomainError> {
        let chart = self.load_chart(company_id, chart_id).await?;
        if !chart.status.can_transition_to(target) {
            warn!("Illegal transition for chart {}: {} -> {}", chart.id, chart.status, target);
            return Err(DomainError::InvalidTransition { from: chart.status, to: target });
        }
        Ok(chart)
    }

    async fn load_chart(&self, company_id: Uuid, id: Uuid) -> Result<OrgChart, DomainError> {
        self.store
            .get(company_id, id)
            .await?
            .and_then(OrgNode::into_org_chart)
            .ok_or(DomainError::ChartNotFound(id))
    }

    async fn put_chart(&self, chart: OrgChart) -> Result<OrgChart, DomainError> {
        self.store
            .put(chart.into())
            .await?
            .into_org_chart()
            .ok_or_else(|| DomainError::InternalError("store returned wrong node kind".into()))
    }
}
