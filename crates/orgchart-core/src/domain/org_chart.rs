// ============================================================================
// OrgChart Core - Org Chart Entity
// File: crates/orgchart-core/src/domain/org_chart.rs
// Description: Versioned root container of one company structure snapshot
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use orgchart_shared::types::sort_key_now;

/// Chart lifecycle status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStatus {
    Draft,
    PendingApproval,
    Approved,
    Revoked,
}

impl ChartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartStatus::Draft => "draft",
            ChartStatus::PendingApproval => "pending_approval",
            ChartStatus::Approved => "approved",
            ChartStatus::Revoked => "revoked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ChartStatus::Draft),
            "pending_approval" => Some(ChartStatus::PendingApproval),
            "approved" => Some(ChartStatus::Approved),
            "revoked" => Some(ChartStatus::Revoked),
            _ => None,
        }
    }

    /// Legal lifecycle transitions. Revoked is terminal and approval
    /// can never be reached without passing through pending_approval.
    pub fn can_transition_to(&self, next: ChartStatus) -> bool {
        matches!(
            (self, next),
            (ChartStatus::Draft, ChartStatus::PendingApproval)
                | (ChartStatus::PendingApproval, ChartStatus::Approved)
                | (ChartStatus::PendingApproval, ChartStatus::Draft)
                | (ChartStatus::Approved, ChartStatus::Revoked)
        )
    }
}

impl Default for ChartStatus {
    fn default() -> Self {
        ChartStatus::Draft
    }
}

impl std::fmt::Display for ChartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Org Chart entity (root of one hierarchy tree)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrgChart {
    pub id: Uuid,
    pub company_id: Uuid,

    #[validate(length(min = 2, max = 150, message = "Chart title must be between 2 and 150 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,

    pub status: ChartStatus,
    /// Derived "<major>.<minor>" version string; minor freezes to 0 on approval.
    pub version: String,

    pub enforced_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub submitted_by: Option<Uuid>,

    pub sort_order: i64,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,

    /// Optimistic concurrency token maintained by the store.
    pub revision: i64,
}

impl OrgChart {
    pub fn new(
        company_id: Uuid,
        title: String,
        description: Option<String>,
        version: String,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let chart = Self {
            id: Uuid::new_v4(),
            company_id,
            title: title.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            status: ChartStatus::Draft,
            version,
            enforced_at: None,
            revoked_at: None,
            approved_at: None,
            approved_by: None,
            submitted_at: None,
            submitted_by: None,
            sort_order: sort_key_now(),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            revision: 0,
        };

        chart.validate()?;
        Ok(chart)
    }

    pub fn mark_submitted(&mut self, submitted_by: Option<Uuid>) {
        self.status = ChartStatus::PendingApproval;
        self.submitted_at = Some(Utc::now());
        self.submitted_by = submitted_by;
        self.modified_at = Some(Utc::now());
        self.modified_by = submitted_by;
    }

    pub fn mark_returned(&mut self, returned_by: Option<Uuid>) {
        self.status = ChartStatus::Draft;
        self.submitted_at = None;
        self.submitted_by = None;
        self.modified_at = Some(Utc::now());
        self.modified_by = returned_by;
    }

    pub fn mark_approved(&mut self, version: String, approved_by: Option<Uuid>) {
        self.status = ChartStatus::Approved;
        self.version = version;
        self.approved_at = Some(Utc::now());
        self.approved_by = approved_by;
        if self.enforced_at.is_none() {
            self.enforced_at = Some(Utc::now());
        }
        self.modified_at = Some(Utc::now());
        self.modified_by = approved_by;
    }

    pub fn mark_revoked(&mut self, revoked_by: Option<Uuid>) {
        self.status = ChartStatus::Revoked;
        self.revoked_at = Some(Utc::now());
        self.modified_at = Some(Utc::now());
        self.modified_by = revoked_by;
    }

    pub fn is_draft(&self) -> bool {
        self.status == ChartStatus::Draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_chart() {
        let chart = OrgChart::new(
            Uuid::new_v4(),
            "2026 Structure".to_string(),
            None,
            "1.0".to_string(),
            None,
        );
        assert!(chart.is_ok());
        let chart = chart.unwrap();
        assert_eq!(chart.status, ChartStatus::Draft);
        assert_eq!(chart.version, "1.0");
        assert!(chart.enforced_at.is_none());
    }

    #[test]
    fn test_title_too_short() {
        let chart = OrgChart::new(Uuid::new_v4(), "X".to_string(), None, "1.0".into(), None);
        assert!(chart.is_err());
    }

    #[test]
    fn test_transitions() {
        use ChartStatus::*;
        assert!(Draft.can_transition_to(PendingApproval));
        assert!(PendingApproval.can_transition_to(Approved));
        assert!(PendingApproval.can_transition_to(Draft));
        assert!(Approved.can_transition_to(Revoked));

        assert!(!Draft.can_transition_to(Approved));
        assert!(!Draft.can_transition_to(Revoked));
        assert!(!Approved.can_transition_to(Draft));
        assert!(!Revoked.can_transition_to(Draft));
        assert!(!Revoked.can_transition_to(Approved));
        assert!(!Revoked.can_transition_to(PendingApproval));
    }

    #[test]
    fn test_approve_sets_enforced_once() {
        let mut chart =
            OrgChart::new(Uuid::new_v4(), "Main".to_string(), None, "1.0".into(), None).unwrap();
        chart.mark_submitted(None);
        chart.mark_approved("1.0".into(), Some(Uuid::new_v4()));
        let first = chart.enforced_at;
        assert!(first.is_some());

        chart.mark_approved("2.0".into(), None);
        assert_eq!(chart.enforced_at, first);
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["draft", "pending_approval", "approved", "revoked"] {
            assert_eq!(ChartStatus::from_str(s).unwrap().as_str(), s);
        }
        assert!(ChartStatus::from_str("archived").is_none());
    }
}
