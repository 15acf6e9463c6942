// ============================================================================
// OrgChart Core - Permission Oracle
// File: crates/orgchart-core/src/permissions.rs
// Description: Pure mapping from (node kind, chart status) to a permission
//              record. Structural shape freezes once a chart leaves draft;
//              narrative content and staffing stay editable.
// ============================================================================

use crate::domain::{ChartStatus, NodeKind};

/// Update-gated field names.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const HEADCOUNT: &str = "headcount";
    pub const CHARTER: &str = "charter";
    pub const SALARY: &str = "salary";
    pub const REPORTS_TO: &str = "reports_to";
    pub const JOB_DESCRIPTION: &str = "job_description";
}

/// Permission record for one (kind, status) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub can_create: bool,
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
    /// None means every field is updatable; Some restricts to the listed set.
    pub updatable_fields: Option<&'static [&'static str]>,
}

impl Permission {
    const fn full_crud() -> Self {
        Self {
            can_create: true,
            can_read: true,
            can_update: true,
            can_delete: true,
            updatable_fields: None,
        }
    }

    const fn read_only() -> Self {
        Self {
            can_create: false,
            can_read: true,
            can_update: false,
            can_delete: false,
            updatable_fields: None,
        }
    }

    const fn limited_update(fields: &'static [&'static str]) -> Self {
        Self {
            can_create: false,
            can_read: true,
            can_update: true,
            can_delete: false,
            updatable_fields: Some(fields),
        }
    }

    pub fn field_allowed(&self, field: &str) -> bool {
        match self.updatable_fields {
            None => true,
            Some(allowed) => allowed.contains(&field),
        }
    }
}

const DEPARTMENT_FROZEN_FIELDS: &[&str] = &[fields::CHARTER, fields::DESCRIPTION];
const POSITION_FROZEN_FIELDS: &[&str] = &[fields::JOB_DESCRIPTION, fields::DESCRIPTION];

/// The policy table. Appointments remain fully mutable in every status
/// because staffing continues regardless of chart approval state.
pub fn permissions_for(kind: NodeKind, status: ChartStatus) -> Permission {
    match (kind, status) {
        (NodeKind::OrgChart, ChartStatus::Draft) => Permission {
            can_create: true,
            can_read: true,
            can_update: true,
            can_delete: false,
            updatable_fields: None,
        },
        (NodeKind::OrgChart, _) => Permission::read_only(),

        (NodeKind::Department, ChartStatus::Draft) => Permission::full_crud(),
        (NodeKind::Department, _) => Permission::limited_update(DEPARTMENT_FROZEN_FIELDS),

        (NodeKind::Position, ChartStatus::Draft) => Permission::full_crud(),
        (NodeKind::Position, _) => Permission::limited_update(POSITION_FROZEN_FIELDS),

        (NodeKind::Appointment, _) => Permission::full_crud(),
    }
}
