// ============================================================================
// OrgChart Core - Department Entity
// File: crates/orgchart-core/src/domain/department.rs
// Description: Organizational unit, optionally nested under another department
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use orgchart_shared::types::sort_key_now;

/// Department charter (narrative content, editable after approval)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charter {
    pub mission: Option<String>,
    pub objectives: Vec<String>,
    pub responsibilities: Vec<String>,
}

/// Department entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Department {
    pub id: Uuid,
    pub company_id: Uuid,
    pub org_chart_id: Uuid,
    /// Parent department in the same chart; None for a top-level department.
    pub parent_department_id: Option<Uuid>,

    #[validate(length(min = 2, max = 150, message = "Department title must be between 2 and 150 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 30, message = "Department code must be between 1 and 30 characters"))]
    pub code: String,

    /// Maximum number of filled appointments across the department's positions.
    #[validate(range(min = 0, message = "Headcount cannot be negative"))]
    pub headcount: i32,

    pub charter: Charter,

    /// Depth relative to the chart; 0 for a top-level department.
    /// Computed once at creation, never recalculated.
    pub level: i32,
    pub sort_order: i64,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,

    pub revision: i64,
}

impl Department {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        company_id: Uuid,
        org_chart_id: Uuid,
        parent_department_id: Option<Uuid>,
        level: i32,
        title: String,
        description: Option<String>,
        code: String,
        headcount: i32,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let department = Self {
            id: Uuid::new_v4(),
            company_id,
            org_chart_id,
            parent_department_id,
            title: title.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            code,
            headcount,
            charter: Charter::default(),
            level,
            sort_order: sort_key_now(),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            revision: 0,
        };

        department.validate()?;
        Ok(department)
    }

    pub fn touch(&mut self, modified_by: Option<Uuid>) {
        self.modified_at = Some(Utc::now());
        self.modified_by = modified_by;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_department() {
        let dept = Department::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            0,
            "Finance".to_string(),
            Some("Money matters".to_string()),
            "FIN".to_string(),
            5,
            None,
        );
        assert!(dept.is_ok());
        let dept = dept.unwrap();
        assert_eq!(dept.level, 0);
        assert_eq!(dept.code, "FIN");
        assert_eq!(dept.charter, Charter::default());
    }

    #[test]
    fn test_negative_headcount_rejected() {
        let dept = Department::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            0,
            "Finance".to_string(),
            None,
            "FIN".to_string(),
            -1,
            None,
        );
        assert!(dept.is_err());
    }

    #[test]
    fn test_empty_code_rejected() {
        let dept = Department::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            0,
            "Finance".to_string(),
            None,
            String::new(),
            5,
            None,
        );
        assert!(dept.is_err());
    }
}
