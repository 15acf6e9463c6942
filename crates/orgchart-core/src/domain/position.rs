// ============================================================================
// OrgChart Core - Position Entity
// File: crates/orgchart-core/src/domain/position.rs
// Description: Role within a department, carrying salary band and job description
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use orgchart_shared::types::sort_key_now;

/// Salary frequency enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryFrequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Annual,
    PerJob,
}

impl SalaryFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryFrequency::Hourly => "hourly",
            SalaryFrequency::Daily => "daily",
            SalaryFrequency::Weekly => "weekly",
            SalaryFrequency::Monthly => "monthly",
            SalaryFrequency::Annual => "annual",
            SalaryFrequency::PerJob => "per_job",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hourly" => Some(SalaryFrequency::Hourly),
            "daily" => Some(SalaryFrequency::Daily),
            "weekly" => Some(SalaryFrequency::Weekly),
            "monthly" => Some(SalaryFrequency::Monthly),
            "annual" => Some(SalaryFrequency::Annual),
            "per_job" => Some(SalaryFrequency::PerJob),
            _ => None,
        }
    }
}

impl Default for SalaryFrequency {
    fn default() -> Self {
        SalaryFrequency::Annual
    }
}

/// Job description (narrative content, editable after approval)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    pub summary: Option<String>,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub qualifications: Vec<String>,
    pub benefits: Vec<String>,
}

/// Position entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Position {
    pub id: Uuid,
    pub company_id: Uuid,
    pub org_chart_id: Uuid,
    pub department_id: Uuid,

    #[validate(length(min = 2, max = 150, message = "Position title must be between 2 and 150 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,

    /// Derived "{department code}-{seq}" identifier, never user-supplied.
    pub code: String,

    /// Reporting edge, orthogonal to department containment.
    pub reports_to_position_id: Option<Uuid>,

    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary_min: i64,
    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary_max: i64,
    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub salary_currency: String,
    pub salary_frequency: SalaryFrequency,

    pub job_description: JobDescription,

    /// Department level + 1; computed once at creation.
    pub level: i32,
    pub sort_order: i64,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,

    pub revision: i64,
}

impl Position {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        company_id: Uuid,
        org_chart_id: Uuid,
        department_id: Uuid,
        level: i32,
        title: String,
        description: Option<String>,
        code: String,
        salary_min: i64,
        salary_max: i64,
        salary_currency: String,
        salary_frequency: SalaryFrequency,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let position = Self {
            id: Uuid::new_v4(),
            company_id,
            org_chart_id,
            department_id,
            title: title.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            code,
            reports_to_position_id: None,
            salary_min,
            salary_max,
            salary_currency,
            salary_frequency,
            job_description: JobDescription::default(),
            level,
            sort_order: sort_key_now(),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            revision: 0,
        };

        position.validate()?;
        Ok(position)
    }

    pub fn touch(&mut self, modified_by: Option<Uuid>) {
        self.modified_at = Some(Utc::now());
        self.modified_by = modified_by;
    }
}
