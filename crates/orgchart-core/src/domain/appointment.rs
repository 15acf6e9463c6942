// ============================================================================
// OrgChart Core - Appointment Entity
// File: crates/orgchart-core/src/domain/appointment.rs
// Description: Binding (or vacancy) of a person to a position
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use orgchart_shared::types::sort_key_now;

/// Offer terms attached to an appointment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOffer {
    pub salary: Option<i64>,
    pub currency: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub benefits: Vec<String>,
    pub conditions: Vec<String>,
}

/// Appointment entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Appointment {
    pub id: Uuid,
    pub company_id: Uuid,
    pub org_chart_id: Uuid,
    pub position_id: Uuid,

    /// Assigned member; None while the seat is vacant.
    pub user_id: Option<Uuid>,
    pub is_vacant: bool,

    pub job_offer: Option<JobOffer>,

    // Employment lifecycle
    pub contract_signed_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub termination_notice_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000, message = "Termination reason too long"))]
    pub termination_reason: Option<String>,

    /// Position level + 1; computed once at creation.
    pub level: i32,
    pub sort_order: i64,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,

    pub revision: i64,
}

impl Appointment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        company_id: Uuid,
        org_chart_id: Uuid,
        position_id: Uuid,
        level: i32,
        user_id: Option<Uuid>,
        job_offer: Option<JobOffer>,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let appointment = Self {
            id: Uuid::new_v4(),
            company_id,
            org_chart_id,
            position_id,
            is_vacant: user_id.is_none(),
            user_id,
            job_offer,
            contract_signed_at: None,
            started_at: None,
            ended_at: None,
            termination_notice_at: None,
            termination_reason: None,
            level,
            sort_order: sort_key_now(),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            revision: 0,
        };

        appointment.validate()?;
        Ok(appointment)
    }

    pub fn vacant(
        company_id: Uuid,
        org_chart_id: Uuid,
        position_id: Uuid,
        level: i32,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        Self::new(company_id, org_chart_id, position_id, level, None, None, created_by)
    }

    /// Assign a member to the seat.
    pub fn appoint(&mut self, user_id: Uuid, appointed_by: Option<Uuid>) {
        self.user_id = Some(user_id);
        self.is_vacant = false;
        self.modified_at = Some(Utc::now());
        self.modified_by = appointed_by;
    }

    /// Remove the assigned member. Returns false if the seat was
    /// already vacant (the call is an idempotent no-op).
    pub fn vacate(&mut self, vacated_by: Option<Uuid>) -> bool {
        if self.is_vacant {
            return false;
        }
        self.user_id = None;
        self.is_vacant = true;
        self.modified_at = Some(Utc::now());
        self.modified_by = vacated_by;
        true
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
    fn test_vacant_appointment() {
        let appt =
            Appointment::vacant(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 2, None).unwrap();
        assert!(appt.is_vacant);
        assert!(appt.user_id.is_none());
    }

    #[test]
    fn test_filled_appointment() {
        let user = Uuid::new_v4();
        let appt = Appointment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            2,
            Some(user),
            None,
            None,
        )
        .unwrap();
        assert!(!appt.is_vacant);
        assert_eq!(appt.user_id, Some(user));
    }

    #[test]
    fn test_vacate_is_idempotent() {
        let mut appt = Appointment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            2,
            Some(Uuid::new_v4()),
            None,
            None,
        )
        .unwrap();

        assert!(appt.vacate(None));
        assert!(appt.is_vacant);
        assert!(appt.user_id.is_none());

        // Second removal does nothing and is not an error.
        assert!(!appt.vacate(None));
        assert!(appt.is_vacant);
    }

    #[test]
    fn test_appoint_fills_seat() {
        let mut appt =
            Appointment::vacant(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 2, None).unwrap();
        let user = Uuid::new_v4();
        appt.appoint(user, None);
        assert!(!appt.is_vacant);
        assert_eq!(appt.user_id, Some(user));
    }
}
