// ============================================================================
// OrgChart Core - Hierarchy Mutation Engine
// File: crates/orgchart-core/src/services/hierarchy_service.rs
// ============================================================================
//! Create/update/delete operations over the hierarchy, including cascade
//! creation (department -> head position -> vacant appointment) and worklist
//! cascade deletion. Every mutation consults the permission oracle against
//! the chart's current status before writing, and runs under the owning
//! chart's writer lock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use orgchart_shared::constants::{
    DEFAULT_SALARY_CURRENCY, HEAD_POSITION_PREFIX, MAX_CODE_RETRIES,
};
use orgchart_shared::utils::normalize_code;

use crate::codegen::{next_chart_version, next_position_code};
use crate::domain::{
    Appointment, ChartStatus, Charter, Department, JobDescription, JobOffer, NodeKind, OrgChart,
    OrgNode, Position, SalaryFrequency,
};
use crate::error::DomainError;
use crate::permissions::{fields, permissions_for, Permission};
use crate::repositories::{HierarchyStore, NodeFilter};

use super::ScopeLocks;

// ----------------------------------------------------------------------------
// Inputs
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewOrgChart {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub org_chart_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub headcount: i32,
    pub parent_department_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewPosition {
    pub org_chart_id: Uuid,
    pub department_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub salary_min: i64,
    pub salary_max: i64,
    pub salary_currency: String,
    pub salary_frequency: SalaryFrequency,
    pub reports_to_position_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub position_id: Uuid,
    pub user_id: Option<Uuid>,
    pub is_vacant: bool,
    pub job_offer: Option<JobOffer>,
}

#[derive(Debug, Clone, Default)]
pub struct OrgChartUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub headcount: Option<i32>,
    pub charter: Option<Charter>,
}

impl DepartmentUpdate {
    fn touched_fields(&self) -> Vec<&'static str> {
        let mut touched = Vec::new();
        if self.title.is_some() {
            touched.push(fields::TITLE);
        }
        if self.description.is_some() {
            touched.push(fields::DESCRIPTION);
        }
        if self.headcount.is_some() {
            touched.push(fields::HEADCOUNT);
        }
        if self.charter.is_some() {
            touched.push(fields::CHARTER);
        }
        touched
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<String>,
    pub salary_frequency: Option<SalaryFrequency>,
    pub job_description: Option<JobDescription>,
    /// Some(None) clears the reporting edge; Some(Some(id)) repoints it.
    pub reports_to_position_id: Option<Option<Uuid>>,
}

impl PositionUpdate {
    fn touched_fields(&self) -> Vec<&'static str> {
        let mut touched = Vec::new();
        if self.title.is_some() {
            touched.push(fields::TITLE);
        }
        if self.description.is_some() {
            touched.push(fields::DESCRIPTION);
        }
        if self.salary_min.is_some()
            || self.salary_max.is_some()
            || self.salary_currency.is_some()
            || self.salary_frequency.is_some()
        {
            touched.push(fields::SALARY);
        }
        if self.job_description.is_some() {
            touched.push(fields::JOB_DESCRIPTION);
        }
        if self.reports_to_position_id.is_some() {
            touched.push(fields::REPORTS_TO);
        }
        touched
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentUpdate {
    pub job_offer: Option<JobOffer>,
    pub contract_signed_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub termination_notice_at: Option<DateTime<Utc>>,
    pub termination_reason: Option<String>,
}

// ----------------------------------------------------------------------------
// Results
// ----------------------------------------------------------------------------

/// Everything created by one department creation.
#[derive(Debug, Clone)]
pub struct DepartmentBundle {
    pub department: Department,
    pub head_position: Position,
    pub appointment: Appointment,
}

/// Everything created by one position creation.
#[derive(Debug, Clone)]
pub struct PositionBundle {
    pub position: Position,
    pub appointment: Appointment,
}

// ----------------------------------------------------------------------------
// Service
// ----------------------------------------------------------------------------

/// Hierarchy mutation engine over a storage port.
pub struct HierarchyService<S: HierarchyStore + ?Sized> {
    store: Arc<S>,
    locks: ScopeLocks,
}

impl<S: HierarchyStore + ?Sized> HierarchyService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, locks: ScopeLocks::default() }
    }

    // ------------------------------------------------------------------
    // Creates
    // ------------------------------------------------------------------

    /// Create a new draft chart; its version is derived from the company's
    /// existing chart counts.
    pub async fn create_org_chart(
        &self,
        company_id: Uuid,
        input: NewOrgChart,
        created_by: Option<Uuid>,
    ) -> Result<OrgChart, DomainError> {
        info!("Creating org chart: {}", input.title);
        let _guard = self.locks.acquire(company_id).await;

        let charts = self.company_charts(company_id).await?;
        let frozen = charts
            .iter()
            .filter(|c| matches!(c.status, ChartStatus::Approved | ChartStatus::Revoked))
            .count();
        let open = charts.len() - frozen;

        let version = next_chart_version(frozen, open);
        let chart =
            OrgChart::new(company_id, input.title, input.description, version, created_by)?;
        self.put_chart(chart).await
    }

    /// Create a department. As one logical unit this also creates a
    /// "Head of {title}" position with a zero salary band and a vacant
    /// appointment for it; a partial failure is rolled back.
    pub async fn create_department(
        &self,
        company_id: Uuid,
        input: NewDepartment,
        created_by: Option<Uuid>,
    ) -> Result<DepartmentBundle, DomainError> {
        info!("Creating department: {}", input.title);
        let _guard = self.locks.acquire(input.org_chart_id).await;

        let chart = self.load_chart(company_id, input.org_chart_id).await?;
        authorize_create(NodeKind::Department, chart.status)?;

        let code = normalize_code(&input.code);
        let siblings = self.chart_departments(company_id, chart.id).await?;
        if siblings.iter().any(|d| d.code == code) {
            warn!("Department code already taken: {}", code);
            return Err(DomainError::DuplicateDepartmentCode(code));
        }

        let level = match input.parent_department_id {
            Some(parent_id) => {
                let parent = siblings
                    .iter()
                    .find(|d| d.id == parent_id)
                    .ok_or(DomainError::DepartmentNotFound(parent_id))?;
                parent.level + 1
            }
            None => 0,
        };

        let department = Department::new(
            company_id,
            chart.id,
            input.parent_department_id,
            level,
            input.title,
            input.description,
            code,
            input.headcount,
            created_by,
        )?;

        let head_position = Position::new(
            company_id,
            chart.id,
            department.id,
            department.level + 1,
            format!("{} {}", HEAD_POSITION_PREFIX, department.title),
            None,
            next_position_code(&department.code, 0),
            0,
            0,
            DEFAULT_SALARY_CURRENCY.to_string(),
            SalaryFrequency::default(),
            created_by,
        )?;

        let appointment = Appointment::vacant(
            company_id,
            chart.id,
            head_position.id,
            head_position.level + 1,
            created_by,
        )?;

        let department = self.put_department(department).await?;

        let head_position = match self.put_position(head_position).await {
            Ok(position) => position,
            Err(e) => {
                return Err(self.rollback_creates(company_id, &[department.id], e).await);
            }
        };

        let appointment = match self.put_appointment(appointment).await {
            Ok(appointment) => appointment,
            Err(e) => {
                return Err(self
                    .rollback_creates(company_id, &[department.id, head_position.id], e)
                    .await);
            }
        };

        info!("Department created: {} ({})", department.id, department.code);
        Ok(DepartmentBundle { department, head_position, appointment })
    }

    /// Create a position with a derived code, plus one vacant appointment.
    pub async fn create_position(
        &self,
        company_id: Uuid,
        input: NewPosition,
        created_by: Option<Uuid>,
    ) -> Result<PositionBundle, DomainError> {
        info!("Creating position: {}", input.title);
        let _guard = self.locks.acquire(input.org_chart_id).await;

        let chart = self.load_chart(company_id, input.org_chart_id).await?;
        authorize_create(NodeKind::Position, chart.status)?;

        let department = self.load_department(company_id, input.department_id).await?;
        if department.org_chart_id != chart.id {
            return Err(DomainError::DepartmentNotFound(input.department_id));
        }

        if input.salary_max < input.salary_min {
            return Err(DomainError::SalaryRangeInvalid {
                min: input.salary_min,
                max: input.salary_max,
            });
        }

        if let Some(reports_to) = input.reports_to_position_id {
            let target = self.load_position(company_id, reports_to).await?;
            if target.org_chart_id != chart.id {
                return Err(DomainError::PositionNotFound(reports_to));
            }
        }

        let code = self.derive_position_code(company_id, &department).await?;

        let mut position = Position::new(
            company_id,
            chart.id,
            department.id,
            department.level + 1,
            input.title,
            input.description,
            code,
            input.salary_min,
            input.salary_max,
            input.salary_currency,
            input.salary_frequency,
            created_by,
        )?;
        position.reports_to_position_id = input.reports_to_position_id;

        let appointment = Appointment::vacant(
            company_id,
            chart.id,
            position.id,
            position.level + 1,
            created_by,
        )?;

        let position = self.put_position(position).await?;
        let appointment = match self.put_appointment(appointment).await {
            Ok(appointment) => appointment,
            Err(e) => {
                return Err(self.rollback_creates(company_id, &[position.id], e).await);
            }
        };

        info!("Position created: {} ({})", position.id, position.code);
        Ok(PositionBundle { position, appointment })
    }

    /// Standalone appointment creation (re-appointing after a position's
    /// prior appointment was removed).
    pub async fn create_appointment(
        &self,
        company_id: Uuid,
        input: NewAppointment,
        created_by: Option<Uuid>,
    ) -> Result<Appointment, DomainError> {
        let scoped = self.load_position(company_id, input.position_id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let position = self.load_position(company_id, input.position_id).await?;
        let chart = self.load_chart(company_id, position.org_chart_id).await?;
        authorize_create(NodeKind::Appointment, chart.status)?;

        let user_id = match (input.is_vacant, input.user_id) {
            (true, Some(_)) => {
                return Err(DomainError::ValidationError(
                    "A vacant appointment cannot carry a user".to_string(),
                ));
            }
            (false, None) => {
                return Err(DomainError::ValidationError(
                    "A filled appointment requires a user".to_string(),
                ));
            }
            (_, user_id) => user_id,
        };

        if user_id.is_some() {
            let department = self.load_department(company_id, position.department_id).await?;
            self.ensure_headcount(company_id, &department, 1).await?;
        }

        let appointment = Appointment::new(
            company_id,
            chart.id,
            position.id,
            position.level + 1,
            user_id,
            input.job_offer,
            created_by,
        )?;
        self.put_appointment(appointment).await
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    pub async fn update_org_chart(
        &self,
        company_id: Uuid,
        id: Uuid,
        update: OrgChartUpdate,
        updated_by: Option<Uuid>,
    ) -> Result<OrgChart, DomainError> {
        let _guard = self.locks.acquire(id).await;

        let mut chart = self.load_chart(company_id, id).await?;
        authorize_update(NodeKind::OrgChart, chart.status)?;

        if let Some(title) = update.title {
            chart.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            chart.description = Some(description.trim().to_string());
        }
        chart.modified_at = Some(Utc::now());
        chart.modified_by = updated_by;
        chart.validate()?;
        self.put_chart(chart).await
    }

    pub async fn update_department(
        &self,
        company_id: Uuid,
        id: Uuid,
        update: DepartmentUpdate,
        updated_by: Option<Uuid>,
    ) -> Result<Department, DomainError> {
        let scoped = self.load_department(company_id, id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let mut department = self.load_department(company_id, id).await?;
        let chart = self.load_chart(company_id, department.org_chart_id).await?;
        let permission = authorize_update(NodeKind::Department, chart.status)?;
        ensure_fields_allowed(&permission, chart.status, &update.touched_fields())?;

        if let Some(title) = update.title {
            department.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            department.description = Some(description.trim().to_string());
        }
        if let Some(headcount) = update.headcount {
            department.headcount = headcount;
        }
        if let Some(charter) = update.charter {
            department.charter = charter;
        }
        department.touch(updated_by);
        department.validate()?;
        self.put_department(department).await
    }

    pub async fn update_position(
        &self,
        company_id: Uuid,
        id: Uuid,
        update: PositionUpdate,
        updated_by: Option<Uuid>,
    ) -> Result<Position, DomainError> {
        let scoped = self.load_position(company_id, id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let mut position = self.load_position(company_id, id).await?;
        let chart = self.load_chart(company_id, position.org_chart_id).await?;
        let permission = authorize_update(NodeKind::Position, chart.status)?;
        ensure_fields_allowed(&permission, chart.status, &update.touched_fields())?;

        if let Some(title) = update.title {
            position.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            position.description = Some(description.trim().to_string());
        }
        if let Some(salary_min) = update.salary_min {
            position.salary_min = salary_min;
        }
        if let Some(salary_max) = update.salary_max {
            position.salary_max = salary_max;
        }
        if let Some(currency) = update.salary_currency {
            position.salary_currency = currency;
        }
        if let Some(frequency) = update.salary_frequency {
            position.salary_frequency = frequency;
        }
        if let Some(job_description) = update.job_description {
            position.job_description = job_description;
        }
        if position.salary_max < position.salary_min {
            return Err(DomainError::SalaryRangeInvalid {
                min: position.salary_min,
                max: position.salary_max,
            });
        }

        if let Some(reports_to) = update.reports_to_position_id {
            if let Some(manager_id) = reports_to {
                let manager = self.load_position(company_id, manager_id).await?;
                if manager.org_chart_id != chart.id {
                    return Err(DomainError::PositionNotFound(manager_id));
                }
                self.ensure_no_reporting_cycle(company_id, position.id, manager_id).await?;
            }
            position.reports_to_position_id = reports_to;
        }

        position.touch(updated_by);
        position.validate()?;
        self.put_position(position).await
    }

    pub async fn update_appointment(
        &self,
        company_id: Uuid,
        id: Uuid,
        update: AppointmentUpdate,
        updated_by: Option<Uuid>,
    ) -> Result<Appointment, DomainError> {
        let scoped = self.load_appointment(company_id, id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let mut appointment = self.load_appointment(company_id, id).await?;
        let chart = self.load_chart(company_id, appointment.org_chart_id).await?;
        authorize_update(NodeKind::Appointment, chart.status)?;

        if let Some(job_offer) = update.job_offer {
            appointment.job_offer = Some(job_offer);
        }
        if let Some(at) = update.contract_signed_at {
            appointment.contract_signed_at = Some(at);
        }
        if let Some(at) = update.started_at {
            appointment.started_at = Some(at);
        }
        if let Some(at) = update.ended_at {
            appointment.ended_at = Some(at);
        }
        if let Some(at) = update.termination_notice_at {
            appointment.termination_notice_at = Some(at);
        }
        if let Some(reason) = update.termination_reason {
            appointment.termination_reason = Some(reason);
        }
        appointment.touch(updated_by);
        appointment.validate()?;
        self.put_appointment(appointment).await
    }

    /// Assign a member to an appointment, enforcing department headcount
    /// when a vacant seat is being filled.
    pub async fn appoint_user(
        &self,
        company_id: Uuid,
        id: Uuid,
        user_id: Uuid,
        appointed_by: Option<Uuid>,
    ) -> Result<Appointment, DomainError> {
        let scoped = self.load_appointment(company_id, id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let mut appointment = self.load_appointment(company_id, id).await?;
        let chart = self.load_chart(company_id, appointment.org_chart_id).await?;
        authorize_update(NodeKind::Appointment, chart.status)?;

        if appointment.is_vacant {
            let position = self.load_position(company_id, appointment.position_id).await?;
            let department = self.load_department(company_id, position.department_id).await?;
            self.ensure_headcount(company_id, &department, 1).await?;
        }

        appointment.appoint(user_id, appointed_by);
        self.put_appointment(appointment).await
    }

    /// Remove the assigned member from an appointment. Vacating an already
    /// vacant appointment is a no-op, not an error.
    pub async fn vacate_appointment(
        &self,
        company_id: Uuid,
        id: Uuid,
        vacated_by: Option<Uuid>,
    ) -> Result<Appointment, DomainError> {
        let scoped = self.load_appointment(company_id, id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let mut appointment = self.load_appointment(company_id, id).await?;
        let chart = self.load_chart(company_id, appointment.org_chart_id).await?;
        authorize_update(NodeKind::Appointment, chart.status)?;

        if !appointment.vacate(vacated_by) {
            return Ok(appointment);
        }
        self.put_appointment(appointment).await
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    /// Cascade delete: one hierarchy load collects every descendant, then
    /// removal proceeds appointments -> positions -> departments, children
    /// before parents.
    pub async fn delete_department(&self, company_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let scoped = self.load_department(company_id, id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let Some(department) = self
            .store
            .get(company_id, id)
            .await?
            .and_then(OrgNode::into_department)
        else {
            // Vanished between the lookup and the lock; already satisfied.
            return Ok(());
        };

        let chart = self.load_chart(company_id, department.org_chart_id).await?;
        authorize_delete(NodeKind::Department, chart.status)?;

        let departments = self.chart_departments(company_id, chart.id).await?;
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for d in &departments {
            if let Some(parent_id) = d.parent_department_id {
                children.entry(parent_id).or_default().push(d.id);
            }
        }

        // Worklist order: parents precede children.
        let mut subtree = vec![department.id];
        let mut index = 0;
        while index < subtree.len() {
            if let Some(kids) = children.get(&subtree[index]) {
                subtree.extend(kids.iter().copied());
            }
            index += 1;
        }
        let subtree_set: HashSet<Uuid> = subtree.iter().copied().collect();

        let positions: Vec<Position> = self
            .chart_positions(company_id, chart.id)
            .await?
            .into_iter()
            .filter(|p| subtree_set.contains(&p.department_id))
            .collect();
        let position_set: HashSet<Uuid> = positions.iter().map(|p| p.id).collect();

        let appointments: Vec<Appointment> = self
            .chart_appointments(company_id, chart.id)
            .await?
            .into_iter()
            .filter(|a| position_set.contains(&a.position_id))
            .collect();

        info!(
            "Cascade deleting department {}: {} departments, {} positions, {} appointments",
            department.id,
            subtree.len(),
            positions.len(),
            appointments.len()
        );

        // Leaf-to-root worklist: appointments, positions, then the subtree
        // departments with children ahead of their parents.
        let mut by_id: HashMap<Uuid, Department> =
            departments.into_iter().map(|d| (d.id, d)).collect();
        let mut worklist: Vec<OrgNode> = Vec::new();
        worklist.extend(appointments.into_iter().map(OrgNode::from));
        worklist.extend(positions.into_iter().map(OrgNode::from));
        for department_id in subtree.iter().rev() {
            if let Some(d) = by_id.remove(department_id) {
                worklist.push(d.into());
            }
        }
        self.remove_all_or_restore(company_id, worklist).await
    }

    /// Delete a position and every appointment referencing it.
    pub async fn delete_position(&self, company_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let scoped = self.load_position(company_id, id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let Some(position) = self
            .store
            .get(company_id, id)
            .await?
            .and_then(OrgNode::into_position)
        else {
            return Ok(());
        };

        let chart = self.load_chart(company_id, position.org_chart_id).await?;
        authorize_delete(NodeKind::Position, chart.status)?;

        let mut worklist = self
            .store
            .find(company_id, NodeKind::Appointment, NodeFilter::in_position(position.id))
            .await?;
        worklist.push(position.into());
        self.remove_all_or_restore(company_id, worklist).await
    }

    /// Leaf deletion, no cascade.
    pub async fn delete_appointment(&self, company_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let scoped = self.load_appointment(company_id, id).await?;
        let _guard = self.locks.acquire(scoped.org_chart_id).await;

        let Some(appointment) = self
            .store
            .get(company_id, id)
            .await?
            .and_then(OrgNode::into_appointment)
        else {
            return Ok(());
        };

        let chart = self.load_chart(company_id, appointment.org_chart_id).await?;
        authorize_delete(NodeKind::Appointment, chart.status)?;
        self.store.remove(company_id, appointment.id).await
    }

    // ------------------------------------------------------------------
    // Loads
    // ------------------------------------------------------------------

    async fn load_chart(&self, company_id: Uuid, id: Uuid) -> Result<OrgChart, DomainError> {
        self.store
            .get(company_id, id)
            .await?
            .and_then(OrgNode::into_org_chart)
            .ok_or(DomainError::ChartNotFound(id))
    }

    async fn load_department(&self, company_id: Uuid, id: Uuid) -> Result<Department, DomainError> {
        self.store
            .get(company_id, id)
            .await?
            .and_then(OrgNode::into_department)
            .ok_or(DomainError::DepartmentNotFound(id))
    }

    async fn load_position(&self, company_id: Uuid, id: Uuid) -> Result<Position, DomainError> {
        self.store
            .get(company_id, id)
            .await?
            .and_then(OrgNode::into_position)
            .ok_or(DomainError::PositionNotFound(id))
    }

    async fn load_appointment(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Appointment, DomainError> {
        self.store
            .get(company_id, id)
            .await?
            .and_then(OrgNode::into_appointment)
            .ok_or(DomainError::AppointmentNotFound(id))
    }

    async fn company_charts(&self, company_id: Uuid) -> Result<Vec<OrgChart>, DomainError> {
        let nodes = self.store.find(company_id, NodeKind::OrgChart, NodeFilter::all()).await?;
        Ok(nodes.into_iter().filter_map(OrgNode::into_org_chart).collect())
    }

    async fn chart_departments(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
    ) -> Result<Vec<Department>, DomainError> {
        let nodes = self
            .store
            .find(company_id, NodeKind::Department, NodeFilter::in_chart(chart_id))
            .await?;
        Ok(nodes.into_iter().filter_map(OrgNode::into_department).collect())
    }

    async fn chart_positions(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
    ) -> Result<Vec<Position>, DomainError> {
        let nodes = self
            .store
            .find(company_id, NodeKind::Position, NodeFilter::in_chart(chart_id))
            .await?;
        Ok(nodes.into_iter().filter_map(OrgNode::into_position).collect())
    }

    async fn chart_appointments(
        &self,
        company_id: Uuid,
        chart_id: Uuid,
    ) -> Result<Vec<Appointment>, DomainError> {
        let nodes = self
            .store
            .find(company_id, NodeKind::Appointment, NodeFilter::in_chart(chart_id))
            .await?;
        Ok(nodes.into_iter().filter_map(OrgNode::into_appointment).collect())
    }

    // ------------------------------------------------------------------
    // Puts
    // ------------------------------------------------------------------

    async fn put_chart(&self, chart: OrgChart) -> Result<OrgChart, DomainError> {
        self.store
            .put(chart.into())
            .await?
            .into_org_chart()
            .ok_or_else(|| DomainError::InternalError("store returned wrong node kind".into()))
    }

    async fn put_department(&self, department: Department) -> Result<Department, DomainError> {
        self.store
            .put(department.into())
            .await?
            .into_department()
            .ok_or_else(|| DomainError::InternalError("store returned wrong node kind".into()))
    }

    async fn put_position(&self, position: Position) -> Result<Position, DomainError> {
        self.store
            .put(position.into())
            .await?
            .into_position()
            .ok_or_else(|| DomainError::InternalError("store returned wrong node kind".into()))
    }

    async fn put_appointment(&self, appointment: Appointment) -> Result<Appointment, DomainError> {
        self.store
            .put(appointment.into())
            .await?
            .into_appointment()
            .ok_or_else(|| DomainError::InternalError("store returned wrong node kind".into()))
    }

    // ------------------------------------------------------------------
    // Invariant helpers
    // ------------------------------------------------------------------

    /// Derive a unique position code for the department. The first attempt
    /// uses sibling count + 1; a collision (counts go stale after
    /// deletions) re-reads and continues from the highest sequence in use.
    async fn derive_position_code(
        &self,
        company_id: Uuid,
        department: &Department,
    ) -> Result<String, DomainError> {
        let mut last_candidate = String::new();
        for attempt in 0..MAX_CODE_RETRIES {
            let in_department = self
                .store
                .find(company_id, NodeKind::Position, NodeFilter::in_department(department.id))
                .await?;
            let in_chart = self
                .store
                .find(
                    company_id,
                    NodeKind::Position,
                    NodeFilter::in_chart(department.org_chart_id),
                )
                .await?;
            let taken: HashSet<String> = in_chart
                .into_iter()
                .filter_map(OrgNode::into_position)
                .map(|p| p.code)
                .collect();

            let candidate = if attempt == 0 {
                next_position_code(&department.code, in_department.len())
            } else {
                let prefix = format!("{}-", department.code);
                let max_seq = taken
                    .iter()
                    .filter_map(|code| code.strip_prefix(&prefix))
                    .filter_map(|seq| seq.parse::<usize>().ok())
                    .max()
                    .unwrap_or(0);
                next_position_code(&department.code, max_seq)
            };

            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
            warn!("Position code collision, retrying: {}", candidate);
            last_candidate = candidate;
        }
        Err(DomainError::CodeConflict(last_candidate))
    }

    /// Filled appointments across the department's positions must stay
    /// within its headcount.
    async fn ensure_headcount(
        &self,
        company_id: Uuid,
        department: &Department,
        additional: usize,
    ) -> Result<(), DomainError> {
        let position_ids: HashSet<Uuid> = self
            .store
            .find(company_id, NodeKind::Position, NodeFilter::in_department(department.id))
            .await?
            .into_iter()
            .map(|n| n.id())
            .collect();

        let filled = self
            .chart_appointments(company_id, department.org_chart_id)
            .await?
            .into_iter()
            .filter(|a| !a.is_vacant && position_ids.contains(&a.position_id))
            .count();

        if filled + additional > department.headcount as usize {
            warn!("Headcount exceeded for department {}", department.id);
            return Err(DomainError::HeadcountExceeded(department.id));
        }
        Ok(())
    }

    /// The reporting graph is separate from department containment and
    /// nothing constructs it acyclic; walk the chain with a visited set
    /// before accepting a new edge.
    async fn ensure_no_reporting_cycle(
        &self,
        company_id: Uuid,
        position_id: Uuid,
        manager_id: Uuid,
    ) -> Result<(), DomainError> {
        let mut visited = HashSet::new();
        let mut current = Some(manager_id);
        while let Some(id) = current {
            if id == position_id {
                return Err(DomainError::ReportingCycle(position_id));
            }
            if !visited.insert(id) {
                // A pre-existing loop elsewhere in the graph; the new edge
                // does not pass through this position, so stop the walk.
                break;
            }
            current = self.load_position(company_id, id).await?.reports_to_position_id;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Failure handling
    // ------------------------------------------------------------------

    /// Undo already-written nodes of a failed multi-node create. If the
    /// rollback itself fails the store is torn and the error says so.
    async fn rollback_creates(
        &self,
        company_id: Uuid,
        created: &[Uuid],
        cause: DomainError,
    ) -> DomainError {
        for id in created.iter().rev() {
            if let Err(e) = self.store.remove(company_id, *id).await {
                error!("Rollback failed for node {}: {}", id, e);
                return DomainError::CascadeFailure(format!(
                    "create failed ({cause}) and rollback of node {id} failed: {e}"
                ));
            }
        }
        cause
    }

    /// Remove every node in worklist order. A step that still fails after
    /// one retry aborts the cascade and re-inserts the nodes already
    /// removed, so a concurrent reader only ever observes the pre-delete
    /// or the fully-deleted state.
    async fn remove_all_or_restore(
        &self,
        company_id: Uuid,
        worklist: Vec<OrgNode>,
    ) -> Result<(), DomainError> {
        let mut removed: Vec<OrgNode> = Vec::with_capacity(worklist.len());
        for node in worklist {
            match self.remove_with_retry(company_id, node.id()).await {
                Ok(()) => removed.push(node),
                Err(cause) => return Err(self.restore_removed(removed, cause).await),
            }
        }
        Ok(())
    }

    async fn restore_removed(&self, removed: Vec<OrgNode>, cause: DomainError) -> DomainError {
        for mut node in removed.into_iter().rev() {
            // Re-insert as a fresh write; the previous token died with the
            // removal.
            node.set_revision(0);
            let id = node.id();
            if let Err(e) = self.store.put(node).await {
                error!("Cascade rollback failed for node {}: {}", id, e);
                return DomainError::CascadeFailure(format!(
                    "{cause}; rollback of node {id} also failed: {e}"
                ));
            }
        }
        cause
    }

    async fn remove_with_retry(&self, company_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        if let Err(first) = self.store.remove(company_id, id).await {
            warn!("Cascade remove failed for {}, retrying: {}", id, first);
            if let Err(second) = self.store.remove(company_id, id).await {
                error!("Cascade remove failed twice for {}: {}", id, second);
                return Err(DomainError::CascadeFailure(format!(
                    "node {id} could not be removed: {second}"
                )));
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Oracle checks
// ----------------------------------------------------------------------------

fn authorize_create(kind: NodeKind, status: ChartStatus) -> Result<Permission, DomainError> {
    let permission = permissions_for(kind, status);
    if !permission.can_create {
        warn!("Create denied for {} while chart is {}", kind, status);
        return Err(DomainError::PermissionDenied { kind, operation: "create", status });
    }
    Ok(permission)
}

fn authorize_update(kind: NodeKind, status: ChartStatus) -> Result<Permission, DomainError> {
    let permission = permissions_for(kind, status);
    if !permission.can_update {
        warn!("Update denied for {} while chart is {}", kind, status);
        return Err(DomainError::PermissionDenied { kind, operation: "update", status });
    }
    Ok(permission)
}

fn authorize_delete(kind: NodeKind, status: ChartStatus) -> Result<Permission, DomainError> {
    let permission = permissions_for(kind, status);
    if !permission.can_delete {
        warn!("Delete denied for {} while chart is {}", kind, status);
        return Err(DomainError::PermissionDenied { kind, operation: "delete", status });
    }
    Ok(permission)
}

/// Restricted updates must reject out-of-set fields, never drop them.
fn ensure_fields_allowed(
    permission: &Permission,
    status: ChartStatus,
    touched: &[&'static str],
) -> Result<(), DomainError> {
    for &field in touched {
        if !permission.field_allowed(field) {
            warn!("Field rejected while chart is {}: {}", status, field);
            return Err(DomainError::FieldNotUpdatable { field, status });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        Store {}

        #[async_trait::async_trait]
        impl HierarchyStore for Store {
            async fn get(&self, company_id: Uuid, id: Uuid) -> Result<Option<OrgNode>, DomainError>;
            async fn put(&self, node: OrgNode) -> Result<OrgNode, DomainError>;
            async fn remove(&self, company_id: Uuid, id: Uuid) -> Result<(), DomainError>;
            async fn find(
                &self,
                company_id: Uuid,
                kind: NodeKind,
                filter: NodeFilter,
            ) -> Result<Vec<OrgNode>, DomainError>;
        }
    }

    fn pending_chart(company_id: Uuid) -> OrgChart {
        let mut chart =
            OrgChart::new(company_id, "Main".to_string(), None, "1.0".into(), None).unwrap();
        chart.mark_submitted(None);
        chart
    }

    /// A denied update must fail before any write reaches the store: the
    /// mock panics on an unexpected put.
    #[tokio::test]
    async fn test_frozen_salary_update_never_touches_store() {
        let company_id = Uuid::new_v4();
        let chart = pending_chart(company_id);
        let position = Position::new(
            company_id,
            chart.id,
            Uuid::new_v4(),
            1,
            "Accountant".to_string(),
            None,
            "FIN-001".to_string(),
            0,
            0,
            "USD".to_string(),
            SalaryFrequency::Annual,
            None,
        )
        .unwrap();
        let position_id = position.id;
        let chart_id = chart.id;

        let mut store = MockStore::new();
        store.expect_get().returning(move |_, id| {
            if id == position_id {
                Ok(Some(position.clone().into()))
            } else if id == chart_id {
                Ok(Some(chart.clone().into()))
            } else {
                Ok(None)
            }
        });

        let service = HierarchyService::new(Arc::new(store));
        let update = PositionUpdate { salary_min: Some(9_999), ..Default::default() };
        let err = service
            .update_position(company_id, position_id, update, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::FieldNotUpdatable { field, .. } if field == fields::SALARY));
    }

    #[tokio::test]
    async fn test_delete_department_denied_outside_draft() {
        let company_id = Uuid::new_v4();
        let chart = pending_chart(company_id);
        let department = Department::new(
            company_id,
            chart.id,
            None,
            0,
            "Finance".to_string(),
            None,
            "FIN".to_string(),
            5,
            None,
        )
        .unwrap();
        let department_id = department.id;
        let chart_id = chart.id;

        let mut store = MockStore::new();
        store.expect_get().returning(move |_, id| {
            if id == department_id {
                Ok(Some(department.clone().into()))
            } else if id == chart_id {
                Ok(Some(chart.clone().into()))
            } else {
                Ok(None)
            }
        });

        let service = HierarchyService::new(Arc::new(store));
        let err = service.delete_department(company_id, department_id).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::PermissionDenied { kind: NodeKind::Department, operation: "delete", .. }
        ));
    }
}
