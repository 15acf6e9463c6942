// ============================================================================
// OrgChart Core - Tree Assembler
// File: crates/orgchart-core/src/services/tree_service.rs
// ============================================================================
//! Loads every node of one chart and flattens it into an ordered,
//! parent-linked row list ready for rendering. Read-only; tolerates
//! partially populated charts.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use orgchart_shared::constants::VACANT_TITLE;

use crate::domain::{Appointment, Department, NodeKind, OrgNode, Position};
use crate::error::DomainError;
use crate::repositories::{HierarchyStore, NodeFilter, UserDirectory};

/// One flattened row of the rendered tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeRow {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub kind: NodeKind,
    pub title: String,
    pub level: i32,
    pub sort_order: i64,
    pub has_children: bool,
}

pub struct TreeService<S: HierarchyStore + ?Sized, D: UserDirectory + ?Sized> {
    store: Arc<S>,
    directory: Arc<D>,
}

enum Item {
    Dept(Department),
    Pos(Position),
    Appt(Appointment),
}

impl Item {
    fn sort_order(&self) -> i64 {
        match self {
            Item::Dept(d) => d.sort_order,
            Item::Pos(p) => p.sort_order,
            Item::Appt(a) => a.sort_order,
        }
    }
}

impl<S: HierarchyStore + ?Sized, D: UserDirectory + ?Sized> TreeService<S, D> {
    pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
        Self { store, directory }
    }

    /// Flatten one chart into display rows, depth-first, siblings in
    /// ascending sort order (insertion order).
    pub async fn assemble(
        &self,
        company_id: Uuid,
        org_chart_id: Uuid,
    ) -> Result<Vec<TreeRow>, DomainError> {
        let chart = self
            .store
            .get(company_id, org_chart_id)
            .await?
            .and_then(OrgNode::into_org_chart)
            .ok_or(DomainError::ChartNotFound(org_chart_id))?;

        let mut departments: Vec<Department> = self
            .store
            .find(company_id, NodeKind::Department, NodeFilter::in_chart(chart.id))
            .await?
            .into_iter()
            .filter_map(OrgNode::into_department)
            .collect();
        let mut positions: Vec<Position> = self
            .store
            .find(company_id, NodeKind::Position, NodeFilter::in_chart(chart.id))
            .await?
            .into_iter()
            .filter_map(OrgNode::into_position)
            .collect();
        let mut appointments: Vec<Appointment> = self
            .store
            .find(company_id, NodeKind::Appointment, NodeFilter::in_chart(chart.id))
            .await?
            .into_iter()
            .filter_map(OrgNode::into_appointment)
            .collect();

        departments.sort_by_key(|d| d.sort_order);
        positions.sort_by_key(|p| p.sort_order);
        appointments.sort_by_key(|a| a.sort_order);

        let mut dept_children: HashMap<Option<Uuid>, Vec<Department>> = HashMap::new();
        for department in departments {
            dept_children
                .entry(department.parent_department_id)
                .or_default()
                .push(department);
        }
        let mut dept_positions: HashMap<Uuid, Vec<Position>> = HashMap::new();
        for position in positions {
            dept_positions.entry(position.department_id).or_default().push(position);
        }
        let mut pos_appointments: HashMap<Uuid, Vec<Appointment>> = HashMap::new();
        for appointment in appointments {
            pos_appointments.entry(appointment.position_id).or_default().push(appointment);
        }

        let roots = dept_children.remove(&None).unwrap_or_default();

        let mut rows = Vec::new();
        rows.push(TreeRow {
            id: chart.id,
            parent_id: None,
            kind: NodeKind::OrgChart,
            title: chart.title.clone(),
            level: 0,
            sort_order: chart.sort_order,
            has_children: !roots.is_empty(),
        });

        let mut stack: Vec<Item> = roots.into_iter().rev().map(Item::Dept).collect();
        while let Some(item) = stack.pop() {
            match item {
                Item::Dept(department) => {
                    let subs = dept_children.remove(&Some(department.id)).unwrap_or_default();
                    let owned = dept_positions.remove(&department.id).unwrap_or_default();
                    rows.push(TreeRow {
                        id: department.id,
                        parent_id: Some(department.parent_department_id.unwrap_or(chart.id)),
                        kind: NodeKind::Department,
                        title: department.title,
                        level: department.level,
                        sort_order: department.sort_order,
                        has_children: !subs.is_empty() || !owned.is_empty(),
                    });

                    // Sub-departments and positions are siblings under the
                    // department, interleaved by sort order.
                    let mut children: Vec<Item> = subs
                        .into_iter()
                        .map(Item::Dept)
                        .chain(owned.into_iter().map(Item::Pos))
                        .collect();
                    children.sort_by_key(Item::sort_order);
                    stack.extend(children.into_iter().rev());
                }
                Item::Pos(position) => {
                    let seats = pos_appointments.remove(&position.id).unwrap_or_default();
                    rows.push(TreeRow {
                        id: position.id,
                        parent_id: Some(position.department_id),
                        kind: NodeKind::Position,
                        title: position.title,
                        level: position.level,
                        sort_order: position.sort_order,
                        has_children: !seats.is_empty(),
                    });
                    stack.extend(seats.into_iter().rev().map(Item::Appt));
                }
                Item::Appt(appointment) => {
                    let title = self.appointment_title(&appointment).await?;
                    rows.push(TreeRow {
                        id: appointment.id,
                        parent_id: Some(appointment.position_id),
                        kind: NodeKind::Appointment,
                        title,
                        level: appointment.level,
                        sort_order: appointment.sort_order,
                        has_children: false,
                    });
                }
            }
        }
        Ok(rows)
    }

    async fn appointment_title(&self, appointment: &Appointment) -> Result<String, DomainError> {
        let Some(user_id) = appointment.user_id else {
            return Ok(VACANT_TITLE.to_string());
        };
        // A filled seat must never present as vacant, even when the
        // directory has no name for the member.
        let name = self.directory.display_name(user_id).await?;
        Ok(name.unwrap_or_else(|| user_id.to_string()))
    }
}
