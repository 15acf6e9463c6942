// ============================================================================
// OrgChart Core - Node Wrapper
// File: crates/orgchart-core/src/domain/node.rs
// Description: Uniform wrapper over the four node kinds, the unit the
//              storage port traffics in
// ============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Appointment, Department, OrgChart, Position};

/// Node kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    OrgChart,
    Department,
    Position,
    Appointment,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::OrgChart => "org_chart",
            NodeKind::Department => "department",
            NodeKind::Position => "position",
            NodeKind::Appointment => "appointment",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the hierarchy, any kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrgNode {
    OrgChart(OrgChart),
    Department(Department),
    Position(Position),
    Appointment(Appointment),
}

impl OrgNode {
    pub fn id(&self) -> Uuid {
        match self {
            OrgNode::OrgChart(c) => c.id,
            OrgNode::Department(d) => d.id,
            OrgNode::Position(p) => p.id,
            OrgNode::Appointment(a) => a.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            OrgNode::OrgChart(_) => NodeKind::OrgChart,
            OrgNode::Department(_) => NodeKind::Department,
            OrgNode::Position(_) => NodeKind::Position,
            OrgNode::Appointment(_) => NodeKind::Appointment,
        }
    }

    pub fn company_id(&self) -> Uuid {
        match self {
            OrgNode::OrgChart(c) => c.company_id,
            OrgNode::Department(d) => d.company_id,
            OrgNode::Position(p) => p.company_id,
            OrgNode::Appointment(a) => a.company_id,
        }
    }

    /// The chart this node belongs to; the chart itself returns its own id.
    pub fn org_chart_id(&self) -> Uuid {
        match self {
            OrgNode::OrgChart(c) => c.id,
            OrgNode::Department(d) => d.org_chart_id,
            OrgNode::Position(p) => p.org_chart_id,
            OrgNode::Appointment(a) => a.org_chart_id,
        }
    }

    /// Owning department, for nodes that have one.
    pub fn department_id(&self) -> Option<Uuid> {
        match self {
            OrgNode::Position(p) => Some(p.department_id),
            _ => None,
        }
    }

    /// Owning position, for nodes that have one.
    pub fn position_id(&self) -> Option<Uuid> {
        match self {
            OrgNode::Appointment(a) => Some(a.position_id),
            _ => None,
        }
    }

    pub fn sort_order(&self) -> i64 {
        match self {
            OrgNode::OrgChart(c) => c.sort_order,
            OrgNode::Department(d) => d.sort_order,
            OrgNode::Position(p) => p.sort_order,
            OrgNode::Appointment(a) => a.sort_order,
        }
    }

    pub fn revision(&self) -> i64 {
        match self {
            OrgNode::OrgChart(c) => c.revision,
            OrgNode::Department(d) => d.revision,
            OrgNode::Position(p) => p.revision,
            OrgNode::Appointment(a) => a.revision,
        }
    }

    pub fn set_revision(&mut self, revision: i64) {
        match self {
            OrgNode::OrgChart(c) => c.revision = revision,
            OrgNode::Department(d) => d.revision = revision,
            OrgNode::Position(p) => p.revision = revision,
            OrgNode::Appointment(a) => a.revision = revision,
        }
    }

    pub fn into_org_chart(self) -> Option<OrgChart> {
        match self {
            OrgNode::OrgChart(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_department(self) -> Option<Department> {
        match self {
            OrgNode::Department(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_position(self) -> Option<Position> {
        match self {
            OrgNode::Position(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_appointment(self) -> Option<Appointment> {
        match self {
            OrgNode::Appointment(a) => Some(a),
            _ => None,
        }
    }
}

impl From<OrgChart> for OrgNode {
    fn from(chart: OrgChart) -> Self {
        OrgNode::OrgChart(chart)
    }
}

impl From<Department> for OrgNode {
    fn from(department: Department) -> Self {
        OrgNode::Department(department)
    }
}

impl From<Position> for OrgNode {
    fn from(position: Position) -> Self {
        OrgNode::Position(position)
    }
}

impl From<Appointment> for OrgNode {
    fn from(appointment: Appointment) -> Self {
        OrgNode::Appointment(appointment)
    }
}
