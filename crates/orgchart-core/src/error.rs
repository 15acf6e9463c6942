//! Domain errors

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{ChartStatus, NodeKind};

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Org chart not found: {0}")]
    ChartNotFound(Uuid),

    #[error("Department not found: {0}")]
    DepartmentNotFound(Uuid),

    #[error("Position not found: {0}")]
    PositionNotFound(Uuid),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(Uuid),

    #[error("Cannot {operation} {kind} while chart is {status}")]
    PermissionDenied {
        kind: NodeKind,
        operation: &'static str,
        status: ChartStatus,
    },

    #[error("Field not updatable while chart is {status}: {field}")]
    FieldNotUpdatable { field: &'static str, status: ChartStatus },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Salary range invalid: max {max} below min {min}")]
    SalaryRangeInvalid { min: i64, max: i64 },

    #[error("Headcount exceeded for department {0}")]
    HeadcountExceeded(Uuid),

    #[error("Department code already exists in chart: {0}")]
    DuplicateDepartmentCode(String),

    #[error("Reporting chain cycle through position {0}")]
    ReportingCycle(Uuid),

    #[error("Code derivation conflict: {0}")]
    CodeConflict(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: ChartStatus, to: ChartStatus },

    #[error("Concurrent modification of node {0}")]
    RevisionConflict(Uuid),

    #[error("Cascade failure: {0}")]
    CascadeFailure(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
