//! # OrgChart Core - Domain Module
//!
//! Domain entities for the org hierarchy engine.

pub mod org_chart;
pub mod department;
pub mod position;
pub mod appointment;
pub mod node;

// Re-export all entities and enums
pub use org_chart::{OrgChart, ChartStatus};
pub use department::{Department, Charter};
pub use position::{Position, JobDescription, SalaryFrequency};
pub use appointment::{Appointment, JobOffer};
pub use node::{NodeKind, OrgNode};
