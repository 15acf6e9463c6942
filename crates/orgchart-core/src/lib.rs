//! # OrgChart Core
//!
//! Domain entities, services, and storage ports for the org hierarchy engine.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod permissions;
pub mod codegen;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
