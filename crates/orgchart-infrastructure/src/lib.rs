//! # OrgChart Infrastructure
//!
//! Store and directory adapters for the org hierarchy engine.

pub mod database;

pub use database::{build_store, MemoryHierarchyStore, MemoryUserDirectory, RpcHierarchyStore};
