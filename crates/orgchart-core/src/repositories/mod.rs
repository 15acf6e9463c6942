//! Storage and lookup ports

pub mod node_store;
pub mod user_directory;

pub use node_store::{HierarchyStore, NodeFilter};
pub use user_directory::UserDirectory;
