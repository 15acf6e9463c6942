//! In-memory adapters (direct-client analog and test substrate)

pub mod node_store_impl;
pub mod user_directory_impl;

pub use node_store_impl::MemoryHierarchyStore;
pub use user_directory_impl::MemoryUserDirectory;
