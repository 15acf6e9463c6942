//! Database module (store adapters)

pub mod connection;
pub mod memory;
pub mod rpc;

pub use connection::build_store;
pub use memory::{MemoryHierarchyStore, MemoryUserDirectory};
pub use rpc::RpcHierarchyStore;
