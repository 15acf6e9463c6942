//! Remote-procedure adapters

pub mod node_store_impl;

pub use node_store_impl::RpcHierarchyStore;
