//! Config-driven store selection

use std::sync::Arc;
use std::time::Duration;

use orgchart_core::repositories::HierarchyStore;
use orgchart_shared::config::StorageSettings;
use orgchart_shared::error::AppError;

use super::{MemoryHierarchyStore, RpcHierarchyStore};

/// Build the configured store backend. Both backends satisfy the same
/// primitive port, so callers never branch on which one is active.
pub fn build_store(settings: &StorageSettings) -> Result<Arc<dyn HierarchyStore>, AppError> {
    match settings.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryHierarchyStore::new())),
        "rpc" => {
            let endpoint = settings.rpc_endpoint.clone().ok_or_else(|| {
                AppError::InternalError("storage.rpc_endpoint is required for the rpc backend".into())
            })?;
            let store =
                RpcHierarchyStore::new(endpoint, Duration::from_secs(settings.rpc_timeout_secs))
                    .map_err(|e| AppError::InternalError(e.to_string()))?;
            Ok(Arc::new(store))
        }
        other => Err(AppError::UnknownStorageBackend(other.to_string())),
    }
}
