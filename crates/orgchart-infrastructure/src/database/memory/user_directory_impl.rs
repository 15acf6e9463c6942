//! In-memory user directory

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use orgchart_core::error::DomainError;
use orgchart_core::repositories::UserDirectory;

#[derive(Default)]
pub struct MemoryUserDirectory {
    names: RwLock<HashMap<Uuid, String>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: Uuid, display_name: impl Into<String>) {
        self.names.write().await.insert(user_id, display_name.into());
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, DomainError> {
        Ok(self.names.read().await.get(&user_id).cloned())
    }
}
