//! User directory trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;

/// Display-name lookup for appointed members, consumed by the tree assembler.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: Uuid) -> Result<Option<String>, DomainError>;
}
