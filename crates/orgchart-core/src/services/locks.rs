//! Per-scope writer locks
//!
//! One async mutex per chart (or company) id, created lazily. Holding the
//! lock for the duration of a mutation gives single-writer-per-chart
//! semantics: cascades and multi-node creates are never interleaved with
//! other writers of the same chart, while different charts proceed
//! concurrently.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub(crate) struct ScopeLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl ScopeLocks {
    pub(crate) async fn acquire(&self, scope: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(scope)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_scope_serializes() {
        let locks = Arc::new(ScopeLocks::default());
        let scope = Uuid::new_v4();

        let guard = locks.acquire(scope).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire(scope).await })
        };
        // The contender cannot finish while the guard is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());
        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_scopes_independent() {
        let locks = ScopeLocks::default();
        let _a = locks.acquire(Uuid::new_v4()).await;
        // A second scope must not block behind the first.
        let _b = locks.acquire(Uuid::new_v4()).await;
    }
}
