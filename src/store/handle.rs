use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::error;

use super::supabase::PostgrestConfig;
use super::{DocumentStore, MemoryStore, PostgrestStore, Result, StoreError};

#[derive(Clone)]
pub enum StoreBackend {
    Postgrest(PostgrestConfig),
    Memory(MemoryStore),
}

/// Process-wide store connection, established on first use.
///
/// Concurrent first callers share one connection attempt. A failed attempt
/// leaves the handle empty so the next caller tries again.
pub struct StoreHandle {
    backend: StoreBackend,
    cell: OnceCell<Arc<dyn DocumentStore>>,
}

impl StoreHandle {
    pub fn new(backend: StoreBackend) -> Self {
        Self {
            backend,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<dyn DocumentStore>> {
        let store = self
            .cell
            .get_or_try_init(|| async {
                let store: Arc<dyn DocumentStore> = match &self.backend {
                    StoreBackend::Postgrest(config) => {
                        Arc::new(PostgrestStore::connect(config).await.inspect_err(|e| {
                            error!("Error establishing store connection: {}", e);
                        })?)
                    }
                    StoreBackend::Memory(store) => Arc::new(store.clone()),
                };
                Ok::<_, StoreError>(store)
            })
            .await?;
        Ok(Arc::clone(store))
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}
