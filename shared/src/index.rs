//! Per-document cache of parsed block sequences. Loading is single-flight:
//! concurrent first requests for one key trigger exactly one provider call
//! and every caller observes the same document.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::document::{Document, DocumentProvider};
use crate::error::Result;

pub struct BlockIndex<P> {
    provider: P,
    cells: Mutex<HashMap<String, Arc<OnceCell<Arc<Document>>>>>,
}

impl<P: DocumentProvider> BlockIndex<P> {
    pub fn new(provider: P) -> Self {
        BlockIndex {
            provider,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached document, loading it through the provider on the
    /// first request. Failed loads are not cached, so a later request can
    /// retry after the underlying artifact appears.
    pub fn get_or_load(&self, document_id: &str) -> Result<Arc<Document>> {
        let cell = {
            let mut cells = self.cells.lock().unwrap();
            cells.entry(document_id.to_string()).or_default().clone()
        };
        // Concurrent first callers block here while a single one loads.
        cell.get_or_try_init(|| {
            debug!(id = document_id, "cache miss, loading document");
            self.provider.load(document_id).map(Arc::new)
        })
        .cloned()
    }

    /// Drops a cache entry. Staleness is the caller's responsibility; there
    /// is no automatic detection.
    pub fn invalidate(&self, document_id: &str) -> bool {
        self.cells.lock().unwrap().remove(document_id).is_some()
    }
}
